// src/flow/acquisition.rs
use crate::errors::{AppError, GenerationError, MISSING_IMAGE_MESSAGE};
use crate::models::{DraftPrompt, Prompt, PromptField};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which acquisition flow the generator screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    #[default]
    Image,
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CallStatus {
    #[default]
    Idle,
    InFlight,
    Failed(String),
}

impl CallStatus {
    pub fn in_flight(&self) -> bool {
        matches!(self, CallStatus::InFlight)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CallStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn settle(&mut self, result: Result<Prompt, GenerationError>) -> Result<Prompt, AppError> {
        match result {
            Ok(prompt) => {
                *self = CallStatus::Idle;
                Ok(prompt)
            }
            Err(e) => {
                *self = CallStatus::Failed(e.user_message().to_string());
                Err(AppError::Generation(e))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub filename: String,
    pub mime_type: &'static str,
    pub data: Bytes,
    pub preview_url: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedImage {
    pub fn new(filename: String, mime_type: &'static str, data: Bytes) -> Self {
        let preview_url = format!(
            "data:{};base64,{}",
            mime_type,
            general_purpose::STANDARD.encode(&data)
        );
        Self {
            filename,
            mime_type,
            data,
            preview_url,
            loaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageFlow {
    image: Option<LoadedImage>,
    status: CallStatus,
}

impl ImageFlow {
    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn status(&self) -> &CallStatus {
        &self.status
    }

    pub fn can_generate(&self) -> bool {
        self.image.is_some() && !self.status.in_flight()
    }

    /// Replaces the held image and clears any previous error.
    pub fn load(&mut self, image: LoadedImage) -> Result<(), AppError> {
        if self.status.in_flight() {
            return Err(AppError::Busy("image generation in progress"));
        }
        self.image = Some(image);
        self.status = CallStatus::Idle;
        Ok(())
    }

    /// Marks the flow in flight and hands out the payload for the gateway.
    pub fn begin(&mut self) -> Result<(Bytes, &'static str), AppError> {
        if self.status.in_flight() {
            return Err(AppError::Busy("image generation in progress"));
        }
        let image = self.image.as_ref().ok_or_else(|| {
            self.status = CallStatus::Failed(MISSING_IMAGE_MESSAGE.to_string());
            AppError::InputMissing(MISSING_IMAGE_MESSAGE)
        })?;
        let payload = (image.data.clone(), image.mime_type);
        self.status = CallStatus::InFlight;
        Ok(payload)
    }

    pub fn finish(&mut self, result: Result<Prompt, GenerationError>) -> Result<Prompt, AppError> {
        self.status.settle(result)
    }
}

/// One-shot slot carrying a prompt back into the text flow.
#[derive(Debug, Default)]
pub struct Handoff(Option<Prompt>);

impl Handoff {
    pub fn put(&mut self, prompt: Prompt) {
        self.0 = Some(prompt);
    }

    pub fn take(&mut self) -> Option<Prompt> {
        self.0.take()
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug, Default)]
pub struct TextFlow {
    draft: DraftPrompt,
    status: CallStatus,
}

impl TextFlow {
    pub fn draft(&self) -> &DraftPrompt {
        &self.draft
    }

    pub fn status(&self) -> &CallStatus {
        &self.status
    }

    pub fn can_generate(&self) -> bool {
        !self.status.in_flight()
    }

    pub fn edit(&mut self, field: PromptField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Adopts a pending hand-off as the current draft, consuming it.
    pub fn adopt(&mut self, handoff: &mut Handoff) -> bool {
        match handoff.take() {
            Some(prompt) => {
                self.draft = DraftPrompt::from(prompt);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the draft for the gateway; later edits do not affect it.
    pub fn begin(&mut self) -> Result<DraftPrompt, AppError> {
        if self.status.in_flight() {
            return Err(AppError::Busy("text generation in progress"));
        }
        self.status = CallStatus::InFlight;
        Ok(self.draft.clone())
    }

    pub fn finish(&mut self, result: Result<Prompt, GenerationError>) -> Result<Prompt, AppError> {
        self.status.settle(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{INVALID_PROMPT_MESSAGE, ResponseShape};
    use crate::models::fixtures::sample_prompt;

    fn image() -> LoadedImage {
        LoadedImage::new(
            "pantai.png".to_string(),
            "image/png",
            Bytes::from_static(b"abc"),
        )
    }

    fn shape_error() -> GenerationError {
        GenerationError::InvalidResponseShape {
            shape: ResponseShape::Prompt,
            detail: "eof".to_string(),
        }
    }

    #[test]
    fn preview_is_a_data_url() {
        assert_eq!(image().preview_url, "data:image/png;base64,YWJj");
    }

    #[test]
    fn image_generation_needs_an_image() {
        let mut flow = ImageFlow::default();
        assert!(!flow.can_generate());
        assert!(matches!(flow.begin(), Err(AppError::InputMissing(_))));
        assert_eq!(flow.status().error(), Some(MISSING_IMAGE_MESSAGE));
    }

    #[test]
    fn image_flow_is_disabled_while_in_flight() {
        let mut flow = ImageFlow::default();
        flow.load(image()).unwrap();
        assert!(flow.can_generate());

        let (data, mime) = flow.begin().unwrap();
        assert_eq!(&data[..], b"abc");
        assert_eq!(mime, "image/png");
        assert!(!flow.can_generate());
        assert!(matches!(flow.begin(), Err(AppError::Busy(_))));
        assert!(matches!(flow.load(image()), Err(AppError::Busy(_))));

        let prompt = flow.finish(Ok(sample_prompt())).unwrap();
        assert_eq!(prompt, sample_prompt());
        assert!(flow.can_generate());
    }

    #[test]
    fn failure_keeps_the_image_and_records_the_message() {
        let mut flow = ImageFlow::default();
        flow.load(image()).unwrap();
        flow.begin().unwrap();
        assert!(flow.finish(Err(shape_error())).is_err());
        assert_eq!(flow.status().error(), Some(INVALID_PROMPT_MESSAGE));
        assert!(flow.image().is_some());

        flow.load(image()).unwrap();
        assert_eq!(flow.status(), &CallStatus::Idle);
    }

    #[test]
    fn handoff_is_consumed_once() {
        let mut handoff = Handoff::default();
        let mut flow = TextFlow::default();
        handoff.put(sample_prompt());

        assert!(flow.adopt(&mut handoff));
        assert_eq!(flow.draft().as_prompt(), &sample_prompt());
        assert!(handoff.take().is_none());

        flow.edit(PromptField::Mood, "Ceria");
        assert!(!flow.adopt(&mut handoff));
        assert_eq!(flow.draft().get(PromptField::Mood), "Ceria");
    }

    #[test]
    fn text_generation_uses_a_snapshot_of_the_draft() {
        let mut flow = TextFlow::default();
        flow.edit(PromptField::Subject, "kucing");
        let sent = flow.begin().unwrap();
        flow.edit(PromptField::Subject, "anjing");
        assert_eq!(sent.get(PromptField::Subject), "kucing");
        assert!(!flow.can_generate());
        assert!(matches!(flow.begin(), Err(AppError::Busy(_))));
        flow.finish(Ok(sample_prompt())).unwrap();
        assert!(flow.can_generate());
    }
}
