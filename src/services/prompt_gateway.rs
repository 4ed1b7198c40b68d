// src/services/prompt_gateway.rs
use crate::config::Languages;
use crate::errors::{GenerationError, ResponseShape};
use crate::models::{DetailedPrompt, DraftPrompt, Prompt};
use crate::services::gemini_client::{GenerativeBackend, Operation, Part, StructuredRequest};
use crate::services::schemas::{detailed_prompt_schema, prompt_schema};
use async_trait::async_trait;
use bytes::Bytes;
use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// The four AI-backed prompt transformations. Every call is a single
/// attempt; failures are returned to the caller as-is.
#[async_trait]
pub trait PromptGateway: Send + Sync {
    async fn generate_from_image(
        &self,
        image: Bytes,
        mime_type: &str,
    ) -> Result<Prompt, GenerationError>;

    async fn generate_from_text(&self, draft: &DraftPrompt) -> Result<Prompt, GenerationError>;

    /// Rewrites every field into the translation language except
    /// `spoken_lines`, which is returned exactly as given.
    async fn translate(&self, prompt: &Prompt) -> Result<Prompt, GenerationError>;

    /// Derives the detailed fields; `spoken_lines` is copied verbatim.
    async fn elaborate(&self, prompt: &Prompt) -> Result<DetailedPrompt, GenerationError>;
}

pub struct SchemaGateway {
    backend: Arc<dyn GenerativeBackend>,
    languages: Languages,
}

impl SchemaGateway {
    pub fn new(backend: Arc<dyn GenerativeBackend>, languages: Languages) -> Self {
        Self { backend, languages }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: Operation,
        parts: Vec<Part>,
    ) -> Result<T, GenerationError> {
        let response_schema = match operation.shape() {
            ResponseShape::Prompt => prompt_schema(),
            ResponseShape::DetailedPrompt => detailed_prompt_schema(),
        };
        let request = StructuredRequest {
            operation,
            parts,
            response_schema,
        };

        let text = self.backend.generate(&request).await.inspect_err(|e| {
            warn!("{} failed: {}", operation.name(), e);
        })?;
        parse_structured(&text, operation.shape())
    }

    fn spoken_lines_rule(&self) -> String {
        let narrative = &self.languages.narrative;
        format!(
            "IMPORTANT RULE for 'spokenLines': analyze the subject and action. If there are \
             characters who can speak, creatively write a suitable line of dialogue for them in \
             {narrative}. If there are no speaking characters (e.g., animals, landscapes), fill this \
             field with a relevant environmental sound described in {narrative} (e.g., crashing \
             waves, a strong gust of wind, birdsong in the morning). Never leave it empty."
        )
    }

    fn image_instruction(&self) -> String {
        format!(
            "Analyze this image and generate a detailed video prompt based on it. Describe the \
             scene, subjects, potential actions and overall mood. Structure the output as a JSON \
             object that adheres to the provided schema. The language of the output must be {}.\n{}",
            self.languages.narrative,
            self.spoken_lines_rule()
        )
    }

    fn text_instruction(&self, draft: &DraftPrompt) -> String {
        format!(
            "You are an expert prompt engineer for the Veo3 video generation model.\n\
             A user has provided the following basic ideas in a JSON object.\n\
             Expand these ideas into a rich, detailed and evocative video prompt.\n\
             Flesh out every field in the provided JSON schema, even if the user left some empty. \
             Use every non-empty field as a creative seed.\n\
             The final output must be a valid JSON object adhering to the schema, written entirely \
             in {}.\n{}\n\nUser Input:\n{}",
            self.languages.narrative,
            self.spoken_lines_rule(),
            pretty(draft)
        )
    }

    fn translate_instruction(&self, prompt: &Prompt) -> String {
        let Languages {
            narrative,
            translation,
        } = &self.languages;
        format!(
            "You are an expert cinematic prompt engineer for the Veo3 video generation model.\n\
             Take the user's {narrative} prompt and elevate it to a premium, highly detailed, \
             professional-grade prompt in {translation}.\n\
             - For each field, creatively expand and enrich the content. Make it much more \
             descriptive, evocative and detailed.\n\
             - Keep character descriptions and actions consistent across all fields.\n\
             - The output language for all fields must be {translation}, except for one.\n\
             - MOST IMPORTANT RULE: you MUST NOT translate the value of the 'spokenLines' field. \
             Preserve its original {narrative} text exactly.\n\
             - The output must be a valid JSON object with exactly the same structure.\n\n\
             {narrative} JSON Input:\n{}",
            pretty(prompt)
        )
    }

    fn elaborate_instruction(&self, prompt: &Prompt) -> String {
        let narrative = &self.languages.narrative;
        format!(
            "You are an expert video prompt creator. Based on the following comprehensive \
             {narrative} video prompt, break it down and creatively fill in the fields of the \
             provided English JSON schema.\n\
             - Analyze the entire prompt to extract and infer the details for each field.\n\
             - Be specific. For 'time', 'cameraMovement', 'lighting', 'videoStyle' and 'videoMood' \
             give specific, professional-sounding choices.\n\
             - MOST IMPORTANT RULE: the 'spokenLines' field of the output MUST contain the exact, \
             untranslated text of the 'spokenLines' field of the input.\n\
             - The output must be a valid JSON object adhering to the schema.\n\n\
             {narrative} Input Prompt:\n{}",
            pretty(prompt)
        )
    }
}

#[async_trait]
impl PromptGateway for SchemaGateway {
    async fn generate_from_image(
        &self,
        image: Bytes,
        mime_type: &str,
    ) -> Result<Prompt, GenerationError> {
        info!("Generating prompt from {} image ({} bytes)", mime_type, image.len());
        self.call(
            Operation::PromptFromImage,
            vec![
                Part::Text(self.image_instruction()),
                Part::InlineImage {
                    mime_type: mime_type.to_string(),
                    data: image,
                },
            ],
        )
        .await
    }

    async fn generate_from_text(&self, draft: &DraftPrompt) -> Result<Prompt, GenerationError> {
        info!("Generating prompt from text draft");
        self.call(
            Operation::PromptFromText,
            vec![Part::Text(self.text_instruction(draft))],
        )
        .await
    }

    async fn translate(&self, prompt: &Prompt) -> Result<Prompt, GenerationError> {
        let mut translated: Prompt = self
            .call(
                Operation::Translate,
                vec![Part::Text(self.translate_instruction(prompt))],
            )
            .await?;
        keep_spoken_lines(&mut translated.spoken_lines, &prompt.spoken_lines, Operation::Translate);
        Ok(translated)
    }

    async fn elaborate(&self, prompt: &Prompt) -> Result<DetailedPrompt, GenerationError> {
        let mut detailed: DetailedPrompt = self
            .call(
                Operation::Elaborate,
                vec![Part::Text(self.elaborate_instruction(prompt))],
            )
            .await?;
        keep_spoken_lines(&mut detailed.spoken_lines, &prompt.spoken_lines, Operation::Elaborate);
        Ok(detailed)
    }
}

/// The single structural check shared by all four operations.
pub(crate) fn parse_structured<T: DeserializeOwned>(
    text: &str,
    shape: ResponseShape,
) -> Result<T, GenerationError> {
    serde_json::from_str(text.trim()).map_err(|e| {
        warn!("Failed to parse {:?} response: {}", shape, text);
        GenerationError::InvalidResponseShape {
            shape,
            detail: e.to_string(),
        }
    })
}

fn keep_spoken_lines(output: &mut String, source: &str, operation: Operation) {
    if output.as_str() != source {
        warn!(
            "{} altered spokenLines; restoring the source text",
            operation.name()
        );
        *output = source.to_string();
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;
    use crate::models::PromptField;
    use crate::models::fixtures::{sample_detailed, sample_prompt};

    fn gateway(responses: Vec<Result<String, GenerationError>>) -> (SchemaGateway, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new(responses));
        (
            SchemaGateway::new(backend.clone(), Languages::default()),
            backend,
        )
    }

    fn json_of<T: Serialize>(value: &T) -> Result<String, GenerationError> {
        Ok(serde_json::to_string(value).unwrap())
    }

    #[tokio::test]
    async fn image_generation_sends_the_image_and_prompt_schema() {
        let (gateway, backend) = gateway(vec![json_of(&sample_prompt())]);
        let prompt = gateway
            .generate_from_image(Bytes::from_static(b"\x89PNG"), "image/png")
            .await
            .unwrap();
        assert_eq!(prompt, sample_prompt());

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].operation, Operation::PromptFromImage);
        assert!(matches!(
            &requests[0].parts[1],
            Part::InlineImage { mime_type, .. } if mime_type == "image/png"
        ));
        assert!(requests[0].response_schema["properties"]["additionalSuggestions"].is_object());
    }

    #[tokio::test]
    async fn text_generation_embeds_the_draft_seeds() {
        let (gateway, backend) = gateway(vec![json_of(&sample_prompt())]);
        let mut draft = DraftPrompt::new();
        draft.set(PromptField::Subject, "kucing oranye");
        gateway.generate_from_text(&draft).await.unwrap();

        let requests = backend.requests.lock().unwrap();
        match &requests[0].parts[0] {
            Part::Text(text) => {
                assert!(text.contains("kucing oranye"));
                assert!(text.contains("Indonesian"));
            }
            other => panic!("unexpected part {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_an_invalid_shape() {
        let (gateway, _) = gateway(vec![Ok("not json".to_string())]);
        let err = gateway
            .generate_from_text(&DraftPrompt::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidResponseShape {
                shape: ResponseShape::Prompt,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn incomplete_prompt_is_an_invalid_shape() {
        let mut value = serde_json::to_value(sample_prompt()).unwrap();
        value["additionalSuggestions"]
            .as_object_mut()
            .unwrap()
            .remove("transitions");
        let (gateway, _) = gateway(vec![Ok(value.to_string())]);
        assert!(gateway.generate_from_text(&DraftPrompt::new()).await.is_err());
    }

    #[tokio::test]
    async fn translate_never_changes_spoken_lines() {
        let source = sample_prompt();
        let mut disobedient = sample_prompt();
        disobedient.spoken_lines = "The sea always gives, if we are patient.".to_string();
        disobedient.subject = "A weathered old fisherman".to_string();

        let (gateway, _) = gateway(vec![json_of(&disobedient)]);
        let translated = gateway.translate(&source).await.unwrap();
        assert_eq!(translated.spoken_lines, source.spoken_lines);
        assert_eq!(translated.subject, "A weathered old fisherman");
    }

    #[tokio::test]
    async fn elaborate_never_changes_spoken_lines() {
        let source = sample_prompt();
        let (gateway, backend) = gateway(vec![json_of(&sample_detailed("Translated line"))]);
        let detailed = gateway.elaborate(&source).await.unwrap();
        assert_eq!(detailed.spoken_lines, source.spoken_lines);
        assert_eq!(
            backend.requests.lock().unwrap()[0].response_schema["required"]
                .as_array()
                .unwrap()
                .len(),
            12
        );
    }

    #[tokio::test]
    async fn elaborate_shape_error_uses_detailed_shape() {
        let (gateway, _) = gateway(vec![Ok("{\"subject\": 1}".to_string())]);
        let err = gateway.elaborate(&sample_prompt()).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidResponseShape {
                shape: ResponseShape::DetailedPrompt,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn transport_errors_pass_through_without_retry() {
        let (gateway, backend) = gateway(vec![
            Err(GenerationError::Transport("connection reset".into())),
            json_of(&sample_prompt()),
        ]);
        let err = gateway.translate(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }
}
