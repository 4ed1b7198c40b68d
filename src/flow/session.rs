// src/flow/session.rs
use crate::errors::{AppError, GenerationError};
use crate::flow::acquisition::{Handoff, ImageFlow, LoadedImage, Mode, TextFlow};
use crate::flow::controller::FlowController;
use crate::flow::presentation::{Applied, CycleEvent, CycleTicket, ResultPipeline, fan_out};
use crate::flow::view::{self, SessionView};
use crate::models::{DraftPrompt, Prompt, PromptField};
use crate::services::PromptGateway;
use bytes::Bytes;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedSession = Arc<Mutex<Session>>;

/// All in-memory UI state of the single user session.
#[derive(Debug)]
pub struct Session {
    controller: FlowController,
    mode: Mode,
    image: ImageFlow,
    text: TextFlow,
    handoff: Handoff,
    pipeline: Option<ResultPipeline>,
    unlock_secret: String,
}

impl Session {
    pub fn new(unlock_secret: impl Into<String>) -> Self {
        Self {
            controller: FlowController::new(),
            mode: Mode::default(),
            image: ImageFlow::default(),
            text: TextFlow::default(),
            handoff: Handoff::default(),
            pipeline: None,
            unlock_secret: unlock_secret.into(),
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn image_flow(&self) -> &ImageFlow {
        &self.image
    }

    pub fn text_flow(&self) -> &TextFlow {
        &self.text
    }

    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    pub fn pipeline(&self) -> Option<&ResultPipeline> {
        self.pipeline.as_ref()
    }

    pub fn snapshot(&self) -> SessionView {
        view::render(self)
    }

    pub fn get_started(&mut self) -> Result<(), AppError> {
        self.controller.get_started()
    }

    pub fn submit_name(&mut self, name: &str) -> Result<String, AppError> {
        self.controller.submit_name(name)
    }

    pub fn finish_launch(&mut self) -> Result<(), AppError> {
        self.controller.finish_launch()?;
        info!(
            "Session entered generator as {}",
            self.controller.user_name().unwrap_or_default()
        );
        Ok(())
    }

    /// Switching to the text flow consumes any pending hand-off.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), AppError> {
        self.controller.require_generating()?;
        self.mode = mode;
        if mode == Mode::Text && self.text.adopt(&mut self.handoff) {
            info!("Text flow adopted a reused prompt");
        }
        Ok(())
    }

    pub fn load_image(&mut self, image: LoadedImage) -> Result<(), AppError> {
        self.controller.require_generating()?;
        info!(
            "Loaded image {} ({}, {} bytes)",
            image.filename,
            image.mime_type,
            image.data.len()
        );
        self.image.load(image)
    }

    pub fn begin_image_generation(&mut self) -> Result<(Bytes, &'static str), AppError> {
        self.controller.require_generating()?;
        self.image.begin()
    }

    pub fn finish_image_generation(
        &mut self,
        result: Result<Prompt, GenerationError>,
    ) -> Result<CycleTicket, AppError> {
        let prompt = self.image.finish(result)?;
        Ok(self.start_cycle(prompt))
    }

    pub fn edit_draft(&mut self, field: PromptField, value: String) -> Result<(), AppError> {
        self.controller.require_generating()?;
        self.text.edit(field, value);
        Ok(())
    }

    pub fn begin_text_generation(&mut self) -> Result<DraftPrompt, AppError> {
        self.controller.require_generating()?;
        self.text.begin()
    }

    pub fn finish_text_generation(
        &mut self,
        result: Result<Prompt, GenerationError>,
    ) -> Result<CycleTicket, AppError> {
        let prompt = self.text.finish(result)?;
        Ok(self.start_cycle(prompt))
    }

    pub fn amend_result(&mut self, field: PromptField, value: String) -> Result<(), AppError> {
        self.current_pipeline()?.amend(field, value);
        Ok(())
    }

    pub fn submit_unlock(&mut self, attempt: &str) -> Result<(), AppError> {
        let secret = self.unlock_secret.clone();
        self.current_pipeline()?.submit_unlock(attempt, &secret)
    }

    /// Sends the editable source prompt back to the text flow.
    pub fn request_reuse(&mut self) -> Result<(), AppError> {
        let source = self.current_pipeline()?.source().clone();
        self.handoff.put(source);
        self.set_mode(Mode::Text)
    }

    pub fn apply_cycle_event(&mut self, event: CycleEvent) -> Applied {
        match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.apply(event),
            None => Applied::Stale,
        }
    }

    fn start_cycle(&mut self, prompt: Prompt) -> CycleTicket {
        let (pipeline, ticket) = ResultPipeline::start(prompt);
        self.pipeline = Some(pipeline);
        ticket
    }

    fn current_pipeline(&mut self) -> Result<&mut ResultPipeline, AppError> {
        self.controller.require_generating()?;
        self.pipeline
            .as_mut()
            .ok_or_else(|| AppError::InvalidTransition("no generated prompt yet".to_string()))
    }
}

/// Drives the fan-out of one cycle, applying each half to the session as
/// it arrives. Halves of a superseded cycle are dropped on arrival.
pub async fn run_cycle(session: SharedSession, gateway: Arc<dyn PromptGateway>, ticket: CycleTicket) {
    fan_out(gateway.as_ref(), ticket, |event| {
        let session = session.clone();
        async move {
            session.lock().await.apply_cycle_event(event);
        }
    })
    .await;
}
