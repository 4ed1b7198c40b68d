// src/flow/controller.rs
use crate::errors::AppError;

/// Top-level screen sequence. Transitions only move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    /// `launching` holds the accepted name while the launch animation runs.
    NameCapture { launching: Option<String> },
    Generating { user_name: String },
}

#[derive(Debug)]
pub struct FlowController {
    screen: Screen,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            screen: Screen::Welcome,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn get_started(&mut self) -> Result<(), AppError> {
        match self.screen {
            Screen::Welcome => {
                self.screen = Screen::NameCapture { launching: None };
                Ok(())
            }
            _ => Err(self.invalid("get started")),
        }
    }

    /// Accepts a name and starts the launch; the screen stays on name
    /// capture until [`FlowController::finish_launch`].
    pub fn submit_name(&mut self, name: &str) -> Result<String, AppError> {
        let name = name.trim();
        match &self.screen {
            Screen::NameCapture { launching: None } => {
                if name.is_empty() {
                    return Err(AppError::Validation("Name must not be empty".to_string()));
                }
                self.screen = Screen::NameCapture {
                    launching: Some(name.to_string()),
                };
                Ok(name.to_string())
            }
            _ => Err(self.invalid("submit a name")),
        }
    }

    pub fn finish_launch(&mut self) -> Result<(), AppError> {
        if let Screen::NameCapture {
            launching: Some(name),
        } = &self.screen
        {
            let user_name = name.clone();
            self.screen = Screen::Generating { user_name };
            return Ok(());
        }
        Err(self.invalid("finish launch"))
    }

    pub fn greeting(&self) -> Option<String> {
        self.user_name()
            .map(|name| format!("Selamat Datang, {}!", name))
    }

    pub fn user_name(&self) -> Option<&str> {
        match &self.screen {
            Screen::Generating { user_name } => Some(user_name),
            _ => None,
        }
    }

    /// Generator events are only accepted on the generating screen.
    pub fn require_generating(&self) -> Result<(), AppError> {
        match self.screen {
            Screen::Generating { .. } => Ok(()),
            _ => Err(self.invalid("use the generator")),
        }
    }

    fn invalid(&self, action: &str) -> AppError {
        AppError::InvalidTransition(format!("cannot {} from {:?}", action, self.screen))
    }
}
