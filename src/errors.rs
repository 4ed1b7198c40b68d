// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

pub const INVALID_PROMPT_MESSAGE: &str = "AI memberikan format yang tidak valid. Silakan coba lagi.";
pub const INVALID_DETAILED_MESSAGE: &str =
    "AI memberikan format detail yang tidak valid. Silakan coba lagi.";
pub const UNKNOWN_FAILURE_MESSAGE: &str = "Terjadi kesalahan yang tidak diketahui.";
pub const MISSING_IMAGE_MESSAGE: &str = "Silakan unggah gambar terlebih dahulu.";
pub const WRONG_PASSPHRASE_MESSAGE: &str = "Kata sandi salah. Silakan coba lagi.";

/// Which structured shape a response was expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Prompt,
    DetailedPrompt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("response is not a well-formed {shape:?}: {detail}")]
    InvalidResponseShape { shape: ResponseShape, detail: String },

    #[error("generative service call failed: {0}")]
    Transport(String),
}

impl GenerationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::InvalidResponseShape {
                shape: ResponseShape::Prompt,
                ..
            } => INVALID_PROMPT_MESSAGE,
            GenerationError::InvalidResponseShape {
                shape: ResponseShape::DetailedPrompt,
                ..
            } => INVALID_DETAILED_MESSAGE,
            GenerationError::Transport(_) => UNKNOWN_FAILURE_MESSAGE,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input missing: {0}")]
    InputMissing(&'static str),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Unlock rejected")]
    UnlockRejected,

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Busy: {0}")]
    Busy(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InputMissing(_) => "Input missing",
            AppError::Generation(GenerationError::InvalidResponseShape { .. }) => {
                "Invalid response shape"
            }
            AppError::Generation(GenerationError::Transport(_)) => "AI service error",
            AppError::UnlockRejected => "Unlock rejected",
            AppError::ImageProcessing(_) => "Image processing error",
            AppError::Validation(_) => "Validation error",
            AppError::InvalidTransition(_) => "Invalid transition",
            AppError::Busy(_) => "Busy",
            AppError::Internal(_) => "Internal error",
        }
    }

    /// Text meant for the person using the UI.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InputMissing(message) => message.to_string(),
            AppError::Generation(e) => e.user_message().to_string(),
            AppError::UnlockRejected => WRONG_PASSPHRASE_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputMissing(_)
            | AppError::ImageProcessing(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Generation(GenerationError::InvalidResponseShape { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Generation(GenerationError::Transport(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnlockRejected => StatusCode::FORBIDDEN,
            AppError::InvalidTransition(_) | AppError::Busy(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": self.user_message()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_errors_pick_the_matching_message() {
        let prompt = GenerationError::InvalidResponseShape {
            shape: ResponseShape::Prompt,
            detail: "eof".to_string(),
        };
        let detailed = GenerationError::InvalidResponseShape {
            shape: ResponseShape::DetailedPrompt,
            detail: "eof".to_string(),
        };
        assert_eq!(prompt.user_message(), INVALID_PROMPT_MESSAGE);
        assert_eq!(detailed.user_message(), INVALID_DETAILED_MESSAGE);
        assert_eq!(
            GenerationError::Transport("timeout".into()).user_message(),
            UNKNOWN_FAILURE_MESSAGE
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::InputMissing(MISSING_IMAGE_MESSAGE).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::UnlockRejected.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Busy("image").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(GenerationError::Transport("x".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn user_message_for_unlock_is_localized() {
        assert_eq!(AppError::UnlockRejected.user_message(), WRONG_PASSPHRASE_MESSAGE);
    }
}
