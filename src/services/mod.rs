// src/services/mod.rs
pub mod gemini_client;
pub mod image_processor;
pub mod prompt_gateway;
pub mod schemas;

pub use gemini_client::{GeminiClient, GenerativeBackend};
pub use image_processor::ImageProcessor;
pub use prompt_gateway::{PromptGateway, SchemaGateway};
