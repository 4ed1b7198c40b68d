// src/services/gemini_client.rs
use crate::errors::{GenerationError, ResponseShape};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PromptFromImage,
    PromptFromText,
    Translate,
    Elaborate,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::PromptFromImage => "prompt_from_image",
            Operation::PromptFromText => "prompt_from_text",
            Operation::Translate => "translate",
            Operation::Elaborate => "elaborate",
        }
    }

    pub fn shape(self) -> ResponseShape {
        match self {
            Operation::Elaborate => ResponseShape::DetailedPrompt,
            _ => ResponseShape::Prompt,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineImage { mime_type: String, data: Bytes },
}

/// One schema-constrained call to the generative service.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub operation: Operation,
    pub parts: Vec<Part>,
    pub response_schema: Value,
}

/// The external generative capability: a structured request in, raw JSON
/// text out. Implementations make exactly one attempt per call.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: &StructuredRequest) -> Result<String, GenerationError>;
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    api_base: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        Self {
            api_key,
            model,
            api_base,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: &StructuredRequest) -> Result<String, GenerationError> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to read Gemini response: {}", e)))?;
        let result = read_response(request.operation, status, &body)?;

        debug!(
            "Gemini {} answered in {} ms",
            request.operation.name(),
            start.elapsed().as_millis()
        );

        extract_text(&result, request.operation.shape())
    }
}

pub(crate) fn request_body(request: &StructuredRequest) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineImage { mime_type, data } => json!({
                "inline_data": {
                    "mime_type": mime_type,
                    "data": general_purpose::STANDARD.encode(data)
                }
            }),
        })
        .collect();

    json!({
        "contents": [{
            "role": "user",
            "parts": parts
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema
        }
    })
}

/// Maps an HTTP answer to its JSON body. A non-2xx status or a body that
/// is not JSON at all is a transport failure, not a shape error.
pub(crate) fn read_response(
    operation: Operation,
    status: StatusCode,
    body: &[u8],
) -> Result<Value, GenerationError> {
    if !status.is_success() {
        let error_text = String::from_utf8_lossy(body);
        error!("Gemini {} returned {}: {}", operation.name(), status, error_text);
        return Err(GenerationError::Transport(format!(
            "Gemini error {}: {}",
            status, error_text
        )));
    }

    serde_json::from_slice(body)
        .map_err(|e| GenerationError::Transport(format!("Failed to read Gemini response: {}", e)))
}

/// Joins the text parts of the first candidate.
pub(crate) fn extract_text(result: &Value, shape: ResponseShape) -> Result<String, GenerationError> {
    let parts = result["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| GenerationError::InvalidResponseShape {
            shape,
            detail: "no content in Gemini response".to_string(),
        })?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(GenerationError::InvalidResponseShape {
            shape,
            detail: "empty text in Gemini response".to_string(),
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_schema_and_inline_image() {
        let request = StructuredRequest {
            operation: Operation::PromptFromImage,
            parts: vec![
                Part::Text("describe".to_string()),
                Part::InlineImage {
                    mime_type: "image/png".to_string(),
                    data: Bytes::from_static(b"abc"),
                },
            ],
            response_schema: json!({ "type": "OBJECT" }),
        };

        let body = request_body(&request);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], "YWJj");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn text_is_joined_across_parts() {
        let result = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(
            extract_text(&result, ResponseShape::Prompt).unwrap(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn missing_candidates_is_a_shape_error() {
        let err = extract_text(&json!({ "candidates": [] }), ResponseShape::DetailedPrompt)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidResponseShape {
                shape: ResponseShape::DetailedPrompt,
                ..
            }
        ));
    }

    #[test]
    fn error_status_is_a_transport_failure() {
        let err = read_response(
            Operation::Translate,
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"error":{"message":"quota"}}"#,
        )
        .unwrap_err();
        match err {
            GenerationError::Transport(message) => {
                assert!(message.contains("429"));
                assert!(message.contains("quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreadable_body_is_a_transport_failure() {
        let err = read_response(Operation::PromptFromText, StatusCode::OK, b"<html>oops</html>")
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[test]
    fn success_body_is_parsed_as_json() {
        let body = read_response(
            Operation::Elaborate,
            StatusCode::OK,
            br#"{"candidates":[]}"#,
        )
        .unwrap();
        assert!(body["candidates"].as_array().unwrap().is_empty());
    }

    #[test]
    fn elaborate_expects_the_detailed_shape() {
        assert_eq!(Operation::Elaborate.shape(), ResponseShape::DetailedPrompt);
        assert_eq!(Operation::Translate.shape(), ResponseShape::Prompt);
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new(
            "k".to_string(),
            "gemini-2.5-flash".to_string(),
            "http://localhost:1".to_string(),
        );
        assert_eq!(
            client.endpoint(),
            "http://localhost:1/models/gemini-2.5-flash:generateContent"
        );
    }
}
