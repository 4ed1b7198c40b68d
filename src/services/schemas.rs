// src/services/schemas.rs
// Response schemas in the generative service's OpenAPI subset.
use crate::models::{DetailedField, PromptField};
use serde_json::{Map, Value, json};

fn prompt_description(field: PromptField) -> &'static str {
    match field {
        PromptField::PromptVideo => "The main, concise video prompt.",
        PromptField::ConceptOpening => "The conceptual opening or high-level idea of the video.",
        PromptField::Scene => "A detailed description of the scene.",
        PromptField::Subject => "The main subject(s) of the video.",
        PromptField::Action => "The primary actions taking place.",
        PromptField::Environment => "The environment or setting.",
        PromptField::Lighting => "The lighting style (e.g., golden hour, cinematic).",
        PromptField::Mood => "The mood or atmosphere of the video.",
        PromptField::SpokenLines => {
            "Any spoken lines or dialogue. If no dialogue, describe relevant environmental sounds."
        }
        PromptField::NegativePrompt => {
            "Elements to exclude from the video (e.g., blurry, low quality)."
        }
        PromptField::CameraAngle => "Suggested camera angles.",
        PromptField::CameraMovement => "Suggested camera movements.",
        PromptField::Transitions => "Suggested scene transitions.",
        PromptField::BackgroundMusic => "Suggestions for background music or sound.",
        PromptField::VisualEffects => "Suggestions for visual effects.",
    }
}

fn detailed_description(field: DetailedField) -> &'static str {
    match field {
        DetailedField::Subject => "The main subject(s) of the video, in English.",
        DetailedField::Action => "The primary actions taking place, in English.",
        DetailedField::Expression => "The expressions or emotions of the subject, in English.",
        DetailedField::Place => "The location or setting, in English.",
        DetailedField::Time => {
            "The time of day or a specific temporal setting (e.g., 'Golden hour', 'Night'), in English."
        }
        DetailedField::CameraMovement => {
            "Specific camera movements (e.g., 'Slow pan left', 'Dolly zoom'), in English."
        }
        DetailedField::Lighting => {
            "The lighting style (e.g., 'Dramatic Rembrandt lighting'), in English."
        }
        DetailedField::VideoStyle => {
            "The overall video style (e.g., 'Cinematic documentary', 'Found footage'), in English."
        }
        DetailedField::VideoMood => {
            "The video's atmosphere or mood (e.g., 'Tense and suspenseful'), in English."
        }
        DetailedField::SoundOrMusic => "Description of sound or music, in English.",
        DetailedField::SpokenLines => "The original spoken lines. DO NOT TRANSLATE THIS FIELD.",
        DetailedField::AdditionalDetails => {
            "Any other important details to include, in English."
        }
    }
}

fn object(properties: Map<String, Value>, required: Vec<&'static str>) -> Value {
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required
    })
}

fn string_property(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

pub fn prompt_schema() -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut suggestion_properties = Map::new();
    let mut suggestion_required = Vec::new();

    for field in PromptField::ALL {
        let property = string_property(prompt_description(field));
        if field.is_suggestion() {
            suggestion_properties.insert(field.key().to_string(), property);
            suggestion_required.push(field.key());
        } else {
            properties.insert(field.key().to_string(), property);
            required.push(field.key());
        }
    }

    properties.insert(
        "additionalSuggestions".to_string(),
        object(suggestion_properties, suggestion_required),
    );
    required.push("additionalSuggestions");

    object(properties, required)
}

pub fn detailed_prompt_schema() -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in DetailedField::ALL {
        properties.insert(
            field.key().to_string(),
            string_property(detailed_description(field)),
        );
        required.push(field.key());
    }
    object(properties, required)
}
