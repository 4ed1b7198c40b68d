// src/models.rs
use serde::{Deserialize, Serialize};

/// A complete structured video prompt as returned by the generative service.
///
/// Every key is required on the wire; a response missing any of them does not
/// parse, which is the only completeness check the gateway performs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub prompt_video: String,
    pub concept_opening: String,
    pub scene: String,
    pub subject: String,
    pub action: String,
    pub environment: String,
    pub lighting: String,
    pub mood: String,
    pub spoken_lines: String,
    pub negative_prompt: String,
    pub additional_suggestions: AdditionalSuggestions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalSuggestions {
    pub camera_angle: String,
    pub camera_movement: String,
    pub transitions: String,
    pub background_music: String,
    pub visual_effects: String,
}

/// English-only elaboration derived from a [`Prompt`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedPrompt {
    pub subject: String,
    pub action: String,
    pub expression: String,
    pub place: String,
    pub time: String,
    pub camera_movement: String,
    pub lighting: String,
    pub video_style: String,
    pub video_mood: String,
    pub sound_or_music: String,
    pub spoken_lines: String,
    pub additional_details: String,
}

/// The fifteen user-editable prompt fields, ten top-level and five nested
/// under the additional suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptField {
    PromptVideo,
    ConceptOpening,
    Scene,
    Subject,
    Action,
    Environment,
    Lighting,
    Mood,
    SpokenLines,
    NegativePrompt,
    CameraAngle,
    CameraMovement,
    Transitions,
    BackgroundMusic,
    VisualEffects,
}

impl PromptField {
    pub const ALL: [PromptField; 15] = [
        PromptField::PromptVideo,
        PromptField::ConceptOpening,
        PromptField::Scene,
        PromptField::Subject,
        PromptField::Action,
        PromptField::Environment,
        PromptField::Lighting,
        PromptField::Mood,
        PromptField::SpokenLines,
        PromptField::NegativePrompt,
        PromptField::CameraAngle,
        PromptField::CameraMovement,
        PromptField::Transitions,
        PromptField::BackgroundMusic,
        PromptField::VisualEffects,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PromptField::PromptVideo => "promptVideo",
            PromptField::ConceptOpening => "conceptOpening",
            PromptField::Scene => "scene",
            PromptField::Subject => "subject",
            PromptField::Action => "action",
            PromptField::Environment => "environment",
            PromptField::Lighting => "lighting",
            PromptField::Mood => "mood",
            PromptField::SpokenLines => "spokenLines",
            PromptField::NegativePrompt => "negativePrompt",
            PromptField::CameraAngle => "cameraAngle",
            PromptField::CameraMovement => "cameraMovement",
            PromptField::Transitions => "transitions",
            PromptField::BackgroundMusic => "backgroundMusic",
            PromptField::VisualEffects => "visualEffects",
        }
    }

    /// Label shown on the text-entry form.
    pub fn form_label(self) -> &'static str {
        match self {
            PromptField::PromptVideo => "Prompt Video",
            PromptField::ConceptOpening => "Pembukaan Konsep",
            PromptField::Scene => "Adegan",
            PromptField::Subject => "Subjek",
            PromptField::Action => "Aksi",
            PromptField::Environment => "Lingkungan",
            PromptField::Lighting => "Pencahayaan",
            PromptField::Mood => "Suasana Hati",
            PromptField::SpokenLines => "Kalimat yang Diucapkan",
            PromptField::NegativePrompt => "Prompt Negatif",
            PromptField::CameraAngle => "Sudut Kamera",
            PromptField::CameraMovement => "Pergerakan Kamera",
            PromptField::Transitions => "Transisi",
            PromptField::BackgroundMusic => "Musik Latar",
            PromptField::VisualEffects => "Efek Visual",
        }
    }

    /// Label used when rendering the translated result.
    pub fn result_label(self) -> &'static str {
        match self {
            PromptField::PromptVideo => "Video Prompt",
            PromptField::ConceptOpening => "Concept Opening",
            PromptField::Scene => "Scene",
            PromptField::Subject => "Subject",
            PromptField::Action => "Action",
            PromptField::Environment => "Environment",
            PromptField::Lighting => "Lighting",
            PromptField::Mood => "Mood",
            PromptField::SpokenLines => "Spoken Lines",
            PromptField::NegativePrompt => "Negative Prompt",
            PromptField::CameraAngle => "Camera Angle",
            PromptField::CameraMovement => "Camera Movement",
            PromptField::Transitions => "Transitions",
            PromptField::BackgroundMusic => "Background Music",
            PromptField::VisualEffects => "Visual Effects",
        }
    }

    pub fn is_suggestion(self) -> bool {
        matches!(
            self,
            PromptField::CameraAngle
                | PromptField::CameraMovement
                | PromptField::Transitions
                | PromptField::BackgroundMusic
                | PromptField::VisualEffects
        )
    }
}

/// One labelled value ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl Prompt {
    pub fn field(&self, field: PromptField) -> &str {
        match field {
            PromptField::PromptVideo => &self.prompt_video,
            PromptField::ConceptOpening => &self.concept_opening,
            PromptField::Scene => &self.scene,
            PromptField::Subject => &self.subject,
            PromptField::Action => &self.action,
            PromptField::Environment => &self.environment,
            PromptField::Lighting => &self.lighting,
            PromptField::Mood => &self.mood,
            PromptField::SpokenLines => &self.spoken_lines,
            PromptField::NegativePrompt => &self.negative_prompt,
            PromptField::CameraAngle => &self.additional_suggestions.camera_angle,
            PromptField::CameraMovement => &self.additional_suggestions.camera_movement,
            PromptField::Transitions => &self.additional_suggestions.transitions,
            PromptField::BackgroundMusic => &self.additional_suggestions.background_music,
            PromptField::VisualEffects => &self.additional_suggestions.visual_effects,
        }
    }

    pub fn field_mut(&mut self, field: PromptField) -> &mut String {
        match field {
            PromptField::PromptVideo => &mut self.prompt_video,
            PromptField::ConceptOpening => &mut self.concept_opening,
            PromptField::Scene => &mut self.scene,
            PromptField::Subject => &mut self.subject,
            PromptField::Action => &mut self.action,
            PromptField::Environment => &mut self.environment,
            PromptField::Lighting => &mut self.lighting,
            PromptField::Mood => &mut self.mood,
            PromptField::SpokenLines => &mut self.spoken_lines,
            PromptField::NegativePrompt => &mut self.negative_prompt,
            PromptField::CameraAngle => &mut self.additional_suggestions.camera_angle,
            PromptField::CameraMovement => &mut self.additional_suggestions.camera_movement,
            PromptField::Transitions => &mut self.additional_suggestions.transitions,
            PromptField::BackgroundMusic => &mut self.additional_suggestions.background_music,
            PromptField::VisualEffects => &mut self.additional_suggestions.visual_effects,
        }
    }

    /// The ten top-level fields, in schema order.
    pub fn narrative_sections(&self) -> Vec<Section> {
        self.sections(|field| !field.is_suggestion())
    }

    pub fn suggestion_sections(&self) -> Vec<Section> {
        self.sections(PromptField::is_suggestion)
    }

    fn sections(&self, include: impl Fn(PromptField) -> bool) -> Vec<Section> {
        PromptField::ALL
            .into_iter()
            .filter(|field| include(*field))
            .map(|field| Section {
                key: field.key(),
                label: field.result_label(),
                value: self.field(field).to_string(),
            })
            .collect()
    }
}

/// A partially filled prompt used as generation input. Blank fields are
/// left for the generative service to invent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DraftPrompt(Prompt);

impl DraftPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: PromptField) -> &str {
        self.0.field(field)
    }

    /// Replaces exactly one field; every other field keeps its value.
    pub fn set(&mut self, field: PromptField, value: impl Into<String>) {
        *self.0.field_mut(field) = value.into();
    }

    pub fn is_blank(&self) -> bool {
        PromptField::ALL
            .into_iter()
            .all(|field| self.get(field).trim().is_empty())
    }

    pub fn as_prompt(&self) -> &Prompt {
        &self.0
    }
}

impl From<Prompt> for DraftPrompt {
    fn from(prompt: Prompt) -> Self {
        Self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailedField {
    Subject,
    Action,
    Expression,
    Place,
    Time,
    CameraMovement,
    Lighting,
    VideoStyle,
    VideoMood,
    SoundOrMusic,
    SpokenLines,
    AdditionalDetails,
}

impl DetailedField {
    pub const ALL: [DetailedField; 12] = [
        DetailedField::Subject,
        DetailedField::Action,
        DetailedField::Expression,
        DetailedField::Place,
        DetailedField::Time,
        DetailedField::CameraMovement,
        DetailedField::Lighting,
        DetailedField::VideoStyle,
        DetailedField::VideoMood,
        DetailedField::SoundOrMusic,
        DetailedField::SpokenLines,
        DetailedField::AdditionalDetails,
    ];

    /// Shown while the premium gate is still locked.
    pub const PREVIEW: [DetailedField; 5] = [
        DetailedField::Subject,
        DetailedField::Action,
        DetailedField::Place,
        DetailedField::VideoStyle,
        DetailedField::VideoMood,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DetailedField::Subject => "subject",
            DetailedField::Action => "action",
            DetailedField::Expression => "expression",
            DetailedField::Place => "place",
            DetailedField::Time => "time",
            DetailedField::CameraMovement => "cameraMovement",
            DetailedField::Lighting => "lighting",
            DetailedField::VideoStyle => "videoStyle",
            DetailedField::VideoMood => "videoMood",
            DetailedField::SoundOrMusic => "soundOrMusic",
            DetailedField::SpokenLines => "spokenLines",
            DetailedField::AdditionalDetails => "additionalDetails",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailedField::Subject => "Subject",
            DetailedField::Action => "Action",
            DetailedField::Expression => "Expression",
            DetailedField::Place => "Place",
            DetailedField::Time => "Time",
            DetailedField::CameraMovement => "Camera Movement",
            DetailedField::Lighting => "Lighting",
            DetailedField::VideoStyle => "Video Style",
            DetailedField::VideoMood => "Video Mood",
            DetailedField::SoundOrMusic => "Sound or Music",
            DetailedField::SpokenLines => "Spoken Lines",
            DetailedField::AdditionalDetails => "Additional Details",
        }
    }
}

impl DetailedPrompt {
    pub fn field(&self, field: DetailedField) -> &str {
        match field {
            DetailedField::Subject => &self.subject,
            DetailedField::Action => &self.action,
            DetailedField::Expression => &self.expression,
            DetailedField::Place => &self.place,
            DetailedField::Time => &self.time,
            DetailedField::CameraMovement => &self.camera_movement,
            DetailedField::Lighting => &self.lighting,
            DetailedField::VideoStyle => &self.video_style,
            DetailedField::VideoMood => &self.video_mood,
            DetailedField::SoundOrMusic => &self.sound_or_music,
            DetailedField::SpokenLines => &self.spoken_lines,
            DetailedField::AdditionalDetails => &self.additional_details,
        }
    }

    /// Non-empty preview fields only.
    pub fn preview_sections(&self) -> Vec<Section> {
        DetailedField::PREVIEW
            .into_iter()
            .filter(|field| !self.field(*field).is_empty())
            .map(|field| self.section(field))
            .collect()
    }

    pub fn all_sections(&self) -> Vec<Section> {
        DetailedField::ALL
            .into_iter()
            .map(|field| self.section(field))
            .collect()
    }

    fn section(&self, field: DetailedField) -> Section {
        Section {
            key: field.key(),
            label: field.label(),
            value: self.field(field).to_string(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn editing_one_draft_field_leaves_the_others_untouched() {
        let seed = sample_prompt();
        for field in PromptField::ALL {
            let mut draft = DraftPrompt::from(seed.clone());
            draft.set(field, "changed");
            for other in PromptField::ALL {
                if other == field {
                    assert_eq!(draft.get(other), "changed");
                } else {
                    assert_eq!(draft.get(other), seed.field(other), "{:?} leaked into {:?}", field, other);
                }
            }
        }
    }

    #[test]
    fn prompt_wire_keys_match_field_keys() {
        let value = serde_json::to_value(sample_prompt()).unwrap();
        for field in PromptField::ALL {
            let slot = if field.is_suggestion() {
                &value["additionalSuggestions"][field.key()]
            } else {
                &value[field.key()]
            };
            assert_eq!(slot.as_str(), Some(sample_prompt().field(field)));
        }
    }

    #[test]
    fn prompt_missing_a_field_does_not_parse() {
        let mut value = serde_json::to_value(sample_prompt()).unwrap();
        value.as_object_mut().unwrap().remove("mood");
        assert!(serde_json::from_value::<Prompt>(value).is_err());
    }

    #[test]
    fn draft_serializes_as_a_flat_prompt() {
        let mut draft = DraftPrompt::new();
        assert!(draft.is_blank());
        draft.set(PromptField::Subject, "kucing oranye");
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["subject"], "kucing oranye");
        assert_eq!(value["additionalSuggestions"]["cameraAngle"], "");
        assert!(!draft.is_blank());
    }

    #[test]
    fn preview_skips_empty_fields() {
        let mut detailed = sample_detailed("Halo");
        detailed.place.clear();
        let keys: Vec<_> = detailed.preview_sections().iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["subject", "action", "videoStyle", "videoMood"]);
        assert_eq!(detailed.all_sections().len(), 12);
    }

    #[test]
    fn prompt_sections_split_narrative_and_suggestions() {
        let prompt = sample_prompt();
        assert_eq!(prompt.narrative_sections().len(), 10);
        let suggestions = prompt.suggestion_sections();
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0].label, "Camera Angle");
    }

    #[test]
    fn field_deserializes_from_wire_key() {
        let field: PromptField = serde_json::from_str("\"backgroundMusic\"").unwrap();
        assert_eq!(field, PromptField::BackgroundMusic);
        assert_eq!(field.form_label(), "Musik Latar");
    }
}
