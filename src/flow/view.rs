// src/flow/view.rs
// Renderable snapshots of the session, serialized for the browser UI.
use crate::flow::acquisition::Mode;
use crate::flow::controller::Screen;
use crate::flow::presentation::{CycleId, Gate, Phase, ResultPipeline};
use crate::flow::session::Session;
use crate::models::{DraftPrompt, Prompt, PromptField, Section};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub screen: ScreenView,
    pub generator: Option<GeneratorView>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum ScreenView {
    Welcome,
    NameCapture {
        launching: bool,
    },
    Generating {
        #[serde(rename = "userName")]
        user_name: String,
        greeting: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorView {
    pub mode: Mode,
    pub image: ImageFlowView,
    pub text: TextFlowView,
    pub result: Option<ResultView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFlowView {
    pub has_image: bool,
    pub filename: Option<String>,
    pub mime_type: Option<&'static str>,
    pub preview_url: Option<String>,
    pub can_generate: bool,
    pub in_flight: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftFieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub suggestion: bool,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFlowView {
    pub draft: DraftPrompt,
    pub fields: Vec<DraftFieldView>,
    pub can_generate: bool,
    pub in_flight: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub cycle: CycleId,
    pub started_at: DateTime<Utc>,
    pub phase: Phase,
    pub gate: Gate,
    pub gate_error: Option<String>,
    pub source: Prompt,
    /// Present once settled, only while unlocked, only if translation succeeded.
    pub translated: Option<TranslatedView>,
    /// Present once settled and only if elaboration succeeded.
    pub detailed: Option<DetailedView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedView {
    pub sections: Vec<Section>,
    pub suggestions: Vec<Section>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedView {
    pub sections: Vec<Section>,
    /// False while locked: only the preview fields are included.
    pub complete: bool,
}

pub fn render(session: &Session) -> SessionView {
    let controller = session.controller();
    let screen = match controller.screen() {
        Screen::Welcome => ScreenView::Welcome,
        Screen::NameCapture { launching } => ScreenView::NameCapture {
            launching: launching.is_some(),
        },
        Screen::Generating { user_name } => ScreenView::Generating {
            user_name: user_name.clone(),
            greeting: controller.greeting().unwrap_or_default(),
        },
    };

    let generator = matches!(screen, ScreenView::Generating { .. }).then(|| GeneratorView {
        mode: session.mode(),
        image: image_view(session),
        text: text_view(session),
        result: session.pipeline().map(result_view),
    });

    SessionView { screen, generator }
}

fn image_view(session: &Session) -> ImageFlowView {
    let flow = session.image_flow();
    let image = flow.image();
    ImageFlowView {
        has_image: image.is_some(),
        filename: image.map(|i| i.filename.clone()),
        mime_type: image.map(|i| i.mime_type),
        preview_url: image.map(|i| i.preview_url.clone()),
        can_generate: flow.can_generate(),
        in_flight: flow.status().in_flight(),
        error: flow.status().error().map(str::to_string),
    }
}

fn text_view(session: &Session) -> TextFlowView {
    let flow = session.text_flow();
    let draft = flow.draft();
    TextFlowView {
        draft: draft.clone(),
        fields: PromptField::ALL
            .into_iter()
            .map(|field| DraftFieldView {
                key: field.key(),
                label: field.form_label(),
                suggestion: field.is_suggestion(),
                value: draft.get(field).to_string(),
            })
            .collect(),
        can_generate: flow.can_generate(),
        in_flight: flow.status().in_flight(),
        error: flow.status().error().map(str::to_string),
    }
}

fn result_view(pipeline: &ResultPipeline) -> ResultView {
    let phase = pipeline.phase();
    let settled = phase != Phase::Loading;
    let unlocked = pipeline.gate() == Gate::Unlocked;

    let translated = pipeline
        .translated()
        .filter(|_| settled && unlocked)
        .map(|prompt| TranslatedView {
            sections: prompt.narrative_sections(),
            suggestions: prompt.suggestion_sections(),
        });

    let detailed = pipeline
        .detailed()
        .filter(|_| settled)
        .map(|detailed| DetailedView {
            sections: if unlocked {
                detailed.all_sections()
            } else {
                detailed.preview_sections()
            },
            complete: unlocked,
        });

    ResultView {
        cycle: pipeline.cycle(),
        started_at: pipeline.started_at(),
        phase,
        gate: pipeline.gate(),
        gate_error: pipeline.gate_error().map(str::to_string),
        source: pipeline.source().clone(),
        translated,
        detailed,
    }
}
