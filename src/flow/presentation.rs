// src/flow/presentation.rs
use crate::errors::{AppError, GenerationError};
use crate::models::{DetailedPrompt, Prompt, PromptField};
use crate::services::PromptGateway;
use chrono::{DateTime, Utc};
use futures_util::future::join;
use log::{debug, info, warn};
use serde::Serialize;
use std::future::Future;
use uuid::Uuid;

/// Identifies one generation cycle; every downstream result carries it.
pub type CycleId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Gate {
    Locked,
    Unlocked,
}

/// Work order for the translate/elaborate fan-out of one cycle.
#[derive(Debug, Clone)]
pub struct CycleTicket {
    pub cycle: CycleId,
    pub source: Prompt,
}

#[derive(Debug)]
pub enum HalfResult {
    Translated(Result<Prompt, GenerationError>),
    Detailed(Result<DetailedPrompt, GenerationError>),
}

#[derive(Debug)]
pub struct CycleEvent {
    pub cycle: CycleId,
    pub result: HalfResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    Stale,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot<T> {
    Pending,
    Done(T),
    Failed(String),
}

impl<T> Slot<T> {
    fn from_result(result: Result<T, GenerationError>) -> Self {
        match result {
            Ok(value) => Slot::Done(value),
            Err(e) => Slot::Failed(e.to_string()),
        }
    }

    fn value(&self) -> Option<&T> {
        match self {
            Slot::Done(value) => Some(value),
            _ => None,
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }
}

/// Presentation state for one source prompt. A new source prompt means a
/// new pipeline, so results and the gate never carry over between cycles.
#[derive(Debug)]
pub struct ResultPipeline {
    cycle: CycleId,
    started_at: DateTime<Utc>,
    source: Prompt,
    translated: Slot<Prompt>,
    detailed: Slot<DetailedPrompt>,
    gate: Gate,
    gate_error: Option<String>,
}

impl ResultPipeline {
    pub fn start(source: Prompt) -> (Self, CycleTicket) {
        let cycle = Uuid::new_v4();
        info!("Starting generation cycle {}", cycle);
        let ticket = CycleTicket {
            cycle,
            source: source.clone(),
        };
        let pipeline = Self {
            cycle,
            started_at: Utc::now(),
            source,
            translated: Slot::Pending,
            detailed: Slot::Pending,
            gate: Gate::Locked,
            gate_error: None,
        };
        (pipeline, ticket)
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn phase(&self) -> Phase {
        if self.translated.is_pending() || self.detailed.is_pending() {
            Phase::Loading
        } else if self.translated.value().is_none() && self.detailed.value().is_none() {
            Phase::Failed
        } else {
            Phase::Ready
        }
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }

    pub fn gate_error(&self) -> Option<&str> {
        self.gate_error.as_deref()
    }

    /// The editable source prompt, including any amendments.
    pub fn source(&self) -> &Prompt {
        &self.source
    }

    pub fn translated(&self) -> Option<&Prompt> {
        self.translated.value()
    }

    pub fn detailed(&self) -> Option<&DetailedPrompt> {
        self.detailed.value()
    }

    pub fn amend(&mut self, field: PromptField, value: impl Into<String>) {
        *self.source.field_mut(field) = value.into();
    }

    /// Records one half of the fan-out. Results from other cycles are dropped.
    pub fn apply(&mut self, event: CycleEvent) -> Applied {
        if event.cycle != self.cycle {
            debug!(
                "Dropping result of stale cycle {} (current {})",
                event.cycle, self.cycle
            );
            return Applied::Stale;
        }

        match event.result {
            HalfResult::Translated(result) => {
                if !self.translated.is_pending() {
                    return Applied::Duplicate;
                }
                if let Err(e) = &result {
                    warn!("Translation failed for cycle {}: {}", self.cycle, e);
                }
                self.translated = Slot::from_result(result);
            }
            HalfResult::Detailed(result) => {
                if !self.detailed.is_pending() {
                    return Applied::Duplicate;
                }
                if let Err(e) = &result {
                    warn!("Elaboration failed for cycle {}: {}", self.cycle, e);
                }
                self.detailed = Slot::from_result(result);
            }
        }

        if self.phase() != Phase::Loading {
            info!("Cycle {} settled as {:?}", self.cycle, self.phase());
        }
        Applied::Accepted
    }

    /// Plain equality against the configured passphrase. A mismatch keeps
    /// the gate locked and reports the rejection. Once unlocked, further
    /// attempts are ignored.
    pub fn submit_unlock(&mut self, attempt: &str, secret: &str) -> Result<(), AppError> {
        if self.gate == Gate::Unlocked {
            return Ok(());
        }
        if attempt == secret {
            self.gate = Gate::Unlocked;
            self.gate_error = None;
            Ok(())
        } else {
            self.gate_error = Some(AppError::UnlockRejected.user_message());
            Err(AppError::UnlockRejected)
        }
    }
}

/// Runs translate and elaborate for one cycle concurrently, delivering each
/// half tagged with the ticket's cycle as soon as it completes.
pub async fn fan_out<F, Fut>(gateway: &dyn PromptGateway, ticket: CycleTicket, deliver: F)
where
    F: Fn(CycleEvent) -> Fut,
    Fut: Future<Output = ()>,
{
    let CycleTicket { cycle, source } = ticket;

    let translate = async {
        let result = gateway.translate(&source).await;
        deliver(CycleEvent {
            cycle,
            result: HalfResult::Translated(result),
        })
        .await
    };
    let elaborate = async {
        let result = gateway.elaborate(&source).await;
        deliver(CycleEvent {
            cycle,
            result: HalfResult::Detailed(result),
        })
        .await
    };

    join(translate, elaborate).await;
}
