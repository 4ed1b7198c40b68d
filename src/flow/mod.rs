// src/flow/mod.rs
pub mod acquisition;
pub mod controller;
pub mod presentation;
pub mod session;
pub mod view;

pub use acquisition::{Handoff, ImageFlow, LoadedImage, Mode, TextFlow};
pub use controller::{FlowController, Screen};
pub use presentation::{CycleTicket, Gate, Phase, ResultPipeline};
pub use session::{Session, SharedSession};
