//! Narrative generation for triage summaries and clinician explanations.
//!
//! This crate implements the core [`Narrator`](triage_core::Narrator) seam:
//! prompts are built from a submission or stored patient, sent to a
//! [`TextGenerator`], and the output is parsed back into narrative text.
//! Scores are never taken from model output.

pub mod config;
pub mod generator;
pub mod narrator;
pub mod prompts;
pub mod response;

pub use config::*;
pub use generator::*;
pub use narrator::*;
pub use prompts::*;
pub use response::*;
