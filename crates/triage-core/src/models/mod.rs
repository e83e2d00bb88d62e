//! Domain models for the triage dashboard.

mod input;
mod patient;
mod urgency;

pub use input::*;
pub use patient::*;
pub use urgency::*;
