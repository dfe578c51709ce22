//! Outcome request adapter.
//!
//! Packages a mission configuration and launch score into a request for the
//! external generative service and always hands back a well-formed
//! `MissionOutcome` — any transport or parse failure degrades to the
//! deterministic fallback instead of reaching the caller as an error.

mod backend;
mod client;
mod request;

pub use backend::{fallback_outcome, normalize_outcome, OutcomeBackend, ScriptedBackend};
pub use client::{GenerativeClient, OutcomeError, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use request::{build_prompt, LaunchQuality, OutcomeRequest, PartFacts, PartSummary};
