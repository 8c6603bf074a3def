//! # Marketeer Copy
//!
//! The governance pipeline around a text-generation model:
//!
//! - [`context`]: builds the bounded request for one model call
//! - [`validate`]: audits and repairs the reply against platform rules
//! - [`orchestrator`]: runs a whole turn under a timeout
//! - [`video`]: plans and scripts short-form videos beat by beat

pub mod context;
pub mod orchestrator;
pub mod validate;
pub mod video;

#[cfg(test)]
mod test_helpers;

pub use context::{ContextAssembler, render_directive};
pub use orchestrator::{TurnOrchestrator, TurnOutcome};
pub use validate::{BoundaryKind, ValidationAudit, Violation, validate_and_edit};
pub use video::{VideoPlan, VideoRequest, VideoScript, VideoScripter, plan_video};
