//! Short-form video planning and scripting.
//!
//! A [`Blueprint`] fixes the beat structure, [`plan_video`] turns it into a
//! timed schedule, and [`VideoScripter`] asks the model for each beat.

pub mod blueprints;
pub mod planner;
pub mod script;

pub use blueprints::{BLUEPRINTS, BeatTemplate, Blueprint, DEFAULT_BLUEPRINT, blueprint};
pub use planner::{MIN_DURATION_SECS, PlannedBeat, VideoPlan, VideoRequest, plan_video};
pub use script::{BeatScript, VideoScript, VideoScripter, beat_prompt, decode_beat, fallback_beat};
