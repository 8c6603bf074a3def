//! # Marketeer Core
//!
//! Domain types, traits, and error definitions for the Marketeer copy
//! governance pipeline. This crate has **no I/O of its own**: it defines the
//! domain model that the other crates implement against.
//!
//! ## Design Philosophy
//!
//! The model backend is defined as a trait here ([`ChatModel`]). Backends live
//! in `marketeer-providers`; tests use stubs. This enables:
//! - Swapping hosted and local backends via configuration
//! - Testing the whole turn pipeline without a network
//! - A clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod model;
pub mod platform;
pub mod request;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ModelError, Result};
pub use message::{ChatMessage, ChatTurn, GenerationRequest, Role};
pub use model::{ChatModel, SamplingParams};
pub use platform::{
    BannedTerm, PlatformRule, PlatformRuleTable, PlatformStyle, load_platform_rules,
};
pub use request::RequestDescriptor;
