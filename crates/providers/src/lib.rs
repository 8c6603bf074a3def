//! Model backends for Marketeer.
//!
//! All backends implement the `marketeer_core::ChatModel` trait.
//! [`build_model`] selects one based on configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatModel;
pub use router::{SUPPORTED_PROVIDERS, build_model};
