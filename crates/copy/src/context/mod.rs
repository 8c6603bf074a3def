//! Turns a campaign request, a platform rule and the caller's chat history
//! into the message list for one model call.
//!
//! | Position | Source | Notes |
//! |----------|--------|-------|
//! | first | directive | rendered from request + platform rule |
//! | middle | history | each turn expands to 0, 1 or 2 messages, oldest first |
//! | last | new user message | must be non-blank |

pub mod assembler;

pub use assembler::{ContextAssembler, render_directive};
