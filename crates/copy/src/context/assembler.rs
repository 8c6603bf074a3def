//! Context assembly for a single copywriting turn.
//!
//! # Determinism
//!
//! Assembly is pure: identical inputs always produce an identical
//! [`GenerationRequest`]. Nothing here reads the clock or the environment.

use marketeer_core::error::{Error, Result};
use marketeer_core::message::{ChatMessage, ChatTurn, GenerationRequest};
use marketeer_core::platform::PlatformRule;
use marketeer_core::request::RequestDescriptor;
use tracing::debug;

// ── Assembler ─────────────────────────────────────────────────────────────

/// Builds [`GenerationRequest`]s. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble `[directive, history..., new user message]`.
    ///
    /// Fails with [`Error::InvalidInput`] when the request targets a
    /// different platform than `rule`, or when `new_user_message` is blank.
    pub fn assemble(
        &self,
        request: &RequestDescriptor,
        rule: &PlatformRule,
        history: &[ChatTurn],
        new_user_message: &str,
    ) -> Result<GenerationRequest> {
        if !rule.matches(&request.platform) {
            return Err(Error::InvalidInput(format!(
                "request targets platform '{}' but rule is for '{}'",
                request.platform,
                rule.id()
            )));
        }

        let new_user_message = new_user_message.trim();
        if new_user_message.is_empty() {
            return Err(Error::InvalidInput("new user message is empty".into()));
        }

        let flattened: Vec<ChatMessage> = history.iter().flat_map(ChatTurn::messages).collect();

        let assembled = GenerationRequest::from_parts(
            render_directive(request, rule),
            flattened,
            new_user_message.to_string(),
        );

        debug!(
            platform = rule.id(),
            turns = history.len(),
            messages = assembled.messages().len(),
            chars = assembled.char_count(),
            "Assembled generation request"
        );

        Ok(assembled)
    }
}

// ── Directive ─────────────────────────────────────────────────────────────

/// Render the directive for a request on a platform.
pub fn render_directive(request: &RequestDescriptor, rule: &PlatformRule) -> String {
    let platform = rule.display_name();
    let style = rule.style();
    let mut out = String::with_capacity(1024);

    out.push_str("You are an expert social media marketer.\n");
    out.push_str(&format!("You help write and refine social media posts for {platform}.\n"));

    out.push_str("\nCampaign context:\n");
    out.push_str(&format!("- Brand: {}\n", request.brand.trim()));
    out.push_str(&format!("- Product/Offer: {}\n", request.product.trim()));
    out.push_str(&format!("- Target audience: {}\n", or_unspecified(&request.audience)));
    out.push_str(&format!("- Campaign goal: {}\n", or_unspecified(&request.goal)));
    out.push_str(&format!("- Platform: {platform}\n"));
    out.push_str(&format!("- Tone: {}\n", request.effective_tone()));
    out.push_str(&format!("- Call-to-action style: {}\n", request.effective_cta_style()));
    if !request.extra_context.trim().is_empty() {
        out.push_str(&format!("- Extra context: {}\n", request.extra_context.trim()));
    }

    if !style.is_empty() {
        out.push_str(&format!("\nPlatform style guidelines for {platform}:\n"));
        for (label, text) in [
            ("Voice and personality", &style.voice),
            ("Emojis", &style.emoji_guideline),
            ("Hashtags", &style.hashtag_guideline),
            ("Formatting", &style.formatting_guideline),
            ("Notes", &style.extra_notes),
        ] {
            if !text.trim().is_empty() {
                out.push_str(&format!("- {label}: {}\n", text.trim()));
            }
        }
    }

    out.push_str("\nHard limits:\n");
    out.push_str(&format!("- Keep the post within {} characters.\n", rule.max_characters()));
    match rule.max_hashtags() {
        Some(0) => out.push_str("- Do not use hashtags.\n"),
        Some(n) => out.push_str(&format!("- Use at most {n} hashtag{}.\n", plural(n))),
        None => {}
    }
    match rule.max_emojis() {
        Some(0) => out.push_str("- Do not use emojis.\n"),
        Some(n) => out.push_str(&format!("- Use at most {n} emoji{}.\n", plural(n))),
        None => {}
    }

    out.push_str("\nYour task:\n");
    out.push_str("- Follow the platform style guidelines and tone.\n");
    out.push_str("- If the user asks to edit or adapt an existing post, transform it accordingly.\n");
    out.push_str("- Do NOT include explanations, analysis, or labels.\n");
    out.push_str("\nRespond with ONLY the post text. Do not add any extra commentary.");

    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn or_unspecified(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() { "not specified" } else { value }
}
