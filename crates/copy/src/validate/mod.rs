//! Post-generation validation and gentle editing.
//!
//! Each pass runs the corrections in a fixed order:
//!
//! 1. Disallowed characters (removed)
//! 2. Emoji limit (first N kept)
//! 3. Hashtag limit (first N kept)
//! 4. Banned terms (case-aware replacement)
//! 5. Consecutive blank lines (runs collapsed)
//! 6. Character cap (boundary-preserving truncation)
//!
//! A removal can expose something an earlier check already passed (a `#tag`
//! glued to a dropped emoji, a banned word split by a dropped `*`, a word
//! cut in half by the cap), so passes repeat until one records nothing.
//! The returned text is therefore a fixed point: validating it again
//! changes nothing and records no violations.

pub mod audit;
mod checks;
mod truncate;

pub use audit::{BoundaryKind, ValidationAudit, Violation};

use marketeer_core::error::{Error, Result};
use marketeer_core::platform::PlatformRule;
use tracing::debug;

/// Upper bound on correction passes. Loaded rules settle in a few.
const MAX_PASSES: usize = 8;

/// Audit `raw_text` against `rule` and return the compliant text.
///
/// Lengths are counted in characters. Fails with
/// [`Error::EmptyGeneration`] when nothing but whitespace is left.
pub fn validate_and_edit(raw_text: &str, rule: &PlatformRule) -> Result<(String, ValidationAudit)> {
    let raw_length = raw_text.chars().count();
    let mut text = raw_text.trim().to_string();
    if text.is_empty() {
        return Err(Error::EmptyGeneration);
    }

    let mut violations = Vec::new();
    let mut passes = 0;
    loop {
        if passes == MAX_PASSES {
            return Err(Error::config(format!(
                "platform '{}': corrections did not settle after {MAX_PASSES} passes",
                rule.id()
            )));
        }
        passes += 1;

        let recorded = violations.len();
        correct(&mut text, rule, &mut violations)?;
        if violations.len() == recorded {
            break;
        }
    }

    let audit = ValidationAudit {
        violations,
        raw_length,
        final_length: text.chars().count(),
    };

    debug!(
        platform = rule.id(),
        raw_length,
        final_length = audit.final_length,
        violations = audit.violations.len(),
        passes,
        "Validated generated text"
    );

    Ok((text, audit))
}

/// One pass over every check.
fn correct(text: &mut String, rule: &PlatformRule, violations: &mut Vec<Violation>) -> Result<()> {
    checks::remove_disallowed(text, rule.disallowed_characters(), violations);
    if let Some(max) = rule.max_emojis() {
        checks::limit_emojis(text, max, violations);
    }
    if let Some(max) = rule.max_hashtags() {
        checks::limit_hashtags(text, max, violations);
    }
    checks::replace_banned_terms(text, rule.banned_terms(), violations)?;
    trim_in_place(text);
    if let Some(max) = rule.max_consecutive_blank_lines() {
        checks::collapse_blank_lines(text, max, violations);
    }

    if text.is_empty() {
        return Err(Error::EmptyGeneration);
    }

    let cap = rule.max_characters();
    let length = text.chars().count();
    if length > cap {
        let cut = truncate::truncate_at_boundary(text, cap);
        let truncated_at = cut.text.chars().count();
        violations.push(Violation::OverCharacterCap {
            cap,
            length,
            overage: length - cap,
            truncated_at,
            boundary: cut.boundary,
        });
        *text = cut.text;
    }
    Ok(())
}

fn trim_in_place(text: &mut String) {
    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}
