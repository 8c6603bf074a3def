//! Individual corrective checks. Each one is a no-op on compliant text.

use std::ops::Range;

use marketeer_core::error::{Error, Result};
use marketeer_core::platform::BannedTerm;
use regex_lite::{Captures, Regex};

use super::audit::Violation;

// ── Banned terms ──────────────────────────────────────────────────────────

/// Replace banned terms, longest first, keeping the matched casing style.
pub(crate) fn replace_banned_terms(
    text: &mut String,
    terms: &[BannedTerm],
    violations: &mut Vec<Violation>,
) -> Result<()> {
    let mut ordered: Vec<&BannedTerm> = terms.iter().collect();
    ordered.sort_by_key(|t| std::cmp::Reverse(t.term.trim().chars().count()));

    for banned in ordered {
        let pattern = term_pattern(&banned.term)?;
        let occurrences = pattern.find_iter(text.as_str()).count();
        if occurrences == 0 {
            continue;
        }

        let replaced = pattern
            .replace_all(text.as_str(), |caps: &Captures<'_>| {
                match_case(&caps[0], &banned.replacement)
            })
            .into_owned();
        *text = replaced;

        violations.push(Violation::BannedTerm {
            term: banned.term.trim().to_string(),
            replacement: banned.replacement.clone(),
            occurrences,
        });
    }
    Ok(())
}

fn term_pattern(term: &str) -> Result<Regex> {
    let term = term.trim();
    let lead = if term.chars().next().is_some_and(is_word_char) { r"\b" } else { "" };
    let trail = if term.chars().last().is_some_and(is_word_char) { r"\b" } else { "" };
    Regex::new(&format!("(?i){lead}{}{trail}", regex_lite::escape(term)))
        .map_err(|e| Error::config(format!("banned term '{term}' is not usable: {e}")))
}

/// ASCII word characters, matching the regex `\b` definition.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// "GUARANTEED" → "AIM TO", "Guaranteed" → "Aim to", otherwise as configured.
fn match_case(matched: &str, replacement: &str) -> String {
    let has_letters = matched.chars().any(char::is_alphabetic);
    if has_letters && !matched.chars().any(char::is_lowercase) && matched.chars().count() > 1 {
        return replacement.to_uppercase();
    }
    if matched.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

// ── Disallowed characters ─────────────────────────────────────────────────

pub(crate) fn remove_disallowed(
    text: &mut String,
    disallowed: &[char],
    violations: &mut Vec<Violation>,
) {
    if disallowed.is_empty() {
        return;
    }

    let mut found: Vec<char> = Vec::new();
    let mut removed = 0;
    text.retain(|c| {
        if disallowed.contains(&c) {
            removed += 1;
            if !found.contains(&c) {
                found.push(c);
            }
            false
        } else {
            true
        }
    });

    if removed > 0 {
        violations.push(Violation::DisallowedCharacters {
            characters: found,
            removed,
        });
    }
}

// ── Hashtags ──────────────────────────────────────────────────────────────

/// Byte ranges of hashtags: `#` at the start, after whitespace or glued to
/// the end of another hashtag, followed by at least one letter, digit or
/// underscore. `#a#b` is two hashtags.
pub(crate) fn hashtag_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut prev: Option<char> = None;
    let mut after_tag = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '#' && (after_tag || prev.is_none_or(char::is_whitespace)) {
            let mut end = i + 1;
            let mut last = c;
            while let Some(&(j, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    end = j + d.len_utf8();
                    last = d;
                    chars.next();
                } else {
                    break;
                }
            }
            after_tag = end > i + 1;
            if after_tag {
                spans.push(i..end);
            }
            prev = Some(last);
            continue;
        }
        after_tag = false;
        prev = Some(c);
    }
    spans
}

/// Keep the first `max` hashtags and drop the rest, along with one
/// preceding space or tab.
pub(crate) fn limit_hashtags(text: &mut String, max: usize, violations: &mut Vec<Violation>) {
    let spans = hashtag_spans(text.as_str());
    if spans.len() <= max {
        return;
    }

    let mut out = String::with_capacity(text.len());
    let mut removed = Vec::with_capacity(spans.len() - max);
    let mut cursor = 0;
    for span in &spans[max..] {
        let start = if span.start > cursor && matches!(text.as_bytes()[span.start - 1], b' ' | b'\t') {
            span.start - 1
        } else {
            span.start
        };
        out.push_str(&text[cursor..start]);
        removed.push(text[span.clone()].to_string());
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);

    violations.push(Violation::TooManyHashtags {
        max,
        found: spans.len(),
        removed,
    });
    *text = out;
}

// ── Emojis ────────────────────────────────────────────────────────────────

/// Pictographic emoji: Misc Symbols/Dingbats and the supplementary emoji
/// blocks, excluding skin-tone modifiers.
pub(crate) fn is_emoji(c: char) -> bool {
    matches!(c as u32, 0x2600..=0x27BF | 0x1F000..=0x1FAFF) && !is_emoji_modifier(c)
}

/// Characters that attach to the preceding emoji.
fn is_emoji_modifier(c: char) -> bool {
    matches!(c as u32, 0x1F3FB..=0x1F3FF | 0xFE0F | 0x200D)
}

pub(crate) fn count_emojis(text: &str) -> usize {
    text.chars().filter(|&c| is_emoji(c)).count()
}

/// Keep the first `max` emojis and drop the rest with their modifiers.
pub(crate) fn limit_emojis(text: &mut String, max: usize, violations: &mut Vec<Violation>) {
    let found = count_emojis(text.as_str());
    if found <= max {
        return;
    }

    let mut out = String::with_capacity(text.len());
    let mut seen = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_emoji(c) {
            out.push(c);
            continue;
        }

        seen += 1;
        if seen <= max {
            out.push(c);
            continue;
        }

        while chars.peek().is_some_and(|&m| is_emoji_modifier(m)) {
            chars.next();
        }
        // Avoid leaving a double space where the emoji was.
        if chars.peek().is_none_or(|n| n.is_whitespace()) && out.ends_with([' ', '\t']) {
            out.pop();
        }
    }

    violations.push(Violation::TooManyEmojis { max, found });
    *text = out;
}

// ── Blank lines ───────────────────────────────────────────────────────────

pub(crate) fn collapse_blank_lines(text: &mut String, max: usize, violations: &mut Vec<Violation>) {
    let mut longest_run = 0;
    let mut run = 0;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
    }
    if longest_run <= max {
        return;
    }

    let mut kept: Vec<&str> = Vec::new();
    run = 0;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        kept.push(line);
    }

    let collapsed = kept.join("\n");
    violations.push(Violation::ExcessBlankLines { max, longest_run });
    *text = collapsed;
}
