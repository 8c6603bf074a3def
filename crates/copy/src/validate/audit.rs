//! The audit trail produced by one validation pass.

use serde::{Deserialize, Serialize};

/// Where an over-cap text was cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// After `.`, `!` or `?`
    Sentence,
    /// Before `,`, `;`, `:` or a line break
    Clause,
    /// At the cap itself, no boundary available
    Hard,
}

impl std::fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sentence => write!(f, "sentence boundary"),
            Self::Clause => write!(f, "clause boundary"),
            Self::Hard => write!(f, "hard cut"),
        }
    }
}

/// One rule the raw text broke, with enough detail to describe the fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    BannedTerm {
        term: String,
        replacement: String,
        occurrences: usize,
    },
    DisallowedCharacters {
        characters: Vec<char>,
        removed: usize,
    },
    TooManyHashtags {
        max: usize,
        found: usize,
        removed: Vec<String>,
    },
    TooManyEmojis {
        max: usize,
        found: usize,
    },
    ExcessBlankLines {
        max: usize,
        longest_run: usize,
    },
    OverCharacterCap {
        cap: usize,
        length: usize,
        overage: usize,
        truncated_at: usize,
        boundary: BoundaryKind,
    },
}

impl Violation {
    /// Short machine-friendly rule name.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::BannedTerm { .. } => "banned_term",
            Self::DisallowedCharacters { .. } => "disallowed_characters",
            Self::TooManyHashtags { .. } => "too_many_hashtags",
            Self::TooManyEmojis { .. } => "too_many_emojis",
            Self::ExcessBlankLines { .. } => "excess_blank_lines",
            Self::OverCharacterCap { .. } => "over_character_cap",
        }
    }

    /// What was wrong with the raw text.
    pub fn description(&self) -> String {
        match self {
            Self::BannedTerm {
                term, occurrences, ..
            } => format!("banned term '{term}' appeared {occurrences} time(s)"),
            Self::DisallowedCharacters { characters, removed } => {
                let listed: String = characters.iter().collect();
                format!("{removed} disallowed character(s) from '{listed}'")
            }
            Self::TooManyHashtags { max, found, .. } => {
                format!("{found} hashtags, limit is {max}")
            }
            Self::TooManyEmojis { max, found } => format!("{found} emojis, limit is {max}"),
            Self::ExcessBlankLines { max, longest_run } => {
                format!("{longest_run} consecutive blank lines, limit is {max}")
            }
            Self::OverCharacterCap {
                cap,
                length,
                overage,
                ..
            } => format!("{length} characters, {overage} over the {cap} cap"),
        }
    }

    /// The corrective action the editor took.
    pub fn action(&self) -> String {
        match self {
            Self::BannedTerm {
                term, replacement, ..
            } => format!("replaced '{term}' with '{replacement}'"),
            Self::DisallowedCharacters { removed, .. } => {
                format!("removed {removed} character(s)")
            }
            Self::TooManyHashtags { removed, .. } => {
                format!("removed {}", removed.join(" "))
            }
            Self::TooManyEmojis { max, found } => {
                format!("removed {} emoji(s) after the first {max}", found - max)
            }
            Self::ExcessBlankLines { max, .. } => {
                format!("collapsed blank-line runs to {max}")
            }
            Self::OverCharacterCap {
                truncated_at,
                boundary,
                ..
            } => format!("truncated to {truncated_at} characters at a {boundary}"),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}; {}", self.rule(), self.description(), self.action())
    }
}

/// Every violation found in one pass, in check order, plus lengths.
///
/// Always produced, even when the text was already compliant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationAudit {
    pub violations: Vec<Violation>,
    /// Character count of the raw model output (untrimmed)
    pub raw_length: usize,
    /// Character count of the final text
    pub final_length: usize,
}

impl ValidationAudit {
    /// True when no rule was violated.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// The cap violation, if the text had to be truncated.
    pub fn truncation(&self) -> Option<&Violation> {
        self.violations
            .iter()
            .find(|v| matches!(v, Violation::OverCharacterCap { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_serializes_with_rule_tag() {
        let v = Violation::OverCharacterCap {
            cap: 280,
            length: 300,
            overage: 20,
            truncated_at: 280,
            boundary: BoundaryKind::Hard,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["rule"], "over_character_cap");
        assert_eq!(json["overage"], 20);
        assert_eq!(json["boundary"], "hard");
        assert_eq!(v.rule(), "over_character_cap");
    }

    #[test]
    fn display_has_description_and_action() {
        let v = Violation::BannedTerm {
            term: "guaranteed".into(),
            replacement: "aim to".into(),
            occurrences: 2,
        };
        let text = v.to_string();
        assert!(text.starts_with("banned_term:"));
        assert!(text.contains("2 time(s)"));
        assert!(text.contains("with 'aim to'"));
    }

    #[test]
    fn clean_audit() {
        let audit = ValidationAudit {
            violations: vec![],
            raw_length: 10,
            final_length: 10,
        };
        assert!(audit.is_clean());
        assert!(audit.truncation().is_none());
    }
}
