//! Platform rules: per-platform constraints and style profiles.
//!
//! The rule table is loaded once at startup (built-in or from a TOML source)
//! and only read afterwards. Lookups are total: an identifier that is not in
//! the table is an error, never a silent fallback to some default platform.
//!
//! # TOML source format
//!
//! ```toml
//! [[banned_terms]]            # applied to every platform
//! term = "guaranteed"
//! replacement = "aim to"
//!
//! [[platforms]]
//! id = "twitter"
//! display_name = "Twitter/X"
//! max_characters = 280
//! max_hashtags = 2
//! max_emojis = 2
//! max_consecutive_blank_lines = 1
//! disallowed_characters = ["<", ">"]
//! aliases = ["x"]
//!
//! [platforms.style]
//! voice = "Short, punchy, and to the point."
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a platform prefers to communicate. Fed into the directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStyle {
    #[serde(default)]
    pub voice: String,
    #[serde(default)]
    pub emoji_guideline: String,
    #[serde(default)]
    pub hashtag_guideline: String,
    #[serde(default)]
    pub formatting_guideline: String,
    #[serde(default)]
    pub extra_notes: String,
}

impl PlatformStyle {
    /// True when no guideline is set.
    pub fn is_empty(&self) -> bool {
        self.voice.is_empty()
            && self.emoji_guideline.is_empty()
            && self.hashtag_guideline.is_empty()
            && self.formatting_guideline.is_empty()
            && self.extra_notes.is_empty()
    }
}

/// A phrase the validator softens, e.g. "guaranteed" → "aim to".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannedTerm {
    pub term: String,
    pub replacement: String,
}

impl BannedTerm {
    pub fn new(term: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            replacement: replacement.into(),
        }
    }
}

/// Constraints for a single platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformRule {
    id: String,
    display_name: String,
    max_characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_hashtags: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_emojis: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_consecutive_blank_lines: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    disallowed_characters: Vec<char>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    banned_terms: Vec<BannedTerm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    style: PlatformStyle,
}

impl PlatformRule {
    /// Create a rule with only a character cap. Fails on a blank id or a
    /// zero cap.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        max_characters: usize,
    ) -> Result<Self> {
        let id = id.into().trim().to_lowercase();
        if id.is_empty() {
            return Err(Error::config("platform rule is missing an identifier"));
        }
        if max_characters == 0 {
            return Err(Error::config(format!(
                "platform '{id}': max_characters must be positive"
            )));
        }
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            id.clone()
        } else {
            display_name
        };
        Ok(Self {
            id,
            display_name,
            max_characters,
            max_hashtags: None,
            max_emojis: None,
            max_consecutive_blank_lines: None,
            disallowed_characters: Vec::new(),
            banned_terms: Vec::new(),
            aliases: Vec::new(),
            style: PlatformStyle::default(),
        })
    }

    pub fn with_max_hashtags(mut self, max: usize) -> Self {
        self.max_hashtags = Some(max);
        self
    }

    pub fn with_max_emojis(mut self, max: usize) -> Self {
        self.max_emojis = Some(max);
        self
    }

    pub fn with_max_consecutive_blank_lines(mut self, max: usize) -> Self {
        self.max_consecutive_blank_lines = Some(max);
        self
    }

    pub fn with_disallowed_characters(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.disallowed_characters = chars.into_iter().collect();
        self
    }

    pub fn with_banned_terms(mut self, terms: impl IntoIterator<Item = BannedTerm>) -> Self {
        self.banned_terms = terms.into_iter().collect();
        self
    }

    pub fn with_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|a| a.into().trim().to_lowercase())
            .collect();
        self
    }

    pub fn with_style(mut self, style: PlatformStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn max_characters(&self) -> usize {
        self.max_characters
    }

    pub fn max_hashtags(&self) -> Option<usize> {
        self.max_hashtags
    }

    pub fn max_emojis(&self) -> Option<usize> {
        self.max_emojis
    }

    pub fn max_consecutive_blank_lines(&self) -> Option<usize> {
        self.max_consecutive_blank_lines
    }

    pub fn disallowed_characters(&self) -> &[char] {
        &self.disallowed_characters
    }

    pub fn banned_terms(&self) -> &[BannedTerm] {
        &self.banned_terms
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn style(&self) -> &PlatformStyle {
        &self.style
    }

    /// Whether `identifier` names this rule (id or alias, case-insensitive).
    pub fn matches(&self, identifier: &str) -> bool {
        let key = identifier.trim().to_lowercase();
        self.id == key || self.aliases.iter().any(|a| *a == key)
    }
}

/// The read-only table of platform rules.
#[derive(Debug, Clone)]
pub struct PlatformRuleTable {
    rules: Vec<PlatformRule>,
    index: HashMap<String, usize>,
}

impl PlatformRuleTable {
    /// Build a table from rules. Fails on an empty list or on duplicate
    /// identifiers/aliases.
    pub fn new(rules: Vec<PlatformRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(Error::config("platform rule table is empty"));
        }

        let mut index = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            for key in std::iter::once(&rule.id).chain(rule.aliases.iter()) {
                if index.insert(key.clone(), i).is_some() {
                    return Err(Error::config(format!(
                        "duplicate platform identifier or alias '{key}'"
                    )));
                }
            }
        }

        Ok(Self { rules, index })
    }

    /// The built-in table: Instagram, Facebook, LinkedIn and Twitter/X.
    pub fn builtin() -> Self {
        let rules = builtin_rules();
        let mut index = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            for key in std::iter::once(&rule.id).chain(rule.aliases.iter()) {
                index.insert(key.clone(), i);
            }
        }
        Self { rules, index }
    }

    /// Look up a rule by identifier or alias (case-insensitive).
    pub fn get(&self, identifier: &str) -> Result<&PlatformRule> {
        self.index
            .get(&identifier.trim().to_lowercase())
            .map(|&i| &self.rules[i])
            .ok_or_else(|| Error::UnknownPlatform(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_ok()
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ── Loading ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSource {
    #[serde(default)]
    banned_terms: Vec<BannedTerm>,
    #[serde(default)]
    platforms: Vec<RawPlatform>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlatform {
    id: Option<String>,
    #[serde(default)]
    display_name: String,
    max_characters: Option<i64>,
    max_hashtags: Option<usize>,
    max_emojis: Option<usize>,
    max_consecutive_blank_lines: Option<usize>,
    #[serde(default)]
    disallowed_characters: Vec<String>,
    #[serde(default)]
    banned_terms: Vec<BannedTerm>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    style: PlatformStyle,
}

/// Parse a platform rule table from a TOML source.
///
/// Top-level `banned_terms` apply to every platform, ahead of the
/// platform's own list.
pub fn load_platform_rules(source: &str) -> Result<PlatformRuleTable> {
    let parsed: RuleSource = toml::from_str(source)
        .map_err(|e| Error::config(format!("malformed platform rules: {e}")))?;

    let mut rules = Vec::with_capacity(parsed.platforms.len());
    for (position, raw) in parsed.platforms.into_iter().enumerate() {
        rules.push(raw.into_rule(position, &parsed.banned_terms)?);
    }

    let table = PlatformRuleTable::new(rules)?;
    tracing::debug!(platforms = table.len(), "Loaded platform rules");
    Ok(table)
}

impl RawPlatform {
    fn into_rule(self, position: usize, shared_terms: &[BannedTerm]) -> Result<PlatformRule> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                Error::config(format!("platform entry #{} is missing an identifier", position + 1))
            })?;

        let cap = match self.max_characters {
            Some(cap) if cap > 0 => cap as usize,
            Some(cap) => {
                return Err(Error::config(format!(
                    "platform '{id}': max_characters must be positive (got {cap})"
                )));
            }
            None => {
                return Err(Error::config(format!(
                    "platform '{id}': max_characters is required"
                )));
            }
        };

        let mut disallowed = Vec::with_capacity(self.disallowed_characters.len());
        for entry in &self.disallowed_characters {
            let mut chars = entry.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => disallowed.push(c),
                _ => {
                    return Err(Error::config(format!(
                        "platform '{id}': disallowed character '{entry}' must be exactly one character"
                    )));
                }
            }
        }

        let terms: Vec<&BannedTerm> = shared_terms.iter().chain(self.banned_terms.iter()).collect();
        for term in &terms {
            if term.term.trim().is_empty() {
                return Err(Error::config(format!("platform '{id}': banned term is blank")));
            }
        }
        // A replacement must already be compliant, or correcting it never ends.
        for term in &terms {
            let replacement = term.replacement.to_lowercase();
            if let Some(banned) = terms
                .iter()
                .find(|other| replacement.contains(&other.term.trim().to_lowercase()))
            {
                return Err(Error::config(format!(
                    "platform '{id}': replacement '{}' contains banned term '{}'",
                    term.replacement,
                    banned.term.trim()
                )));
            }
            if let Some(c) = term.replacement.chars().find(|c| disallowed.contains(c)) {
                return Err(Error::config(format!(
                    "platform '{id}': replacement '{}' contains disallowed character '{c}'",
                    term.replacement
                )));
            }
        }

        let mut rule = PlatformRule::new(id, self.display_name, cap)?
            .with_disallowed_characters(disallowed)
            .with_banned_terms(shared_terms.iter().cloned().chain(self.banned_terms))
            .with_aliases(self.aliases)
            .with_style(self.style);
        rule.max_hashtags = self.max_hashtags;
        rule.max_emojis = self.max_emojis;
        rule.max_consecutive_blank_lines = self.max_consecutive_blank_lines;
        Ok(rule)
    }
}

// ── Built-in rules ────────────────────────────────────────────────────────

fn default_banned_terms() -> Vec<BannedTerm> {
    vec![
        BannedTerm::new("guaranteed", "aim to"),
        BannedTerm::new("guarantee", "aim to"),
        BannedTerm::new("no risk", "low risk"),
    ]
}

fn builtin_rule(
    id: &str,
    display_name: &str,
    max_characters: usize,
    max_hashtags: usize,
    max_emojis: usize,
    style: PlatformStyle,
) -> PlatformRule {
    PlatformRule {
        id: id.into(),
        display_name: display_name.into(),
        max_characters,
        max_hashtags: Some(max_hashtags),
        max_emojis: Some(max_emojis),
        max_consecutive_blank_lines: Some(1),
        disallowed_characters: Vec::new(),
        banned_terms: default_banned_terms(),
        aliases: Vec::new(),
        style,
    }
}

fn builtin_rules() -> Vec<PlatformRule> {
    vec![
        builtin_rule(
            "instagram",
            "Instagram",
            2200,
            5,
            5,
            PlatformStyle {
                voice: "Casual, energetic, playful. Focus on vibes, feelings, and moments.".into(),
                emoji_guideline: "Use emojis naturally to enhance mood (1-5 per post). \
                    Avoid overloading every word with emojis."
                    .into(),
                hashtag_guideline: "Use 3-5 relevant hashtags at the end of the post. \
                    Mix branded and generic hashtags."
                    .into(),
                formatting_guideline: "Short paragraphs, line breaks for readability.".into(),
                extra_notes: "Hook in the first line. Make it thumb-stopping.".into(),
            },
        ),
        builtin_rule(
            "facebook",
            "Facebook",
            125,
            0,
            1,
            PlatformStyle {
                voice: "Friendly and conversational, a bit more explanatory than Instagram."
                    .into(),
                emoji_guideline: "Use emojis sparingly, mainly to highlight key ideas.".into(),
                hashtag_guideline: "Do not use hashtags.".into(),
                formatting_guideline: "1-3 short paragraphs. Clear, readable, easy to skim."
                    .into(),
                extra_notes: "Good place for promotions with a clear offer.".into(),
            },
        ),
        builtin_rule(
            "linkedin",
            "LinkedIn",
            3000,
            3,
            2,
            PlatformStyle {
                voice: "Professional, clear, and value-driven. Write as if speaking to \
                    working professionals."
                    .into(),
                emoji_guideline: "Avoid emojis in most cases; at most one subtle emoji.".into(),
                hashtag_guideline: "Use 0-3 professional hashtags at the end if needed.".into(),
                formatting_guideline: "Short, well-structured paragraphs. Avoid slang. \
                    No all-caps."
                    .into(),
                extra_notes: "Highlight business value, customer experience, and trust.".into(),
            },
        ),
        PlatformRule {
            aliases: vec!["x".into(), "twitter/x".into()],
            ..builtin_rule(
                "twitter",
                "Twitter/X",
                280,
                2,
                2,
                PlatformStyle {
                    voice: "Short, punchy, and to the point. Witty if possible.".into(),
                    emoji_guideline: "Use emojis sparingly (0-2) to add flavor, not clutter."
                        .into(),
                    hashtag_guideline: "Use 1-2 short hashtags. Relevance over quantity.".into(),
                    formatting_guideline: "A single paragraph. Max impact in minimal characters."
                        .into(),
                    extra_notes: "Lead with the core hook in the first few words.".into(),
                },
            )
        },
    ]
}
