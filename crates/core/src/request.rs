//! The campaign request a copy session is built around.

use serde::{Deserialize, Serialize};

/// Everything the assembler needs to know about a campaign.
///
/// Built once per authoring session and handed by reference to each turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Brand name
    pub brand: String,

    /// Product or offer being promoted
    pub product: String,

    /// Who the post is for
    #[serde(default)]
    pub audience: String,

    /// What the campaign should achieve
    #[serde(default)]
    pub goal: String,

    /// Desired tone (blank = "friendly")
    #[serde(default)]
    pub tone: String,

    /// Call-to-action style (blank = "soft")
    #[serde(default)]
    pub cta_style: String,

    /// Free-form extra context
    #[serde(default)]
    pub extra_context: String,

    /// Target platform identifier, resolved against the rule table
    pub platform: String,
}

impl RequestDescriptor {
    /// Create a descriptor with the required fields; the rest start blank.
    pub fn new(
        brand: impl Into<String>,
        product: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            product: product.into(),
            audience: String::new(),
            goal: String::new(),
            tone: String::new(),
            cta_style: String::new(),
            extra_context: String::new(),
            platform: platform.into(),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_cta_style(mut self, cta_style: impl Into<String>) -> Self {
        self.cta_style = cta_style.into();
        self
    }

    pub fn with_extra_context(mut self, extra_context: impl Into<String>) -> Self {
        self.extra_context = extra_context.into();
        self
    }

    /// Tone with the blank default applied.
    pub fn effective_tone(&self) -> &str {
        non_blank_or(&self.tone, "friendly")
    }

    /// CTA style with the blank default applied.
    pub fn effective_cta_style(&self) -> &str {
        non_blank_or(&self.cta_style, "soft")
    }
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let req = RequestDescriptor::new("Brew Bliss", "Oat latte", "instagram")
            .with_audience("students")
            .with_goal("weekend foot traffic")
            .with_tone("playful")
            .with_cta_style("urgent")
            .with_extra_context("2-for-1 on Saturdays");
        assert_eq!(req.brand, "Brew Bliss");
        assert_eq!(req.platform, "instagram");
        assert_eq!(req.effective_tone(), "playful");
        assert_eq!(req.effective_cta_style(), "urgent");
        assert_eq!(req.extra_context, "2-for-1 on Saturdays");
    }

    #[test]
    fn blank_tone_and_cta_fall_back() {
        let req = RequestDescriptor::new("b", "p", "twitter").with_tone("  ");
        assert_eq!(req.effective_tone(), "friendly");
        assert_eq!(req.effective_cta_style(), "soft");
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let req: RequestDescriptor =
            serde_json::from_str(r#"{"brand":"b","product":"p","platform":"linkedin"}"#).unwrap();
        assert!(req.audience.is_empty());
        assert_eq!(req.platform, "linkedin");
    }
}
