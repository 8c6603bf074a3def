//! Beat structures for short-form video formats.

use marketeer_core::error::{Error, Result};
use serde::Serialize;

/// One beat of a blueprint. `weight` is its relative share of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeatTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub goal: &'static str,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Blueprint {
    pub name: &'static str,
    pub description: &'static str,
    pub beats: &'static [BeatTemplate],
}

impl Blueprint {
    pub fn total_weight(&self) -> f64 {
        self.beats.iter().map(|b| b.weight).sum()
    }
}

pub const DEFAULT_BLUEPRINT: &str = "short_ad";

const fn beat(id: &'static str, title: &'static str, goal: &'static str, weight: f64) -> BeatTemplate {
    BeatTemplate {
        id,
        title,
        goal,
        weight,
    }
}

pub static BLUEPRINTS: &[Blueprint] = &[
    Blueprint {
        name: "short_ad",
        description: "Punchy short ad for Reels/Shorts/TikTok with strong hook and CTA.",
        beats: &[
            beat("hook", "Hook", "Grab attention in the first second and stop the scroll.", 0.2),
            beat("problem", "Problem", "Show the pain point the viewer feels right now.", 0.2),
            beat("solution", "Solution", "Introduce the product as the clear solution.", 0.3),
            beat("proof", "Proof", "Show quick proof: results, social proof, or credibility.", 0.2),
            beat("cta", "Call to Action", "Give a clear, simple next step.", 0.1),
        ],
    },
    Blueprint {
        name: "ugc_review",
        description: "User-generated style review with before/after flow.",
        beats: &[
            beat("intro", "UGC Intro", "Introduce yourself quickly and mention the product.", 0.2),
            beat("before", "Before", "Describe life before using the product (the struggle).", 0.25),
            beat("experience", "Experience", "Describe what it was like actually trying the product.", 0.3),
            beat("after", "After", "Describe the positive results and outcome.", 0.15),
            beat("recommend", "Recommendation & CTA", "Recommend the product and give a simple prompt to act.", 0.1),
        ],
    },
    Blueprint {
        name: "how_to",
        description: "Educational explainer with clear steps and recap.",
        beats: &[
            beat("intro", "Intro", "Tell viewers what they will learn and why it matters.", 0.2),
            beat("step1", "Step 1", "Explain and demo the first key step.", 0.25),
            beat("step2", "Step 2", "Explain and demo the second key step.", 0.25),
            beat("step3", "Step 3", "Optional third step or bonus tip.", 0.15),
            beat("wrap", "Recap & CTA", "Recap key points and suggest the next action.", 0.15),
        ],
    },
];

/// Look up a blueprint by name (case-insensitive).
pub fn blueprint(name: &str) -> Result<&'static Blueprint> {
    let key = name.trim().to_lowercase();
    BLUEPRINTS
        .iter()
        .find(|b| b.name == key)
        .ok_or_else(|| Error::UnknownBlueprint(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_blueprints_have_five_beats_summing_to_one() {
        for bp in BLUEPRINTS {
            assert_eq!(bp.beats.len(), 5, "{}", bp.name);
            assert!((bp.total_weight() - 1.0).abs() < 1e-9, "{}", bp.name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(blueprint(" How_To ").unwrap().name, "how_to");
        assert_eq!(blueprint(DEFAULT_BLUEPRINT).unwrap().beats[0].id, "hook");
    }

    #[test]
    fn unknown_blueprint_is_an_error() {
        let err = blueprint("documentary").unwrap_err();
        assert!(matches!(err, Error::UnknownBlueprint(ref n) if n == "documentary"));
    }
}
