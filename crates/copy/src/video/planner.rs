//! Timed beat schedules for a video request.

use marketeer_core::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::blueprints::{DEFAULT_BLUEPRINT, blueprint};

/// Shortest video we plan for, in seconds.
pub const MIN_DURATION_SECS: u32 = 5;

/// What the caller wants a video script for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub brand: String,
    pub product: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default = "default_blueprint")]
    pub blueprint: String,
    pub duration_secs: u32,
    /// Free-form label, e.g. "Instagram Reels"
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub extra_context: String,
}

fn default_blueprint() -> String {
    DEFAULT_BLUEPRINT.into()
}

impl VideoRequest {
    pub fn new(brand: impl Into<String>, product: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            brand: brand.into(),
            product: product.into(),
            audience: String::new(),
            goal: String::new(),
            blueprint: default_blueprint(),
            duration_secs,
            platform: String::new(),
            style: String::new(),
            extra_context: String::new(),
        }
    }

    pub fn with_blueprint(mut self, blueprint: impl Into<String>) -> Self {
        self.blueprint = blueprint.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_extra_context(mut self, extra_context: impl Into<String>) -> Self {
        self.extra_context = extra_context.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedBeat {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub goal: String,
    pub t_start: f64,
    pub t_end: f64,
}

impl PlannedBeat {
    pub fn duration(&self) -> f64 {
        self.t_end - self.t_start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPlan {
    pub blueprint: String,
    pub duration_secs: u32,
    pub platform: String,
    pub style: String,
    pub beats: Vec<PlannedBeat>,
}

/// Split the requested runtime across the blueprint's beats by weight.
///
/// The last beat always ends exactly at the (clamped) duration. Times are
/// rounded to hundredths of a second.
pub fn plan_video(request: &VideoRequest) -> Result<VideoPlan> {
    let bp = blueprint(&request.blueprint)?;
    if bp.beats.is_empty() {
        return Err(Error::config(format!("blueprint '{}' has no beats", bp.name)));
    }

    let duration_secs = request.duration_secs.max(MIN_DURATION_SECS);
    let total = f64::from(duration_secs);
    let total_weight = match bp.total_weight() {
        w if w > 0.0 => w,
        _ => 1.0,
    };

    let last = bp.beats.len() - 1;
    let mut cursor = 0.0;
    let beats = bp
        .beats
        .iter()
        .enumerate()
        .map(|(index, tpl)| {
            let t_end = if index == last {
                total
            } else {
                cursor + tpl.weight / total_weight * total
            };
            let beat = PlannedBeat {
                index,
                id: tpl.id.to_string(),
                title: tpl.title.to_string(),
                goal: tpl.goal.to_string(),
                t_start: round2(cursor),
                t_end: round2(t_end),
            };
            cursor = t_end;
            beat
        })
        .collect();

    Ok(VideoPlan {
        blueprint: bp.name.to_string(),
        duration_secs,
        platform: request.platform.trim().to_string(),
        style: request.style.trim().to_string(),
        beats,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ad_thirty_seconds() {
        let plan = plan_video(&VideoRequest::new("Brew Haven", "Latte", 30)).unwrap();
        let windows: Vec<(f64, f64)> = plan.beats.iter().map(|b| (b.t_start, b.t_end)).collect();
        assert_eq!(
            windows,
            vec![(0.0, 6.0), (6.0, 12.0), (12.0, 21.0), (21.0, 27.0), (27.0, 30.0)]
        );
        assert_eq!(plan.blueprint, "short_ad");
    }

    #[test]
    fn duration_is_clamped() {
        let plan = plan_video(&VideoRequest::new("b", "p", 2)).unwrap();
        assert_eq!(plan.duration_secs, MIN_DURATION_SECS);
        assert_eq!(plan.beats.last().unwrap().t_end, 5.0);
    }

    #[test]
    fn beats_are_contiguous_and_rounded() {
        let req = VideoRequest::new("b", "p", 17).with_blueprint("ugc_review");
        let plan = plan_video(&req).unwrap();
        assert_eq!(plan.beats[0].t_start, 0.0);
        for pair in plan.beats.windows(2) {
            assert_eq!(pair[0].t_end, pair[1].t_start);
        }
        for beat in &plan.beats {
            assert_eq!(beat.t_end, round2(beat.t_end));
            assert!(beat.duration() > 0.0);
        }
        assert_eq!(plan.beats[4].t_end, 17.0);
    }

    #[test]
    fn unknown_blueprint_propagates() {
        let req = VideoRequest::new("b", "p", 30).with_blueprint("vlog");
        assert!(matches!(plan_video(&req), Err(Error::UnknownBlueprint(_))));
    }
}
