//! Beat-by-beat script generation.

use std::sync::Arc;
use std::time::Duration;

use marketeer_core::error::{Error, Result};
use marketeer_core::message::ChatMessage;
use marketeer_core::model::ChatModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::planner::{PlannedBeat, VideoPlan, VideoRequest, plan_video};

/// The script for one beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatScript {
    pub beat_index: usize,
    pub title: String,
    pub t_start: f64,
    pub t_end: f64,
    pub voiceover: String,
    pub on_screen: String,
    pub shots: Vec<String>,
    pub broll: Vec<String>,
    pub captions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoScript {
    pub plan: VideoPlan,
    pub beats: Vec<BeatScript>,
    /// Where fallback content had to stand in for the model's
    pub warnings: Vec<String>,
}

// ── Prompt ────────────────────────────────────────────────────────────────

/// Directive for one beat, asking for a single JSON object.
pub fn beat_prompt(request: &VideoRequest, plan: &VideoPlan, beat: &PlannedBeat) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("You are a creative short-form video scriptwriter.\n");
    out.push_str(&format!("Platform: {}\n", or_default(&plan.platform, "short-form video")));
    out.push_str(&format!("Style: {}\n", or_default(&plan.style, "warm and energetic")));
    out.push('\n');
    out.push_str(&format!("Brand: {}\n", request.brand.trim()));
    out.push_str(&format!("Product: {}\n", request.product.trim()));
    out.push_str(&format!(
        "Target audience: {}\n",
        or_default(&request.audience, "not specified")
    ));
    out.push_str(&format!("Campaign goal: {}\n", or_default(&request.goal, "not specified")));
    if !request.extra_context.trim().is_empty() {
        out.push_str(&format!("Extra context: {}\n", request.extra_context.trim()));
    }

    out.push_str("\nThis video follows a multi-beat structure. You are writing ONLY this beat:\n");
    out.push_str(&format!("- Beat title: {}\n", beat.title));
    out.push_str(&format!("- Beat goal: {}\n", beat.goal));
    out.push_str(&format!(
        "- Time window: {:.1}s to {:.1}s of a {}s video.\n",
        beat.t_start, beat.t_end, plan.duration_secs
    ));

    out.push_str(
        "\nReturn a single JSON object with EXACTLY these keys:\n\
         \x20 \"voiceover\"  (string, at most 18 words)\n\
         \x20 \"on_screen\"  (string, at most 36 characters, a short overlay text)\n\
         \x20 \"shots\"      (array of 3 short shot descriptions)\n\
         \x20 \"broll\"      (array of 2 short b-roll ideas)\n\
         \x20 \"captions\"   (array of 1-2 short caption strings)\n\
         \nDo not add any extra keys, explanations, or markdown. Just output the JSON object.",
    );
    out
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() { default } else { value }
}

// ── Decoding ──────────────────────────────────────────────────────────────

/// A list field the model sometimes sends as a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextList {
    Many(Vec<String>),
    One(String),
}

impl TextList {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawBeat {
    #[serde(default)]
    voiceover: Option<String>,
    #[serde(default)]
    on_screen: Option<String>,
    #[serde(default)]
    shots: Option<TextList>,
    #[serde(default)]
    broll: Option<TextList>,
    #[serde(default)]
    captions: Option<TextList>,
}

/// Parse the whole reply, or failing that the outermost `{ ... }` slice.
fn extract_beat(raw: &str) -> Option<RawBeat> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(beat) = serde_json::from_str(text) {
        return Some(beat);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Generic content used when the model's reply is unusable.
pub fn fallback_beat(beat: &PlannedBeat) -> BeatScript {
    let title = &beat.title;
    BeatScript {
        beat_index: beat.index,
        title: title.clone(),
        t_start: beat.t_start,
        t_end: beat.t_end,
        voiceover: format!("Introduce the idea for the '{title}' part in a clear, simple line."),
        on_screen: format!("{title} on screen."),
        shots: vec![
            format!("Shot of the main subject related to {}.", title.to_lowercase()),
            "Close-up shot for extra detail.".into(),
            "Wide shot to show context or environment.".into(),
        ],
        broll: vec![
            "Supporting b-roll that reinforces the message.".into(),
            "Cutaway showing product or user in action.".into(),
        ],
        captions: vec![format!("{title} caption text.")],
    }
}

/// Decode a beat reply. Never fails: unusable or missing parts are taken
/// from [`fallback_beat`] and reported as warnings.
pub fn decode_beat(raw: &str, beat: &PlannedBeat) -> (BeatScript, Vec<String>) {
    let label = format!("Beat {} ('{}')", beat.index + 1, beat.title);
    let mut warnings = Vec::new();
    let fallback = fallback_beat(beat);

    let Some(parsed) = extract_beat(raw) else {
        warnings.push(format!("{label} used fallback block due to invalid JSON."));
        return (fallback, warnings);
    };

    let mut missing = |key: &str| warnings.push(format!("{label} missing key '{key}', using fallback."));

    let text = |value: Option<String>| value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let list = |value: Option<TextList>| value.map(TextList::into_vec).filter(|v| !v.is_empty());

    let voiceover = text(parsed.voiceover).unwrap_or_else(|| {
        missing("voiceover");
        fallback.voiceover.clone()
    });
    let on_screen = text(parsed.on_screen).unwrap_or_else(|| {
        missing("on_screen");
        fallback.on_screen.clone()
    });
    let shots = list(parsed.shots).unwrap_or_else(|| {
        missing("shots");
        fallback.shots.clone()
    });
    let broll = list(parsed.broll).unwrap_or_else(|| {
        missing("broll");
        fallback.broll.clone()
    });
    let captions = list(parsed.captions).unwrap_or_else(|| {
        missing("captions");
        fallback.captions.clone()
    });

    let script = BeatScript {
        voiceover,
        on_screen,
        shots,
        broll,
        captions,
        ..fallback
    };
    (script, warnings)
}

// ── Scripter ──────────────────────────────────────────────────────────────

/// Plans a video and asks the model for each beat in turn.
pub struct VideoScripter {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl VideoScripter {
    pub fn new(model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Plan and script a video. One model call per beat; timeouts and model
    /// errors abort the whole script.
    pub async fn script(&self, request: &VideoRequest) -> Result<VideoScript> {
        let plan = plan_video(request)?;
        info!(
            blueprint = %plan.blueprint,
            duration_secs = plan.duration_secs,
            beats = plan.beats.len(),
            "Scripting video"
        );

        let mut beats = Vec::with_capacity(plan.beats.len());
        let mut warnings = Vec::new();

        for beat in &plan.beats {
            let messages = [
                ChatMessage::directive(beat_prompt(request, &plan, beat)),
                ChatMessage::user(format!(
                    "Write beat {} ({}) as JSON.",
                    beat.index + 1,
                    beat.title
                )),
            ];

            let raw = match tokio::time::timeout(self.timeout, self.model.generate(&messages)).await {
                Ok(reply) => reply?,
                Err(_) => {
                    let timeout_ms = self.timeout.as_millis() as u64;
                    warn!(beat = beat.index, timeout_ms, "Beat generation timed out");
                    return Err(Error::GenerationTimeout { timeout_ms });
                }
            };
            debug!(beat = beat.index, chars = raw.chars().count(), "Beat reply received");

            let (script, beat_warnings) = decode_beat(&raw, beat);
            for w in &beat_warnings {
                warn!(beat = beat.index, "{w}");
            }
            warnings.extend(beat_warnings);
            beats.push(script);
        }

        Ok(VideoScript {
            plan,
            beats,
            warnings,
        })
    }
}
