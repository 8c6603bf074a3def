//! `marketeer video`: Plan or script a short-form video.

use std::path::Path;

use clap::Args;
use marketeer_copy::video::{BLUEPRINTS, DEFAULT_BLUEPRINT, VideoPlan, VideoScript};
use marketeer_copy::{VideoRequest, VideoScripter, plan_video};
use marketeer_core::Error;

#[derive(Debug, Clone, Args)]
pub struct VideoArgs {
    /// Brand name
    #[arg(long)]
    pub brand: String,

    /// Product or offer
    #[arg(long)]
    pub product: String,

    #[arg(long, default_value = "")]
    pub audience: String,

    /// Campaign goal
    #[arg(long, default_value = "")]
    pub goal: String,

    /// Beat structure: short_ad, ugc_review or how_to
    #[arg(short, long, default_value = DEFAULT_BLUEPRINT)]
    pub blueprint: String,

    /// Target length in seconds (minimum 5)
    #[arg(short, long, default_value_t = 30)]
    pub duration: u32,

    /// Platform label, e.g. "Instagram Reels"
    #[arg(long, default_value = "")]
    pub platform: String,

    /// Overall style, e.g. "warm and energetic"
    #[arg(long, default_value = "")]
    pub style: String,

    #[arg(long, default_value = "")]
    pub extra_context: String,
}

impl VideoArgs {
    pub fn to_request(&self) -> VideoRequest {
        VideoRequest::new(&self.brand, &self.product, self.duration)
            .with_blueprint(&self.blueprint)
            .with_audience(&self.audience)
            .with_goal(&self.goal)
            .with_platform(&self.platform)
            .with_style(&self.style)
            .with_extra_context(&self.extra_context)
    }
}

pub async fn run(
    config_path: Option<&Path>,
    args: VideoArgs,
    plan_only: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = args.to_request();

    if plan_only {
        let plan = plan_video(&request).map_err(video_error)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print!("{}", render_plan(&plan));
        }
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    let model = marketeer_providers::build_model(&config.backend)?;
    let scripter = VideoScripter::new(model, config.generation.timeout());

    eprint!("  Scripting...");
    let result = scripter.script(&request).await;
    eprint!("\r             \r");
    let script = result.map_err(video_error)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&script)?);
    } else {
        print!("{}", render_script(&script));
    }
    Ok(())
}

/// Unknown blueprints get the list of valid names appended.
fn video_error(err: Error) -> Box<dyn std::error::Error> {
    match err {
        Error::UnknownBlueprint(_) => {
            let names: Vec<&str> = BLUEPRINTS.iter().map(|b| b.name).collect();
            format!("{err} (available: {})", names.join(", ")).into()
        }
        other => other.into(),
    }
}

fn render_plan(plan: &VideoPlan) -> String {
    let mut out = format!(
        "🎬 {} — {}s{}\n\n",
        plan.blueprint,
        plan.duration_secs,
        if plan.platform.is_empty() {
            String::new()
        } else {
            format!(" for {}", plan.platform)
        }
    );
    for beat in &plan.beats {
        out.push_str(&format!(
            "  {}. [{:>6.2}s – {:>6.2}s] {}\n     {}\n",
            beat.index + 1,
            beat.t_start,
            beat.t_end,
            beat.title,
            beat.goal
        ));
    }
    out
}

fn render_script(script: &VideoScript) -> String {
    let mut out = render_plan(&script.plan);
    out.push('\n');
    for beat in &script.beats {
        out.push_str(&format!(
            "── {} ({:.1}s – {:.1}s) ──\n",
            beat.title, beat.t_start, beat.t_end
        ));
        out.push_str(&format!("  Voiceover: {}\n", beat.voiceover));
        out.push_str(&format!("  On screen: {}\n", beat.on_screen));
        for (label, items) in [
            ("Shots", &beat.shots),
            ("B-roll", &beat.broll),
            ("Captions", &beat.captions),
        ] {
            out.push_str(&format!("  {label}:\n"));
            for item in items {
                out.push_str(&format!("    - {item}\n"));
            }
        }
        out.push('\n');
    }
    if !script.warnings.is_empty() {
        out.push_str("⚠ Warnings:\n");
        for w in &script.warnings {
            out.push_str(&format!("  - {w}\n"));
        }
    }
    out
}
