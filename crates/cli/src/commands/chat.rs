//! `marketeer chat`: Single-shot or interactive copywriting turns.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::Args;
use marketeer_config::AppConfig;
use marketeer_copy::{TurnOrchestrator, TurnOutcome};
use marketeer_core::{ChatTurn, Error, RequestDescriptor};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Campaign fields shared by every turn of a session.
#[derive(Debug, Clone, Args)]
pub struct CampaignArgs {
    /// Target platform (id or alias)
    #[arg(short, long)]
    pub platform: String,

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

    /// Tone (default: friendly)
    #[arg(long, default_value = "")]
    pub tone: String,

    /// Call-to-action style (default: soft)
    #[arg(long, default_value = "")]
    pub cta: String,

    /// Free-form extra context
    #[arg(long, default_value = "")]
    pub extra_context: String,
}

impl CampaignArgs {
    pub fn to_request(&self) -> RequestDescriptor {
        RequestDescriptor::new(&self.brand, &self.product, &self.platform)
            .with_audience(&self.audience)
            .with_goal(&self.goal)
            .with_tone(&self.tone)
            .with_cta_style(&self.cta)
            .with_extra_context(&self.extra_context)
    }
}

pub async fn run(
    config_path: Option<&Path>,
    campaign: CampaignArgs,
    message: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let rules = Arc::new(super::load_rules(&config)?);
    let request = campaign.to_request();

    // Fail on an unknown platform before touching the backend.
    let rule = rules.get(&request.platform)?;
    let platform_name = rule.display_name().to_string();
    let cap = rule.max_characters();

    let needs_key = matches!(
        config.backend.provider.to_lowercase().as_str(),
        "huggingface" | "hf" | "openai"
    );
    if needs_key && !config.has_api_key() {
        print_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let model = marketeer_providers::build_model(&config.backend)?;
    let orchestrator = TurnOrchestrator::new(model.clone(), rules, config.generation.timeout());

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Writing...");
        let result = orchestrator.run_turn_until(&request, &msg, &[], ctrl_c()).await;
        eprint!("\r           \r");
        let outcome = result?;

        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!("{}", outcome.final_text);
            eprintln!();
            eprint!("{}", super::validate::render_audit(&outcome.audit, cap));
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Marketeer Chat — Interactive Mode     ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Backend:   {}", config.backend.provider);
    println!("  Model:     {}", config.backend.model);
    println!("  Platform:  {platform_name}");
    println!("  Brand:     {}", request.brand);
    println!();
    match model.health_check().await {
        Ok(true) => {}
        Ok(false) => eprintln!("  ⚠ Backend answered the health check with an error status."),
        Err(e) => eprintln!("  ⚠ Backend unreachable ({e}); turns may fail."),
    }
    println!("  Describe the post you want, or ask for edits to the last one.");
    println!("  Type '/reset' to clear the history, 'exit' or Ctrl+D to quit.");
    println!("  Ctrl+C cancels a running turn; at the prompt it quits.");
    println!();

    let mut history: Vec<ChatTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut interrupted = false;
    loop {
        prompt()?;
        let line = match next_input(&mut lines, ctrl_c()).await? {
            Input::Line(line) => line,
            Input::End => break,
            Input::Interrupted => {
                interrupted = true;
                println!();
                break;
            }
        };
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/reset" => {
                history.clear();
                println!("  (history cleared)");
                println!();
            }
            _ => {
                eprint!("  ...");
                let result = orchestrator
                    .run_turn_until(&request, input, &history, ctrl_c())
                    .await;
                eprint!("\r     \r");
                match result {
                    Ok(outcome) => {
                        print_outcome(&outcome);
                        history.push(outcome.as_chat_turn(input));
                    }
                    Err(Error::Cancelled) => {
                        eprintln!("  [Cancelled]");
                        println!();
                    }
                    Err(e) => {
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }
            }
        }
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    if interrupted {
        // The blocking stdin read cannot be cancelled and would hold up
        // runtime shutdown until the next Enter.
        std::io::stdout().flush()?;
        std::process::exit(130);
    }
    Ok(())
}

async fn ctrl_c() {
    let _ = tokio::signal::ctrl_c().await;
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Line(String),
    End,
    Interrupted,
}

/// Wait for the next input line, or for `interrupt` (Ctrl+C at the prompt).
async fn next_input<R>(
    lines: &mut Lines<R>,
    interrupt: impl Future<Output = ()>,
) -> std::io::Result<Input>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        biased;
        () = interrupt => Ok(Input::Interrupted),
        line = lines.next_line() => Ok(line?.map_or(Input::End, Input::Line)),
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_outcome(outcome: &TurnOutcome) {
    println!();
    for line in outcome.final_text.lines() {
        println!("  Marketeer > {line}");
    }
    println!();
    if !outcome.audit.is_clean() {
        for v in &outcome.audit.violations {
            eprintln!("  ⚠ {}", v.action());
        }
    }
    eprintln!(
        "  ({} chars, {} ms)",
        outcome.audit.final_length, outcome.elapsed_ms
    );
    println!();
}

fn print_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    MARKETEER_API_KEY   (generic)");
    eprintln!("    HF_TOKEN            (Hugging Face)");
    eprintln!("    OPENAI_API_KEY      (OpenAI)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Or run a local model with backend.provider = \"ollama\".");
    eprintln!();
}
