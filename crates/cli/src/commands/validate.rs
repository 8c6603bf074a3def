//! `marketeer validate`: Audit existing copy against a platform.

use std::io::Read;
use std::path::Path;

use marketeer_copy::{ValidationAudit, validate_and_edit};

pub async fn run(
    config_path: Option<&Path>,
    platform: &str,
    file: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let rules = super::load_rules(&config)?;
    let rule = rules.get(platform)?;

    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let (final_text, audit) = validate_and_edit(&raw, rule)?;

    if json {
        let out = serde_json::json!({
            "platform": rule.id(),
            "final_text": final_text,
            "audit": audit,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{final_text}");
        eprintln!();
        eprint!("{}", render_audit(&audit, rule.max_characters()));
    }

    Ok(())
}

/// Human-readable audit summary.
pub fn render_audit(audit: &ValidationAudit, cap: usize) -> String {
    let mut out = format!(
        "  Length: {} → {} characters (cap {cap})\n",
        audit.raw_length, audit.final_length
    );
    if audit.is_clean() {
        out.push_str("  ✅ No violations\n");
    } else {
        for v in &audit.violations {
            out.push_str(&format!("  ⚠ {}: {}\n      → {}\n", v.rule(), v.description(), v.action()));
        }
    }
    out
}
