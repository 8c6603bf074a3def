//! `marketeer platforms`: List the platform rule table.

use std::path::Path;

use marketeer_core::PlatformRule;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let rules = super::load_rules(&config)?;

    println!("📣 Platforms");
    println!("============");
    println!();
    println!("  ┌──────────────┬──────────────┬────────┬──────────┬────────┬──────────────┐");
    println!("  │ Id           │ Name         │ Cap    │ Hashtags │ Emojis │ Aliases      │");
    println!("  ├──────────────┼──────────────┼────────┼──────────┼────────┼──────────────┤");
    for rule in rules.iter() {
        println!("  {}", table_row(rule));
    }
    println!("  └──────────────┴──────────────┴────────┴──────────┴────────┴──────────────┘");
    println!();
    match &config.platforms.rules_file {
        Some(path) => println!("  Rules loaded from {}", path.display()),
        None => println!("  Using built-in rules (set platforms.rules_file to override)"),
    }

    Ok(())
}

fn table_row(rule: &PlatformRule) -> String {
    let limit = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
    let aliases = if rule.aliases().is_empty() {
        "-".to_string()
    } else {
        rule.aliases().join(", ")
    };
    format!(
        "│ {:<12} │ {:<12} │ {:>6} │ {:>8} │ {:>6} │ {:<12} │",
        rule.id(),
        rule.display_name(),
        rule.max_characters(),
        limit(rule.max_hashtags()),
        limit(rule.max_emojis()),
        aliases,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketeer_core::PlatformRuleTable;

    #[test]
    fn row_shows_limits_and_aliases() {
        let table = PlatformRuleTable::builtin();
        let row = table_row(table.get("x").unwrap());
        assert!(row.contains("twitter"));
        assert!(row.contains("280"));
        assert!(row.contains("x, twitter/x"));
    }

    #[test]
    fn missing_limits_render_as_dash() {
        let rule = PlatformRule::new("threads", "Threads", 500).unwrap();
        let row = table_row(&rule);
        assert!(row.contains("│        - │"));
    }
}
