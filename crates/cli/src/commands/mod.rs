//! Subcommand implementations and the setup they share.

pub mod chat;
pub mod platforms;
pub mod validate;
pub mod video;

use marketeer_config::AppConfig;
use marketeer_core::PlatformRuleTable;
use std::path::Path;

/// Load config from `path` or the default location, with env overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    let config = config.map_err(|e| format!("Failed to load config: {e}"))?;
    tracing::debug!(
        provider = %config.backend.provider,
        model = %config.backend.model,
        "Configuration loaded"
    );
    Ok(config)
}

/// The configured platform rule table.
pub fn load_rules(config: &AppConfig) -> Result<PlatformRuleTable, Box<dyn std::error::Error>> {
    Ok(config
        .platform_rules()
        .map_err(|e| format!("Failed to load platform rules: {e}"))?)
}
