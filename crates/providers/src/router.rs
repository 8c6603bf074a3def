//! Backend selection: turns a `[backend]` config section into a model.

use std::sync::Arc;

use marketeer_config::BackendConfig;
use marketeer_core::error::ModelError;
use marketeer_core::model::ChatModel;
use tracing::info;

use crate::openai_compat::OpenAiCompatModel;

/// Backends this build knows how to construct.
pub const SUPPORTED_PROVIDERS: &[&str] = &["huggingface", "openai", "ollama", "custom"];

/// Build the model selected by configuration.
pub fn build_model(config: &BackendConfig) -> Result<Arc<dyn ChatModel>, ModelError> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let provider = config.provider.to_lowercase();

    let model = match provider.as_str() {
        "huggingface" | "hf" => {
            require_key(&provider, &api_key)?;
            match &config.api_url {
                Some(url) => OpenAiCompatModel::new("huggingface", url, api_key, &config.model)?,
                None => OpenAiCompatModel::huggingface(api_key, &config.model)?,
            }
        }
        "openai" => {
            require_key(&provider, &api_key)?;
            match &config.api_url {
                Some(url) => OpenAiCompatModel::new("openai", url, api_key, &config.model)?,
                None => OpenAiCompatModel::openai(api_key, &config.model)?,
            }
        }
        "ollama" => OpenAiCompatModel::ollama(config.api_url.as_deref(), &config.model)?,
        "custom" => {
            let url = config.api_url.as_deref().ok_or_else(|| {
                ModelError::NotConfigured("custom backend requires backend.api_url".into())
            })?;
            OpenAiCompatModel::new("custom", url, api_key, &config.model)?
        }
        other => {
            return Err(ModelError::NotConfigured(format!(
                "unknown backend '{other}' (expected one of: {})",
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }
    };

    info!(
        backend = %provider,
        model = %config.model,
        stream = config.stream,
        "Model backend ready"
    );

    Ok(Arc::new(
        model
            .with_sampling(config.sampling())
            .with_streaming(config.stream)
            .with_directive_as_user(config.directive_as_user),
    ))
}

fn require_key(provider: &str, key: &str) -> Result<(), ModelError> {
    if key.trim().is_empty() {
        return Err(ModelError::NotConfigured(format!(
            "{provider} backend requires an API key (set MARKETEER_API_KEY)"
        )));
    }
    Ok(())
}
