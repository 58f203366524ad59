//! Builds the service components from [`Config`], failing fast on anything
//! missing.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use url::Url;

use common::{Config, LlmConfig, NewsConfig};

use crate::error::ConfigurationError;
use crate::llm::content::{ContentGenerator, MAX_TOKENS, TEMPERATURE};
use crate::llm::remote::RemoteLlmProvider;
use crate::news::exa::ExaNewsClient;
use crate::orchestrator::Orchestrator;
use crate::platforms::PlatformCatalog;

/// Reject empty credentials; `name` only shows up in the error.
pub fn require_credential(name: &str, value: String) -> Result<String, ConfigurationError> {
    if value.trim().is_empty() {
        return Err(ConfigurationError::MissingCredential { name: name.to_string() });
    }
    Ok(value)
}

/// Read a credential from the environment variable `env_var`.
pub fn credential_from_env(env_var: &str) -> Result<String, ConfigurationError> {
    let value = std::env::var(env_var).unwrap_or_default();
    require_credential(env_var, value)
}

/// Accept only absolute http(s) URLs.
pub fn validate_endpoint(url: String) -> Result<String, ConfigurationError> {
    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(url),
        Ok(parsed) => Err(ConfigurationError::InvalidEndpoint {
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
            url,
        }),
        Err(e) => Err(ConfigurationError::InvalidEndpoint {
            reason: e.to_string(),
            url,
        }),
    }
}

pub fn build_news_client(cfg: &NewsConfig) -> Result<ExaNewsClient, ConfigurationError> {
    let api_key = credential_from_env(cfg.api_key_env())?;
    let client = ExaNewsClient::new(cfg.api_url(), api_key)?.with_timeout(cfg.timeout_seconds);
    info!(api_url = cfg.api_url(), "news client initialized");
    Ok(client)
}

pub fn build_llm_provider(cfg: &LlmConfig) -> Result<RemoteLlmProvider, ConfigurationError> {
    let api_key = credential_from_env(cfg.api_key_env())?;
    let provider = RemoteLlmProvider::new(cfg.api_url(), api_key, cfg.model())?.with_defaults(
        cfg.timeout_seconds,
        MAX_TOKENS,
        TEMPERATURE,
    );
    info!(api_url = cfg.api_url(), model = cfg.model(), "LLM provider initialized");
    Ok(provider)
}

/// Wire the default catalog, news client and content generator together.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator, ConfigurationError> {
    let catalog = PlatformCatalog::default();
    let news = build_news_client(&config.news)?;
    let llm = build_llm_provider(&config.llm)?;
    let generator = ContentGenerator::for_catalog(Arc::new(llm), &catalog)?;
    Ok(Orchestrator::new(Arc::new(news), Arc::new(generator), catalog))
}

/// `config.default.toml` merged with `--config FILE` or `./config.toml`.
pub async fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = explicit {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = Config::load_with_defaults(
        Some(default_path.as_path()).filter(|p| p.exists()),
        override_path.as_deref(),
    )
    .await
    .map_err(|e| {
        error!(%e, "failed to load configuration");
        e
    })?;
    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");
    Ok(config)
}
