use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SECRETS_FILE: &str = ".streamlit/secrets.toml";
pub const DEFAULT_VISION_MODEL: &str = "openai/gpt-4-vision-preview";

/// Application configuration loaded from environment variables.
/// Nothing here is required: a missing API key only disables model calls.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub secrets_file: PathBuf,
    pub vision_model: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_file = std::env::var("SECRETS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_FILE));

        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Config {
            openrouter_api_key: resolve_api_key(&secrets_file).map(|(key, _)| key),
            openrouter_base_url: std::env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            secrets_file,
            vision_model: std::env::var("VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Where a resolved API key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    SecretsFile(PathBuf),
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "OPENROUTER_API_KEY")]
    openrouter_api_key: Option<String>,
}

/// Resolves the API key: environment variable first, then the secrets file.
/// Blank values count as absent.
pub fn resolve_api_key(secrets_file: &Path) -> Option<(String, KeySource)> {
    if let Some(key) = std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty()) {
        return Some((key, KeySource::Environment));
    }

    match read_secrets_key(secrets_file) {
        Ok(Some(key)) => Some((key, KeySource::SecretsFile(secrets_file.to_path_buf()))),
        Ok(None) => None,
        Err(e) => {
            warn!("Ignoring unreadable secrets file {}: {e:#}", secrets_file.display());
            None
        }
    }
}

/// Reads `OPENROUTER_API_KEY` from a TOML secrets file.
/// A missing file is `Ok(None)`; a file that exists but does not parse is an error.
pub fn read_secrets_key(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        debug!("No secrets file at {}", path.display());
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read secrets file '{}'", path.display()))?;
    let secrets: SecretsFile = toml::from_str(&raw)
        .with_context(|| format!("Secrets file '{}' is not valid TOML", path.display()))?;

    Ok(secrets.openrouter_api_key.filter(|k| !k.trim().is_empty()))
}
