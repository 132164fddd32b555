use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use batchscope::client::{ApiToken, ClientConfig, DEFAULT_BASE_URL};
use batchscope::types::DEFAULT_PAGE_SIZE;
use batchscope::validators::is_valid_base_url;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "batchscope.toml";

const MAX_PAGE_SIZE: u64 = 500;

/// Runtime context for batchscope commands
#[derive(Debug)]
pub struct ExplorerContext {
    /// Path the config was loaded from, if any
    pub config_path: Option<PathBuf>,
    /// Loaded (or default) configuration
    pub config: ExplorerConfig,
}

/// Configuration stored in batchscope.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_token")]
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: default_token(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token() -> String {
    "${BATCHDATA_API_TOKEN}".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl ExplorerContext {
    /// Load the explicit config file, or `batchscope.toml` from the working directory if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    Self::from_path(&candidate)
                } else {
                    Ok(Self {
                        config_path: None,
                        config: ExplorerConfig::default(),
                    })
                }
            }
        }
    }

    /// Read and validate a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ExplorerConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

        if !is_valid_base_url(&config.api.base_url) {
            anyhow::bail!("Invalid api.base_url in {}: {}", path.display(), config.api.base_url);
        }
        if config.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }

        Ok(Self {
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    /// Page size for list and comparables, clamped to a sane range
    pub fn page_size(&self) -> u64 {
        self.config.search.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Resolve the API token: explicit flag first, then the config value (with `${VAR}` expansion)
    pub fn api_token(&self, explicit: Option<&str>) -> Result<ApiToken> {
        if let Some(token) = explicit.map(str::trim).filter(|token| !token.is_empty()) {
            return Ok(ApiToken::new(token));
        }
        let token = expand_env(&self.config.api.token)
            .context("No API token: pass --token or set BATCHDATA_API_TOKEN")?;
        if token.trim().is_empty() {
            anyhow::bail!("No API token: pass --token or set BATCHDATA_API_TOKEN");
        }
        Ok(ApiToken::new(token))
    }

    pub fn client_config(&self, explicit_token: Option<&str>) -> Result<ClientConfig> {
        let config = ClientConfig::new(self.api_token(explicit_token)?)
            .with_base_url(&self.config.api.base_url)?
            .with_timeout(Duration::from_secs(self.config.api.timeout_secs));
        Ok(config)
    }
}

/// Expand a whole-value `${VAR}` reference
fn expand_env(value: &str) -> Result<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))
    } else {
        Ok(value.to_string())
    }
}
