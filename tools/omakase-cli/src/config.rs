//! CLI configuration.

use anyhow::{Context, Result};
use omakase_cart::CartConfig;
use serde::{Deserialize, Serialize};

/// Config file names searched from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["omakase.toml", ".omakase.toml", "omakase.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart backend and persistence settings.
    #[serde(default)]
    pub cart: CartConfig,

    /// Local session storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse config text; the format follows the file extension.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        self.cart = self.cart.with_env_overrides();
        self
    }
}

/// Where the session store lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Session directory. Deleting it ends the session.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

fn default_storage_dir() -> String {
    ".omakase/session".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Generate a default omakase.toml config file.
pub fn generate_default_config() -> String {
    r#"# Omakase cart client configuration

[cart]
api_url = "http://localhost:3000"
cart_path = "/cart"
session_header = "session-id"
stale_time_ms = 10000

[cart.timeout]
connect_ms = 2000
total_ms = 10000

[storage]
# Delete this directory to start a new session
dir = ".omakase/session"
"#
    .to_string()
}
