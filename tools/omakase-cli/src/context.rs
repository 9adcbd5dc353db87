//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use omakase_cart::{CartHandle, CartProvider, CartService};
use omakase_store::{FileStore, Storage};
use tracing::debug;

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Config file the settings came from, if any.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config: config.with_env_overrides(),
            output,
            cwd,
            config_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Session directory standing in for the browser tab.
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.dir)
    }

    /// Open the session store.
    pub fn storage(&self) -> Result<Storage> {
        let dir = self.storage_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open session store: {}", dir.display()))?;
        Ok(Storage::new(store))
    }

    /// Mount the cart against the configured backend.
    pub fn open_cart(&self) -> Result<CartSession> {
        let service = CartService::connect(&self.config.cart, self.storage()?)
            .context("Failed to set up cart client")?;
        debug!(api_url = %self.config.cart.api_url, "cart client ready");
        self.output
            .debug(&format!("session store: {}", self.storage_dir().display()));
        Ok(CartSession {
            provider: CartProvider::new(service),
        })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// A mounted cart for the duration of one command.
pub struct CartSession {
    provider: CartProvider,
}

impl CartSession {
    pub fn handle(&self) -> CartHandle {
        self.provider.handle()
    }
}
