use anyhow::{Context, Result};
use rpmkit::RpmBackend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("rpmtx"))
}

/// Get the state directory path (~/.local/state/rpmtx)
pub fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("rpmtx"))
}

/// Expand `~` in a configured path
fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the pending transaction is kept
    pub transaction_file: Option<String>,

    /// rpm database access
    pub rpm: RpmConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpmConfig {
    /// rpm executable (found automatically when unset)
    pub path: Option<String>,
    /// Alternate installroot
    pub root: Option<String>,
    /// Alternate database directory
    pub dbpath: Option<String>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load the default config file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("Config file does not exist, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config format: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Path of the pending transaction file
    pub fn transaction_path(&self) -> Result<PathBuf> {
        match &self.transaction_file {
            Some(path) => Ok(expand_path(path)),
            None => Ok(state_dir()?.join("transaction.toml")),
        }
    }

    /// Build the rpm backend described by this config
    pub fn backend(&self) -> Result<RpmBackend> {
        let mut backend = match &self.rpm.path {
            Some(path) => RpmBackend::with_executable(expand_path(path).to_string_lossy()),
            None => RpmBackend::new().context("Could not locate rpm")?,
        };
        if let Some(root) = &self.rpm.root {
            backend = backend.with_root(expand_path(root));
        }
        if let Some(dbpath) = &self.rpm.dbpath {
            backend = backend.with_dbpath(expand_path(dbpath));
        }
        Ok(backend)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }
}
