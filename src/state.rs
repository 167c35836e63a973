use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rpmkit::Transaction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The pending transaction as kept between invocations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingTransaction {
    /// Last time the transaction was changed
    pub last_updated: DateTime<Utc>,

    /// Queued package operations, in insertion order
    #[serde(default)]
    pub transaction: Transaction,
}

impl PendingTransaction {
    /// Load from disk, or return an empty transaction if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Transaction file does not exist, starting empty");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read transaction file: {}", path.display()))?;

        let pending: PendingTransaction = toml::from_str(&content)
            .with_context(|| format!("Failed to parse transaction file: {}", path.display()))?;

        log::debug!(
            "Loaded {} entries from {}",
            pending.transaction.count(),
            path.display()
        );
        Ok(pending)
    }

    /// Save to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            toml::to_string_pretty(&self).context("Failed to serialize transaction to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write transaction file: {}", path.display()))?;

        log::debug!("Saved transaction to {}", path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }
}

impl Default for PendingTransaction {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            transaction: Transaction::new(),
        }
    }
}
