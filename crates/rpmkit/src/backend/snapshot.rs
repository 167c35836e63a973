//! Captured package database, held in memory and stored as JSON.

use crate::backend::PackageDatabase;
use crate::error::{Error, Result};
use crate::types::PackageHeader;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// A fixed set of installed package headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Installed packages in database order
    #[serde(default)]
    pub packages: Vec<PackageHeader>,
}

impl Snapshot {
    /// Build a snapshot from headers.
    pub fn from_headers(packages: Vec<PackageHeader>) -> Self {
        Self { packages }
    }

    /// Capture every installed package from another database.
    pub fn capture(db: &dyn PackageDatabase) -> Result<Self> {
        Ok(Self::from_headers(db.query_installed()?))
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::SnapshotNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        log::debug!(
            "loaded {} packages from {}",
            snapshot.packages.len(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Write the snapshot to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::debug!("saved {} packages to {}", self.packages.len(), path.display());
        Ok(())
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the snapshot holds no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageDatabase for Snapshot {
    fn is_available(&self) -> bool {
        true
    }

    fn query_installed(&self) -> Result<Vec<PackageHeader>> {
        Ok(self.packages.clone())
    }
}
