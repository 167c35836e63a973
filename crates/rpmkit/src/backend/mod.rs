//! Package database abstraction.
//!
//! The [`PackageDatabase`] trait is the only way the core reads installed
//! package metadata. Callers own the handle and pass it in explicitly:
//! - [`rpm::RpmBackend`] queries the system rpm database
//! - [`snapshot::Snapshot`] serves headers captured earlier or built in memory

pub mod rpm;
pub mod snapshot;

use crate::error::Result;
use crate::types::PackageHeader;

/// Read-only access to installed package headers.
pub trait PackageDatabase: Send + Sync {
    /// Check if the database can be queried.
    fn is_available(&self) -> bool;

    /// Return a header for every installed package.
    ///
    /// Errors are returned as-is; implementations do not retry.
    fn query_installed(&self) -> Result<Vec<PackageHeader>>;
}

/// Get the default backend (system rpm database).
pub fn default_backend() -> Result<rpm::RpmBackend> {
    rpm::RpmBackend::new()
}
