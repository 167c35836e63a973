//! # rpmkit
//!
//! Pending package transaction bookkeeping and leaf package detection for
//! RPM-based systems.
//!
//! This crate provides:
//! - [`Transaction`]: the set of pending install/upgrade/erase operations and
//!   the reason each package is part of it
//! - [`orphan`]: detection of installed packages nothing else requires
//! - [`backend`]: read-only access to installed package headers, either from
//!   the system rpm database or from a captured [`Snapshot`]
//!
//! ## Example
//!
//! ```no_run
//! use rpmkit::{Client, OperationMode, PackageIdentity, Reason, Transaction};
//!
//! // Find packages nothing else requires
//! let client = Client::new().expect("rpm not available");
//! for pkg in client.leaves().expect("query failed") {
//!     println!("{pkg}");
//! }
//!
//! // Track what this run intends to do
//! let mut tx = Transaction::new();
//! let bash: PackageIdentity = "bash-5.2.26-3.fc40.x86_64".parse().unwrap();
//! tx.add(bash.clone(), OperationMode::Upgrade, Reason::UserRequested);
//! print!("{}", tx.display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod orphan;
pub mod transaction;
pub mod types;

pub use backend::PackageDatabase;
pub use backend::rpm::RpmBackend;
pub use backend::snapshot::Snapshot;
pub use error::{Error, ErrorCategory, Result};
pub use transaction::{PlannedPackage, Transaction};
pub use types::{
    IdentityFilter, OperationMode, PackageHeader, PackageIdentity, Reason, TransactionEntry,
};

use std::collections::BTreeSet;

/// High-level client over an installed-package database.
///
/// The client owns the database handle it was given; every query goes
/// through that handle and nothing else.
pub struct Client {
    backend: Box<dyn PackageDatabase>,
}

impl Client {
    /// Create a new Client with the system rpm database.
    ///
    /// Returns an error if rpm is not installed.
    pub fn new() -> Result<Self> {
        let backend = backend::default_backend()?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client with a custom backend.
    pub fn with_backend(backend: Box<dyn PackageDatabase>) -> Self {
        Self { backend }
    }

    /// Check if the database can be queried.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Headers of every installed package.
    pub fn installed(&self) -> Result<Vec<PackageHeader>> {
        self.backend.query_installed()
    }

    /// Installed packages that no other installed package requires.
    pub fn leaves(&self) -> Result<BTreeSet<PackageIdentity>> {
        orphan::find_orphans(self.backend.as_ref())
    }

    /// Capture the installed packages into a [`Snapshot`].
    pub fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::capture(self.backend.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_with_snapshot_backend() {
        let a = PackageIdentity::new("a", "noarch", "0", "1", "1");
        let b = PackageIdentity::new("b", "noarch", "0", "1", "1");
        let snapshot = Snapshot::from_headers(vec![
            PackageHeader::new(a).with_provides(["liba"]),
            PackageHeader::new(b.clone())
                .with_requires(["liba"])
                .with_provides(["libb"]),
        ]);

        let client = Client::with_backend(Box::new(snapshot.clone()));
        assert!(client.is_available());
        assert_eq!(client.installed().unwrap().len(), 2);
        assert_eq!(client.leaves().unwrap(), BTreeSet::from([b]));
        assert_eq!(client.snapshot().unwrap(), snapshot);
    }
}
