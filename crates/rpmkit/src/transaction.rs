//! Pending transaction bookkeeping.
//!
//! A [`Transaction`] is an ordered list of (package, mode) entries plus the
//! reason each package was added. It carries no behavior beyond bookkeeping:
//! deciding what goes in is the resolver's job, running it is the package
//! manager's.

use crate::error::{Error, Result};
use crate::types::{IdentityFilter, OperationMode, PackageIdentity, Reason, TransactionEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The set of pending package operations.
///
/// Invariants:
/// - an (identity, mode) pair appears at most once
/// - every identity in the entry list has exactly one reason record
///
/// The store holds no locks. Wrap it in a mutex if it must be shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PlannedPackage>", into = "Vec<PlannedPackage>")]
pub struct Transaction {
    entries: Vec<TransactionEntry>,
    reasons: HashMap<PackageIdentity, Reason>,
}

/// Flat record used to persist a transaction in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedPackage {
    /// Operation code
    pub mode: OperationMode,
    /// Why the package is in the transaction
    #[serde(default)]
    pub reason: Reason,
    /// The package
    pub package: PackageIdentity,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transaction holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a package operation.
    ///
    /// The pair is appended only if not already present. The reason for the
    /// identity is set either way, replacing any earlier one.
    pub fn add(&mut self, identity: PackageIdentity, mode: OperationMode, reason: Reason) {
        let present = self
            .entries
            .iter()
            .any(|e| e.identity == identity && e.mode == mode);

        if present {
            log::trace!("{identity} already queued for {mode}");
        } else {
            log::debug!("queue {identity} for {mode} ({reason})");
            self.entries.push(TransactionEntry {
                identity: identity.clone(),
                mode,
            });
        }

        self.reasons.insert(identity, reason);
    }

    /// Add a package operation requested by the user.
    pub fn add_requested(&mut self, identity: PackageIdentity, mode: OperationMode) {
        self.add(identity, mode, Reason::UserRequested);
    }

    /// Remove every entry for a package, whatever its mode.
    ///
    /// Returns whether anything was removed. Unknown packages are a no-op.
    pub fn remove(&mut self, identity: &PackageIdentity) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.identity != identity);
        let had_reason = self.reasons.remove(identity).is_some();

        let removed = self.entries.len() < before || had_reason;
        if removed {
            log::debug!("dropped {identity} from transaction");
        }
        removed
    }

    /// Replace the mode of a package, keeping its reason.
    ///
    /// Fails with [`Error::NotFound`] if the package was never added.
    pub fn change_mode(&mut self, identity: &PackageIdentity, mode: OperationMode) -> Result<()> {
        let reason = self
            .reasons
            .get(identity)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                identity: identity.to_string(),
            })?;

        self.remove(identity);
        self.add(identity.clone(), mode, reason);
        Ok(())
    }

    /// Mode of an entry whose identity matches the filter.
    ///
    /// With a filter matching more than one package, which match is reported
    /// is not guaranteed. Use [`IdentityFilter::exact`] for a definite answer.
    pub fn get_mode(&self, filter: &IdentityFilter) -> Option<&OperationMode> {
        self.entries
            .iter()
            .find(|e| filter.matches(&e.identity))
            .map(|e| &e.mode)
    }

    /// Why a package is in the transaction.
    pub fn reason(&self, identity: &PackageIdentity) -> Option<&Reason> {
        self.reasons.get(identity)
    }

    /// All entries in insertion order.
    pub fn dump(&self) -> &[TransactionEntry] {
        &self.entries
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionEntry> {
        self.entries.iter()
    }

    /// Drop everything, as after a commit or discard.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.reasons.clear();
    }

    /// Render the transaction, one line per entry.
    ///
    /// Entries are grouped as erase, install, upgrade, then anything else,
    /// and sorted by identity within each group:
    ///
    /// ```text
    /// [e] name.arch epoch:version-release - reason
    /// ```
    pub fn display(&self) -> String {
        let mut erased = Vec::new();
        let mut installed = Vec::new();
        let mut upgraded = Vec::new();
        let mut misc = Vec::new();

        for entry in &self.entries {
            match entry.mode {
                OperationMode::Erase => erased.push(entry),
                OperationMode::Install => installed.push(entry),
                OperationMode::Upgrade => upgraded.push(entry),
                OperationMode::Other(_) => misc.push(entry),
            }
        }

        let mut out = String::new();
        for group in [&mut erased, &mut installed, &mut upgraded, &mut misc] {
            group.sort_by(|a, b| a.identity.cmp(&b.identity));
            for entry in group.iter() {
                let reason = self
                    .reasons
                    .get(&entry.identity)
                    .map_or("", Reason::as_str);
                out.push_str(&format!(
                    "[{}] {} - {}\n",
                    entry.mode.tag(),
                    entry.identity,
                    reason
                ));
            }
        }
        out
    }

    /// Flatten into persistable records.
    pub fn planned(&self) -> Vec<PlannedPackage> {
        self.entries
            .iter()
            .map(|e| PlannedPackage {
                mode: e.mode.clone(),
                reason: self.reasons.get(&e.identity).cloned().unwrap_or_default(),
                package: e.identity.clone(),
            })
            .collect()
    }
}

impl From<Vec<PlannedPackage>> for Transaction {
    fn from(planned: Vec<PlannedPackage>) -> Self {
        let mut transaction = Self::new();
        for p in planned {
            transaction.add(p.package, p.mode, p.reason);
        }
        transaction
    }
}

impl From<Transaction> for Vec<PlannedPackage> {
    fn from(transaction: Transaction) -> Self {
        transaction.planned()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl<'a> IntoIterator for &'a Transaction {
    type Item = &'a TransactionEntry;
    type IntoIter = std::slice::Iter<'a, TransactionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
