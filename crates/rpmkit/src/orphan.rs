//! Leaf (orphan) package detection.
//!
//! A package is a leaf when no installed package requires its name, any
//! capability it provides, or any file it owns. A package requiring its own
//! capability keeps itself installed. Matching is plain string equality
//! between requires entries and those names; version constraints are not
//! considered.

use crate::backend::PackageDatabase;
use crate::error::Result;
use crate::types::{PackageHeader, PackageIdentity};
use std::collections::{BTreeSet, HashMap};

/// Index from required names to a package requiring them.
#[derive(Debug, Clone, Default)]
pub struct RequirementIndex {
    required: HashMap<String, PackageIdentity>,
}

impl RequirementIndex {
    /// Build the index from installed package headers.
    ///
    /// Headers without requirements contribute nothing. When several
    /// packages require the same name, the last one in database order is
    /// remembered.
    pub fn build(headers: &[PackageHeader]) -> Self {
        let mut required = HashMap::new();

        for header in headers {
            for name in &header.requires {
                required.insert(name.clone(), header.identity.clone());
            }
        }

        log::debug!(
            "requirement index: {} names from {} packages",
            required.len(),
            headers.len()
        );
        Self { required }
    }

    /// Number of distinct required names.
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// Whether no package requires anything.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Whether any installed package requires `name`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains_key(name)
    }

    /// A package requiring `name`, for diagnostics only.
    pub fn requirer(&self, name: &str) -> Option<&PackageIdentity> {
        self.required.get(name)
    }
}

/// Find leaf packages in a set of installed headers.
pub fn leaves(headers: &[PackageHeader]) -> BTreeSet<PackageIdentity> {
    let index = RequirementIndex::build(headers);

    let leaves: BTreeSet<PackageIdentity> = headers
        .iter()
        .filter(|header| {
            let needed = std::iter::once(header.identity.name())
                .chain(header.provides.iter().map(String::as_str))
                .chain(header.files.iter().map(String::as_str))
                .find(|name| index.is_required(name));
            if let Some(name) = needed {
                log::trace!(
                    "{} kept by {name} (required by {:?})",
                    header.identity,
                    index.requirer(name).map(ToString::to_string)
                );
            }
            needed.is_none()
        })
        .map(|header| header.identity.clone())
        .collect();

    log::debug!("{} of {} packages are leaves", leaves.len(), headers.len());
    leaves
}

/// Query the installed packages and return those nothing requires.
///
/// The database is queried once and both passes run over that result.
/// Query errors propagate unchanged.
pub fn find_orphans(db: &dyn PackageDatabase) -> Result<BTreeSet<PackageIdentity>> {
    let headers = db.query_installed()?;
    Ok(leaves(&headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::snapshot::Snapshot;
    use crate::error::Error;

    fn id(name: &str) -> PackageIdentity {
        PackageIdentity::new(name, "x86_64", "0", "1.0", "1")
    }

    fn header(name: &str) -> PackageHeader {
        PackageHeader::new(id(name))
    }

    struct BrokenDatabase;

    impl PackageDatabase for BrokenDatabase {
        fn is_available(&self) -> bool {
            false
        }

        fn query_installed(&self) -> Result<Vec<PackageHeader>> {
            Err(Error::DatabaseUnavailable {
                message: "rpmdb locked".to_string(),
            })
        }
    }

    #[test]
    fn test_required_package_is_not_a_leaf() {
        let headers = vec![
            header("a").with_provides(["liba"]),
            header("b").with_requires(["liba"]).with_provides(["libb"]),
        ];
        let result = leaves(&headers);
        assert_eq!(result, BTreeSet::from([id("b")]));
    }

    #[test]
    fn test_empty_database() {
        let db = Snapshot::default();
        assert!(find_orphans(&db).unwrap().is_empty());
    }

    #[test]
    fn test_bare_package_is_a_leaf() {
        let headers = vec![
            header("a").with_provides(["liba"]),
            header("b").with_requires(["liba"]),
            header("c"),
        ];
        let result = leaves(&headers);
        assert!(result.contains(&id("c")));
        assert!(!result.contains(&id("a")));
    }

    #[test]
    fn test_required_by_name_or_file() {
        let headers = vec![
            header("bash").with_files(["/usr/bin/bash", "/usr/bin/sh"]),
            header("coreutils"),
            header("scripts").with_requires(["/usr/bin/sh", "coreutils"]),
        ];
        let result = leaves(&headers);
        assert_eq!(result, BTreeSet::from([id("scripts")]));
    }

    #[test]
    fn test_self_requirement_keeps_package() {
        let headers = vec![
            header("libfoo")
                .with_provides(["libfoo.so.1()(64bit)"])
                .with_requires(["libfoo.so.1()(64bit)"]),
        ];
        let index = RequirementIndex::build(&headers);
        assert!(index.is_required("libfoo.so.1()(64bit)"));
        assert!(leaves(&headers).is_empty());
    }

    #[test]
    fn test_required_by_name() {
        let headers = vec![header("perl-libs"), header("perl").with_requires(["perl-libs"])];
        assert_eq!(leaves(&headers), BTreeSet::from([id("perl")]));
    }

    #[test]
    fn test_index_attribution_keeps_last_writer() {
        let headers = vec![
            header("x").with_requires(["libc.so.6"]),
            header("y").with_requires(["libc.so.6"]),
        ];
        let index = RequirementIndex::build(&headers);
        assert_eq!(index.len(), 1);
        assert!(index.is_required("libc.so.6"));
        assert_eq!(index.requirer("libc.so.6"), Some(&id("y")));
        assert!(!index.is_required("libm.so.6"));
        assert!(index.requirer("libm.so.6").is_none());
    }

    #[test]
    fn test_find_orphans_uses_database() {
        let db = Snapshot::from_headers(vec![
            header("a").with_provides(["liba"]),
            header("b").with_requires(["liba"]),
        ]);
        assert_eq!(find_orphans(&db).unwrap(), BTreeSet::from([id("b")]));
    }

    #[test]
    fn test_database_error_propagates() {
        let err = find_orphans(&BrokenDatabase).unwrap_err();
        assert!(matches!(err, Error::DatabaseUnavailable { .. }));
    }
}
