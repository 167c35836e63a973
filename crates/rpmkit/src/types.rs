//! Core types for transaction bookkeeping and package headers.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Epoch value used when a package declares none.
pub const DEFAULT_EPOCH: &str = "0";

/// Normalize an epoch string: absent, empty and `(none)` all mean `0`.
///
/// The value is otherwise kept verbatim; epochs are compared as strings.
pub fn normalize_epoch(epoch: &str) -> String {
    let epoch = epoch.trim();
    if epoch.is_empty() || epoch == "(none)" {
        DEFAULT_EPOCH.to_string()
    } else {
        epoch.to_string()
    }
}

/// Identity of one package build: name, arch, epoch, version, release.
///
/// Ordering is lexicographic over the five fields in that order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageIdentity {
    name: String,
    arch: String,
    #[serde(default = "default_epoch", deserialize_with = "deserialize_epoch")]
    epoch: String,
    version: String,
    release: String,
}

fn default_epoch() -> String {
    DEFAULT_EPOCH.to_string()
}

fn deserialize_epoch<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Epoch {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<Epoch>::deserialize(deserializer)? {
        Some(Epoch::Text(s)) => normalize_epoch(&s),
        Some(Epoch::Number(n)) => n.to_string(),
        None => default_epoch(),
    })
}

impl PackageIdentity {
    /// Create a new identity. The epoch is normalized.
    pub fn new(
        name: impl Into<String>,
        arch: impl Into<String>,
        epoch: impl AsRef<str>,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arch: arch.into(),
            epoch: normalize_epoch(epoch.as_ref()),
            version: version.into(),
            release: release.into(),
        }
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Architecture.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Normalized epoch.
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Upstream version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Release.
    pub fn release(&self) -> &str {
        &self.release
    }

    /// `epoch:version-release`, with the epoch left out when it is `0`.
    pub fn version_string(&self) -> String {
        if self.epoch == DEFAULT_EPOCH {
            format!("{}-{}", self.version, self.release)
        } else {
            format!("{}:{}-{}", self.epoch, self.version, self.release)
        }
    }

    /// `name-[epoch:]version-release.arch`, the inverse of [`FromStr`].
    pub fn nevra(&self) -> String {
        format!("{}-{}.{}", self.name, self.version_string(), self.arch)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {}:{}-{}",
            self.name, self.arch, self.epoch, self.version, self.release
        )
    }
}

impl FromStr for PackageIdentity {
    type Err = Error;

    /// Parse `name-[epoch:]version-release.arch`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidIdentity {
            input: s.to_string(),
        };

        let s = s.trim();
        let (rest, arch) = s.rsplit_once('.').ok_or_else(invalid)?;
        let (rest, release) = rest.rsplit_once('-').ok_or_else(invalid)?;
        let (name, evr) = rest.rsplit_once('-').ok_or_else(invalid)?;
        let (epoch, version) = evr.split_once(':').unwrap_or((DEFAULT_EPOCH, evr));

        if [name, arch, epoch, version, release]
            .iter()
            .any(|part| part.is_empty())
        {
            return Err(invalid());
        }

        Ok(Self::new(name, arch, epoch, version, release))
    }
}

/// A partial identity used to look packages up.
///
/// Unset fields act as wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFilter {
    /// Package name
    pub name: Option<String>,
    /// Architecture
    pub arch: Option<String>,
    /// Epoch (normalized before comparison)
    pub epoch: Option<String>,
    /// Version
    pub version: Option<String>,
    /// Release
    pub release: Option<String>,
}

impl IdentityFilter {
    /// A filter matching everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// A filter matching exactly one identity.
    pub fn exact(identity: &PackageIdentity) -> Self {
        Self {
            name: Some(identity.name.clone()),
            arch: Some(identity.arch.clone()),
            epoch: Some(identity.epoch.clone()),
            version: Some(identity.version.clone()),
            release: Some(identity.release.clone()),
        }
    }

    /// Restrict by name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict by architecture.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Restrict by epoch.
    pub fn with_epoch(mut self, epoch: impl Into<String>) -> Self {
        self.epoch = Some(epoch.into());
        self
    }

    /// Restrict by version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Restrict by release.
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Whether every field set on this filter equals the identity's field.
    pub fn matches(&self, identity: &PackageIdentity) -> bool {
        fn field_matches(wanted: Option<&str>, actual: &str) -> bool {
            wanted.is_none_or(|w| w == actual)
        }

        field_matches(self.name.as_deref(), &identity.name)
            && field_matches(self.arch.as_deref(), &identity.arch)
            && self
                .epoch
                .as_deref()
                .is_none_or(|e| normalize_epoch(e) == identity.epoch)
            && field_matches(self.version.as_deref(), &identity.version)
            && field_matches(self.release.as_deref(), &identity.release)
    }
}

/// What the transaction will do with a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationMode {
    /// Install a package that is not present
    Install,
    /// Upgrade an installed package
    Upgrade,
    /// Erase an installed package
    Erase,
    /// Unrecognized mode code, kept as given
    Other(String),
}

impl OperationMode {
    /// Parse a mode code (`i`, `u`, `e`, or the long names).
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "i" | "install" => OperationMode::Install,
            "u" | "upgrade" | "update" => OperationMode::Upgrade,
            "e" | "erase" | "remove" => OperationMode::Erase,
            _ => OperationMode::Other(code.trim().to_string()),
        }
    }

    /// Code stored in transaction state.
    pub fn code(&self) -> &str {
        match self {
            OperationMode::Install => "i",
            OperationMode::Upgrade => "u",
            OperationMode::Erase => "e",
            OperationMode::Other(code) => code,
        }
    }

    /// Tag shown between brackets in transaction listings.
    ///
    /// Unrecognized modes render as `?` followed by their code, so they
    /// never show a known tag and stay distinct from each other.
    pub fn tag(&self) -> String {
        match self {
            OperationMode::Other(code) => format!("?{code}"),
            known => known.code().to_string(),
        }
    }
}

impl From<String> for OperationMode {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<OperationMode> for String {
    fn from(mode: OperationMode) -> Self {
        mode.code().to_string()
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::Install => write!(f, "install"),
            OperationMode::Upgrade => write!(f, "upgrade"),
            OperationMode::Erase => write!(f, "erase"),
            OperationMode::Other(code) => write!(f, "other ({code})"),
        }
    }
}

/// Why a package is part of the transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Reason {
    /// Requested by the user
    #[default]
    UserRequested,
    /// Pulled in to satisfy a dependency
    DependencyPulled,
    /// Any other recorded reason
    Other(String),
}

impl Reason {
    /// Short form used in listings and state files.
    pub fn as_str(&self) -> &str {
        match self {
            Reason::UserRequested => "user",
            Reason::DependencyPulled => "dep",
            Reason::Other(text) => text,
        }
    }
}

impl From<String> for Reason {
    fn from(text: String) -> Self {
        match text.as_str() {
            "user" => Reason::UserRequested,
            "dep" => Reason::DependencyPulled,
            _ => Reason::Other(text),
        }
    }
}

impl From<Reason> for String {
    fn from(reason: Reason) -> Self {
        reason.as_str().to_string()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pending operation: a package and what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionEntry {
    /// The package
    pub identity: PackageIdentity,
    /// The operation
    pub mode: OperationMode,
}

/// Installed-package metadata as returned by a package database query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageHeader {
    /// Package identity
    #[serde(flatten)]
    pub identity: PackageIdentity,
    /// Required capability names and file paths
    #[serde(default, deserialize_with = "nullable_list")]
    pub requires: Vec<String>,
    /// Provided capability names
    #[serde(default, deserialize_with = "nullable_list")]
    pub provides: Vec<String>,
    /// Owned file paths
    #[serde(default, deserialize_with = "nullable_list")]
    pub files: Vec<String>,
}

/// Missing metadata lists are valid: `null` reads as empty.
fn nullable_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PackageHeader {
    /// Create a header with no metadata lists.
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            requires: Vec::new(),
            provides: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Add required names.
    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(requires.into_iter().map(Into::into));
        self
    }

    /// Add provided capabilities.
    pub fn with_provides<I, S>(mut self, provides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provides.extend(provides.into_iter().map(Into::into));
        self
    }

    /// Add owned files.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }
}
