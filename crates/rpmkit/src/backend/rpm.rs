//! System rpm database backend using `rpm -qa`.

use crate::backend::PackageDatabase;
use crate::error::{Error, Result};
use crate::types::{PackageHeader, PackageIdentity};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Query format: one tagged line per package and per metadata entry.
///
/// Array tags inside `[...]` expand to one line per element and to nothing
/// when the package has no such entries.
const QUERY_FORMAT: &str = "@pkg\t%{NAME}\t%{ARCH}\t%{EPOCH}\t%{VERSION}\t%{RELEASE}\n\
[@req\t%{REQUIRENAME}\n]\
[@prv\t%{PROVIDENAME}\n]\
[@file\t%{FILENAMES}\n]";

/// rpm's rendering of an absent tag.
const NONE_VALUE: &str = "(none)";

/// Backend that executes read-only `rpm` queries.
#[derive(Debug, Clone)]
pub struct RpmBackend {
    /// Path to the rpm executable
    rpm_path: String,
    /// Alternate installroot (`--root`)
    root: Option<PathBuf>,
    /// Alternate database directory (`--dbpath`)
    dbpath: Option<PathBuf>,
}

impl RpmBackend {
    /// Create a new RpmBackend.
    ///
    /// Returns an error if rpm is not installed.
    pub fn new() -> Result<Self> {
        let rpm_path = find_rpm()?;
        Ok(Self::with_executable(rpm_path))
    }

    /// Create a backend using a specific rpm executable.
    pub fn with_executable(rpm_path: impl Into<String>) -> Self {
        Self {
            rpm_path: rpm_path.into(),
            root: None,
            dbpath: None,
        }
    }

    /// Query packages installed under another root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Query a database in a non-default directory.
    pub fn with_dbpath(mut self, dbpath: impl Into<PathBuf>) -> Self {
        self.dbpath = Some(dbpath.into());
        self
    }

    /// Path of the rpm executable in use.
    pub fn executable(&self) -> &str {
        &self.rpm_path
    }

    /// Run an rpm command and return output.
    fn run_rpm(&self, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(&self.rpm_path);
        if let Some(root) = &self.root {
            cmd.arg("--root").arg(root);
        }
        if let Some(dbpath) = &self.dbpath {
            cmd.arg("--dbpath").arg(dbpath);
        }
        cmd.args(args);

        log::debug!("running {cmd:?}");
        cmd.output().map_err(|e| Error::DatabaseUnavailable {
            message: format!("failed to execute rpm: {e}"),
        })
    }
}

impl PackageDatabase for RpmBackend {
    fn is_available(&self) -> bool {
        self.run_rpm(&["--version"])
            .is_ok_and(|output| output.status.success())
    }

    fn query_installed(&self) -> Result<Vec<PackageHeader>> {
        let output = self.run_rpm(&["-qa", "--queryformat", QUERY_FORMAT])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_rpm_output(&stderr, output.status.code()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let headers = parse_query_output(&stdout)?;
        log::info!("queried {} installed packages", headers.len());
        Ok(headers)
    }
}

/// Find the rpm executable path.
fn find_rpm() -> Result<String> {
    let paths = ["/usr/bin/rpm", "/bin/rpm", "/usr/local/bin/rpm"];

    for path in &paths {
        if std::path::Path::new(path).exists() {
            return Ok((*path).to_string());
        }
    }

    which::which("rpm")
        .map(|path| path.to_string_lossy().into_owned())
        .map_err(|_| Error::RpmNotFound)
}

/// Parse the tagged output produced by [`QUERY_FORMAT`].
pub fn parse_query_output(output: &str) -> Result<Vec<PackageHeader>> {
    let mut headers = Vec::new();
    let mut current: Option<PackageHeader> = None;

    for (idx, line) in output.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some((tag, value)) = line.split_once('\t') else {
            log::debug!("skipping untagged rpm output line {line_no}: {line}");
            continue;
        };

        match tag {
            "@pkg" => {
                headers.extend(current.take());
                let fields: Vec<&str> = value.split('\t').collect();
                let [name, arch, epoch, version, release] = fields.as_slice() else {
                    return Err(Error::QueryParse {
                        line: line_no,
                        message: format!("expected 5 package fields, found {}", fields.len()),
                    });
                };
                current = Some(PackageHeader::new(PackageIdentity::new(
                    *name, *arch, *epoch, *version, *release,
                )));
            }
            "@req" | "@prv" | "@file" => {
                let Some(header) = current.as_mut() else {
                    return Err(Error::QueryParse {
                        line: line_no,
                        message: format!("{tag} entry before any package"),
                    });
                };
                if value.is_empty() || value == NONE_VALUE {
                    continue;
                }
                let list = match tag {
                    "@req" => &mut header.requires,
                    "@prv" => &mut header.provides,
                    _ => &mut header.files,
                };
                list.push(value.to_string());
            }
            _ => log::debug!("skipping unknown rpm output tag {tag} at line {line_no}"),
        }
    }

    headers.extend(current);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
@pkg\tbash\tx86_64\t(none)\t5.2.26\t3.fc40
@req\t/bin/sh
@req\tlibc.so.6()(64bit)
@req\tlibtinfo.so.6()(64bit)
@prv\tbash
@prv\tbash(x86-64)
@file\t/usr/bin/bash
@file\t/usr/bin/sh
@pkg\tgpg-pubkey\t(none)\t(none)\t8d5a5a07\t5a94e39c
@pkg\tvim-enhanced\tx86_64\t2\t9.1.083\t1.fc40
@req\t(none)
@prv\tvim
@file\t/usr/share/doc/vim enhanced/README
";

    #[test]
    fn test_parse_query_output() {
        let headers = parse_query_output(SAMPLE).unwrap();
        assert_eq!(headers.len(), 3);

        let bash = &headers[0];
        assert_eq!(bash.identity.name(), "bash");
        assert_eq!(bash.identity.epoch(), "0");
        assert_eq!(bash.requires.len(), 3);
        assert_eq!(bash.provides, vec!["bash", "bash(x86-64)"]);
        assert_eq!(bash.files, vec!["/usr/bin/bash", "/usr/bin/sh"]);

        let pubkey = &headers[1];
        assert_eq!(pubkey.identity.arch(), "(none)");
        assert!(pubkey.requires.is_empty());
        assert!(pubkey.files.is_empty());

        let vim = &headers[2];
        assert_eq!(vim.identity.epoch(), "2");
        assert!(vim.requires.is_empty());
        assert_eq!(vim.files, vec!["/usr/share/doc/vim enhanced/README"]);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_query_output("").unwrap().is_empty());
        assert!(parse_query_output("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_short_package_line() {
        let err = parse_query_output("@pkg\tbash\tx86_64\n").unwrap_err();
        assert!(matches!(err, Error::QueryParse { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_orphaned_metadata() {
        let err = parse_query_output("\n@req\tlibc.so.6\n").unwrap_err();
        assert!(matches!(err, Error::QueryParse { line: 2, .. }));
    }

    #[test]
    fn test_parse_skips_noise() {
        let output = "warning: something odd\n@pkg\ta\tnoarch\t0\t1\t1\n@xyz\tignored\n";
        let headers = parse_query_output(output).unwrap();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].requires.is_empty());
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let backend = RpmBackend::with_executable("/nonexistent/rpm-binary")
            .with_root("/mnt/sysimage")
            .with_dbpath("/var/lib/rpm");
        assert!(!backend.is_available());
        let err = backend.query_installed().unwrap_err();
        assert!(matches!(err, Error::DatabaseUnavailable { .. }));
    }

    #[test]
    fn test_find_rpm_returns_existing_path_or_not_found() {
        match find_rpm() {
            Ok(path) => assert!(std::path::Path::new(&path).is_file()),
            Err(err) => assert!(matches!(err, Error::RpmNotFound)),
        }
    }
}
