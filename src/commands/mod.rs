pub mod config;
pub mod leaves;
pub mod snapshot;
pub mod tx;

use anyhow::{Context as _, Result, bail};
use rpmkit::{Client, Snapshot};
use std::path::Path;

use crate::Context;

/// Open a client over a JSON snapshot, or over the configured rpm database.
pub fn open_client(ctx: &Context, snapshot: Option<&Path>) -> Result<Client> {
    match snapshot {
        Some(path) => {
            let snapshot = Snapshot::load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            Ok(Client::with_backend(Box::new(snapshot)))
        }
        None => {
            let backend = ctx.config.backend()?;
            let executable = backend.executable().to_string();
            let client = Client::with_backend(Box::new(backend));
            if !client.is_available() {
                bail!("rpm at {executable} cannot be run; set [rpm] path in the config");
            }
            Ok(client)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RpmConfig};
    use tempfile::TempDir;

    fn context(config: Config) -> Context {
        Context {
            quiet: true,
            config,
        }
    }

    #[test]
    fn test_open_client_rejects_unusable_rpm() {
        let ctx = context(Config {
            rpm: RpmConfig {
                path: Some("/nonexistent/bin/rpm".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        let err = open_client(&ctx, None).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/bin/rpm"));
    }

    #[test]
    fn test_open_client_from_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.json");
        Snapshot::default().save(&path).unwrap();

        let ctx = context(Config::default());
        let client = open_client(&ctx, Some(&path)).unwrap();
        assert!(client.is_available());
        assert!(client.leaves().unwrap().is_empty());
    }
}
