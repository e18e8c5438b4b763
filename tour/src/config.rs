use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use tour_core::connection::{ConnectionSettings, DEFAULT_ADDRESS, TlsSettings};

/// Connection options, as read from the `--config` file or collected from CLI flags.
///
/// A relative `ca_cert` in the file is resolved against the file's directory; on the command
/// line it is relative to the working directory.
///
/// ```json
/// { "address": "localhost:50051", "ca_cert": "ssl/ca_cert.pem", "connect_timeout_ms": 3000 }
/// ```
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub address: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub tls_domain: Option<String>,
    pub connect_timeout_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file '{}'", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;

        Ok(match path.parent() {
            Some(dir) => config.relative_to(dir),
            None => config,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Anchors a relative `ca_cert` at `dir`.
    pub fn relative_to(mut self, dir: &Path) -> Self {
        self.ca_cert = self.ca_cert.map(|ca_cert| dir.join(ca_cert));
        self
    }

    /// Options set in `overrides` win over the ones in `self`.
    pub fn merge(self, overrides: FileConfig) -> Self {
        Self {
            address: overrides.address.or(self.address),
            ca_cert: overrides.ca_cert.or(self.ca_cert),
            tls_domain: overrides.tls_domain.or(self.tls_domain),
            connect_timeout_ms: overrides.connect_timeout_ms.or(self.connect_timeout_ms),
        }
    }

    pub fn into_settings(self) -> ConnectionSettings {
        ConnectionSettings {
            address: self.address.unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            tls: self.ca_cert.map(|ca_certificate| TlsSettings {
                ca_certificate,
                domain: self.tls_domain,
            }),
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
        }
    }
}

impl From<&Cli> for FileConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            address: cli.addr.clone(),
            ca_cert: cli.ca_cert.clone(),
            tls_domain: cli.tls_domain.clone(),
            connect_timeout_ms: cli.connect_timeout_ms,
        }
    }
}

/// Resolves the connection settings: CLI flags, then the config file, then defaults.
pub fn resolve(cli: &Cli) -> Result<ConnectionSettings> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    Ok(file.merge(FileConfig::from(cli)).into_settings())
}
