//! # Connection
//!
//! Opens the one [`Channel`] a tour process uses for all of its calls.
//!
//! When [`TlsSettings`] are present the CA certificate is read from disk and installed as
//! the only trust anchor; otherwise the connection is plaintext HTTP/2.
use std::{path::PathBuf, time::Duration};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

/// Address used when none is configured.
pub const DEFAULT_ADDRESS: &str = "localhost:50051";

/// Errors that can occur while establishing the channel.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Failed to read CA certificate '{path}': {source}")]
    CaCertificate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TLS configuration: {0}")]
    Tls(#[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
}

/// Trust settings for a TLS connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    /// PEM file holding the CA certificate(s) the server certificate must chain to.
    pub ca_certificate: PathBuf,
    /// Name to verify the server certificate against. Defaults to the host of the address.
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// `host:port`, or a full `http://` / `https://` URI.
    pub address: String,
    pub tls: Option<TlsSettings>,
    pub connect_timeout: Option<Duration>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            tls: None,
            connect_timeout: None,
        }
    }
}

impl ConnectionSettings {
    /// The URI the channel is built from, with the scheme matching the TLS setting.
    pub fn uri(&self) -> String {
        endpoint_uri(&self.address, self.tls.is_some())
    }

    /// Builds the endpoint without connecting. Reads the CA certificate if TLS is enabled.
    pub fn endpoint(&self) -> Result<Endpoint, ConnectError> {
        let uri = self.uri();
        let mut endpoint =
            Endpoint::new(uri.clone()).map_err(|e| ConnectError::InvalidUrl(uri, e))?;

        if let Some(tls) = &self.tls {
            endpoint = endpoint
                .tls_config(tls.client_config()?)
                .map_err(ConnectError::Tls)?;
        }

        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        Ok(endpoint)
    }
}

impl TlsSettings {
    /// The name the server certificate is verified against, if it overrides the host.
    ///
    /// A blank domain counts as unset.
    pub fn server_name(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.trim().is_empty())
    }

    fn client_config(&self) -> Result<ClientTlsConfig, ConnectError> {
        let pem = std::fs::read(&self.ca_certificate).map_err(|source| {
            ConnectError::CaCertificate {
                path: self.ca_certificate.clone(),
                source,
            }
        })?;

        let mut config = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem));

        if let Some(domain) = self.server_name() {
            config = config.domain_name(domain);
        }

        Ok(config)
    }
}

/// Connects to the server described by `settings`.
pub async fn connect(settings: &ConnectionSettings) -> Result<Channel, ConnectError> {
    let endpoint = settings.endpoint()?;

    tracing::debug!(uri = %settings.uri(), tls = settings.tls.is_some(), "connecting");

    endpoint
        .connect()
        .await
        .map_err(|e| ConnectError::ConnectionFailed(settings.uri(), e))
}

fn endpoint_uri(address: &str, tls: bool) -> String {
    let address = address.trim();

    match address.split_once("://") {
        Some(("http", rest)) if tls => format!("https://{rest}"),
        Some(_) => address.to_string(),
        None if tls => format!("https://{address}"),
        None => format!("http://{address}"),
    }
}
