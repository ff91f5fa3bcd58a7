// Configuration TLS pour rouilleftp
use crate::core_tls::error::TlsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Upgrade the control channel with AUTH TLS after connecting
    pub enabled: bool,

    /// PEM bundle of trusted CAs; the platform store is used when absent
    pub ca_file: Option<PathBuf>,

    /// Name checked against the server certificate, defaults to the host
    pub server_name: Option<String>,

    /// Skip certificate verification (self-signed lab servers)
    pub accept_invalid_certs: bool,
}

impl TlsConfig {
    /// Checks that the configured CA bundle can be found.
    pub fn validate(&self) -> Result<(), TlsError> {
        if !self.enabled {
            return Ok(());
        }

        if let Some(ca_file) = &self.ca_file {
            if !ca_file.exists() {
                return Err(TlsError::CertificateLoadError(format!(
                    "CA file not found: {:?}",
                    ca_file
                )));
            }
        }

        Ok(())
    }

    /// The name presented in the handshake for a connection to `host`.
    pub fn server_name_for<'a>(&'a self, host: &'a str) -> &'a str {
        self.server_name.as_deref().unwrap_or(host)
    }
}
