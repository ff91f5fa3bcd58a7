// Gestion des erreurs pour le module TLS (côté client)
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TlsError {
    #[error("Failed to load CA certificates: {0}")]
    CertificateLoadError(String),

    #[error("Invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshakeError(String),

    #[error("Control connection is already secured")]
    AlreadySecured,
}
