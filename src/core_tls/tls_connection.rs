// Gestion des connexions TLS pour rouilleftp
use crate::core_tls::error::TlsError;
use crate::core_tls::tls_config::TlsConfig;
use log::{debug, warn};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, ClientConfig, RootCertStore, ServerName};
use tokio_rustls::TlsConnector;

/// Client side of FTPS: one connector shared by the control channel and
/// every data channel of a session, so resumption tickets carry over.
#[derive(Clone)]
pub struct TlsConnection {
    connector: TlsConnector,
    server_name: ServerName,
}

impl TlsConnection {
    /// Builds a connector for `host` from the user's TLS configuration.
    pub fn new(config: &TlsConfig, host: &str) -> Result<Self, TlsError> {
        config.validate()?;

        let client_config = if config.accept_invalid_certs {
            warn!("Certificate verification disabled for {}", host);
            ClientConfig::builder()
                .with_safe_defaults()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
                .with_no_client_auth()
        } else {
            ClientConfig::builder()
                .with_safe_defaults()
                .with_root_certificates(load_root_store(config)?)
                .with_no_client_auth()
        };

        Self::from_client_config(Arc::new(client_config), config.server_name_for(host))
    }

    /// Wraps an already built rustls configuration.
    pub fn from_client_config(
        client_config: Arc<ClientConfig>,
        server_name: &str,
    ) -> Result<Self, TlsError> {
        let server_name = ServerName::try_from(server_name)
            .map_err(|e| TlsError::InvalidServerName(format!("{}: {}", server_name, e)))?;

        Ok(Self {
            connector: TlsConnector::from(client_config),
            server_name,
        })
    }

    pub fn server_name(&self) -> &ServerName {
        &self.server_name
    }

    /// Runs the client handshake on `stream`.
    pub async fn connect(&self, stream: TcpStream) -> Result<TlsStream<TcpStream>, TlsError> {
        match self
            .connector
            .connect(self.server_name.clone(), stream)
            .await
        {
            Ok(tls_stream) => Ok(tls_stream),
            Err(e) => Err(TlsError::TlsHandshakeError(e.to_string())),
        }
    }
}

fn load_root_store(config: &TlsConfig) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();

    match &config.ca_file {
        Some(ca_file) => {
            let pem = match std::fs::read(ca_file) {
                Ok(p) => p,
                Err(e) => {
                    return Err(TlsError::CertificateLoadError(format!(
                        "{}: {}",
                        ca_file.display(),
                        e
                    )))
                }
            };

            let certs = match rustls_pemfile::certs(&mut &pem[..]) {
                Ok(c) => c,
                Err(e) => return Err(TlsError::CertificateLoadError(e.to_string())),
            };

            let (added, ignored) = roots.add_parsable_certificates(&certs);
            debug!(
                "Loaded {} CA certificates from {:?} ({} ignored)",
                added, ca_file, ignored
            );
            if added == 0 {
                return Err(TlsError::CertificateLoadError(format!(
                    "No usable certificate in {}",
                    ca_file.display()
                )));
            }
        }
        None => {
            let native = rustls_native_certs::load_native_certs()
                .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
            for cert in native {
                if let Err(e) = roots.add(&Certificate(cert.0)) {
                    debug!("Skipping platform certificate: {}", e);
                }
            }
            if roots.is_empty() {
                return Err(TlsError::CertificateLoadError(
                    "Platform certificate store is empty".to_string(),
                ));
            }
        }
    }

    Ok(roots)
}

struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}
