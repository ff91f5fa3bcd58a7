// Module de support SSL/TLS pour rouilleftp
// AUTH TLS sur le canal de contrôle, puis chaque canal de données

pub mod error;
pub mod tls_config;
pub mod tls_connection;
pub mod upgrade;

pub use error::TlsError;
pub use tls_config::TlsConfig;
pub use tls_connection::TlsConnection;
