pub mod config;
pub mod constants;
pub mod core_control;
pub mod core_ftpcommand;
pub mod core_listing;
pub mod core_network;
pub mod core_tls;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use core_control::{FtpError, FtpResult, Reply};
pub use core_ftpcommand::TypeCode;
pub use core_listing::{Entry, EntryType, ListParseError, ListParser};
pub use core_tls::{TlsConfig, TlsConnection, TlsError};
pub use session::Session;
