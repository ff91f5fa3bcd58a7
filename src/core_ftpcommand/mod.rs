// Session operations, one file per family of FTP commands
pub mod ftpcommand;
pub mod list;
pub mod transfer;
pub mod type_;
pub mod walk;

pub use ftpcommand::FtpCommand;
pub use type_::TypeCode;
