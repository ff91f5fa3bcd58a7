// Control channel: command framing, reply parsing and the error type shared by every session call.
pub mod control;
pub mod error;
pub mod reply;

pub use control::ControlChannel;
pub use error::{FtpError, FtpResult};
pub use reply::Reply;
