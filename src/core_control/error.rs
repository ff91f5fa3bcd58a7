// Errors surfaced by the control channel and every session command.
use crate::core_tls::TlsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    /// The reply did not carry the status the command requires. Holds the
    /// raw reply text.
    #[error("{}", .0.trim_end())]
    UnexpectedReply(String),

    #[error("Malformed passive mode reply: {}", .0.trim_end())]
    PassiveReply(String),

    #[error("Passive mode negotiation timed out")]
    PassiveTimeout,

    /// End of stream in the middle of a multi-line reply. Holds what was read.
    #[error("Reply truncated by end of stream: {}", .0.trim_end())]
    TruncatedReply(String),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Control connection is not open")]
    NotConnected,

    #[error("Invalid number in reply: {0}")]
    InvalidNumber(String),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type FtpResult<T> = Result<T, FtpError>;

impl FtpError {
    /// The raw server text carried by the error, if any.
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            FtpError::UnexpectedReply(text)
            | FtpError::PassiveReply(text)
            | FtpError::TruncatedReply(text) => Some(text),
            _ => None,
        }
    }
}
