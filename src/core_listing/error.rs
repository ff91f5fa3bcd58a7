// Erreurs d'analyse des lignes de listing
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListParseError {
    /// The line does not have this parser's shape. The chain moves on.
    #[error("Unsupported LIST line")]
    UnsupportedLine,

    #[error("Unknown entry type: {0:?}")]
    UnknownEntryType(char),

    #[error("Unsupported LIST date: {0}")]
    UnsupportedDate(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

impl ListParseError {
    /// Whether the next parser of the chain may still try the line.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ListParseError::UnsupportedLine)
    }
}
