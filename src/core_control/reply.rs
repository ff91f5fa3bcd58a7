use crate::core_control::error::{FtpError, FtpResult};

/// One reply unit read from the control channel.
///
/// The text is kept exactly as received, line terminators included, so a
/// multi-line reply is the concatenation of all its physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    text: String,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The three-digit status code, or an empty string for a short line.
    pub fn code(&self) -> &str {
        self.text.get(..3).unwrap_or("")
    }

    pub fn code_number(&self) -> Option<u16> {
        self.code().parse().ok()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.starts_with(prefix)
    }

    /// Positive preliminary reply (1xx): a data transfer is about to start.
    pub fn is_preliminary(&self) -> bool {
        self.text.starts_with('1')
    }

    /// Transient or permanent negative completion (4xx, 5xx).
    pub fn is_negative(&self) -> bool {
        self.text.starts_with('4') || self.text.starts_with('5')
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// First line without its code and separator.
    pub fn message(&self) -> &str {
        let first = self.lines().next().unwrap_or("");
        first.get(4..).unwrap_or("").trim()
    }

    /// Physical lines without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
    }

    /// Fails with the raw reply text unless it starts with `expects`.
    pub fn expect(self, expects: &str) -> FtpResult<Reply> {
        if self.starts_with(expects) {
            Ok(self)
        } else {
            Err(FtpError::UnexpectedReply(self.text))
        }
    }
}

/// A line whose fourth byte is `-` opens a multi-line reply.
pub fn is_continuation(line: &str) -> bool {
    line.len() >= 4 && line.as_bytes()[3] == b'-'
}

/// The `NNN ` marker closing the multi-line reply opened by `line`.
pub fn closing_marker(line: &str) -> String {
    format!("{} ", line.get(..3).unwrap_or(""))
}
