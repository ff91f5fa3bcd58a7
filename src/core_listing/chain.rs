use crate::core_listing::dos::parse_dir_line;
use crate::core_listing::entry::Entry;
use crate::core_listing::error::ListParseError;
use crate::core_listing::hosted::parse_hosted_ftp_line;
use crate::core_listing::mlsd::parse_rfc3659_line;
use crate::core_listing::unix::parse_ls_line;
use chrono::{DateTime, FixedOffset, Utc};

/// A listing-line parser: the line, the reference time used for year
/// inference, and the server's timezone.
pub type ListParser = fn(&str, DateTime<Utc>, FixedOffset) -> Result<Entry, ListParseError>;

/// The chain used for LIST output, most specific format first.
pub fn default_parsers() -> Vec<ListParser> {
    vec![
        parse_rfc3659_line as ListParser,
        parse_ls_line,
        parse_dir_line,
        parse_hosted_ftp_line,
    ]
}

/// Tries each parser in order. `UnsupportedLine` moves on to the next one;
/// a success or any other error ends the chain.
pub fn parse_with(
    parsers: &[ListParser],
    line: &str,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<Entry, ListParseError> {
    for parser in parsers {
        match parser(line, now, tz) {
            Err(e) if e.is_unsupported() => continue,
            outcome => return outcome,
        }
    }
    Err(ListParseError::UnsupportedLine)
}
