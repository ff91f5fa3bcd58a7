use crate::core_listing::entry::Entry;
use crate::core_listing::error::ListParseError;
use crate::core_listing::scanner::Scanner;
use crate::core_listing::unix::parse_ls_line;
use chrono::{DateTime, FixedOffset, Utc};

/// hostedftp.com sends `ls` lines with a link count of 0:
/// `-r--------   0 user group     65222236 Feb 24 00:39 report.csv`.
/// The line is rewritten with a link count of 1 and handed to the `ls` parser.
pub fn parse_hosted_ftp_line(
    line: &str,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<Entry, ListParseError> {
    if line.find(' ') != Some(10) {
        return Err(ListParseError::UnsupportedLine);
    }

    let mut scanner = Scanner::new(line);
    let fields = scanner.next_fields(2);
    if fields.len() < 2 || fields[1] != "0" {
        return Err(ListParseError::UnsupportedLine);
    }

    let rewritten = format!("{} 1 {}", fields[0], scanner.remaining());
    parse_ls_line(&rewritten, now, tz)
}
