use crate::core_listing::entry::{Entry, EntryType};
use crate::core_listing::error::ListParseError;
use crate::core_listing::time::local_to_utc;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

// Both layouts render to 17 bytes: `01-02-06  03:04PM`, `2006-01-02  15:04`.
const DIR_TIME_FORMATS: [&str; 2] = ["%m-%d-%y  %I:%M%p", "%Y-%m-%d  %H:%M"];
const DIR_TIME_WIDTH: usize = 17;

/// Parses a line of MS-DOS `DIR` output, as sent by IIS:
/// `01-02-06  03:04PM   <DIR>          subdir`.
pub fn parse_dir_line(
    line: &str,
    _now: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<Entry, ListParseError> {
    if line.len() <= DIR_TIME_WIDTH {
        return Err(ListParseError::UnsupportedLine);
    }
    let (stamp, rest) = match (line.get(..DIR_TIME_WIDTH), line.get(DIR_TIME_WIDTH..)) {
        (Some(stamp), Some(rest)) => (stamp, rest),
        _ => return Err(ListParseError::UnsupportedLine),
    };

    let naive = DIR_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(stamp, format).ok())
        .ok_or(ListParseError::UnsupportedLine)?;

    let rest = rest.trim_start_matches(' ');
    let (entry_type, size, rest) = if let Some(rest) = rest.strip_prefix("<DIR>") {
        (EntryType::Folder, 0, rest)
    } else {
        let space = rest.find(' ').ok_or(ListParseError::UnsupportedLine)?;
        let size = rest[..space]
            .parse::<u64>()
            .map_err(|_| ListParseError::UnsupportedLine)?;
        (EntryType::File, size, &rest[space..])
    };

    let mut entry = Entry::new(rest.trim_start_matches(' '), entry_type);
    entry.size = size;
    entry.time = Some(local_to_utc(naive, tz)?);
    Ok(entry)
}
