use crate::core_listing::entry::{Entry, EntryType};
use crate::core_listing::error::ListParseError;
use crate::core_listing::time::parse_fact_timestamp;
use chrono::{DateTime, FixedOffset, Utc};

/// Parses an RFC 3659 fact line, e.g.
/// `modify=20230615120000;type=file;size=42; report.txt`.
///
/// Only `modify`, `type` and `size` are interpreted; other facts are
/// accepted and ignored.
pub fn parse_rfc3659_line(
    line: &str,
    _now: DateTime<Utc>,
    _tz: FixedOffset,
) -> Result<Entry, ListParseError> {
    // The first fact separator must come before the name separator.
    let space = match (line.find(';'), line.find(' ')) {
        (Some(semicolon), Some(space)) if semicolon < space => space,
        _ => return Err(ListParseError::UnsupportedLine),
    };

    let mut entry = Entry::new(&line[space + 1..], EntryType::File);

    let facts = &line[..space];
    let facts = facts.strip_suffix(';').unwrap_or(facts);

    for fact in facts.split(';') {
        let (key, value) = match fact.find('=') {
            Some(i) if i > 0 => (&fact[..i], &fact[i + 1..]),
            _ => return Err(ListParseError::UnsupportedLine),
        };

        match key.to_ascii_lowercase().as_str() {
            "modify" => {
                entry.time = Some(parse_fact_timestamp(value)?);
            }
            "type" => match value.to_ascii_lowercase().as_str() {
                "dir" | "cdir" | "pdir" => entry.entry_type = EntryType::Folder,
                "file" => entry.entry_type = EntryType::File,
                _ => {}
            },
            "size" => {
                if let Ok(size) = value.parse() {
                    entry.size = size;
                }
            }
            _ => {}
        }
    }

    Ok(entry)
}
