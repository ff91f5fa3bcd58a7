use crate::core_listing::entry::{Entry, EntryType};
use crate::core_listing::error::ListParseError;
use crate::core_listing::scanner::Scanner;
use crate::core_listing::time::parse_ls_time;
use chrono::{DateTime, FixedOffset, Utc};

fn parse_size(field: &str) -> Result<u64, ListParseError> {
    field
        .parse()
        .map_err(|_| ListParseError::InvalidSize(field.to_string()))
}

/// Parses a line shaped like `ls -l` output.
///
/// Besides the usual eight fields, two server quirks are recognized:
/// `d--------- folder 0 Mon DD HH:MM name` and a zero link count followed
/// directly by the size.
pub fn parse_ls_line(
    line: &str,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<Entry, ListParseError> {
    // Permissions are exactly 10 bytes, or 11 with a trailing ACL marker.
    match line.find(' ') {
        Some(10) => {}
        Some(11) if line.as_bytes()[10] == b'+' => {}
        _ => return Err(ListParseError::UnsupportedLine),
    }

    let mut scanner = Scanner::new(line);
    let mut fields = scanner.next_fields(6);
    if fields.len() < 6 {
        return Err(ListParseError::UnsupportedLine);
    }

    if fields[1] == "folder" && fields[2] == "0" {
        let mut entry = Entry::new(scanner.remaining(), EntryType::Folder);
        entry.time = Some(parse_ls_time(fields[3], fields[4], fields[5], now, tz)?);
        return Ok(entry);
    }

    if fields[1] == "0" {
        fields.push(scanner.next_field());
        let mut entry = Entry::new(scanner.remaining(), EntryType::File);
        entry.size = parse_size(fields[2]).map_err(|_| ListParseError::UnsupportedLine)?;
        entry.time = Some(parse_ls_time(fields[4], fields[5], fields[6], now, tz)?);
        return Ok(entry);
    }

    fields.extend(scanner.next_fields(2));
    if fields.len() < 8 {
        return Err(ListParseError::UnsupportedLine);
    }

    let mut entry = Entry::new(scanner.remaining(), EntryType::File);
    match fields[0].chars().next() {
        Some('-') => {
            entry.size = parse_size(fields[4])?;
        }
        Some('d') => entry.entry_type = EntryType::Folder,
        Some('l') => {
            entry.entry_type = EntryType::Link;
            if let Some(i) = entry.name.find(" -> ") {
                if i > 0 {
                    entry.target = Some(entry.name[i + 4..].to_string());
                    entry.name.truncate(i);
                }
            }
        }
        Some(other) => return Err(ListParseError::UnknownEntryType(other)),
        None => return Err(ListParseError::UnsupportedLine),
    }

    entry.time = Some(parse_ls_time(fields[5], fields[6], fields[7], now, tz)?);
    Ok(entry)
}
