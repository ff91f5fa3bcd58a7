use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    #[default]
    File,
    Folder,
    Link,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryType::File => "file",
            EntryType::Folder => "dir",
            EntryType::Link => "link",
        };
        f.write_str(name)
    }
}

/// One normalized line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub name: String,
    /// Link target, only for `Link` entries that carried one.
    pub target: Option<String>,
    pub entry_type: EntryType,
    /// Byte count; meaningful for files only.
    pub size: u64,
    pub time: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn new(name: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            entry_type,
            ..Self::default()
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_folder(&self) -> bool {
        self.entry_type == EntryType::Folder
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = match &self.time {
            Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
            None => "-".to_string(),
        };
        write!(f, "{:<4} {:>12} {} {}", self.entry_type, self.size, time, self.name)?;
        if let Some(target) = &self.target {
            write!(f, " -> {}", target)?;
        }
        Ok(())
    }
}
