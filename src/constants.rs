// src/constants.rs

// Reply prefixes the client matches against. Matching is done on the text
// prefix, not on the numeric value.
pub const STATUS_OK: &str = "200";
pub const STATUS_SYSTEM_STATUS: &str = "211";
pub const STATUS_DIRECTORY_STATUS: &str = "212";
pub const STATUS_FILE_STATUS: &str = "213";
pub const STATUS_SYSTEM_TYPE: &str = "215";
pub const STATUS_CONNECTION_CLOSING: &str = "221";
pub const STATUS_CLOSING_DATA_CONNECTION: &str = "226";
pub const STATUS_PASSIVE_MODE: &str = "227";
pub const STATUS_LOGGED_IN: &str = "230";
pub const STATUS_AUTH_OK: &str = "234";
pub const STATUS_ACTION_OK: &str = "250";
pub const STATUS_PATH_CREATED: &str = "257";
pub const STATUS_USER_OK: &str = "331";
pub const STATUS_ACTION_PENDING: &str = "350";

pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_PASSIVE_TIMEOUT_SECS: u64 = 10;
pub const DATA_BUFFER_SIZE: usize = 64 * 1024;

pub const PASV_TUPLE_REGEX: &str = r"\((.*)\)";
pub const PWD_PATH_REGEX: &str = r#""(.*)""#;

// Fact timestamps as used by MLSD and MDTM, fractional seconds stripped.
pub const FACT_TIME_FORMAT: &str = "%Y%m%d%H%M%S";
