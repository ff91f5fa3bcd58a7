// Directory listing parsers: one per server dialect, tried in order by the chain.
pub mod chain;
pub mod dos;
pub mod entry;
pub mod error;
pub mod hosted;
pub mod mlsd;
pub mod scanner;
pub mod time;
pub mod unix;

pub use chain::{default_parsers, parse_with, ListParser};
pub use entry::{Entry, EntryType};
pub use error::ListParseError;
