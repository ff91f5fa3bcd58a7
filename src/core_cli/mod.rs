pub mod cli;
pub mod run;

pub use cli::{Cli, Command};
