use clap::{Parser, Subcommand};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleftp", about = "A FTP/FTPS client written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Server address, overrides the configuration (host:port or ftp[s]:// URL)
    #[arg(short, long)]
    pub address: Option<String>,

    /// User name, overrides the configuration
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password, overrides the configuration
    #[arg(short, long)]
    pub password: Option<String>,

    /// Trace every command and reply
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List a directory (MLSD, falling back to LIST)
    Ls {
        #[arg(default_value = "")]
        path: String,
        /// Print the lines as sent by the server
        #[arg(long)]
        raw: bool,
    },
    /// Send a command line as is and print the reply
    Raw {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Print every file below a directory
    Walk {
        #[arg(default_value = "")]
        path: String,
    },
    /// Download a file
    Get {
        remote: String,
        local: Option<String>,
        /// Start at this byte offset
        #[arg(long, default_value_t = 0, conflicts_with = "resume")]
        offset: u64,
        /// Continue from the size of the local file
        #[arg(long)]
        resume: bool,
        /// Stamp the local file with the remote modification time
        #[arg(long)]
        preserve_time: bool,
    },
    /// Upload a file
    Put {
        local: String,
        remote: Option<String>,
        /// Start at this byte offset, in both files
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Print the current directory
    Pwd,
    /// Create a directory
    Mkdir { path: String },
    /// Remove a directory
    Rmdir { path: String },
    /// Delete a file
    Rm { path: String },
    /// Rename a file or directory
    Mv { from: String, to: String },
    /// Print the size of a file
    Size { path: String },
    /// Print the modification time of a file
    Mdtm { path: String },
    /// Print the server status, or the status of a path
    Stat {
        #[arg(default_value = "")]
        path: String,
    },
    /// Print the server system type
    Syst,
}
