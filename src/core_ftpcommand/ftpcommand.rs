use crate::core_ftpcommand::type_::TypeCode;
use std::fmt;

/// Commands the client sends on the control channel.
#[allow(clippy::upper_case_acronyms)]
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FtpCommand {
    USER(String),
    PASS(String),
    QUIT,
    PWD,
    CWD(String),
    CDUP,
    NOOP,
    MKD(String),
    RMD(String),
    DELE(String),
    RNFR(String),
    RNTO(String),
    RETR(String),
    STOR(String),
    REST(u64),
    PASV,
    LIST(String),
    MLSD(String),
    SYST,
    STAT(String),
    SIZE(String),
    MDTM(String),
    TYPE(TypeCode),
    AUTH(String),
    PBSZ(u64),
    PROT(String),
}

impl FtpCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            FtpCommand::USER(_) => "USER",
            FtpCommand::PASS(_) => "PASS",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::PWD => "PWD",
            FtpCommand::CWD(_) => "CWD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::NOOP => "NOOP",
            FtpCommand::MKD(_) => "MKD",
            FtpCommand::RMD(_) => "RMD",
            FtpCommand::DELE(_) => "DELE",
            FtpCommand::RNFR(_) => "RNFR",
            FtpCommand::RNTO(_) => "RNTO",
            FtpCommand::RETR(_) => "RETR",
            FtpCommand::STOR(_) => "STOR",
            FtpCommand::REST(_) => "REST",
            FtpCommand::PASV => "PASV",
            FtpCommand::LIST(_) => "LIST",
            FtpCommand::MLSD(_) => "MLSD",
            FtpCommand::SYST => "SYST",
            FtpCommand::STAT(_) => "STAT",
            FtpCommand::SIZE(_) => "SIZE",
            FtpCommand::MDTM(_) => "MDTM",
            FtpCommand::TYPE(_) => "TYPE",
            FtpCommand::AUTH(_) => "AUTH",
            FtpCommand::PBSZ(_) => "PBSZ",
            FtpCommand::PROT(_) => "PROT",
        }
    }

    fn argument(&self) -> Option<String> {
        match self {
            FtpCommand::USER(arg)
            | FtpCommand::PASS(arg)
            | FtpCommand::CWD(arg)
            | FtpCommand::MKD(arg)
            | FtpCommand::RMD(arg)
            | FtpCommand::DELE(arg)
            | FtpCommand::RNFR(arg)
            | FtpCommand::RNTO(arg)
            | FtpCommand::RETR(arg)
            | FtpCommand::STOR(arg)
            | FtpCommand::LIST(arg)
            | FtpCommand::MLSD(arg)
            | FtpCommand::STAT(arg)
            | FtpCommand::SIZE(arg)
            | FtpCommand::MDTM(arg)
            | FtpCommand::AUTH(arg)
            | FtpCommand::PROT(arg) => Some(arg.clone()),
            FtpCommand::REST(offset) | FtpCommand::PBSZ(offset) => Some(offset.to_string()),
            FtpCommand::TYPE(code) => Some(code.to_string()),
            FtpCommand::QUIT
            | FtpCommand::PWD
            | FtpCommand::CDUP
            | FtpCommand::NOOP
            | FtpCommand::PASV
            | FtpCommand::SYST => None,
        }
    }
}

/// The command line as sent on the wire, without the terminator. An empty
/// argument gives the bare verb (`LIST`, `MLSD`).
impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument() {
            Some(arg) if !arg.is_empty() => write!(f, "{} {}", self.verb(), arg),
            _ => f.write_str(self.verb()),
        }
    }
}
