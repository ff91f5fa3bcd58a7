use crate::constants::STATUS_OK;
use crate::core_control::FtpResult;
use crate::core_ftpcommand::FtpCommand;
use crate::session::Session;
use std::fmt;
use std::str::FromStr;

/// Representation type selected with `TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Ascii,
    Ebcdic,
    Image,
    /// Local byte size, in bits.
    Local(u8),
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCode::Ascii => f.write_str("A"),
            TypeCode::Ebcdic => f.write_str("E"),
            TypeCode::Image => f.write_str("I"),
            TypeCode::Local(size) => write!(f, "L {}", size),
        }
    }
}

impl FromStr for TypeCode {
    type Err = String;

    /// Accepts the `TYPE` argument forms: `A`, `E`, `I` and `L <bits>`.
    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = arg.split_whitespace().collect();
        let primary_type = parts.first().map(|s| s.to_uppercase()).unwrap_or_default();

        match primary_type.as_str() {
            "A" => Ok(TypeCode::Ascii),
            "E" => Ok(TypeCode::Ebcdic),
            "I" => Ok(TypeCode::Image),
            "L" => match parts.get(1) {
                Some(size) => size
                    .parse::<u8>()
                    .map(TypeCode::Local)
                    .map_err(|_| format!("Invalid byte size parameter: {}", size)),
                None => Err("Byte size parameter required for TYPE L".to_string()),
            },
            _ => Err(format!("Unknown representation type: {}", arg)),
        }
    }
}

impl Session {
    /// Sends `TYPE`; the server must answer 200.
    pub async fn set_type(&mut self, code: TypeCode) -> FtpResult<()> {
        self.cmd(STATUS_OK, FtpCommand::TYPE(code)).await?;
        Ok(())
    }
}
