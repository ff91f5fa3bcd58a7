use crate::constants::{PASV_TUPLE_REGEX, STATUS_PASSIVE_MODE};
use crate::core_control::{FtpError, FtpResult};
use crate::core_ftpcommand::FtpCommand;
use crate::session::Session;
use lazy_static::lazy_static;
use log::{debug, error};
use regex::Regex;
use tokio::time::timeout;

lazy_static! {
    static ref PASV_TUPLE: Regex = Regex::new(PASV_TUPLE_REGEX).unwrap();
}

/// Extracts the data port from a `227` reply.
///
/// The reply carries `(h1,h2,h3,h4,p1,p2)`; the host octets are ignored
/// and the port is `p1 * 256 + p2`.
pub fn parse_pasv_port(reply: &str) -> FtpResult<u16> {
    let malformed = || FtpError::PassiveReply(reply.to_string());

    let tuple = PASV_TUPLE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .ok_or_else(malformed)?;

    let numbers = tuple
        .as_str()
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| malformed())?;

    if numbers.len() != 6 {
        return Err(malformed());
    }

    Ok((u16::from(numbers[4]) << 8) | u16::from(numbers[5]))
}

impl Session {
    /// Sends PASV and returns the port the server listens on.
    ///
    /// The exchange is bounded by the session's passive timeout. When the
    /// bound expires the control connection is dropped: the session is
    /// unusable afterwards and every call fails with `NotConnected`.
    pub(crate) async fn negotiate_passive(&mut self) -> FtpResult<u16> {
        let limit = self.passive_timeout;
        let control = self.control()?;

        let command = FtpCommand::PASV.to_string();
        let outcome = timeout(limit, control.cmd(STATUS_PASSIVE_MODE, &command)).await;

        match outcome {
            Ok(reply) => {
                let reply = reply?;
                let port = parse_pasv_port(reply.text())?;
                debug!("Passive mode negotiated, data port {}", port);
                Ok(port)
            }
            Err(_) => {
                error!(
                    "No PASV reply from {} within {:?}, closing control connection",
                    self.addr, limit
                );
                self.control = None;
                Err(FtpError::PassiveTimeout)
            }
        }
    }
}
