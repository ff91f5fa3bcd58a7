use crate::constants::{
    DEFAULT_PASSIVE_TIMEOUT_SECS, PWD_PATH_REGEX, STATUS_ACTION_OK, STATUS_ACTION_PENDING,
    STATUS_CONNECTION_CLOSING, STATUS_DIRECTORY_STATUS, STATUS_FILE_STATUS, STATUS_LOGGED_IN,
    STATUS_OK, STATUS_PATH_CREATED, STATUS_SYSTEM_STATUS, STATUS_SYSTEM_TYPE, STATUS_USER_OK,
};
use crate::core_control::{ControlChannel, FtpError, FtpResult, Reply};
use crate::core_ftpcommand::FtpCommand;
use crate::core_listing::time::parse_fact_timestamp;
use crate::core_listing::{default_parsers, ListParser};
use crate::core_network::FtpStream;
use crate::core_tls::TlsConnection;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

lazy_static! {
    static ref PWD_PATH: Regex = Regex::new(PWD_PATH_REGEX).unwrap();
}

/// A client session with one FTP server.
///
/// Owns the control connection; every operation takes `&mut self`, so one
/// command/reply exchange is in flight at a time. Once the control
/// connection is lost (PASV timeout, failed TLS upgrade, `quit`, `close`)
/// every operation fails with `FtpError::NotConnected`.
pub struct Session {
    pub(crate) control: Option<ControlChannel>,
    pub(crate) addr: String,
    pub(crate) peer: SocketAddr,
    pub(crate) tls: Option<TlsConnection>,
    pub(crate) debug: bool,
    pub(crate) passive_timeout: Duration,
    pub(crate) parsers: Vec<ListParser>,
    pub(crate) timezone: FixedOffset,
    pub(crate) welcome: Reply,
}

impl Session {
    /// Connects to `addr` (`host:port`) and reads the greeting.
    pub async fn connect(addr: &str) -> FtpResult<Session> {
        Self::connect_with(addr, false).await
    }

    /// Same as `connect`, with every command and reply traced at `info`.
    pub async fn connect_debug(addr: &str) -> FtpResult<Session> {
        Self::connect_with(addr, true).await
    }

    pub async fn connect_with(addr: &str, debug: bool) -> FtpResult<Session> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        info!("Connected to {} ({})", addr, peer);

        let mut control = ControlChannel::new(FtpStream::Plain(stream), debug);
        let welcome = control.receive().await?;
        if welcome.is_negative() {
            warn!("{} refused the session: {}", addr, welcome.text().trim_end());
            return Err(FtpError::UnexpectedReply(welcome.into_text()));
        }

        Ok(Session {
            control: Some(control),
            addr: addr.to_string(),
            peer,
            tls: None,
            debug,
            passive_timeout: Duration::from_secs(DEFAULT_PASSIVE_TIMEOUT_SECS),
            parsers: default_parsers(),
            timezone: Utc.fix(),
            welcome,
        })
    }

    pub(crate) fn control(&mut self) -> FtpResult<&mut ControlChannel> {
        self.control.as_mut().ok_or(FtpError::NotConnected)
    }

    pub(crate) async fn cmd(&mut self, expects: &str, command: FtpCommand) -> FtpResult<Reply> {
        self.control()?.cmd(expects, &command.to_string()).await
    }

    /// Sends USER then PASS. A server that answers USER with 230 needs no
    /// password; that counts as success.
    pub async fn login(&mut self, user: &str, password: &str) -> FtpResult<()> {
        let control = self.control()?;
        control.send(&FtpCommand::USER(user.to_string()).to_string()).await?;
        let reply = control.receive().await?;

        if reply.starts_with(STATUS_LOGGED_IN) {
            info!("Logged in as {} (no password required)", user);
            return Ok(());
        }
        reply.expect(STATUS_USER_OK)?;

        control
            .cmd(STATUS_LOGGED_IN, &FtpCommand::PASS(password.to_string()).to_string())
            .await?;
        info!("Logged in as {}", user);
        Ok(())
    }

    pub async fn change_directory(&mut self, path: &str) -> FtpResult<()> {
        self.cmd(STATUS_ACTION_OK, FtpCommand::CWD(path.to_string()))
            .await?;
        Ok(())
    }

    /// CDUP; servers answer either 250 or 200.
    pub async fn change_to_parent(&mut self) -> FtpResult<()> {
        let control = self.control()?;
        control.send(&FtpCommand::CDUP.to_string()).await?;
        let reply = control.receive().await?;
        if reply.starts_with(STATUS_ACTION_OK) || reply.starts_with(STATUS_OK) {
            Ok(())
        } else {
            Err(FtpError::UnexpectedReply(reply.into_text()))
        }
    }

    pub async fn make_directory(&mut self, path: &str) -> FtpResult<()> {
        self.cmd(STATUS_PATH_CREATED, FtpCommand::MKD(path.to_string()))
            .await?;
        Ok(())
    }

    pub async fn remove_directory(&mut self, path: &str) -> FtpResult<()> {
        self.cmd(STATUS_ACTION_OK, FtpCommand::RMD(path.to_string()))
            .await?;
        Ok(())
    }

    pub async fn delete(&mut self, path: &str) -> FtpResult<()> {
        self.cmd(STATUS_ACTION_OK, FtpCommand::DELE(path.to_string()))
            .await?;
        Ok(())
    }

    pub async fn rename(&mut self, from: &str, to: &str) -> FtpResult<()> {
        self.cmd(STATUS_ACTION_PENDING, FtpCommand::RNFR(from.to_string()))
            .await?;
        self.cmd(STATUS_ACTION_OK, FtpCommand::RNTO(to.to_string()))
            .await?;
        debug!("Renamed {} to {}", from, to);
        Ok(())
    }

    /// PWD. Doubled quotes inside the path are unescaped.
    pub async fn current_directory(&mut self) -> FtpResult<String> {
        let reply = self.cmd(STATUS_PATH_CREATED, FtpCommand::PWD).await?;

        match PWD_PATH.captures(reply.text()).and_then(|caps| caps.get(1)) {
            Some(path) => Ok(path.as_str().replace("\"\"", "\"")),
            None => Err(FtpError::UnexpectedReply(reply.into_text())),
        }
    }

    /// SYST, e.g. `UNIX Type: L8`.
    pub async fn system_type(&mut self) -> FtpResult<String> {
        let reply = self.cmd(STATUS_SYSTEM_TYPE, FtpCommand::SYST).await?;
        let text = reply.text().trim();
        Ok(text.split_once(' ').map(|(_, rest)| rest).unwrap_or("").to_string())
    }

    /// STAT for `path`.
    ///
    /// A system status (211) is returned line by line. For file and
    /// directory status (213, 212) the lines carrying the status code are
    /// dropped and the others trimmed.
    pub async fn status(&mut self, path: &str) -> FtpResult<Vec<String>> {
        let control = self.control()?;
        control.send(&FtpCommand::STAT(path.to_string()).to_string()).await?;
        let reply = control.receive().await?;

        if reply.starts_with(STATUS_SYSTEM_STATUS) {
            return Ok(reply.lines().map(str::to_string).collect());
        }
        if !reply.starts_with(STATUS_FILE_STATUS) && !reply.starts_with(STATUS_DIRECTORY_STATUS) {
            return Err(FtpError::UnexpectedReply(reply.into_text()));
        }

        let code = reply.code();
        Ok(reply
            .lines()
            .filter(|line| !line.starts_with(code))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn file_size(&mut self, path: &str) -> FtpResult<u64> {
        let reply = self
            .cmd(STATUS_FILE_STATUS, FtpCommand::SIZE(path.to_string()))
            .await?;
        reply
            .message()
            .parse()
            .map_err(|_| FtpError::InvalidNumber(reply.text().trim_end().to_string()))
    }

    /// MDTM: the last modification time of `path`, in UTC.
    pub async fn modification_time(&mut self, path: &str) -> FtpResult<DateTime<Utc>> {
        let reply = self
            .cmd(STATUS_FILE_STATUS, FtpCommand::MDTM(path.to_string()))
            .await?;
        parse_fact_timestamp(reply.message())
            .map_err(|_| FtpError::InvalidNumber(reply.text().trim_end().to_string()))
    }

    pub async fn noop(&mut self) -> FtpResult<()> {
        self.cmd(STATUS_OK, FtpCommand::NOOP).await?;
        Ok(())
    }

    /// Sends any command line and returns the reply code and raw text,
    /// without checking the status.
    pub async fn raw_cmd(&mut self, command: &str) -> FtpResult<(u16, String)> {
        let control = self.control()?;
        control.send(command).await?;
        let reply = control.receive().await?;
        match reply.code_number() {
            Some(code) => Ok((code, reply.into_text())),
            None => Err(FtpError::InvalidNumber(reply.into_text())),
        }
    }

    /// QUIT, then drop the connection whatever the answer.
    pub async fn quit(&mut self) -> FtpResult<()> {
        let mut control = self.control.take().ok_or(FtpError::NotConnected)?;
        let outcome = control
            .cmd(STATUS_CONNECTION_CLOSING, &FtpCommand::QUIT.to_string())
            .await;
        info!("Disconnected from {}", self.addr);
        outcome.map(|_| ())
    }

    /// Drops the connection without QUIT.
    pub async fn close(&mut self) {
        if let Some(control) = self.control.take() {
            let mut stream = control.into_stream();
            if let Err(e) = stream.shutdown().await {
                debug!("Shutdown of control connection: {}", e);
            }
            info!("Connection to {} closed", self.addr);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    /// Whether AUTH TLS succeeded on this session.
    pub fn is_secure(&self) -> bool {
        self.tls.is_some()
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The host part of the address the session was opened with.
    pub fn host(&self) -> String {
        match self.addr.rsplit_once(':') {
            Some((host, port)) if port.parse::<u16>().is_ok() => host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_string(),
            _ => self.addr.clone(),
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// The greeting sent by the server on connect.
    pub fn welcome(&self) -> &Reply {
        &self.welcome
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if let Some(control) = self.control.as_mut() {
            control.set_debug(debug);
        }
    }

    pub fn passive_timeout(&self) -> Duration {
        self.passive_timeout
    }

    pub fn set_passive_timeout(&mut self, passive_timeout: Duration) {
        self.passive_timeout = passive_timeout;
    }

    /// Parsers tried, in order, on LIST output.
    pub fn parsers(&self) -> &[ListParser] {
        &self.parsers
    }

    pub fn set_parsers(&mut self, parsers: Vec<ListParser>) {
        self.parsers = parsers;
    }

    /// Timezone used for listing times that carry none.
    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    pub fn set_timezone(&mut self, timezone: FixedOffset) {
        self.timezone = timezone;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("addr", &self.addr)
            .field("peer", &self.peer)
            .field("connected", &self.is_connected())
            .field("secure", &self.is_secure())
            .field("debug", &self.debug)
            .field("passive_timeout", &self.passive_timeout)
            .field("parsers", &self.parsers.len())
            .field("timezone", &self.timezone)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeServer;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_multi_line_greeting() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server
                .accept("220-Welcome to the archive\r\n220-Be nice\r\n220 Ready")
                .await;
            conn.expect_reply("QUIT", "221 Goodbye").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        assert_eq!(session.welcome().lines().count(), 3);
        assert_eq!(session.welcome().message(), "Welcome to the archive");

        session.quit().await.unwrap();
        assert!(!session.is_connected());
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_greeting() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let _conn = server.accept("421 Too many connections").await;
        });

        let err = Session::connect(&addr).await.unwrap_err();
        assert_eq!(err.reply_text(), Some("421 Too many connections\r\n"));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_with_password() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("USER bob", "331 Please specify the password").await;
            conn.expect_reply("PASS secret", "230 Login successful").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        session.login("bob", "secret").await.unwrap();
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_accepted_without_password() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("USER anonymous", "230 Already logged in").await;
            // PASS must not be sent: the next command is NOOP.
            conn.expect_reply("NOOP", "200 NOOP ok").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        session.login("anonymous", "").await.unwrap();
        session.noop().await.unwrap();
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("USER bob", "331 Please specify the password").await;
            conn.expect_reply("PASS wrong", "530 Login incorrect").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        let err = session.login("bob", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "530 Login incorrect");
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_navigation_and_metadata() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("CWD /pub", "250 Directory successfully changed").await;
            conn.expect_reply("CDUP", "200 Okay").await;
            conn.expect_reply("PWD", "257 \"/home/\"\"quoted\"\"\" is the current directory")
                .await;
            conn.expect_reply("MKD new", "257 \"/new\" created").await;
            conn.expect_reply("RMD old", "250 Remove directory operation successful").await;
            conn.expect_reply("DELE a.txt", "250 Delete operation successful").await;
            conn.expect_reply("RNFR a", "350 Ready for RNTO").await;
            conn.expect_reply("RNTO b", "250 Rename successful").await;
            conn.expect_reply("SYST", "215 UNIX Type: L8").await;
            conn.expect_reply("SIZE b", "213 37192705").await;
            conn.expect_reply("MDTM b", "213 20150912040700").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        session.change_directory("/pub").await.unwrap();
        session.change_to_parent().await.unwrap();
        assert_eq!(
            session.current_directory().await.unwrap(),
            "/home/\"quoted\""
        );
        session.make_directory("new").await.unwrap();
        session.remove_directory("old").await.unwrap();
        session.delete("a.txt").await.unwrap();
        session.rename("a", "b").await.unwrap();
        assert_eq!(session.system_type().await.unwrap(), "UNIX Type: L8");
        assert_eq!(session.file_size("b").await.unwrap(), 37192705);
        assert_eq!(
            session.modification_time("b").await.unwrap(),
            Utc.with_ymd_and_hms(2015, 9, 12, 4, 7, 0).unwrap()
        );
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_without_pending_state() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("RNFR ghost", "550 RNFR command failed").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        let err = session.rename("ghost", "b").await.unwrap_err();
        assert_eq!(err.reply_text(), Some("550 RNFR command failed\r\n"));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_pwd_without_quotes() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("PWD", "257 /home").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        assert!(matches!(
            session.current_directory().await,
            Err(FtpError::UnexpectedReply(_))
        ));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_status_replies() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply(
                "STAT all.zip",
                "213-status of all.zip:\r\n    09-12-15  04:07AM             37192705 all.zip\r\n213 End of status.",
            )
            .await;
            conn.expect_reply(
                "STAT",
                "211-FTP server status:\r\n     Connected to 127.0.0.1\r\n211 End of status",
            )
            .await;
            conn.expect_reply("STAT nope", "450 No such file").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        assert_eq!(
            session.status("all.zip").await.unwrap(),
            vec!["09-12-15  04:07AM             37192705 all.zip"]
        );
        assert_eq!(
            session.status("").await.unwrap(),
            vec![
                "211-FTP server status:",
                "     Connected to 127.0.0.1",
                "211 End of status"
            ]
        );
        assert!(session.status("nope").await.is_err());
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_raw_cmd_does_not_check_status() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("FEAT", "211-Features:\r\n MDTM\r\n SIZE\r\n211 End").await;
            conn.expect_reply("SITE CHMOD 644 f", "500 Unknown command").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        let (code, text) = session.raw_cmd("FEAT").await.unwrap();
        assert_eq!(code, 211);
        assert!(text.contains(" MDTM\r\n"));

        let (code, _) = session.raw_cmd("SITE CHMOD 644 f").await.unwrap();
        assert_eq!(code, 500);
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_without_quit() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.wait_closed().await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        session.close().await;
        assert!(!session.is_connected());
        assert!(matches!(session.quit().await, Err(FtpError::NotConnected)));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_host_from_address() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let _conn = server.accept("220 Ready").await;
        });

        let session = Session::connect(&addr).await.unwrap();
        assert_eq!(session.host(), "127.0.0.1");
        assert_eq!(session.peer_addr().to_string(), addr);
        peer.await.unwrap();
    }
}
