// Passage du canal de contrôle en TLS (AUTH TLS, PBSZ 0, PROT P)
use crate::constants::{STATUS_AUTH_OK, STATUS_OK};
use crate::core_control::{ControlChannel, FtpError, FtpResult};
use crate::core_ftpcommand::FtpCommand;
use crate::core_network::FtpStream;
use crate::core_tls::{TlsConfig, TlsConnection, TlsError};
use crate::session::Session;
use log::{error, info};

impl Session {
    /// Secures the control channel, then every data channel opened later.
    ///
    /// Any failure leaves the session closed: the control connection is
    /// dropped and later calls fail with `NotConnected`.
    pub async fn upgrade_tls(&mut self, tls: TlsConnection) -> FtpResult<()> {
        if self.tls.is_some() {
            return Err(TlsError::AlreadySecured.into());
        }

        match self.secure_control(tls).await {
            Ok(()) => {
                info!("Control connection to {} secured", self.addr);
                Ok(())
            }
            Err(e) => {
                error!("TLS upgrade with {} failed: {}", self.addr, e);
                self.control = None;
                self.tls = None;
                Err(e)
            }
        }
    }

    /// Builds the connector from `config` for this session's host, then
    /// upgrades.
    pub async fn upgrade_tls_with(&mut self, config: &TlsConfig) -> FtpResult<()> {
        let tls = TlsConnection::new(config, &self.host())?;
        self.upgrade_tls(tls).await
    }

    async fn secure_control(&mut self, tls: TlsConnection) -> FtpResult<()> {
        self.cmd(STATUS_AUTH_OK, FtpCommand::AUTH("TLS".to_string()))
            .await?;

        let control = self.control.take().ok_or(FtpError::NotConnected)?;
        let debug = control.debug();
        let tcp = match control.into_stream() {
            FtpStream::Plain(tcp) => tcp,
            FtpStream::Tls(_) => return Err(TlsError::AlreadySecured.into()),
        };

        let secured = tls.connect(tcp).await?;
        self.control = Some(ControlChannel::new(
            FtpStream::Tls(Box::new(secured)),
            debug,
        ));
        self.tls = Some(tls);

        self.cmd(STATUS_OK, FtpCommand::PBSZ(0)).await?;
        self.cmd(STATUS_OK, FtpCommand::PROT("P".to_string())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_listing::EntryType;
    use crate::test_support::{lab_connector, tls_acceptor, FakeServer};

    #[tokio::test]
    async fn test_upgrade_secures_control_and_data_channels() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let acceptor = tls_acceptor();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("AUTH TLS", "234 Proceed with negotiation.").await;
            let mut conn = conn.secure(&acceptor).await;
            conn.expect_reply("PBSZ 0", "200 PBSZ set to 0.").await;
            conn.expect_reply("PROT P", "200 PROT now Private.").await;

            conn.expect_reply("TYPE A", "200 Switching to ASCII mode.").await;
            let listener = conn.passive().await;
            conn.expect("MLSD /pub").await;
            // Fails unless the client handshakes on the data channel too.
            let data = FakeServer::accept_secure_data(&listener, &acceptor).await;
            conn.reply("150 Here comes the directory listing.").await;
            FakeServer::send_lines(
                data,
                &["type=dir; incoming", "modify=20230615120000;type=file;size=42; report.txt"],
            )
            .await;
            conn.reply("226 Directory send OK.").await;

            conn.expect_reply("QUIT", "221 Goodbye.").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        session.upgrade_tls(lab_connector()).await.unwrap();
        assert!(session.is_secure());

        let entries = session.list("/pub").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "incoming");
        assert_eq!(entries[0].entry_type, EntryType::Folder);
        assert_eq!(entries[1].name, "report.txt");
        assert_eq!(entries[1].size, 42);

        session.quit().await.unwrap();
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_second_upgrade_is_refused() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let acceptor = tls_acceptor();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("AUTH TLS", "234 Proceed with negotiation.").await;
            let mut conn = conn.secure(&acceptor).await;
            conn.expect_reply("PBSZ 0", "200 PBSZ set to 0.").await;
            conn.expect_reply("PROT P", "200 PROT now Private.").await;
            conn.expect_reply("NOOP", "200 NOOP ok.").await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        session.upgrade_tls(lab_connector()).await.unwrap();

        let err = session.upgrade_tls(lab_connector()).await.unwrap_err();
        assert!(matches!(err, FtpError::Tls(TlsError::AlreadySecured)));
        assert!(session.is_connected());
        session.noop().await.unwrap();
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_auth_closes_the_session() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("AUTH TLS", "502 Command not implemented").await;
            conn.wait_closed().await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        let err = session.upgrade_tls(lab_connector()).await.unwrap_err();
        assert_eq!(err.reply_text(), Some("502 Command not implemented\r\n"));

        assert!(!session.is_connected());
        assert!(!session.is_secure());
        assert!(matches!(session.noop().await, Err(FtpError::NotConnected)));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_handshake_closes_the_session() {
        let server = FakeServer::bind().await;
        let addr = server.addr();
        let peer = tokio::spawn(async move {
            let mut conn = server.accept("220 Ready").await;
            conn.expect_reply("AUTH TLS", "234 Proceed with negotiation.").await;
            let client_hello = conn.read_raw().await;
            assert_eq!(client_hello.first(), Some(&0x16));
            // Plain text where a ServerHello is expected.
            conn.reply("this is not TLS").await;
            conn.wait_closed().await;
        });

        let mut session = Session::connect(&addr).await.unwrap();
        let err = session.upgrade_tls(lab_connector()).await.unwrap_err();
        assert!(matches!(err, FtpError::Tls(TlsError::TlsHandshakeError(_))));
        assert!(!session.is_connected());
        peer.await.unwrap();
    }
}
