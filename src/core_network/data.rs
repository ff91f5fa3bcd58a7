use crate::core_control::FtpResult;
use crate::core_network::FtpStream;
use crate::session::Session;
use log::debug;
use std::net::SocketAddr;
use tokio::net::TcpStream;

impl Session {
    /// Dials the data channel on the control connection's peer.
    ///
    /// Once the session is secured, the data channel goes through the same
    /// TLS handshake as the control channel before it is handed out.
    pub(crate) async fn open_data_channel(&self, port: u16) -> FtpResult<FtpStream> {
        let addr = SocketAddr::new(self.peer.ip(), port);
        debug!("Opening data connection to {}", addr);

        let stream = TcpStream::connect(addr).await?;

        match &self.tls {
            Some(tls) => {
                let secured = tls.connect(stream).await?;
                debug!("Data connection to {} secured", addr);
                Ok(FtpStream::Tls(Box::new(secured)))
            }
            None => Ok(FtpStream::Plain(stream)),
        }
    }
}
