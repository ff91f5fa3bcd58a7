// Scripted FTP peer for the session tests
use crate::core_tls::{TlsConfig, TlsConnection};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::rustls::{Certificate, PrivateKey, ServerConfig};
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;

/// Anything the peer can talk FTP over: plain TCP, then TLS after AUTH.
pub(crate) trait PeerStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> PeerStream for T {}

/// Client connector that trusts the throwaway certificate of `tls_acceptor`.
pub(crate) fn lab_connector() -> TlsConnection {
    let config = TlsConfig {
        enabled: true,
        accept_invalid_certs: true,
        ..TlsConfig::default()
    };
    TlsConnection::new(&config, "127.0.0.1").unwrap()
}

/// Server side TLS with a freshly generated self-signed certificate.
pub(crate) fn tls_acceptor() -> TlsAcceptor {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(
            vec![Certificate(cert.serialize_der().unwrap())],
            PrivateKey(cert.serialize_private_key_der()),
        )
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Two ends of a loopback TCP connection: (client, server).
pub(crate) async fn loopback_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    (client.unwrap(), accepted.unwrap().0)
}

pub(crate) struct FakeServer {
    listener: TcpListener,
}

impl FakeServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    pub fn addr(&self) -> String {
        self.listener.local_addr().unwrap().to_string()
    }

    /// Accepts the client and sends `greeting`.
    pub async fn accept(self, greeting: &str) -> PeerConnection {
        let (stream, _) = self.listener.accept().await.unwrap();
        let stream: Box<dyn PeerStream> = Box::new(stream);
        let mut conn = PeerConnection {
            stream: BufReader::new(stream),
        };
        conn.reply(greeting).await;
        conn
    }

    pub async fn accept_data(listener: &TcpListener) -> TcpStream {
        listener.accept().await.unwrap().0
    }

    /// Accepts a data connection and runs the server handshake on it.
    pub async fn accept_secure_data(listener: &TcpListener, acceptor: &TlsAcceptor) -> TlsStream<TcpStream> {
        let data = Self::accept_data(listener).await;
        acceptor.accept(data).await.unwrap()
    }

    /// Writes `lines` on a data connection, CRLF terminated, then closes it.
    pub async fn send_lines<S: AsyncWrite + Unpin>(mut data: S, lines: &[&str]) {
        for line in lines {
            data.write_all(line.as_bytes()).await.unwrap();
            data.write_all(b"\r\n").await.unwrap();
        }
        data.shutdown().await.unwrap();
    }

    pub async fn read_all(data: &mut TcpStream) -> Vec<u8> {
        let mut received = Vec::new();
        data.read_to_end(&mut received).await.unwrap();
        received
    }
}

/// The server side of one control connection.
pub(crate) struct PeerConnection {
    stream: BufReader<Box<dyn PeerStream>>,
}

impl PeerConnection {
    /// Runs the server handshake on the control connection, after 234.
    pub async fn secure(self, acceptor: &TlsAcceptor) -> PeerConnection {
        let secured = acceptor.accept(self.stream.into_inner()).await.unwrap();
        let stream: Box<dyn PeerStream> = Box::new(secured);
        PeerConnection {
            stream: BufReader::new(stream),
        }
    }

    /// The next command line without its terminator, `None` once the client
    /// hung up.
    pub async fn read_command(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.stream.read_line(&mut line).await {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    pub async fn expect(&mut self, command: &str) {
        assert_eq!(self.read_command().await.as_deref(), Some(command));
    }

    /// Sends `text` followed by CRLF. Multi-line replies carry their inner
    /// CRLFs in `text`.
    pub async fn reply(&mut self, text: &str) {
        let stream = self.stream.get_mut();
        stream.write_all(text.as_bytes()).await.unwrap();
        stream.write_all(b"\r\n").await.unwrap();
        stream.flush().await.unwrap();
    }

    pub async fn expect_reply(&mut self, command: &str, reply: &str) {
        self.expect(command).await;
        self.reply(reply).await;
    }

    /// Answers PASV with a fresh loopback listener.
    pub async fn passive(&mut self) -> TcpListener {
        self.expect("PASV").await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        self.reply(&format!(
            "227 Entering Passive Mode (127,0,0,1,{},{}).",
            port >> 8,
            port & 0xff
        ))
        .await;
        listener
    }

    /// One read of whatever the client sent, bypassing line framing.
    pub async fn read_raw(&mut self) -> Vec<u8> {
        let mut buffer = vec![0u8; 4096];
        let n = self.stream.read(&mut buffer).await.unwrap();
        buffer.truncate(n);
        buffer
    }

    /// Waits for the client to close the connection.
    pub async fn wait_closed(&mut self) {
        let mut buffer = [0u8; 1024];
        loop {
            match self.stream.read(&mut buffer).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }
}
