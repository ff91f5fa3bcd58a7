use crate::constants::{DATA_BUFFER_SIZE, STATUS_ACTION_PENDING, STATUS_CLOSING_DATA_CONNECTION};
use crate::core_control::{FtpError, FtpResult, Reply};
use crate::core_ftpcommand::{FtpCommand, TypeCode};
use crate::core_network::FtpStream;
use crate::session::Session;
use log::{debug, info, warn};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

impl Session {
    /// Downloads `path` into `sink`. Returns the number of bytes copied.
    pub async fn retrieve<W>(&mut self, path: &str, sink: &mut W) -> FtpResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.retrieve_from(path, 0, sink).await
    }

    /// Downloads `path` starting at byte `offset` (`REST`) into `sink`.
    ///
    /// The transfer only succeeds once the server confirmed it with 226.
    /// When `sink` fails, the completion reply is still read before the
    /// sink's error is returned.
    pub async fn retrieve_from<W>(&mut self, path: &str, offset: u64, sink: &mut W) -> FtpResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut data = self
            .open_transfer(FtpCommand::RETR(path.to_string()), offset)
            .await?;

        let copied = tokio::io::copy(&mut data, sink).await;
        let finished = self.finish_transfer(data).await;

        let copied = copied?;
        finished?;
        info!("Retrieved {} ({} bytes from offset {})", path, copied, offset);
        Ok(copied)
    }

    /// Downloads `path` from `offset`, handing each chunk read from the data
    /// channel to `callback`. An error from the callback aborts the transfer.
    pub async fn retrieve_chunks<F>(&mut self, path: &str, offset: u64, mut callback: F) -> FtpResult<u64>
    where
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        let mut data = self
            .open_transfer(FtpCommand::RETR(path.to_string()), offset)
            .await?;

        let pumped = pump_chunks(&mut data, &mut callback).await;
        let finished = self.finish_transfer(data).await;

        let pumped = pumped?;
        finished?;
        info!("Retrieved {} ({} bytes from offset {})", path, pumped, offset);
        Ok(pumped)
    }

    /// Uploads the whole of `source` to `path`.
    pub async fn store<R>(&mut self, path: &str, source: &mut R) -> FtpResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.store_from(path, source, 0).await
    }

    /// Uploads `source` to `path`, telling the server to start writing at
    /// byte `offset`. Nothing checks that the remote file really had
    /// `offset` bytes.
    pub async fn store_from<R>(&mut self, path: &str, source: &mut R, offset: u64) -> FtpResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut data = self
            .open_transfer(FtpCommand::STOR(path.to_string()), offset)
            .await?;

        let copied = tokio::io::copy(source, &mut data).await;
        let finished = self.finish_transfer(data).await;

        let copied = copied?;
        finished?;
        info!("Stored {} ({} bytes at offset {})", path, copied, offset);
        Ok(copied)
    }

    /// Binary type, PASV, optional REST, then the transfer command. Returns
    /// the data channel once the server announced the transfer (1xx).
    async fn open_transfer(&mut self, command: FtpCommand, offset: u64) -> FtpResult<FtpStream> {
        self.set_type(TypeCode::Image).await?;
        let port = self.negotiate_passive().await?;

        if offset > 0 {
            self.cmd(STATUS_ACTION_PENDING, FtpCommand::REST(offset)).await?;
        }

        let mut data = self.dial_data_command(port, command).await?;

        let reply = self.control()?.receive_no_discard().await?;
        if !reply.is_preliminary() {
            // A refusal here is the final reply for this command.
            if let Err(e) = data.shutdown().await {
                debug!("Data channel shutdown: {}", e);
            }
            return Err(FtpError::UnexpectedReply(reply.into_text()));
        }

        Ok(data)
    }

    /// Sends a command that uses the data channel, then dials `port`.
    ///
    /// When the dial fails the server may still answer the command; that
    /// answer is consumed so the next exchange stays aligned.
    pub(crate) async fn dial_data_command(
        &mut self,
        port: u16,
        command: FtpCommand,
    ) -> FtpResult<FtpStream> {
        self.control()?.send(&command.to_string()).await?;

        match self.open_data_channel(port).await {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!("Data connection for {} failed: {}", command.verb(), e);
                self.drain_abandoned(&command).await;
                Err(e)
            }
        }
    }

    /// Reads what the server says about a command whose data channel never
    /// opened. A 1xx announcement is followed by the failure reply (425,
    /// 522...), so both are read, each bounded by the passive timeout.
    async fn drain_abandoned(&mut self, command: &FtpCommand) {
        let limit = self.passive_timeout;
        let control = match self.control() {
            Ok(control) => control,
            Err(_) => return,
        };

        loop {
            match timeout(limit, control.receive_no_discard()).await {
                Ok(Ok(reply)) => {
                    debug!("Reply to abandoned {}: {}", command.verb(), reply.text().trim_end());
                    if !reply.is_preliminary() {
                        return;
                    }
                }
                Ok(Err(e)) => {
                    debug!("No reply to abandoned {}: {}", command.verb(), e);
                    return;
                }
                Err(_) => {
                    debug!("No reply to abandoned {} within {:?}", command.verb(), limit);
                    return;
                }
            }
        }
    }

    /// Shuts the data channel down and reads the completion reply, which
    /// must be 226.
    pub(crate) async fn finish_transfer(&mut self, mut data: FtpStream) -> FtpResult<Reply> {
        if let Err(e) = data.shutdown().await {
            debug!("Data channel shutdown: {}", e);
        }
        drop(data);

        self.control()?
            .receive()
            .await?
            .expect(STATUS_CLOSING_DATA_CONNECTION)
    }
}

async fn pump_chunks<F>(data: &mut FtpStream, callback: &mut F) -> io::Result<u64>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut buffer = vec![0u8; DATA_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = data.read(&mut buffer).await?;
        if n == 0 {
            return Ok(total);
        }
        callback(&buffer[..n])?;
        total += n as u64;
    }
}
