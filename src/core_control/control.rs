use crate::core_control::error::{FtpError, FtpResult};
use crate::core_control::reply::{closing_marker, is_continuation, Reply};
use crate::core_network::FtpStream;
use log::{info, trace, warn};
use tokio::io::{
    split, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, ReadHalf, WriteHalf,
};

/// The command/reply side of a session.
///
/// Owns the buffered reader and writer built over one control stream. Both
/// are rebuilt from scratch when the stream is replaced (TLS upgrade).
pub struct ControlChannel {
    reader: BufReader<ReadHalf<FtpStream>>,
    writer: BufWriter<WriteHalf<FtpStream>>,
    debug: bool,
}

impl ControlChannel {
    pub fn new(stream: FtpStream, debug: bool) -> Self {
        let (read_half, write_half) = split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            debug,
        }
    }

    /// Gives the stream back, dropping whatever was buffered.
    pub fn into_stream(self) -> FtpStream {
        self.reader.into_inner().unsplit(self.writer.into_inner())
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn trace_line(&self, direction: &str, line: &str) {
        let line = line.trim_end();
        let is_password = line
            .get(..5)
            .map_or(false, |verb| verb.eq_ignore_ascii_case("PASS "));
        let shown = if is_password {
            "PASS ****"
        } else {
            line
        };
        if self.debug {
            info!("{} {}", direction, shown);
        } else {
            trace!("{} {}", direction, shown);
        }
    }

    /// Writes one command line and flushes it.
    pub async fn send(&mut self, command: &str) -> FtpResult<()> {
        self.trace_line(">", command);
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Reads one physical line, terminator included. `None` at end of stream.
    async fn receive_line(&mut self) -> FtpResult<Option<String>> {
        let mut buffer = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buffer).await?;
        if n == 0 {
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&buffer).into_owned();
        self.trace_line("<", &line);
        Ok(Some(line))
    }

    async fn read_reply(&mut self) -> FtpResult<Reply> {
        let first = match self.receive_line().await? {
            Some(line) => line,
            None => return Err(FtpError::ConnectionClosed),
        };

        let mut text = first.clone();
        if is_continuation(&first) {
            let closing = closing_marker(&first);
            loop {
                let line = match self.receive_line().await? {
                    Some(line) => line,
                    None => return Err(FtpError::TruncatedReply(text)),
                };
                text.push_str(&line);

                if line.len() < 4 {
                    warn!("Incorrectly terminated multi-line reply: {:?}", text);
                    break;
                }
                if line.starts_with(&closing) {
                    break;
                }
            }
        }

        Ok(Reply::new(text))
    }

    /// Reads one reply, then discards anything else already buffered.
    pub async fn receive(&mut self) -> FtpResult<Reply> {
        let reply = self.read_reply().await?;
        let discarded = self.discard_buffered();
        if discarded > 0 {
            warn!("Discarded {} unexpected bytes after reply", discarded);
        }
        Ok(reply)
    }

    /// Reads one reply and leaves the buffer untouched. Used for transfer
    /// initiation, where the completion reply may already be buffered.
    pub async fn receive_no_discard(&mut self) -> FtpResult<Reply> {
        self.read_reply().await
    }

    /// Drops bytes received but not yet consumed. Returns how many.
    pub fn discard_buffered(&mut self) -> usize {
        let buffered = self.reader.buffer().len();
        self.reader.consume(buffered);
        buffered
    }

    /// Sends `command` and requires a reply starting with `expects`.
    pub async fn cmd(&mut self, expects: &str, command: &str) -> FtpResult<Reply> {
        self.send(command).await?;
        self.receive().await?.expect(expects)
    }
}
