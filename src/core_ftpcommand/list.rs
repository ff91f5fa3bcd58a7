use crate::core_control::{FtpError, FtpResult};
use crate::core_ftpcommand::{FtpCommand, TypeCode};
use crate::core_listing::mlsd::parse_rfc3659_line;
use crate::core_listing::{parse_with, Entry};
use crate::core_network::FtpStream;
use crate::session::Session;
use chrono::Utc;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Which command produced a listing; decides how its lines are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListingFormat {
    Mlsd,
    List,
}

impl Session {
    /// Lists `path` (the current directory when empty) as parsed entries.
    ///
    /// MLSD is tried first. Lines no parser understands are skipped.
    pub async fn list(&mut self, path: &str) -> FtpResult<Vec<Entry>> {
        let (lines, format) = self.fetch_listing(path).await?;
        let now = Utc::now();

        let mut entries = Vec::with_capacity(lines.len());
        for line in &lines {
            let parsed = match format {
                ListingFormat::Mlsd => parse_rfc3659_line(line, now, self.timezone),
                ListingFormat::List => parse_with(&self.parsers, line, now, self.timezone),
            };
            match parsed {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!("Skipping listing line {:?}: {}", line, e),
            }
        }

        info!("Listed {} ({} entries)", display_path(path), entries.len());
        Ok(entries)
    }

    /// Lists `path` without parsing: one string per line, terminators removed.
    pub async fn list_raw(&mut self, path: &str) -> FtpResult<Vec<String>> {
        let (lines, _) = self.fetch_listing(path).await?;
        Ok(lines)
    }

    /// ASCII type, PASV, then MLSD. When MLSD is refused, LIST is sent and
    /// reuses the data connection already dialed.
    pub(crate) async fn fetch_listing(
        &mut self,
        path: &str,
    ) -> FtpResult<(Vec<String>, ListingFormat)> {
        self.set_type(TypeCode::Ascii).await?;
        let port = self.negotiate_passive().await?;

        let mut data = self
            .dial_data_command(port, FtpCommand::MLSD(path.to_string()))
            .await?;

        let mut format = ListingFormat::Mlsd;
        let reply = self.control()?.receive_no_discard().await?;
        if !reply.is_preliminary() {
            debug!(
                "MLSD refused ({}), falling back to LIST",
                reply.text().trim_end()
            );
            format = ListingFormat::List;

            let control = self.control()?;
            control.send(&FtpCommand::LIST(path.to_string()).to_string()).await?;
            let reply = control.receive_no_discard().await?;
            if !reply.is_preliminary() {
                if let Err(e) = data.shutdown().await {
                    debug!("Data channel shutdown: {}", e);
                }
                return Err(FtpError::UnexpectedReply(reply.into_text()));
            }
        }

        let lines = read_lines(&mut data).await;
        let finished = self.finish_transfer(data).await;

        let lines = lines?;
        finished?;
        Ok((lines, format))
    }
}

/// Reads the data channel to the end, one entry per line.
async fn read_lines(data: &mut FtpStream) -> FtpResult<Vec<String>> {
    let mut reader = BufReader::new(data);
    let mut lines = Vec::new();
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buffer);
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}
