use crate::core_cli::Command;
use anyhow::{Context, Result};
use colored::*;
use filetime::{set_file_mtime, FileTime};
use log::{info, warn};
use rouilleftp::core_listing::EntryType;
use rouilleftp::Session;
use std::io::SeekFrom;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// Runs one sub-command on a logged-in session.
pub async fn run(session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Ls { path, raw } => {
            if raw {
                for line in session.list_raw(&path).await? {
                    println!("{}", line);
                }
            } else {
                for entry in session.list(&path).await? {
                    let line = entry.to_string();
                    match entry.entry_type {
                        EntryType::Folder => println!("{}", line.blue()),
                        EntryType::Link => println!("{}", line.cyan()),
                        EntryType::File => println!("{}", line),
                    }
                }
            }
        }
        Command::Raw { command } => {
            let (_, text) = session.raw_cmd(&command.join(" ")).await?;
            print!("{}", text);
        }
        Command::Walk { path } => {
            let mut count = 0u64;
            session
                .walk(&path, |file| {
                    println!("{}", file);
                    count += 1;
                    Ok::<(), anyhow::Error>(())
                })
                .await?;
            info!("{} files below {}", count, display_path(&path));
        }
        Command::Get {
            remote,
            local,
            offset,
            resume,
            preserve_time,
        } => {
            let local = local.unwrap_or_else(|| base_name(&remote).to_string());
            get(session, &remote, &local, offset, resume).await?;

            if preserve_time {
                let modified = session.modification_time(&remote).await?;
                let mtime = FileTime::from_unix_time(modified.timestamp(), 0);
                set_file_mtime(&local, mtime)
                    .with_context(|| format!("Failed to set modification time of {}", local))?;
            }
        }
        Command::Put {
            local,
            remote,
            offset,
        } => {
            let remote = remote.unwrap_or_else(|| base_name(&local).to_string());
            let mut file = File::open(&local)
                .await
                .with_context(|| format!("Failed to open {}", local))?;
            if offset > 0 {
                file.seek(SeekFrom::Start(offset)).await?;
            }
            let sent = session.store_from(&remote, &mut file, offset).await?;
            println!("{} -> {} ({} bytes)", local, remote, sent);
        }
        Command::Pwd => println!("{}", session.current_directory().await?),
        Command::Mkdir { path } => session.make_directory(&path).await?,
        Command::Rmdir { path } => session.remove_directory(&path).await?,
        Command::Rm { path } => session.delete(&path).await?,
        Command::Mv { from, to } => session.rename(&from, &to).await?,
        Command::Size { path } => println!("{}", session.file_size(&path).await?),
        Command::Mdtm { path } => {
            println!("{}", session.modification_time(&path).await?.to_rfc3339())
        }
        Command::Stat { path } => {
            for line in session.status(&path).await? {
                println!("{}", line);
            }
        }
        Command::Syst => println!("{}", session.system_type().await?),
    }

    Ok(())
}

async fn get(session: &mut Session, remote: &str, local: &str, offset: u64, resume: bool) -> Result<()> {
    let offset = if resume {
        match tokio::fs::metadata(local).await {
            Ok(metadata) => metadata.len(),
            Err(_) => {
                warn!("Nothing to resume, {} does not exist", local);
                0
            }
        }
    } else {
        offset
    };

    let mut file = if offset > 0 {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(local)
            .await
            .with_context(|| format!("Failed to open {}", local))?;
        file.seek(SeekFrom::Start(offset)).await?;
        file
    } else {
        File::create(local)
            .await
            .with_context(|| format!("Failed to create {}", local))?
    };

    let received = session.retrieve_from(remote, offset, &mut file).await?;
    file.flush().await?;
    println!("{} -> {} ({} bytes from offset {})", remote, local, received, offset);
    Ok(())
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').find(|part| !part.is_empty()).unwrap_or(path)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/pub/linux/kernel.tar.gz"), "kernel.tar.gz");
        assert_eq!(base_name("notes.txt"), "notes.txt");
        assert_eq!(base_name("/pub/dir/"), "dir");
    }
}
