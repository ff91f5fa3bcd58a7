mod core_cli;

use crate::core_cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use env_logger::{Builder, Env};
use log::{info, warn};
use rouilleftp::config::{load_config, Config};
use rouilleftp::{Session, TlsConnection};
use std::io::Write;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize the logger with a custom format and colors
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp().to_string();
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red(),
                log::Level::Warn => record.level().to_string().yellow(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().white(),
            };
            writeln!(buf, "[{}] [{}] {}", timestamp, level, record.args())
        })
        .init();

    let default_config_path = if cfg!(target_os = "windows") {
        "C:\\ProgramData\\rouilleftp\\rouilleftp.conf"
    } else {
        "/etc/rouilleftp.conf"
    };

    // Load configuration from the TOML file
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None if Path::new(default_config_path).exists() => load_config(default_config_path)?,
        None => Config::default(),
    };

    // Override the configuration from the CLI if provided
    if let Some(address) = args.address.clone() {
        config.server.address = address;
    }
    if let Some(user) = args.user.clone() {
        config.server.user = user;
    }
    if let Some(password) = args.password.clone() {
        config.server.password = password;
    }
    config.server.debug |= args.debug;
    config.validate().context("Invalid configuration")?;

    let target = config.target()?;
    let mut session = Session::connect_with(&target.addr(), config.server.debug)
        .await
        .with_context(|| format!("Failed to connect to {}", target.addr()))?;
    session.set_passive_timeout(config.passive_timeout());

    if target.secure {
        let host = target.host.trim_start_matches('[').trim_end_matches(']');
        let tls = TlsConnection::new(&config.tls, host)?;
        session
            .upgrade_tls(tls)
            .await
            .with_context(|| format!("Failed to secure the connection to {}", target.addr()))?;
    }

    session
        .login(&target.user, &target.password)
        .await
        .with_context(|| format!("Failed to log in as {}", target.user))?;

    if let Some(path) = &target.path {
        session.change_directory(path).await?;
    }

    let outcome = core_cli::run::run(&mut session, args.command).await;

    if session.is_connected() {
        if let Err(e) = session.quit().await {
            warn!("QUIT failed: {}", e);
        }
    }
    if outcome.is_ok() {
        info!("Done");
    }
    outcome
}
