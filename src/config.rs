use crate::constants::{DEFAULT_FTP_PORT, DEFAULT_PASSIVE_TIMEOUT_SECS};
use crate::core_tls::TlsConfig;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port`, `ftp://[user[:pass]@]host[:port][/path]` or `ftps://...`
    pub address: String,
    pub user: String,
    pub password: String,
    pub debug: bool,
    pub passive_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: format!("127.0.0.1:{}", DEFAULT_FTP_PORT),
            user: String::from("anonymous"),
            password: String::new(),
            debug: false,
            passive_timeout_secs: DEFAULT_PASSIVE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

/// Where to connect and as whom, once the address has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// `ftps://` address: upgrade with AUTH TLS right after connecting.
    pub secure: bool,
    /// Directory given in the URL, if any.
    pub path: Option<String>,
}

impl Target {
    /// `host:port`, suitable for `Session::connect`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn passive_timeout(&self) -> Duration {
        Duration::from_secs(self.server.passive_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.passive_timeout_secs == 0 {
            bail!("passive_timeout_secs must be greater than 0");
        }
        self.tls.validate().context("Invalid [tls] section")?;
        self.target()?;
        Ok(())
    }

    /// Resolves `server.address` into a connection target. Credentials in a
    /// URL take precedence over `user` and `password`.
    pub fn target(&self) -> Result<Target> {
        let address = self.server.address.trim();
        let mut target = Target {
            host: String::new(),
            port: DEFAULT_FTP_PORT,
            user: self.server.user.clone(),
            password: self.server.password.clone(),
            secure: self.tls.enabled,
            path: None,
        };

        if address.contains("://") {
            let url = Url::parse(address)
                .with_context(|| format!("Invalid server address: {}", address))?;
            match url.scheme() {
                "ftp" => {}
                "ftps" => target.secure = true,
                other => bail!("Unsupported scheme '{}' in {}", other, address),
            }

            target.host = url
                .host_str()
                .ok_or_else(|| anyhow!("No host in server address: {}", address))?
                .to_string();
            target.port = url.port().unwrap_or(DEFAULT_FTP_PORT);
            if !url.username().is_empty() {
                target.user = url.username().to_string();
            }
            if let Some(password) = url.password() {
                target.password = password.to_string();
            }
            if url.path() != "/" && !url.path().is_empty() {
                target.path = Some(url.path().to_string());
            }
        } else {
            match address.rsplit_once(':') {
                Some((host, port)) => {
                    target.host = host.to_string();
                    target.port = port
                        .parse()
                        .with_context(|| format!("Invalid port in server address: {}", address))?;
                }
                None => target.host = address.to_string(),
            }
        }

        if target.host.is_empty() {
            bail!("No host in server address: {:?}", address);
        }
        Ok(target)
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration file: {}", path))?;
    Ok(config)
}
