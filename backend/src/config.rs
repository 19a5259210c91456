//! Server settings read from the environment.
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `8080`)
//! - `SEED_FILE`: JSON fixture loaded into the local repository at startup
//!
//! Repository selection has its own variables, see [`crate::db::factory`].

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            seed_file: None,
        }
    }
}

impl ServerConfig {
    /// Load settings from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a number between 0 and 65535, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let seed_file = non_empty("SEED_FILE").map(PathBuf::from);

        Ok(Self {
            host,
            port,
            seed_file,
        })
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
