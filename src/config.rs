use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;

/// Server configuration loaded from environment variables.
///
/// | Env Var         | Default        |
/// |-----------------|----------------|
/// | `HOST`          | `0.0.0.0`      |
/// | `PORT`          | `8000`         |
/// | `DATABASE_PATH` | `taskboard.db` |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let host = host
            .parse()
            .with_context(|| format!("HOST must be an IP address, got {host:?}"))?;

        let port = lookup("PORT").unwrap_or_else(|| "8000".into());
        let port = port
            .parse()
            .with_context(|| format!("PORT must be a valid u16, got {port:?}"))?;

        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("taskboard.db"));

        Ok(Self {
            host,
            port,
            database_path,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
