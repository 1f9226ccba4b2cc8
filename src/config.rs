use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 3660,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Ceiling forwarded to the LP solver
    pub time_limit_seconds: u64,
    /// Largest horizon accepted over HTTP
    pub max_horizon_hours: usize,
    /// Horizon above which a size warning is logged
    pub horizon_warning_hours: usize,
    /// Solves allowed in flight over HTTP; extra requests get a 503
    pub max_concurrent_solves: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 3600,
            max_horizon_hours: 8760,
            horizon_warning_hours: 168,
            max_concurrent_solves: 4,
        }
    }
}

impl OptimizerConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("HVAC__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("invalid configuration")?;
        if cfg.optimizer.time_limit_seconds == 0 {
            anyhow::bail!("optimizer.time_limit_seconds must be positive");
        }
        if cfg.optimizer.max_concurrent_solves == 0 {
            anyhow::bail!("optimizer.max_concurrent_solves must be positive");
        }
        Ok(cfg)
    }
}
