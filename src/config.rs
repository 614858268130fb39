// Runtime configuration, read from environment variables

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::format::DEFAULT_CURRENCY;

pub const ENV_ADDR: &str = "DASHBOARD_ADDR";
pub const ENV_LOG: &str = "DASHBOARD_LOG";
pub const ENV_MAX_SESSIONS: &str = "DASHBOARD_MAX_SESSIONS";
pub const ENV_CURRENCY: &str = "DASHBOARD_CURRENCY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// Default tracing filter when RUST_LOG is not set
    pub log_filter: String,

    /// Live sessions kept before the least recently used one is dropped
    pub max_sessions: usize,

    /// Symbol used when formatting amounts
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_filter: "info".to_string(),
            max_sessions: 1000,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map (unset keys fall back to defaults)
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(addr) = vars.get(ENV_ADDR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", ENV_ADDR, addr))?;
        }

        if let Some(filter) = vars.get(ENV_LOG) {
            config.log_filter = filter.clone();
        }

        if let Some(max) = vars.get(ENV_MAX_SESSIONS) {
            config.max_sessions = max
                .parse()
                .with_context(|| format!("{} must be a positive integer: {}", ENV_MAX_SESSIONS, max))?;
            if config.max_sessions == 0 {
                anyhow::bail!("{} must be at least 1", ENV_MAX_SESSIONS);
            }
        }

        if let Some(symbol) = vars.get(ENV_CURRENCY) {
            config.currency = symbol.clone();
        }

        Ok(config)
    }
}
