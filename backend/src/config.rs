//! Server configuration
//!
//! Read from the process environment after `.env` has been loaded:
//!
//! | Variable           | Default   |
//! |--------------------|-----------|
//! | `BIND_ADDR`        | `0.0.0.0` |
//! | `PORT`             | `3001`    |
//! | `ROOM_CODE_LENGTH` | `6`       |

use anyhow::{bail, Context};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ROOM_CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub room_code_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            room_code_length: DEFAULT_ROOM_CODE_LENGTH,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = ServerConfig::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid BIND_ADDR {addr:?}"))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("Invalid PORT {port:?}"))?;
        }
        if let Some(len) = lookup("ROOM_CODE_LENGTH") {
            config.room_code_length = len
                .parse()
                .with_context(|| format!("Invalid ROOM_CODE_LENGTH {len:?}"))?;
        }

        if !(4..=12).contains(&config.room_code_length) {
            bail!(
                "ROOM_CODE_LENGTH must be between 4 and 12, got {}",
                config.room_code_length
            );
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
