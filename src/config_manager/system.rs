use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// System configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(rename = "conf_version")]
    #[serde(default = "default_conf_version")]
    pub conf_version: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_conf_version() -> String {
    "v1.0.0".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    12480
}

impl SystemConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = if self.host == "localhost" { "127.0.0.1" } else { self.host.as_str() };
        let ip: IpAddr = host
            .parse()
            .with_context(|| format!("Invalid host address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            conf_version: default_conf_version(),
            host: default_host(),
            port: default_port(),
        }
    }
}
