//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// HTTP port for the JSON API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Version reported by `/health`.
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            version: default_version(),
        }
    }
}

impl ServerConfig {
    /// `address:port` for the listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub(crate) const fn default_http_port() -> u16 {
    8080
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
