use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Destination port for queries.
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Per-attempt receive timeout in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Total sends per exchange, including the first.
    #[serde(default = "default_query_attempts")]
    pub query_attempts: u32,

    /// CNAME indirection budget for a top-level lookup.
    #[serde(default = "default_max_indirection")]
    pub max_indirection: i32,

    /// Overrides the built-in root server hints when non-empty.
    #[serde(default)]
    pub root_hints: Vec<RootHint>,
}

/// A well-known root server: name plus IPv4 address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RootHint {
    pub name: String,
    pub address: Ipv4Addr,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_dns_port() -> u16 {
    53
}
fn default_query_timeout_ms() -> u64 {
    5000
}
fn default_query_attempts() -> u32 {
    3
}
fn default_max_indirection() -> i32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            dns_port: default_dns_port(),
            query_timeout_ms: default_query_timeout_ms(),
            query_attempts: default_query_attempts(),
            max_indirection: default_max_indirection(),
            root_hints: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
