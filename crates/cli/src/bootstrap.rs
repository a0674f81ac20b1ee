use std::net::Ipv4Addr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rootwalk_domain::{Config, RootHint};

/// Command-line values that take precedence over the configuration file.
pub struct CliOverrides {
    pub timeout_ms: Option<u64>,
    pub attempts: Option<u32>,
    pub max_indirection: Option<i32>,
    pub log_level: Option<String>,
    pub server: Option<Ipv4Addr>,
}

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&text).with_context(|| format!("parsing config file {path}"))?
        }
        None => Config::default(),
    };

    if let Some(timeout_ms) = overrides.timeout_ms {
        config.resolver.query_timeout_ms = timeout_ms;
    }
    if let Some(attempts) = overrides.attempts {
        config.resolver.query_attempts = attempts;
    }
    if let Some(max_indirection) = overrides.max_indirection {
        config.resolver.max_indirection = max_indirection;
    }
    if let Some(level) = overrides.log_level {
        config.logging.level = level;
    }
    if let Some(address) = overrides.server {
        // A single synthetic hint: resolution starts at this server.
        config.resolver.root_hints = vec![RootHint {
            name: address.to_string(),
            address,
        }];
    }
    Ok(config)
}

pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
