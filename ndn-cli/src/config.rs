//! `ClientConfig`: layered configuration for the demonstrator CLI.
//!
//! Grounded in the workspace's use of the `config` crate: layers are
//! applied in increasing precedence — built-in defaults, then a TOML
//! file, then `NDN_*` environment variables, then CLI flags overlaid by
//! the caller after loading. This mirrors how the management crate's
//! former QUIC options were assembled before being generalized away from
//! a concrete transport.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Configuration governing how the demonstrator talks to a forwarder and
/// sizes its local content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme-qualified transport endpoint, e.g. `unix:///run/ndn/nfd.sock`
    /// or `tcp://127.0.0.1:6363`. Only parsed, never dialed, by this crate.
    pub transport_uri: String,
    pub store_capacity: usize,
    pub default_freshness_ms: u64,
    pub max_packet_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport_uri: "unix:///run/ndn/nfd.sock".to_string(),
            store_capacity: 16,
            default_freshness_ms: 1000,
            max_packet_size: ndn_core::tlv::MAX_NDN_PACKET_SIZE,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from, in increasing precedence: built-in
    /// defaults, an optional TOML file at `path`, and `NDN_*` environment
    /// variables (e.g. `NDN_STORE_CAPACITY=64`).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&ClientConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        builder = builder.add_source(Environment::with_prefix("NDN").separator("_"));
        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_any_source() {
        let cfg = ClientConfig::load(None).unwrap();
        assert_eq!(cfg.store_capacity, 16);
        assert_eq!(cfg.transport_uri, "unix:///run/ndn/nfd.sock");
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("NDN_STORE_CAPACITY", "64");
        let cfg = ClientConfig::load(None).unwrap();
        std::env::remove_var("NDN_STORE_CAPACITY");
        assert_eq!(cfg.store_capacity, 64);
    }
}
