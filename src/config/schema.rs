//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the director.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the director.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DirectorConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Advertisement registry settings.
    pub registry: RegistryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8444").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8444".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Which namespace index backs the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Segment-indexed prefix tree.
    #[default]
    Trie,
    /// Full scan over every namespace.
    Linear,
}

/// Registry and expiration settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// How long an advertisement stays valid without being repeated.
    pub advertisement_ttl_secs: u64,

    /// How often the expiration sweeper runs.
    pub sweep_interval_secs: u64,

    /// Index strategy. Changing it requires a restart.
    pub index: IndexKind,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            advertisement_ttl_secs: 15 * 60,
            sweep_interval_secs: 60,
            index: IndexKind::Trie,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum advertisement body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: DirectorConfig = toml::from_str("").unwrap();
        assert_eq!(config, DirectorConfig::default());
        assert_eq!(config.registry.advertisement_ttl_secs, 900);
        assert_eq!(config.registry.index, IndexKind::Trie);
    }

    #[test]
    fn test_partial_sections() {
        let config: DirectorConfig = toml::from_str(
            r#"
            [registry]
            advertisement_ttl_secs = 120
            index = "linear"

            [admin]
            enabled = true
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.registry.advertisement_ttl_secs, 120);
        assert_eq!(config.registry.sweep_interval_secs, 60);
        assert_eq!(config.registry.index, IndexKind::Linear);
        assert!(config.admin.enabled);
        assert_eq!(config.listener, ListenerConfig::default());
    }
}
