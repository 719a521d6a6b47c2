//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTL and intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DirectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DirectorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("sweep interval ({interval}s) must not exceed the advertisement TTL ({ttl}s)")]
    SweepSlowerThanTtl { interval: u64, ttl: u64 },

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &DirectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }

    let registry = &config.registry;
    if registry.advertisement_ttl_secs == 0 {
        errors.push(ValidationError::Zero { field: "registry.advertisement_ttl_secs" });
    }
    if registry.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "registry.sweep_interval_secs" });
    }
    if registry.advertisement_ttl_secs > 0
        && registry.sweep_interval_secs > registry.advertisement_ttl_secs
    {
        errors.push(ValidationError::SweepSlowerThanTtl {
            interval: registry.sweep_interval_secs,
            ttl: registry.advertisement_ttl_secs,
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&DirectorConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = DirectorConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.registry.advertisement_ttl_secs = 0;
        config.admin.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingAdminKey));
        assert!(errors.contains(&ValidationError::Zero {
            field: "registry.advertisement_ttl_secs"
        }));
    }

    #[test]
    fn test_sweep_interval_bounded_by_ttl() {
        let mut config = DirectorConfig::default();
        config.registry.advertisement_ttl_secs = 30;
        config.registry.sweep_interval_secs = 60;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::SweepSlowerThanTtl { interval: 60, ttl: 30 }]);
        assert_eq!(
            errors[0].to_string(),
            "sweep interval (60s) must not exceed the advertisement TTL (30s)"
        );
    }
}
