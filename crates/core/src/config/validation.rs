//! Range and consistency checks run after every load.

use crate::config::AppConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Check a merged configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `scope` is not an http(s) URL
    /// - `generation` is empty
    /// - `entry_point` is not one of `core_assets`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scope = self.parsed_scope()?;

        if self.generation.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "generation".into(), reason: "must not be empty".into() });
        }

        let entry = scope
            .resolve(&self.entry_point)
            .map_err(|e| ConfigError::Invalid { field: "entry_point".into(), reason: e.to_string() })?;
        let mut seeds_entry = false;
        for asset in &self.core_assets {
            let resolved = scope
                .resolve(asset)
                .map_err(|e| ConfigError::Invalid { field: "core_assets".into(), reason: e.to_string() })?;
            seeds_entry |= resolved == entry;
        }
        if !seeds_entry {
            return Err(ConfigError::Invalid {
                field: "entry_point".into(),
                reason: "must be listed in core_assets so it is available offline".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if scope.base().scheme() == "http" && !matches!(scope.base().host_str(), Some("localhost" | "127.0.0.1")) {
            tracing::warn!(scope = %scope, "scope is served over plain http; browsers only allow this on localhost");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ConfigError>) -> Option<String> {
        match result {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_scope() {
        let config = AppConfig { scope: "ftp://example.com/".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("scope"));
    }

    #[test]
    fn test_validate_empty_generation() {
        let config = AppConfig { generation: "  ".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("generation"));
    }

    #[test]
    fn test_validate_entry_point_not_seeded() {
        let config = AppConfig { entry_point: "home.html".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("entry_point"));
    }

    #[test]
    fn test_validate_entry_point_matches_after_resolution() {
        let config = AppConfig {
            entry_point: "./index.html".into(),
            core_assets: vec!["index.html".into(), "sw.js".into()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("max_bytes"));
    }

    #[test]
    fn test_validate_max_bytes_exceeds_limit() {
        let config = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() }; // 51MB
        assert_eq!(field_of(config.validate()).as_deref(), Some("max_bytes"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
