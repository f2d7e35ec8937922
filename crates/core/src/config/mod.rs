//! Worker configuration.
//!
//! Values are merged by figment: built-in defaults, then the TOML file named
//! by `OFFLINE_WORKER_CONFIG_FILE`, then `OFFLINE_WORKER_*` environment
//! variables. Later sources override earlier ones.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::Scope;

mod validation;

pub use validation::ConfigError;

/// Settings for one worker deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Registration scope every relative locator resolves against.
    ///
    /// Set via OFFLINE_WORKER_SCOPE environment variable.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Name of the current cache generation. Bump it on every deploy that
    /// changes cached asset semantics; older generations are purged on activate.
    ///
    /// Set via OFFLINE_WORKER_GENERATION environment variable.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Entry point document served as the offline navigation fallback.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Assets fetched and stored during install.
    #[serde(default = "default_core_assets")]
    pub core_assets: Vec<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via OFFLINE_WORKER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Title of push notifications.
    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    /// Activate as soon as install finishes, even while sessions are still
    /// controlled by an older generation. When false, activation waits until
    /// those sessions close.
    #[serde(default = "default_skip_waiting")]
    pub skip_waiting: bool,
}

fn default_scope() -> String {
    "http://localhost:8080/".into()
}

fn default_generation() -> String {
    "offline-worker-v1".into()
}

fn default_entry_point() -> String {
    "index.html".into()
}

fn default_core_assets() -> Vec<String> {
    vec!["index.html".into(), "manifest.json".into(), "sw.js".into()]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offline-worker-cache.sqlite")
}

fn default_user_agent() -> String {
    "offline-worker/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_notification_title() -> String {
    "Offline Worker".into()
}

fn default_skip_waiting() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            generation: default_generation(),
            entry_point: default_entry_point(),
            core_assets: default_core_assets(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            notification_title: default_notification_title(),
            skip_waiting: default_skip_waiting(),
        }
    }
}

impl AppConfig {
    /// Network timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed registration scope.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the scope is not an http(s) URL.
    pub fn parsed_scope(&self) -> Result<Scope, ConfigError> {
        Scope::parse(&self.scope).map_err(|e| ConfigError::Invalid { field: "scope".into(), reason: e.to_string() })
    }

    /// Merge defaults, the optional TOML file and the environment, then validate.
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadFailed` when a source cannot be read or parsed,
    /// `ConfigError::Invalid` when a merged value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFLINE_WORKER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFLINE_WORKER_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scope, "http://localhost:8080/");
        assert_eq!(config.generation, "offline-worker-v1");
        assert_eq!(config.entry_point, "index.html");
        assert_eq!(config.core_assets, vec!["index.html", "manifest.json", "sw.js"]);
        assert!(config.skip_waiting);
        assert_eq!(config.db_path, PathBuf::from("./offline-worker-cache.sqlite"));
        assert_eq!(config.user_agent, "offline-worker/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_parsed_scope() {
        let config = AppConfig { scope: "https://user.github.io/repo".into(), ..Default::default() };
        assert_eq!(config.parsed_scope().unwrap().base().as_str(), "https://user.github.io/repo/");
    }

    #[test]
    fn test_load_layers_env_over_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "worker.toml",
                r#"
                scope = "https://user.github.io/repo/"
                generation = "site-v1"
                "#,
            )?;
            jail.set_env("OFFLINE_WORKER_CONFIG_FILE", "worker.toml");
            jail.set_env("OFFLINE_WORKER_GENERATION", "site-v2");
            jail.set_env("OFFLINE_WORKER_SKIP_WAITING", "false");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.scope, "https://user.github.io/repo/");
            assert_eq!(config.generation, "site-v2");
            assert_eq!(config.entry_point, "index.html");
            assert!(!config.skip_waiting);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OFFLINE_WORKER_MAX_BYTES", "0");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
            Ok(())
        });
    }
}
