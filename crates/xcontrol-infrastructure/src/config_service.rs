//! Configuration service implementation.
//!
//! Loads `xcontrol.toml`, then fills account settings the file leaves unset
//! from the environment.

use crate::env::EnvSource;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use xcontrol_core::config::AppConfig;
use xcontrol_core::session::parse_bool_flag;
use xcontrol_core::{Result, XControlError};

pub const ACCOUNT_URL_ENV_VARS: &[&str] = &["ACCOUNT_SERVICE_URL", "NEXT_PUBLIC_ACCOUNT_SERVICE_URL"];
pub const COOKIE_SECURE_ENV_VAR: &str = "SESSION_COOKIE_SECURE";

/// Configuration service that loads and caches the application configuration.
#[derive(Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    env: Arc<dyn EnvSource>,
    /// Cached configuration, populated on first access.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// `path = None` means no file: defaults plus environment.
    pub fn new(path: Option<PathBuf>, env: Arc<dyn EnvSource>) -> Self {
        Self {
            path,
            env,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the configuration, loading from file if not cached.
    pub async fn get_config(&self) -> Result<AppConfig> {
        {
            let cached = self.config.read().await;
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = self.load().await?;
        let mut cached = self.config.write().await;
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub async fn invalidate_cache(&self) {
        *self.config.write().await = None;
    }

    async fn load(&self) -> Result<AppConfig> {
        let mut config = match &self.path {
            Some(path) => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    XControlError::config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let config = Self::parse(&content)?;
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            None => {
                tracing::info!("No configuration file found, using defaults");
                AppConfig::default()
            }
        };
        apply_env_overrides(&mut config, self.env.as_ref());
        Ok(config)
    }

    /// Parses a TOML document into an [`AppConfig`].
    pub fn parse(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(|e| XControlError::config(e.to_string()))
    }
}

/// Fills unset account settings from the environment.
pub fn apply_env_overrides(config: &mut AppConfig, env: &dyn EnvSource) {
    if config.account.base_url.is_none() {
        config.account.base_url = env.first(ACCOUNT_URL_ENV_VARS);
    }
    if config.account.session_cookie_secure.is_none() {
        config.account.session_cookie_secure = env
            .first(&[COOKIE_SECURE_ENV_VAR])
            .and_then(|value| parse_bool_flag(&value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_path_uses_defaults_and_env() {
        let env = StaticEnv::new()
            .with("NEXT_PUBLIC_ACCOUNT_SERVICE_URL", "https://auth.example.com")
            .with(COOKIE_SECURE_ENV_VAR, "yes");
        let service = ConfigService::new(None, Arc::new(env));
        let config = service.get_config().await.unwrap();

        assert_eq!(config.account.api_base_url(), "https://auth.example.com/api/auth");
        assert!(config.account.cookie_secure());
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_file_values_win_over_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "0.0.0.0:9000"

[account]
base_url = "https://accounts.internal"
session_cookie_secure = false

[cms]
theme = "neon"
extensions = ["app-shell"]
"#
        )
        .unwrap();

        let env = StaticEnv::new()
            .with("ACCOUNT_SERVICE_URL", "https://ignored.example.com")
            .with(COOKIE_SECURE_ENV_VAR, "true");
        let service = ConfigService::new(Some(file.path().to_path_buf()), Arc::new(env));
        let config = service.get_config().await.unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.account.base_url(), "https://accounts.internal");
        assert!(!config.account.cookie_secure());
        assert_eq!(config.cms.theme, "neon");
        assert_eq!(config.cms.extensions, vec!["app-shell"]);
    }

    #[tokio::test]
    async fn test_unreadable_or_invalid_file_is_config_error() {
        let service = ConfigService::new(
            Some(PathBuf::from("/definitely/not/here/xcontrol.toml")),
            Arc::new(StaticEnv::new()),
        );
        let err = service.get_config().await.unwrap_err();
        assert!(matches!(err, XControlError::Config(_)));

        assert!(ConfigService::parse("[server\nbind=").is_err());
    }

    #[tokio::test]
    async fn test_config_is_cached_until_invalidated() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();
        let service = ConfigService::new(Some(file.path().to_path_buf()), Arc::new(StaticEnv::new()));
        assert_eq!(service.get_config().await.unwrap().logging.level, "debug");

        std::fs::write(file.path(), "[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(service.get_config().await.unwrap().logging.level, "debug");

        service.invalidate_cache().await;
        assert_eq!(service.get_config().await.unwrap().logging.level, "warn");
    }
}
