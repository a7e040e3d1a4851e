//! Runtime service endpoints per environment and region.
//!
//! Layering, later wins:
//!
//! ```text
//! built-in defaults
//! runtime.base.toml
//! runtime.<env>.toml            # env = prod | sit
//! [regions.<region>] of the merged document
//! ```
//!
//! Keys use the serialized field names (`apiBaseUrl`, `authUrl`, ...).

use crate::env::EnvSource;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use xcontrol_core::config::{runtime_cache_key, RuntimeConfig, RuntimeEnvironment, RuntimeRegion};
use xcontrol_core::{Result, XControlError};

pub const ENVIRONMENT_ENV_VARS: &[&str] = &["RUNTIME_ENV", "NODE_ENV", "DENO_ENV"];
pub const REGION_ENV_VARS: &[&str] = &["RUNTIME_REGION", "REGION"];

/// Loads runtime configs and caches them by `environment:region`.
///
/// Entries are never invalidated; file changes require a restart.
pub struct RuntimeConfigService {
    dir: PathBuf,
    cache: RwLock<HashMap<String, RuntimeConfig>>,
}

impl RuntimeConfigService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Environment and region selected by the process environment.
    pub fn detect(env: &dyn EnvSource) -> (RuntimeEnvironment, RuntimeRegion) {
        (
            RuntimeEnvironment::parse(env.first(ENVIRONMENT_ENV_VARS).as_deref()),
            RuntimeRegion::parse(env.first(REGION_ENV_VARS).as_deref()),
        )
    }

    pub async fn load_for_env(&self, env: &dyn EnvSource) -> Result<RuntimeConfig> {
        let (environment, region) = Self::detect(env);
        self.load(environment, region).await
    }

    pub async fn load(
        &self,
        environment: RuntimeEnvironment,
        region: RuntimeRegion,
    ) -> Result<RuntimeConfig> {
        let key = runtime_cache_key(environment, region);
        if let Some(cached) = self.cache.read().await.get(&key) {
            return Ok(cached.clone());
        }

        let config = self.build(environment, region).await?;
        tracing::info!(
            "Runtime config resolved for {} (api: {}, auth: {})",
            key,
            config.api_base_url,
            config.auth_url
        );
        self.cache
            .write()
            .await
            .entry(key)
            .or_insert_with(|| config.clone());
        Ok(config)
    }

    async fn build(
        &self,
        environment: RuntimeEnvironment,
        region: RuntimeRegion,
    ) -> Result<RuntimeConfig> {
        let mut merged = match toml::Value::try_from(RuntimeConfig::default())? {
            toml::Value::Table(table) => table,
            _ => return Err(XControlError::internal("runtime defaults are not a table")),
        };

        merge_tables(&mut merged, read_table(&self.dir.join("runtime.base.toml")).await);
        merge_tables(
            &mut merged,
            read_table(&self.dir.join(format!("runtime.{}.toml", environment))).await,
        );

        if let Some(toml::Value::Table(mut regions)) = merged.remove("regions")
            && let Some(toml::Value::Table(overrides)) = regions.remove(region.as_str())
        {
            merge_tables(&mut merged, overrides);
        }

        merged.insert(
            "environment".to_string(),
            toml::Value::String(environment.as_str().to_string()),
        );
        merged.insert(
            "region".to_string(),
            toml::Value::String(region.as_str().to_string()),
        );

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| XControlError::config(e.to_string()))
    }
}

/// Reads a TOML table. Missing or invalid files yield an empty table.
async fn read_table(path: &Path) -> toml::Table {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return toml::Table::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return toml::Table::new();
        }
    };
    match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("Invalid runtime config {}, ignoring: {}", path.display(), e);
            toml::Table::new()
        }
    }
}

/// Deep merge: nested tables merge, every other value replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use tempfile::TempDir;

    #[test]
    fn test_detect() {
        let env = StaticEnv::new().with("NODE_ENV", "development").with("REGION", "china");
        assert_eq!(
            RuntimeConfigService::detect(&env),
            (RuntimeEnvironment::Sit, RuntimeRegion::Cn)
        );
        let env = StaticEnv::new()
            .with("RUNTIME_ENV", "production")
            .with("NODE_ENV", "development");
        assert_eq!(
            RuntimeConfigService::detect(&env),
            (RuntimeEnvironment::Prod, RuntimeRegion::Default)
        );
    }

    #[tokio::test]
    async fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let service = RuntimeConfigService::new(dir.path());
        let config = service
            .load(RuntimeEnvironment::Prod, RuntimeRegion::Default)
            .await
            .unwrap();
        assert_eq!(config.api_base_url, "https://api.svc.plus");
        assert_eq!(config.auth_url, "https://accounts.svc.plus");
        assert_eq!(config.dashboard_url, "https://console.svc.plus");
        assert_eq!(config.log_level, "info");
    }

    #[tokio::test]
    async fn test_layering_and_region_override() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("runtime.base.toml"),
            r#"
logLevel = "warn"
apiBaseUrl = "https://api.base"

[regions.cn]
apiBaseUrl = "https://api.cn"
"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("runtime.sit.toml"),
            "apiBaseUrl = \"https://api.sit\"\nlogLevel = \"debug\"\n",
        )
        .unwrap();

        let service = RuntimeConfigService::new(dir.path());
        let sit = service
            .load(RuntimeEnvironment::Sit, RuntimeRegion::Default)
            .await
            .unwrap();
        assert_eq!(sit.api_base_url, "https://api.sit");
        assert_eq!(sit.log_level, "debug");
        assert_eq!(sit.environment, RuntimeEnvironment::Sit);

        let prod_cn = service
            .load(RuntimeEnvironment::Prod, RuntimeRegion::Cn)
            .await
            .unwrap();
        assert_eq!(prod_cn.api_base_url, "https://api.cn");
        assert_eq!(prod_cn.log_level, "warn");
        assert_eq!(prod_cn.region, RuntimeRegion::Cn);
    }

    #[tokio::test]
    async fn test_results_are_cached() {
        let dir = TempDir::new().unwrap();
        let service = RuntimeConfigService::new(dir.path());
        let first = service
            .load(RuntimeEnvironment::Prod, RuntimeRegion::Global)
            .await
            .unwrap();

        std::fs::write(dir.path().join("runtime.prod.toml"), "apiBaseUrl = \"https://changed\"\n")
            .unwrap();
        let second = service
            .load(RuntimeEnvironment::Prod, RuntimeRegion::Global)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("runtime.base.toml"), "apiBaseUrl = ").unwrap();
        let service = RuntimeConfigService::new(dir.path());
        let config = service
            .load(RuntimeEnvironment::Prod, RuntimeRegion::Default)
            .await
            .unwrap();
        assert_eq!(config.api_base_url, "https://api.svc.plus");
    }

    #[test]
    fn test_merge_tables_deep() {
        let mut base: toml::Table = "a = 1\n[nested]\nx = 1\ny = 2\n".parse().unwrap();
        let overlay: toml::Table = "b = 2\n[nested]\ny = 3\n".parse().unwrap();
        merge_tables(&mut base, overlay);
        assert_eq!(base["a"].as_integer(), Some(1));
        assert_eq!(base["b"].as_integer(), Some(2));
        assert_eq!(base["nested"]["x"].as_integer(), Some(1));
        assert_eq!(base["nested"]["y"].as_integer(), Some(3));
    }
}
