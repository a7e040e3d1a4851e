//! Application configuration model (`xcontrol.toml`).
//!
//! Loading lives in `xcontrol-infrastructure`; this module only defines the
//! shape, defaults and the pure lookups on top of it.

use crate::cms::CmsConfig;
use crate::download::DEFAULT_REMOTE_BASE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_ACCOUNT_SERVICE_URL: &str = "https://accounts.svc.plus";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub account: AccountConfig,
    pub downloads: DownloadsConfig,
    pub manifests: ManifestsConfig,
    pub cms: CmsConfig,
    pub features: FeatureToggles,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// External account service.
///
/// Unset fields are filled from the environment at load time.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AccountConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie_secure: Option<bool>,
}

impl AccountConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_ACCOUNT_SERVICE_URL)
    }

    /// `<base_url>/api/auth`, without a doubled slash.
    pub fn api_base_url(&self) -> String {
        format!("{}/api/auth", self.base_url().trim_end_matches('/'))
    }

    pub fn cookie_secure(&self) -> bool {
        self.session_cookie_secure.unwrap_or(false)
    }
}

/// Directory listing manifests. Values are local paths or `http(s)://` URLs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DownloadsConfig {
    pub primary_manifest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_manifest: Option<String>,
    pub remote_base: String,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            primary_manifest: "public/dl-index/artifacts-manifest.json".to_string(),
            fallback_manifest: Some("public/dl-index/all.json".to_string()),
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ManifestsConfig {
    pub template_manifest: String,
    pub docs_index: String,
    pub downloads_index: String,
}

impl Default for ManifestsConfig {
    fn default() -> Self {
        Self {
            template_manifest: "public/_build/template-manifest.json".to_string(),
            docs_index: "public/_build/docs_index.json".to_string(),
            downloads_index: "public/dl-index/all.json".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// `[features.<section>] "<path>" = bool`.
///
/// A toggle that is not configured counts as enabled.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct FeatureToggles(BTreeMap<String, BTreeMap<String, bool>>);

impl FeatureToggles {
    pub fn is_enabled(&self, section: &str, path: &str) -> bool {
        self.0
            .get(section)
            .and_then(|toggles| toggles.get(path))
            .copied()
            .unwrap_or(true)
    }

    pub fn set(&mut self, section: impl Into<String>, path: impl Into<String>, enabled: bool) {
        self.0
            .entry(section.into())
            .or_default()
            .insert(path.into(), enabled);
    }
}

// ============================================================================
// Runtime environment
// ============================================================================

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Prod,
    Sit,
}

impl RuntimeEnvironment {
    /// `sit|staging|test|dev|development` select SIT; anything else is prod.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("sit" | "staging" | "test" | "dev" | "development") => RuntimeEnvironment::Sit,
            _ => RuntimeEnvironment::Prod,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeEnvironment::Prod => "prod",
            RuntimeEnvironment::Sit => "sit",
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeRegion {
    #[default]
    Default,
    Cn,
    Global,
}

impl RuntimeRegion {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("cn" | "china") => RuntimeRegion::Cn,
            Some("global") => RuntimeRegion::Global,
            _ => RuntimeRegion::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeRegion::Default => "default",
            RuntimeRegion::Cn => "cn",
            RuntimeRegion::Global => "global",
        }
    }
}

impl fmt::Display for RuntimeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service endpoints resolved for one environment and region.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub api_base_url: String,
    pub auth_url: String,
    pub dashboard_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_api_base_url: Option<String>,
    pub log_level: String,
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    #[serde(default)]
    pub region: RuntimeRegion,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.svc.plus".to_string(),
            auth_url: DEFAULT_ACCOUNT_SERVICE_URL.to_string(),
            dashboard_url: "https://console.svc.plus".to_string(),
            internal_api_base_url: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            environment: RuntimeEnvironment::Prod,
            region: RuntimeRegion::Default,
        }
    }
}

/// Cache key of a resolved runtime config.
pub fn runtime_cache_key(environment: RuntimeEnvironment, region: RuntimeRegion) -> String {
    format!("{}:{}", environment, region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.account.api_base_url(), "https://accounts.svc.plus/api/auth");
        assert!(!config.account.cookie_secure());
        assert_eq!(config.downloads.remote_base, "https://dl.svc.plus");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.cms.template, "default");
    }

    #[test]
    fn test_feature_toggles() {
        let config: AppConfig = toml::from_str(
            r#"
            [features.appModules]
            "/download" = false
            "/docs" = true
            "#,
        )
        .unwrap();
        assert!(!config.features.is_enabled("appModules", "/download"));
        assert!(config.features.is_enabled("appModules", "/docs"));
        assert!(config.features.is_enabled("appModules", "/unlisted"));
        assert!(config.features.is_enabled("cmsExperience", "/homepage/dynamic"));
    }

    #[test]
    fn test_account_base_url_trailing_slash() {
        let account = AccountConfig {
            base_url: Some("https://auth.example.com/".to_string()),
            session_cookie_secure: Some(true),
        };
        assert_eq!(account.api_base_url(), "https://auth.example.com/api/auth");
        assert!(account.cookie_secure());
    }

    #[test]
    fn test_environment_and_region_parsing() {
        assert_eq!(RuntimeEnvironment::parse(Some(" Staging ")), RuntimeEnvironment::Sit);
        assert_eq!(RuntimeEnvironment::parse(Some("development")), RuntimeEnvironment::Sit);
        assert_eq!(RuntimeEnvironment::parse(Some("production")), RuntimeEnvironment::Prod);
        assert_eq!(RuntimeEnvironment::parse(None), RuntimeEnvironment::Prod);
        assert_eq!(RuntimeRegion::parse(Some("China")), RuntimeRegion::Cn);
        assert_eq!(RuntimeRegion::parse(Some("global")), RuntimeRegion::Global);
        assert_eq!(RuntimeRegion::parse(Some("eu")), RuntimeRegion::Default);
        assert_eq!(
            runtime_cache_key(RuntimeEnvironment::Sit, RuntimeRegion::Cn),
            "sit:cn"
        );
    }
}
