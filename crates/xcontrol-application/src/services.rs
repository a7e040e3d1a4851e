//! Wiring of every use case from an [`AppConfig`].

use crate::auth_gateway::AuthGateway;
use crate::cms_service::CmsService;
use crate::download_center::DownloadCenterService;
use crate::manifest_service::ManifestService;
use crate::user_center::UserCenterService;
use std::sync::Arc;
use xcontrol_core::cms::{CmsRegistry, CmsRuntime};
use xcontrol_core::config::{AppConfig, FeatureToggles};
use xcontrol_core::download::DownloadListingRepository;
use xcontrol_core::extension::ExtensionRegistry;
use xcontrol_core::manifest::ManifestRepository;
use xcontrol_core::session::{AccountService, CookiePolicy};
use xcontrol_infrastructure::{HttpAccountService, JsonManifestRepository, ManifestListingRepository};

/// Feature section gating application modules such as `/download`.
pub const APP_MODULES: &str = "appModules";

/// Shared, immutable handles to every use case.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub downloads: Arc<DownloadCenterService>,
    pub manifests: Arc<ManifestService>,
    pub cms: Arc<CmsService>,
    pub user_center: Arc<UserCenterService>,
    pub auth: Arc<AuthGateway>,
}

impl AppServices {
    /// Production wiring: file/HTTP manifests and the HTTP account service.
    pub fn from_config(config: AppConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: AppConfig) -> AppServicesBuilder {
        AppServicesBuilder {
            config,
            listings: None,
            manifests: None,
            account: None,
            cms_registry: None,
            extensions: None,
        }
    }

    pub fn features(&self) -> &FeatureToggles {
        &self.config.features
    }

    pub fn is_module_enabled(&self, path: &str) -> bool {
        self.config.features.is_enabled(APP_MODULES, path)
    }
}

/// Builder allowing individual adapters to be replaced (tests, tools).
pub struct AppServicesBuilder {
    config: AppConfig,
    listings: Option<Arc<dyn DownloadListingRepository>>,
    manifests: Option<Arc<dyn ManifestRepository>>,
    account: Option<Arc<dyn AccountService>>,
    cms_registry: Option<CmsRegistry>,
    extensions: Option<ExtensionRegistry>,
}

impl AppServicesBuilder {
    pub fn with_listing_repository(mut self, repository: Arc<dyn DownloadListingRepository>) -> Self {
        self.listings = Some(repository);
        self
    }

    pub fn with_manifest_repository(mut self, repository: Arc<dyn ManifestRepository>) -> Self {
        self.manifests = Some(repository);
        self
    }

    pub fn with_account_service(mut self, account: Arc<dyn AccountService>) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_cms_registry(mut self, registry: CmsRegistry) -> Self {
        self.cms_registry = Some(registry);
        self
    }

    pub fn with_extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn build(self) -> AppServices {
        let config = self.config;

        let listings = self.listings.unwrap_or_else(|| {
            Arc::new(ManifestListingRepository::from_config(&config.downloads))
        });
        let manifests = self
            .manifests
            .unwrap_or_else(|| Arc::new(JsonManifestRepository::from_config(&config.manifests)));
        let account = self.account.unwrap_or_else(|| {
            let api_base_url = config.account.api_base_url();
            tracing::info!("Account service API at {}", api_base_url);
            Arc::new(HttpAccountService::new(api_base_url))
        });

        let registry = self.cms_registry.unwrap_or_else(CmsRegistry::builtin);
        let runtime = CmsRuntime::new(Arc::new(registry), config.cms.clone());
        let extensions = self.extensions.unwrap_or_else(ExtensionRegistry::builtin);
        let cookies = CookiePolicy::new(config.account.cookie_secure());

        AppServices {
            downloads: Arc::new(DownloadCenterService::new(
                listings,
                config.downloads.remote_base.clone(),
            )),
            manifests: Arc::new(ManifestService::new(manifests)),
            cms: Arc::new(CmsService::new(runtime)),
            user_center: Arc::new(UserCenterService::new(extensions)),
            auth: Arc::new(AuthGateway::new(account, cookies)),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_toggles() {
        let mut config = AppConfig::default();
        config.features.set(APP_MODULES, "/download", false);
        let services = AppServices::from_config(config);
        assert!(!services.is_module_enabled("/download"));
        assert!(services.is_module_enabled("/docs"));
    }

    #[test]
    fn test_cookie_policy_follows_config() {
        let mut config = AppConfig::default();
        config.account.session_cookie_secure = Some(true);
        let services = AppServices::from_config(config);
        assert!(services.auth.cookie_policy().secure);
    }
}
