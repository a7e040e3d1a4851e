//! Infrastructure layer: configuration loading, manifest sources and the
//! account-service HTTP client.

pub mod account_client;
pub mod config_service;
pub mod env;
pub mod manifest_repository;
pub mod manifest_source;
pub mod paths;
pub mod runtime_config;

pub use account_client::HttpAccountService;
pub use config_service::ConfigService;
pub use env::{EnvSource, ProcessEnv, StaticEnv};
pub use manifest_repository::{JsonManifestRepository, ManifestListingRepository};
pub use manifest_source::ManifestSource;
pub use paths::XControlPaths;
pub use runtime_config::RuntimeConfigService;
