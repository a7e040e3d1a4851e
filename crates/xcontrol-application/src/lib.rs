//! Application layer for XControl.
//!
//! Use cases that coordinate the domain (`xcontrol-core`) with its
//! infrastructure adapters: the download center, manifests, CMS page
//! composition, user-center routing and the auth gateway.

pub mod auth_gateway;
pub mod cms_service;
pub mod download_center;
pub mod manifest_service;
pub mod services;
pub mod user_center;

pub use auth_gateway::{AuthGateway, GatewayResponse};
pub use cms_service::{CmsOverview, CmsService};
pub use download_center::{DownloadCenterService, DownloadHome};
pub use manifest_service::ManifestService;
pub use services::{AppServices, AppServicesBuilder};
pub use user_center::{PanelLink, PanelRoute, UserCenterService};
