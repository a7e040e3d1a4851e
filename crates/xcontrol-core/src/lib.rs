//! Domain layer of the XControl dashboard backend.
//!
//! Holds the models and pure logic (download section building, CMS
//! composition, session normalization) plus the repository/service traits
//! implemented by `xcontrol-infrastructure`.

pub mod cms;
pub mod config;
pub mod download;
pub mod error;
pub mod extension;
pub mod manifest;
pub mod session;

// Re-export common error type
pub use error::{Result, XControlError};
