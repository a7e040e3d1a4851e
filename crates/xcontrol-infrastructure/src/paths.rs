//! Configuration file discovery.
//!
//! Lookup order for `xcontrol.toml`:
//!
//! ```text
//! --config <path>                      # explicit, must exist
//! $XCONTROL_CONFIG                     # explicit, must exist
//! ./xcontrol.toml                      # working directory
//! ~/.config/xcontrol/xcontrol.toml     # platform config dir
//! ```
//!
//! When nothing is found the built-in defaults apply.

use crate::env::EnvSource;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "xcontrol.toml";
pub const CONFIG_ENV_VAR: &str = "XCONTROL_CONFIG";
const APP_DIR_NAME: &str = "xcontrol";

pub struct XControlPaths;

impl XControlPaths {
    /// `~/.config/xcontrol` (or the platform equivalent).
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Resolves the configuration file to load, if any.
    ///
    /// An explicit path (argument or environment) is returned even if it does
    /// not exist so that loading reports it; implicit locations are only
    /// returned when present.
    pub fn config_file(explicit: Option<&Path>, env: &dyn EnvSource) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = env.first(&[CONFIG_ENV_VAR]) {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        Self::config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Directory holding `runtime.*.toml`: next to the config file, or the
    /// working directory.
    pub fn runtime_config_dir(config_file: Option<&Path>) -> PathBuf {
        config_file
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
