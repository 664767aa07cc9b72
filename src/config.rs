//! Layered configuration.
//!
//! Sources are merged in order, later ones winning: built-in defaults, a
//! JSON config file (`bundlescope.config.json` in the working directory, or
//! an explicit path), then `BUNDLESCOPE_*` environment variables.
//!
//! ```json
//! {
//!   "reasons": {
//!     "import() prefetch": "lazy",
//!     "custom loader": "static"
//!   }
//! }
//! ```

use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::graph::{ReasonBehavior, ReasonTable};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bundlescope.config.json";

/// Prefix of the environment variables merged over the file.
pub const ENV_PREFIX: &str = "BUNDLESCOPE_";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Figment(#[from] figment::Error),
}

/// Graph construction settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Extra or overriding reason type classifications.
    #[serde(default)]
    pub reasons: BTreeMap<String, ReasonBehavior>,
}

impl GraphConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist. Without one, the default file is used
    /// only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));
        Ok(figment.extract()?)
    }

    /// Parse configuration from a JSON string over the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Json::string(json))
            .extract()?;
        Ok(config)
    }

    /// The built-in reason table with this configuration's overrides applied.
    pub fn reason_table(&self) -> ReasonTable {
        ReasonTable::with_overrides(&self.reasons)
    }
}
