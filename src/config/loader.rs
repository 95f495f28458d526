//! Configuration loading.
//!
//! Settings come from an optional YAML file, then from `SALARY_*`
//! environment variables. Nested keys use a double underscore, so
//! `SALARY_LICENSE__SERVER_URL` sets `license.server_url`.

use std::fs;
use std::path::Path;

use config::{Config, Environment};

use crate::error::{EngineError, EngineResult};

use super::types::AppConfig;

/// Prefix of environment variables that override the configuration.
pub const ENV_PREFIX: &str = "SALARY";

const ENV_SOURCE: &str = "environment";

impl AppConfig {
    /// Loads the configuration from `path` (if given) and the process
    /// environment.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use salary_engine::config::AppConfig;
    /// use std::path::Path;
    ///
    /// let config = AppConfig::load(Some(Path::new("./config/salary.yaml")))?;
    /// println!("Listening on {}", config.bind_addr);
    /// # Ok::<(), salary_engine::error::EngineError>(())
    /// ```
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading overrides from `env` instead of
    /// the process environment when it is given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> EngineResult<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        let parse_error = |e: config::ConfigError| EngineError::ConfigParseError {
            path: ENV_SOURCE.to_string(),
            message: e.to_string(),
        };

        Config::builder()
            .add_source(Config::try_from(&base).map_err(parse_error)?)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(parse_error)
    }

    /// Reads a YAML configuration file. Missing keys take their defaults.
    pub fn from_yaml_file(path: &Path) -> EngineResult<Self> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
