//! Client configuration
//!
//! Settings are layered: built-in defaults, then an optional file
//! (TOML, YAML or JSON by extension), then `BIOMENTOR_*` environment variables.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "BIOMENTOR";

/// Configuration for the BioMentor API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the quiz resource API
    pub mcq_url: String,

    /// Base URL of the login/refresh authority
    pub auth_url: String,

    /// Request timeout in seconds (0 disables the timeout)
    #[serde(default)]
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mcq_url: "http://localhost:8000".to_string(),
            auth_url: "http://localhost:8001".to_string(),
            timeout_secs: 0,
            user_agent: format!("biomentor-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load configuration from file, with environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the result is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Load defaults, then the optional file, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error if any layer fails to parse or the merged config is invalid
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("mcq_url", defaults.mcq_url)?
            .set_default("auth_url", defaults.auth_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("user_agent", defaults.user_agent)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both base URLs are absolute http(s) URLs
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the offending field
    pub fn validate(&self) -> CoreResult<()> {
        for (field, value) in [("mcq_url", &self.mcq_url), ("auth_url", &self.auth_url)] {
            let url = Url::parse(value)
                .map_err(|e| CoreError::invalid_config(format!("{field}: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(CoreError::invalid_config(format!(
                    "{field}: unsupported scheme '{}'",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Render as a TOML document for `config init` and `config show`
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] if the value cannot be encoded
    pub fn to_toml_string(&self) -> CoreResult<String> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!(
            "# BioMentor client configuration (timeout_secs = 0 disables the timeout)\n{body}"
        ))
    }
}
