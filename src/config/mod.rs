//! Settings file for the validator

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::error::{ConfigError, Result};

/// Optional defaults read from a YAML file. Command-line flags win over
/// anything set here.
///
/// ```yaml
/// server_url: http://localhost:8081
/// tests: [aep-133-create, aep-135-delete-resource]
/// timeout_secs: 30
/// format: json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Server URL used instead of the one in the API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Tests to run when `--tests` is not given
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<String>,

    /// Per-request timeout; no timeout when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Output format when `--format` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl Settings {
    /// Default settings path: `<config dir>/aep-e2e-validator/settings.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aep-e2e-validator").join("settings.yaml"))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default path is read if
    /// present and defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("timeout_secs must be greater than 0".into()).into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
