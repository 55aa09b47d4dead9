//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. Request
//! handlers never read process-wide environment variables; the `*_from_env_value` helpers
//! below take the already-read `Option<String>` so they can be tested without touching the
//! environment.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_VISION_MAX_RETRIES, DEFAULT_VISION_MODEL,
    DEFAULT_VISION_TIMEOUT_SECS,
};
use crate::{VaultError, VaultResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deployment environment. Production hides the Swagger UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Settings for the external vision model.
#[derive(Clone, Debug)]
pub struct VisionSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Serve a fixed extraction instead of calling the model.
    pub mock: bool,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_VISION_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
            max_retries: DEFAULT_VISION_MAX_RETRIES,
            mock: false,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    vision: VisionSettings,
    environment: Environment,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] if the vision model name is blank or the
    /// timeout is zero.
    pub fn new(
        data_dir: PathBuf,
        vision: VisionSettings,
        environment: Environment,
    ) -> VaultResult<Self> {
        if vision.model.trim().is_empty() {
            return Err(VaultError::InvalidConfig(
                "vision model cannot be empty".into(),
            ));
        }
        if vision.timeout.is_zero() {
            return Err(VaultError::InvalidConfig(
                "vision timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            data_dir,
            vision,
            environment,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn vision(&self) -> &VisionSettings {
        &self.vision
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Names of settings that are required for full functionality but absent.
    ///
    /// The service still starts without them; callers log a warning per entry.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.vision.mock && self.vision.api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        missing
    }
}

/// Resolve and create the data directory.
///
/// `override_dir` wins when present; otherwise [`DEFAULT_DATA_DIR`] relative to the
/// working directory is used. The directory is created if it does not exist.
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> VaultResult<PathBuf> {
    let dir = override_dir
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    if dir.exists() && !dir.is_dir() {
        return Err(VaultError::InvalidConfig(format!(
            "data directory path is not a directory: {}",
            dir.display()
        )));
    }

    std::fs::create_dir_all(&dir).map_err(|e| {
        VaultError::InvalidConfig(format!(
            "failed to create data directory {}: {e}",
            dir.display()
        ))
    })?;

    Ok(dir)
}

/// Parse a boolean flag such as `MOCK_AI`. Only `true` (any case) enables it.
pub fn flag_from_env_value(value: Option<String>) -> bool {
    value
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Parse the deployment environment. Anything other than `production` is development.
pub fn environment_from_env_value(value: Option<String>) -> Environment {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("production") => Environment::Production,
        _ => Environment::Development,
    }
}

/// Parse an optional numeric setting, falling back to `default` when absent or blank.
///
/// # Errors
///
/// Returns [`VaultError::InvalidConfig`] naming `key` if the value is present but not a
/// valid number.
pub fn number_from_env_value<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> VaultResult<T> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| VaultError::InvalidConfig(format!("{key} must be a number, got '{v}'"))),
    }
}

/// Raw values of the vision-related environment variables, as read by a binary.
#[derive(Clone, Debug, Default)]
pub struct VisionEnv {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<String>,
    pub max_retries: Option<String>,
    pub mock: Option<String>,
}

impl VisionEnv {
    /// Reads the process environment. Call once at startup.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("VAULT_VISION_MODEL").ok(),
            timeout_secs: std::env::var("VAULT_VISION_TIMEOUT_SECS").ok(),
            max_retries: std::env::var("VAULT_VISION_MAX_RETRIES").ok(),
            mock: std::env::var("MOCK_AI").ok(),
        }
    }

    /// Resolves the raw values into [`VisionSettings`], applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] if the timeout or retry count is not a number.
    pub fn resolve(self) -> VaultResult<VisionSettings> {
        Ok(VisionSettings {
            api_key: non_blank(self.api_key),
            model: non_blank(self.model).unwrap_or_else(|| DEFAULT_VISION_MODEL.into()),
            timeout: Duration::from_secs(number_from_env_value(
                "VAULT_VISION_TIMEOUT_SECS",
                self.timeout_secs,
                DEFAULT_VISION_TIMEOUT_SECS,
            )?),
            max_retries: number_from_env_value(
                "VAULT_VISION_MAX_RETRIES",
                self.max_retries,
                DEFAULT_VISION_MAX_RETRIES,
            )?,
            mock: flag_from_env_value(self.mock),
        })
    }
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
