use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::consts::{
    API_KEY_ENV_VARS, ARK_API_URL, DEFAULT_DURATION_SECS, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_OUTPUT_PATH, DEFAULT_POLL_INTERVAL, DEFAULT_PROMPT, DEFAULT_RESOLUTION,
    PLACEHOLDER_IMAGE_URL, SEEDANCE_PRO_MODEL, TEST_IMAGE_URL_ENV_VAR,
};
use crate::error::VideoTaskError;

/// Settings for a single run. Layered as defaults, then `i2v.toml` if
/// present, then `I2V_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub base_url: String,
    pub model: String,
    pub output_path: PathBuf,
    pub max_attempts: u32,
    pub poll_interval_secs: f64,
    pub prompt: String,
    pub duration_seconds: u32,
    pub resolution: String,
    pub camera_fixed: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, VideoTaskError> {
        Self::build(File::with_name("i2v").required(false))
    }

    pub fn from_file(path: &Path) -> Result<Self, VideoTaskError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, VideoTaskError>
    where
        S: ::config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .set_default("base_url", ARK_API_URL)?
            .set_default("model", SEEDANCE_PRO_MODEL)?
            .set_default("output_path", DEFAULT_OUTPUT_PATH)?
            .set_default("max_attempts", i64::from(DEFAULT_MAX_POLL_ATTEMPTS))?
            .set_default("poll_interval_secs", DEFAULT_POLL_INTERVAL.as_secs_f64())?
            .set_default("prompt", DEFAULT_PROMPT)?
            .set_default("duration_seconds", i64::from(DEFAULT_DURATION_SECS))?
            .set_default("resolution", DEFAULT_RESOLUTION)?
            .set_default("camera_fixed", false)?
            .add_source(file)
            .add_source(Environment::with_prefix("I2V").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn poll_interval(&self) -> Result<Duration, VideoTaskError> {
        Duration::try_from_secs_f64(self.poll_interval_secs).map_err(|e| {
            VideoTaskError::InvalidInput(format!(
                "poll_interval_secs {} is not a valid duration: {e}",
                self.poll_interval_secs
            ))
        })
    }
}

/// Bearer token for the Ark API. Never printed in full.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Resolves the API key through `lookup`, trying each accepted variable name
/// in order. Empty values count as unset.
pub fn api_key_from<F>(lookup: F) -> Result<ApiKey, VideoTaskError>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_ENV_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        .map(ApiKey::new)
        .ok_or_else(|| VideoTaskError::MissingCredential(API_KEY_ENV_VARS.join(" or ")))
}

pub fn image_url_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(TEST_IMAGE_URL_ENV_VAR)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string())
}
