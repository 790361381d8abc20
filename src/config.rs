//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. Map tuning values have defaults and only need
//! to be set when experimenting with timings.

use crate::services::focus::{FocusSettings, RetryPolicy};
use crate::services::reveal::{DEFAULT_REVEAL_DURATION, DEFAULT_REVEAL_GRACE, DEFAULT_REVEAL_STEPS};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Base URL of the activity backend (e.g. https://xyz.supabase.co)
    pub backend_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Backend API key
    pub backend_api_key: String,

    /// Map viewport and animation tuning
    pub map: MapSettings,
}

/// Tuning for map sessions.
#[derive(Debug, Clone, Copy)]
pub struct MapSettings {
    /// Padding around fitted bounds, in pixels
    pub fit_padding_px: f64,
    /// Total wall-clock time of a route reveal
    pub reveal_duration: Duration,
    /// Number of reveal steps, independent of route length
    pub reveal_steps: u32,
    /// Pause after the last reveal step before the line is removed
    pub reveal_grace: Duration,
    /// Fetch attempts while a focus target is missing
    pub seek_attempts: u32,
    /// Delay before each seek attempt
    pub seek_delay: Duration,
    /// Close decoded routes into polygons (meters); `None` keeps them as-is
    pub close_threshold_meters: Option<f64>,
}

impl Default for MapSettings {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            fit_padding_px: crate::services::focus::DEFAULT_FIT_PADDING_PX,
            reveal_duration: DEFAULT_REVEAL_DURATION,
            reveal_steps: DEFAULT_REVEAL_STEPS,
            reveal_grace: DEFAULT_REVEAL_GRACE,
            seek_attempts: retry.attempts,
            seek_delay: retry.delay,
            close_threshold_meters: None,
        }
    }
}

impl MapSettings {
    pub fn focus_settings(&self) -> FocusSettings {
        FocusSettings {
            padding: self.fit_padding_px,
            reveal_duration: self.reveal_duration,
            retry: RetryPolicy {
                attempts: self.seek_attempts,
                delay: self.seek_delay,
            },
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            fit_padding_px: parse_var("FIT_PADDING_PX")?.unwrap_or(defaults.fit_padding_px),
            reveal_duration: parse_var("REVEAL_DURATION_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal_duration),
            reveal_steps: parse_var::<u32>("REVEAL_STEPS")?
                .map(|s| s.max(1))
                .unwrap_or(defaults.reveal_steps),
            reveal_grace: parse_var("REVEAL_GRACE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal_grace),
            seek_attempts: parse_var("SEEK_ATTEMPTS")?.unwrap_or(defaults.seek_attempts),
            seek_delay: parse_var("SEEK_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.seek_delay),
            close_threshold_meters: parse_var("POLYGON_CLOSE_THRESHOLD_M")?,
        })
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            backend_api_key: "test_api_key".to_string(),
            map: MapSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            backend_api_key: env::var("BACKEND_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_API_KEY"))?,
            map: MapSettings::from_env()?,
        })
    }
}

/// Read an optional variable, failing on a value that does not parse.
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
