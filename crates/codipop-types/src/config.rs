//! Application configuration types for Codipop.
//!
//! `AppConfig` represents the `config.toml` in the data directory that controls
//! the compositor endpoint, selection cap, daily quota, and request timeout.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use std::fmt;

/// Top-level configuration for the fitting client.
///
/// Loaded from `~/.codipop/config.toml`. All fields have sensible defaults.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// Compositor endpoint accepting the multipart try-on payload.
    #[serde(default = "default_compositor_url")]
    pub compositor_url: String,

    /// Optional bearer token for the compositor. Redacted from `Debug`.
    #[serde(default)]
    pub compositor_token: Option<SecretString>,

    /// Maximum number of garments selected in one session.
    #[serde(default = "default_max_selection")]
    pub max_selection: usize,

    /// Maximum compositor calls per local calendar day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Client-side timeout for a single compositor call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_compositor_url() -> String {
    "https://codipop-backend.onrender.com/try-on".to_string()
}

fn default_max_selection() -> usize {
    3
}

fn default_daily_limit() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("compositor_url", &self.compositor_url)
            .field(
                "compositor_token",
                &self.compositor_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_selection", &self.max_selection)
            .field("daily_limit", &self.daily_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compositor_url: default_compositor_url(),
            compositor_token: None,
            max_selection: default_max_selection(),
            daily_limit: default_daily_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
