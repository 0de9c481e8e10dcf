use crate::translation::DEFAULT_API_URL;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation endpoint
    pub translate_api_url: String,
    pub request_timeout: Duration,

    // Memoized translations kept per context
    pub cache_capacity: usize,

    // Where the language preference is persisted
    pub preferences_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("TRANSLATE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(10),
            ),
            cache_capacity: std::env::var("TRANSLATE_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            preferences_file: std::env::var("PREFERENCES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/preferences.json")),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            cache_capacity: 1024,
            preferences_file: PathBuf::from("data/preferences.json"),
        }
    }
}
