//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default Drive REST endpoint.
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com";

/// Default generative-text REST endpoint.
pub const DEFAULT_AI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default generative model id.
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Directory holding the local store file
    pub data_dir: PathBuf,
    /// Base URL of the Drive API
    pub drive_api_base: String,
    /// Base URL of the generative-text API
    pub ai_api_base: String,
    /// API key for the generative-text API; completion is disabled without it
    pub ai_api_key: Option<String>,
    /// Generative model id
    pub ai_model: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATA_DIR` - Local store directory (default: ./data)
    /// - `DRIVE_API_BASE` - Drive API base URL
    /// - `AI_API_BASE` - Generative API base URL
    /// - `AI_API_KEY` - Generative API key (default: unset)
    /// - `AI_MODEL` - Generative model id (default: gemini-1.5-flash)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            drive_api_base: env::var("DRIVE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_DRIVE_API_BASE.to_string()),
            ai_api_base: env::var("AI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_AI_API_BASE.to_string()),
            ai_api_key: env::var("AI_API_KEY").ok().filter(|v| !v.trim().is_empty()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
        }
    }

    /// Path of the JSON file backing the local store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("local_store.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            data_dir: PathBuf::from("./data"),
            drive_api_base: DEFAULT_DRIVE_API_BASE.to_string(),
            ai_api_base: DEFAULT_AI_API_BASE.to_string(),
            ai_api_key: None,
            ai_model: DEFAULT_AI_MODEL.to_string(),
        }
    }
}
