//! Configuration module
//!
//! Environment-driven configuration for the conversion service. Every knob
//! has a default so a bare `mediapress-api` starts locally; `validate()`
//! catches the combinations that would misbehave at runtime.

use std::env;

use crate::constants::{
    DEFAULT_ALLOWED_IMAGE_TYPES, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE_BYTES,
    DEFAULT_MAX_TOTAL_SIZE_BYTES, DEFAULT_QUALITY, DEFAULT_RATE_LIMIT_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_WEBP_METHOD, MAX_QUALITY, MIN_QUALITY,
};

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Auth
    pub api_key: String,
    // Rate limiting
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    // Upload limits
    pub max_files: usize,
    pub max_file_size_bytes: usize,
    pub max_total_size_bytes: usize,
    pub allowed_image_types: Vec<String>,
    // Image conversion
    pub default_quality: u8,
    pub webp_method: u8,
    pub preserve_metadata: bool,
    pub auto_orient: bool,
    pub max_image_dimension: Option<u32>,
    // Video conversion
    pub ffmpeg_path: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list_or(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(v) => v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Best effort; absence of a .env file is not an error.
        dotenvy::dotenv().ok();

        Ok(Self {
            server_port: env_parse_or("SERVER_PORT", 8000),
            cors_origins: env_list_or("CORS_ORIGINS", &["http://localhost:3000"]),
            environment: env_or("ENVIRONMENT", "development"),
            api_key: env_or("API_KEY", "changeme"),
            rate_limit_requests: env_parse_or("RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS),
            rate_limit_window_secs: env_parse_or(
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            ),
            max_files: env_parse_or("MAX_FILES", DEFAULT_MAX_FILES),
            max_file_size_bytes: env_parse_or("MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE_BYTES),
            max_total_size_bytes: env_parse_or(
                "MAX_TOTAL_SIZE_BYTES",
                DEFAULT_MAX_TOTAL_SIZE_BYTES,
            ),
            allowed_image_types: env_list_or("ALLOWED_IMAGE_TYPES", DEFAULT_ALLOWED_IMAGE_TYPES),
            default_quality: env_parse_or("DEFAULT_QUALITY", DEFAULT_QUALITY),
            webp_method: env_parse_or("WEBP_METHOD", DEFAULT_WEBP_METHOD),
            preserve_metadata: env_parse_or("PRESERVE_METADATA", true),
            auto_orient: env_parse_or("AUTO_ORIENT", true),
            max_image_dimension: env::var("MAX_IMAGE_DIMENSION")
                .ok()
                .and_then(|v| v.parse().ok()),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_key.is_empty() {
            anyhow::bail!("API_KEY must not be empty");
        }
        if self.is_production() && self.api_key == "changeme" {
            anyhow::bail!("API_KEY must be changed from the default in production");
        }
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.default_quality) {
            anyhow::bail!(
                "DEFAULT_QUALITY must be between {} and {}",
                MIN_QUALITY,
                MAX_QUALITY
            );
        }
        if self.webp_method > 6 {
            anyhow::bail!("WEBP_METHOD must be between 0 and 6");
        }
        if self.rate_limit_requests == 0 || self.rate_limit_window_secs == 0 {
            anyhow::bail!("rate limit threshold and window must be non-zero");
        }
        if self.max_files == 0 {
            anyhow::bail!("MAX_FILES must be at least 1");
        }
        if self.max_file_size_bytes > self.max_total_size_bytes {
            anyhow::bail!("MAX_FILE_SIZE_BYTES cannot exceed MAX_TOTAL_SIZE_BYTES");
        }
        if self.allowed_image_types.is_empty() {
            anyhow::bail!("ALLOWED_IMAGE_TYPES must not be empty");
        }
        if self.api_key == "changeme" {
            tracing::warn!("API_KEY is the default value; set it before exposing the service");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
