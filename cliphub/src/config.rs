//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CLIPHUB_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`, missing file is fine)
//! 2. **Environment variables** - Variables prefixed with `CLIPHUB_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CLIPHUB_CLIP__MAX_CONCURRENT=8` sets the `clip.max_concurrent` field.
//!
//! ## Configuration Structure
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 5000
//! enable_metrics: false
//! cors:
//!   allowed_origins: ["*"]
//! storage:
//!   uploads_dir: uploads
//!   clips_dir: trimmed
//! clip:
//!   ffmpeg_path: ffmpeg
//!   max_concurrent: 4
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CLIPHUB_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded from YAML and environment variables; every field has a default, so an
/// empty config file yields a working local setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Cross-origin access policy
    pub cors: CorsConfig,
    /// Storage roots for uploaded and clipped files
    pub storage: StorageConfig,
    /// External trim tool settings
    pub clip: ClipConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_metrics: false,
            cors: CorsConfig::default(),
            storage: StorageConfig::default(),
            clip: ClipConfig::default(),
        }
    }
}

/// CORS configuration for browser clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests; `"*"` allows any origin
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: None,
        }
    }
}

/// A single allowed CORS origin.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin (e.g., `https://app.example.com`)
    Origin(String),
}

impl Serialize for CorsOrigin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            CorsOrigin::Wildcard => serializer.serialize_str("*"),
            CorsOrigin::Origin(origin) => serializer.serialize_str(origin),
        }
    }
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

/// Storage roots for the two file areas.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding caller-uploaded original files
    pub uploads_dir: PathBuf,
    /// Directory holding trimmed clip outputs
    pub clips_dir: PathBuf,
    /// Maximum accepted upload body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            clips_dir: PathBuf::from("trimmed"),
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Settings for the external trim tool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipConfig {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,
    /// Maximum number of trim processes allowed to run at once
    pub max_concurrent: usize,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            max_concurrent: 4,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values.
            // CLIPHUB_CONFIG belongs to Args, not Config
            .merge(Env::prefixed("CLIPHUB_").ignore(&["config"]).split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        if self.clip.max_concurrent == 0 {
            return Err(Error::Internal {
                operation: "Config validation: clip.max_concurrent must be at least 1".to_string(),
            });
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(Error::Internal {
                operation: "Config validation: storage.max_upload_bytes must be at least 1".to_string(),
            });
        }

        // Clips stored in the uploads root would show up in the uploads listing
        if self.storage.uploads_dir == self.storage.clips_dir {
            return Err(Error::Internal {
                operation: "Config validation: storage.uploads_dir and storage.clips_dir must be different directories".to_string(),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
