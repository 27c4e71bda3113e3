//! API configuration.

use std::path::PathBuf;

use pillcount_models::{ServiceVariant, VariantParseError};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size; `None` leaves uploads unbounded
    pub max_body_size: Option<usize>,
    /// Environment (development/production)
    pub environment: String,
    /// Directory served under `/public`
    pub public_dir: PathBuf,
    /// Landing page served at `/`
    pub index_path: PathBuf,
    /// Label style and extraction strategy
    pub variant: ServiceVariant,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: None,
            environment: "development".to_string(),
            public_dir: PathBuf::from("public"),
            index_path: PathBuf::from("templates/index.html"),
            variant: ServiceVariant::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, VariantParseError> {
        let defaults = Self::default();
        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE").ok().and_then(|s| s.parse().ok()),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            public_dir: std::env::var_os("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            index_path: std::env::var_os("INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_path),
            variant: ServiceVariant::from_env()?,
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Directory listed by `/demo-images`.
    pub fn demo_dir(&self) -> PathBuf {
        self.public_dir.join("demo_images")
    }
}
