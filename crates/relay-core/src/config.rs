//! Configuration module
//!
//! Environment-driven configuration for the relay: server settings, Shopify
//! Admin API credentials, per-kind size limits, and the timing knobs for
//! readiness polling and job retention.

use std::env;
use std::time::Duration;

const MAX_IMAGE_SIZE_MB: usize = 10;
const MAX_VIDEO_SIZE_MB: usize = 100;
const MAX_FILE_SIZE_MB: usize = 100;
const POLL_INTERVAL_MS: u64 = 5000;
const POLL_MAX_ATTEMPTS: u32 = 30;
const JOB_RETENTION_SECS: u64 = 3600;
const SWEEP_INTERVAL_SECS: u64 = 3600;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Shopify Admin API
    pub shopify_store_domain: String,
    pub shopify_access_token: String,
    pub shopify_api_version: String,
    // Per-kind upload size limits
    pub max_image_size_bytes: usize,
    pub max_video_size_bytes: usize,
    pub max_file_size_bytes: usize,
    /// Overall multipart request body cap (covers the largest allowed kind
    /// plus form overhead).
    pub request_body_limit_bytes: usize,
    // Local transformation
    pub temp_dir: String,
    pub ffmpeg_path: String,
    pub image_max_edge: u32,
    pub image_jpeg_quality: u8,
    // File readiness polling
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    // Job table housekeeping
    pub job_retention: Duration,
    pub sweep_interval: Duration,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let shopify_store_domain = env::var("SHOPIFY_STORE_DOMAIN")
            .map_err(|_| anyhow::anyhow!("SHOPIFY_STORE_DOMAIN must be set"))?;
        let shopify_access_token = env::var("SHOPIFY_ACCESS_TOKEN")
            .map_err(|_| anyhow::anyhow!("SHOPIFY_ACCESS_TOKEN must be set"))?;
        let shopify_api_version =
            env::var("SHOPIFY_API_VERSION").unwrap_or_else(|_| "2024-07".to_string());

        let max_image_size_bytes =
            env_or("MAX_IMAGE_SIZE_MB", MAX_IMAGE_SIZE_MB) * 1024 * 1024;
        let max_video_size_bytes =
            env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB) * 1024 * 1024;
        let max_file_size_bytes = env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB) * 1024 * 1024;

        let largest = max_image_size_bytes
            .max(max_video_size_bytes)
            .max(max_file_size_bytes);
        let request_body_limit_bytes =
            env_or("REQUEST_BODY_LIMIT_BYTES", largest + 1024 * 1024);

        let config = Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            shopify_store_domain,
            shopify_access_token,
            shopify_api_version,
            max_image_size_bytes,
            max_video_size_bytes,
            max_file_size_bytes,
            request_body_limit_bytes,
            temp_dir: env::var("TEMP_DIR")
                .unwrap_or_else(|_| std::env::temp_dir().to_string_lossy().into_owned()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            image_max_edge: env_or("IMAGE_MAX_EDGE", 2048),
            image_jpeg_quality: env_or("IMAGE_JPEG_QUALITY", 82),
            poll_interval: Duration::from_millis(env_or("POLL_INTERVAL_MS", POLL_INTERVAL_MS)),
            poll_max_attempts: env_or("POLL_MAX_ATTEMPTS", POLL_MAX_ATTEMPTS),
            job_retention: Duration::from_secs(env_or("JOB_RETENTION_SECS", JOB_RETENTION_SECS)),
            sweep_interval: Duration::from_secs(env_or(
                "SWEEP_INTERVAL_SECS",
                SWEEP_INTERVAL_SECS,
            )),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.shopify_store_domain.is_empty() || self.shopify_store_domain.contains('/') {
            return Err(anyhow::anyhow!(
                "SHOPIFY_STORE_DOMAIN must be a bare host like my-store.myshopify.com"
            ));
        }
        if self.shopify_access_token.is_empty() {
            return Err(anyhow::anyhow!("SHOPIFY_ACCESS_TOKEN must not be empty"));
        }
        if self.is_production() && self.cors_origins.contains(&"*".to_string()) {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        if self.poll_max_attempts == 0 {
            return Err(anyhow::anyhow!("POLL_MAX_ATTEMPTS must be at least 1"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Admin GraphQL endpoint for the configured store.
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shopify_store_domain, self.shopify_api_version
        )
    }
}
