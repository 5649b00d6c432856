//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/kiosk").
    pub data_dir: String,

    /// Path to the package catalog JSON file (default: "catalog.json").
    pub catalog_path: String,

    /// Public URL of the payment webhook, handed to the processor as the
    /// invoice callback.
    pub callback_url: String,

    /// Payment processor API URL.
    pub processor_api_url: String,

    /// Payment processor merchant API key (optional; checkout is unavailable
    /// without it).
    pub processor_api_key: Option<String>,

    /// Shared secret for webhook signature verification (optional; skipped
    /// with a warning when absent).
    pub webhook_secret: Option<String>,

    /// Chat platform bot API base URL (optional).
    pub bot_api_url: Option<String>,

    /// Chat platform bot token (optional; notifications are logged instead
    /// of delivered without it).
    pub bot_token: Option<String>,

    /// Service API key for the presentation glue (optional).
    pub service_api_key: Option<String>,

    /// Admin API key for reporting and catalog reload (optional).
    pub admin_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Interval between expiry sweeps in seconds.
    pub sweep_interval_seconds: u64,
}

/// Processor secrets file structure.
#[derive(Debug, Deserialize)]
struct ProcessorSecrets {
    api_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load processor secrets from file first, then fall back to
        // env vars.
        let (processor_api_key, webhook_secret) = load_processor_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/kiosk".into()),
            catalog_path: std::env::var("CATALOG_PATH").unwrap_or_else(|_| "catalog.json".into()),
            callback_url: std::env::var("CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:8080/webhooks/payment".into()),
            processor_api_url: std::env::var("PROCESSOR_API_URL")
                .unwrap_or_else(|_| "https://api.oxapay.com".into()),
            processor_api_key,
            webhook_secret,
            bot_api_url: std::env::var("BOT_API_URL").ok(),
            bot_token: std::env::var("BOT_TOKEN").ok(),
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            sweep_interval_seconds: std::env::var("SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Load processor secrets from file or environment.
fn load_processor_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/processor.json",
        "kiosk/.secrets/processor.json",
        "../.secrets/processor.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<ProcessorSecrets>(path) {
            tracing::info!(path = %path, "Loaded processor secrets from file");
            return (Some(secrets.api_key), secrets.webhook_secret);
        }
    }

    tracing::debug!("Processor secrets file not found, using environment variables");
    (
        std::env::var("PROCESSOR_API_KEY").ok(),
        std::env::var("WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/kiosk".into(),
            catalog_path: "catalog.json".into(),
            callback_url: "http://localhost:8080/webhooks/payment".into(),
            processor_api_url: "https://api.oxapay.com".into(),
            processor_api_key: None,
            webhook_secret: None,
            bot_api_url: None,
            bot_token: None,
            service_api_key: None,
            admin_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            sweep_interval_seconds: 30,
        }
    }
}
