//! Configuration management for the ticket server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that fail to parse fall back to their default.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use ticketgate_runtime::QrCodec;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Ledger and artifact locations
    pub storage: StorageConfig,
    /// QR rendering settings
    pub qr: QrConfig,
    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
    /// Largest accepted request body in bytes (image uploads)
    pub max_upload_bytes: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON ledger file
    pub tickets_file: PathBuf,
    /// Directory holding one PNG per ticket
    pub qr_codes_dir: PathBuf,
}

/// QR rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    /// Pixels per module
    pub module_size: u32,
    /// Quiet zone width in modules
    pub border: u32,
    /// Error correction level: L, M, Q or H
    pub ec_level: String,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `GET /metrics`
    pub enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "PORT").unwrap_or(5000),
                log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
                shutdown_timeout: parsed(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(30),
                max_upload_bytes: parsed(&lookup, "MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024),
            },
            storage: StorageConfig {
                tickets_file: lookup("TICKETS_FILE")
                    .map_or_else(|| PathBuf::from("tickets.json"), PathBuf::from),
                qr_codes_dir: lookup("QR_CODES_DIR")
                    .map_or_else(|| PathBuf::from("qr_codes"), PathBuf::from),
            },
            qr: QrConfig {
                module_size: parsed(&lookup, "QR_MODULE_SIZE").unwrap_or(10),
                border: parsed(&lookup, "QR_BORDER").unwrap_or(4),
                ec_level: lookup("QR_EC_LEVEL").unwrap_or_else(|| "L".to_string()),
            },
            metrics: MetricsConfig {
                enabled: parsed(&lookup, "METRICS_ENABLED").unwrap_or(true),
            },
        }
    }

    /// Address to bind the HTTP listener to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// How long in-flight requests may drain after a shutdown signal
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }

    /// QR codec built from the rendering settings.
    ///
    /// An unknown error correction level falls back to `L`.
    #[must_use]
    pub fn qr_codec(&self) -> QrCodec {
        let codec = QrCodec::new(self.qr.module_size, self.qr.border);
        match QrCodec::parse_ec_level(&self.qr.ec_level) {
            Some(level) => codec.with_ec_level(level),
            None => {
                tracing::warn!(ec_level = %self.qr.ec_level, "Unknown QR error correction level, using L");
                codec
            },
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}
