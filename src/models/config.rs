//! Configuration module for the Label Registry
//!
//! All settings are environment-sourced with safe defaults. The listening
//! port can additionally be overridden from the command line.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{CounterState, SequenceMode};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3201;
pub const DEFAULT_PREFIX: &str = "KIOSCO-922-";
pub const DEFAULT_DIGITS: u32 = 5;
/// Widest zero-pad accepted from env, disk or a state patch
pub const MAX_DIGITS: u32 = 32;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DB_FILE_NAME: &str = "db.json";

/// Code format: `prefix + zero-padded(number, digits)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeScheme {
    pub prefix: String,
    pub digits: u32,
}

impl CodeScheme {
    /// Fresh stored-mode counter seeded from this scheme
    pub fn initial_state(&self) -> CounterState {
        CounterState {
            prefix: self.prefix.clone(),
            digits: self.digits,
            next: 1,
        }
    }
}

impl Default for CodeScheme {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            digits: DEFAULT_DIGITS,
        }
    }
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub scheme: CodeScheme,
    pub mode: SequenceMode,
    /// Shared secret for the access guard; `None` disables the guard
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_vars<F>(get: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::config(format!("PORT is not a valid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let prefix = get("BARCODE_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let digits = match get("BARCODE_DIGITS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|d| *d <= MAX_DIGITS)
                .ok_or_else(|| {
                    AppError::config(format!(
                        "BARCODE_DIGITS must be an integer between 0 and {}: {}",
                        MAX_DIGITS, raw
                    ))
                })?,
            None => DEFAULT_DIGITS,
        };

        let mode = match get("LABEL_MODE") {
            Some(raw) => SequenceMode::from_name(&raw).ok_or_else(|| {
                AppError::config(format!("LABEL_MODE must be 'derived' or 'stored': {}", raw))
            })?,
            None => SequenceMode::Derived,
        };

        // An empty key would let an empty header through, so treat it as unset
        let api_key = get("API_KEY").filter(|k| !k.is_empty());

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let public_dir = get("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR));

        Ok(Self {
            host,
            port,
            scheme: CodeScheme { prefix, digits },
            mode,
            api_key,
            data_dir,
            public_dir,
        })
    }

    /// Apply the `--port` CLI flag, which wins over `PORT`
    pub fn with_port_override(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn db_file(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| AppError::config(format!("invalid bind address {}:{}", self.host, self.port)))
    }

    /// Log effective settings. The API key itself is never logged.
    pub fn log_summary(&self) {
        info!("⚙️  Mode: {}", self.mode.name());
        info!("   Prefix: {:?}, digits: {}", self.scheme.prefix, self.scheme.digits);
        info!("   Data file: {}", self.db_file().display());
        info!("   Public dir: {}", self.public_dir.display());
        info!(
            "   Access guard: {}",
            if self.api_key.is_some() { "enabled" } else { "disabled" }
        );
    }
}
