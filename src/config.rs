//! Application configuration loaded from environment variables.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::store::StoreBackend;

/// Application configuration loaded from environment variables.
#[derive(Clone, Deserialize)]
pub struct Config {
    // === Server ===
    /// HTTP port for the guestbook API.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Storage ===
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Which store implementation backs the API.
    #[serde(default)]
    pub store_backend: StoreBackend,

    /// Maximum pooled database connections.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_db_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,

    /// Apply embedded migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    // === Client ===
    /// Base URL the client talks to.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    // === Observability ===
    /// Start the Prometheus exporter.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Port for the Prometheus exporter.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_port() -> u16 {
    5001
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_db_acquire_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: None,
            store_backend: StoreBackend::default(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout(),
            run_migrations: default_true(),
            api_url: default_api_url(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &self.redacted_database_url())
            .field("store_backend", &self.store_backend)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .field("api_url", &self.api_url)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("metrics_port", &self.metrics_port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid for serving the API.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.store_backend == StoreBackend::Postgres {
            match self.database_url.as_deref() {
                None | Some("") => {
                    return Err("DATABASE_URL is required for the postgres store".to_string())
                }
                Some(_) => {}
            }

            if self.db_max_connections == 0 {
                return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Log filter directive: `--verbose` wins over `RUST_LOG`.
    pub fn log_directive(&self, verbose: bool) -> &str {
        if verbose {
            "guestbook=debug,info"
        } else {
            &self.rust_log
        }
    }

    /// Check only what the client needs.
    pub fn validate_client(&self) -> Result<(), String> {
        self.api_base_url().map(|_| ())
    }

    /// Parsed client base URL.
    pub fn api_base_url(&self) -> Result<Url, String> {
        Url::parse(&self.api_url).map_err(|e| format!("API_URL is not a valid URL: {}", e))
    }

    /// Database URL with credentials masked, for display.
    pub fn redacted_database_url(&self) -> String {
        match self.database_url.as_deref() {
            None | Some("") => "(not set)".to_string(),
            Some(raw) => match Url::parse(raw) {
                Ok(mut url) => {
                    if url.password().is_some() {
                        let _ = url.set_password(Some("****"));
                    }
                    url.to_string()
                }
                Err(_) => "[REDACTED]".to_string(),
            },
        }
    }
}
