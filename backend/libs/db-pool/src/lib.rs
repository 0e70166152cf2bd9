//! Database connection pool management
//!
//! Builds the PostgreSQL pool for portfolio services: pool sizing and
//! timeouts from the environment, optional TLS against a supplied CA bundle,
//! a startup round-trip to prove the connection, and pool gauges.

pub mod env_utils;
mod metrics;

pub use metrics::acquire_with_metrics;
use metrics::update_pool_metrics;

use env_utils::{env_required, parse_env_with_default};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Timeout for the startup verification query
    pub connect_timeout_secs: u64,
    /// Timeout for getting a connection out of the pool
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// PEM CA bundle; when set the pool connects with `verify-full`
    pub ssl_root_cert_pem: Option<Vec<u8>>,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .field("tls", &self.ssl_root_cert_pem.is_some())
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            ssl_root_cert_pem: None,
        }
    }
}

impl DbConfig {
    /// Read `DATABASE_URL` and the `DB_*` tuning variables.
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            service_name: service_name.to_string(),
            database_url: env_required("DATABASE_URL")?,
            max_connections: parse_env_with_default("DB_MAX_CONNECTIONS", defaults.max_connections)
                .max(1),
            min_connections: parse_env_with_default("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_secs: parse_env_with_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            acquire_timeout_secs: parse_env_with_default(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            idle_timeout_secs: parse_env_with_default(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            ),
            max_lifetime_secs: parse_env_with_default(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            ),
            ssl_root_cert_pem: None,
        })
    }

    /// Require TLS verified against the given PEM bundle.
    pub fn with_ssl_root_cert(mut self, pem: Vec<u8>) -> Self {
        self.ssl_root_cert_pem = Some(pem);
        self
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let options = PgConnectOptions::from_str(&self.database_url)?;

        Ok(match &self.ssl_root_cert_pem {
            Some(pem) => options
                .ssl_mode(PgSslMode::VerifyFull)
                .ssl_root_cert_from_pem(pem.clone()),
            None => options,
        })
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
            .test_before_acquire(true)
    }

    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            tls = self.ssl_root_cert_pem.is_some(),
            "Database pool configuration"
        );
    }
}

/// Create the pool and prove it works with a `SELECT NOW()` round-trip.
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    debug!(?config, "Creating database pool");

    let pool = config
        .pool_options()
        .connect_with(config.connect_options()?)
        .await?;

    let verify = sqlx::query_scalar::<_, chrono::DateTime<chrono::Utc>>("SELECT NOW()")
        .fetch_one(&pool);

    match tokio::time::timeout(Duration::from_secs(config.connect_timeout_secs), verify).await {
        Ok(Ok(server_time)) => {
            info!(
                service = %config.service_name,
                %server_time,
                "Successfully connected to the database"
            );

            update_pool_metrics(&pool, &config.service_name);

            let pool_clone = pool.clone();
            let service = config.service_name.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(30));
                loop {
                    interval.tick().await;
                    update_pool_metrics(&pool_clone, &service);
                }
            });

            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "DATABASE_URL",
            "DB_MAX_CONNECTIONS",
            "DB_MIN_CONNECTIONS",
            "DB_CONNECT_TIMEOUT_SECS",
            "DB_ACQUIRE_TIMEOUT_SECS",
            "DB_IDLE_TIMEOUT_SECS",
            "DB_MAX_LIFETIME_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_requires_database_url() {
        clear_env();
        assert!(DbConfig::from_env("portfolio-service").is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/portfolio");

        let config = DbConfig::from_env("portfolio-service").unwrap();
        assert_eq!(config.service_name, "portfolio-service");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout_secs, 10);
        assert!(config.ssl_root_cert_pem.is_none());

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_overrides_and_clamps_zero() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/portfolio");
        std::env::set_var("DB_MAX_CONNECTIONS", "0");
        std::env::set_var("DB_IDLE_TIMEOUT_SECS", "900");

        let config = DbConfig::from_env("portfolio-service").unwrap();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.idle_timeout_secs, 900);

        clear_env();
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = DbConfig {
            database_url: "postgres://user:secret@db/portfolio".to_string(),
            ..DbConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_connect_options_enable_tls_with_ca() {
        let config = DbConfig {
            database_url: "postgres://user:pw@db.internal:5432/portfolio".to_string(),
            ..DbConfig::default()
        };

        let plain = config.connect_options().unwrap();
        assert!(!matches!(plain.get_ssl_mode(), PgSslMode::VerifyFull));

        let tls = config
            .with_ssl_root_cert(b"-----BEGIN CERTIFICATE-----".to_vec())
            .connect_options()
            .unwrap();
        assert!(matches!(tls.get_ssl_mode(), PgSslMode::VerifyFull));
        assert_eq!(tls.get_database(), Some("portfolio"));
    }

    #[test]
    fn test_connect_options_rejects_bad_url() {
        let config = DbConfig {
            database_url: "not a url".to_string(),
            ..DbConfig::default()
        };
        assert!(config.connect_options().is_err());
    }
}
