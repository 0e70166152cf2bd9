/// Configuration management for portfolio-service
///
/// Loads configuration from environment variables with sensible defaults.
use db_pool::env_utils::{parse_env_list, parse_env_optional, parse_env_with_default};
use db_pool::DbConfig;

pub const SERVICE_NAME: &str = "portfolio-service";

const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DbConfig,
    pub database_tls: Option<DatabaseTlsConfig>,
    pub s3: S3Config,
    pub jwt: JwtConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug)]
pub struct CorsConfig {
    /// Empty means any origin is allowed
    pub allowed_origins: Vec<String>,
}

/// Location of the PEM CA bundle used to verify the database certificate
#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseTlsConfig {
    pub bucket: String,
    pub key: String,
}

#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    /// Prefix for browser-facing object URLs, no trailing slash
    pub public_base_url: String,
    pub presigned_url_expiry_secs: u64,
}

impl S3Config {
    /// Public URL clients use to fetch an object.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub private_key_pem: Option<String>,
    pub public_key_pem: Option<String>,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("private_key_pem", &self.private_key_pem.as_ref().map(|_| "[REDACTED]"))
            .field("public_key_pem", &self.public_key_pem.is_some())
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DbConfig::from_env(SERVICE_NAME).map_err(anyhow::Error::msg)?;

        let region = env_or("AWS_REGION", "us-east-2");
        let bucket = env_or("AWS_S3_BUCKET_NAME", "portfolio-media");
        let endpoint = parse_env_optional::<String>("S3_ENDPOINT");
        let public_base_url = parse_env_optional::<String>("S3_PUBLIC_BASE_URL")
            .unwrap_or_else(|| default_public_base_url(&bucket, &region, endpoint.as_deref()));

        let database_tls = match (
            parse_env_optional::<String>("DB_SSL_CA_BUCKET"),
            parse_env_optional::<String>("DB_SSL_CA_KEY"),
        ) {
            (Some(bucket), Some(key)) => Some(DatabaseTlsConfig { bucket, key }),
            (None, None) => None,
            _ => anyhow::bail!("DB_SSL_CA_BUCKET and DB_SSL_CA_KEY must be set together"),
        };

        Ok(Config {
            app: AppConfig {
                host: env_or("PORTFOLIO_SERVICE_HOST", "0.0.0.0"),
                port: parse_env_with_default("PORTFOLIO_SERVICE_PORT", 5000),
                env: env_or("APP_ENV", "development"),
            },
            cors: CorsConfig {
                allowed_origins: parse_env_list("CORS_ALLOWED_ORIGINS")
                    .into_iter()
                    .filter(|origin| origin != "*")
                    .collect(),
            },
            database,
            database_tls,
            s3: S3Config {
                bucket,
                region,
                access_key_id: parse_env_optional("AWS_ACCESS_KEY_ID"),
                secret_access_key: parse_env_optional("AWS_SECRET_ACCESS_KEY"),
                endpoint,
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
                presigned_url_expiry_secs: parse_env_with_default(
                    "S3_PRESIGNED_URL_EXPIRY_SECS",
                    DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
                )
                .max(1),
            },
            jwt: JwtConfig {
                private_key_pem: parse_env_optional("JWT_PRIVATE_KEY_PEM").map(unescape_pem),
                public_key_pem: parse_env_optional("JWT_PUBLIC_KEY_PEM").map(unescape_pem),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

fn env_or(key: &str, default: &str) -> String {
    parse_env_optional(key).unwrap_or_else(|| default.to_string())
}

fn default_public_base_url(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        // path-style addressing for MinIO and other S3-compatible stores
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

/// PEM keys passed through env files often carry literal `\n` sequences.
fn unescape_pem(raw: String) -> String {
    if raw.contains("\\n") {
        raw.replace("\\n", "\n")
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &[&str] = &[
        "DATABASE_URL",
        "PORTFOLIO_SERVICE_HOST",
        "PORTFOLIO_SERVICE_PORT",
        "AWS_REGION",
        "AWS_S3_BUCKET_NAME",
        "S3_ENDPOINT",
        "S3_PUBLIC_BASE_URL",
        "S3_PRESIGNED_URL_EXPIRY_SECS",
        "DB_SSL_CA_BUCKET",
        "DB_SSL_CA_KEY",
        "CORS_ALLOWED_ORIGINS",
        "JWT_PUBLIC_KEY_PEM",
    ];

    fn reset_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
        std::env::set_var("DATABASE_URL", "postgres://localhost/portfolio");
    }

    #[test]
    #[serial_test::serial]
    fn test_defaults() {
        reset_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 5000);
        assert_eq!(config.s3.region, "us-east-2");
        assert_eq!(config.s3.presigned_url_expiry_secs, 300);
        assert_eq!(
            config.s3.public_base_url,
            "https://portfolio-media.s3.us-east-2.amazonaws.com"
        );
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.database_tls.is_none());
        assert!(!config.is_production());
    }

    #[test]
    #[serial_test::serial]
    fn test_public_url_follows_custom_endpoint() {
        reset_env();
        std::env::set_var("S3_ENDPOINT", "http://localhost:9000/");
        std::env::set_var("AWS_S3_BUCKET_NAME", "media");

        let config = Config::from_env().unwrap();
        assert_eq!(config.s3.public_base_url, "http://localhost:9000/media");
        assert_eq!(
            config.s3.object_url("travel/japan/a.jpg"),
            "http://localhost:9000/media/travel/japan/a.jpg"
        );

        std::env::set_var("S3_PUBLIC_BASE_URL", "https://cdn.example.com/");
        let config = Config::from_env().unwrap();
        assert_eq!(config.s3.object_url("/a.jpg"), "https://cdn.example.com/a.jpg");

        reset_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_database_tls_requires_both_vars() {
        reset_env();
        std::env::set_var("DB_SSL_CA_BUCKET", "certs");
        assert!(Config::from_env().is_err());

        std::env::set_var("DB_SSL_CA_KEY", "rds/global-bundle.pem");
        let config = Config::from_env().unwrap();
        assert_eq!(
            config.database_tls,
            Some(DatabaseTlsConfig {
                bucket: "certs".to_string(),
                key: "rds/global-bundle.pem".to_string(),
            })
        );

        reset_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_cors_wildcard_means_any_origin() {
        reset_env();
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().unwrap().cors.allowed_origins.is_empty());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example");
        assert_eq!(
            Config::from_env().unwrap().cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );

        reset_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_pem_newlines_are_unescaped() {
        reset_env();
        std::env::set_var("JWT_PUBLIC_KEY_PEM", "-----BEGIN-----\\nabc\\n-----END-----");

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.jwt.public_key_pem.as_deref(),
            Some("-----BEGIN-----\nabc\n-----END-----")
        );

        reset_env();
    }
}
