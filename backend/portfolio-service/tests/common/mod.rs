#![allow(dead_code)]

use async_trait::async_trait;
use crypto_core::jwt;
use crypto_core::test_keys::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
use db_pool::DbConfig;
use portfolio_service::config::{AppConfig, Config, CorsConfig, JwtConfig, S3Config};
use portfolio_service::services::ObjectStorage;
use portfolio_service::Result;
use std::sync::{Mutex, Once};
use std::time::Duration;

pub fn init_jwt() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        jwt::initialize_jwt_keys(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY)
            .expect("Failed to initialize test keys");
    });
}

pub fn bearer(user_id: i32, role: &str) -> (&'static str, String) {
    init_jwt();
    let token = jwt::generate_access_token(user_id, "ana@example.com", "ana", role)
        .expect("token generation");
    ("Authorization", format!("Bearer {}", token))
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            env: "test".to_string(),
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        database: DbConfig {
            service_name: "portfolio-service-test".to_string(),
            database_url: database_url.to_string(),
            ..DbConfig::default()
        },
        database_tls: None,
        s3: S3Config {
            bucket: "portfolio-test".to_string(),
            region: "us-east-2".to_string(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            public_base_url: "https://cdn.test".to_string(),
            presigned_url_expiry_secs: 300,
        },
        jwt: JwtConfig {
            private_key_pem: None,
            public_key_pem: None,
        },
    }
}

/// Object storage double: signs fake URLs and records deletions
#[derive(Default)]
pub struct StubStorage {
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for StubStorage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        Ok(format!(
            "https://portfolio-test.s3.test/{}?content-type={}&X-Amz-Expires={}",
            key,
            content_type,
            expires_in.as_secs()
        ))
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
