/// Object storage for uploaded media
///
/// Clients upload straight to the bucket through pre-signed PUT URLs; the
/// service only signs URLs and deletes objects. [`ObjectStorage`] is the seam
/// handlers depend on, [`S3Storage`] the production implementation.
use crate::config::S3Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Pre-signed URL allowing a single PUT of `key` with `content_type`.
    async fn presign_put(&self, key: &str, content_type: &str, expires_in: Duration)
        -> Result<String>;

    /// Remove an object. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> Result<()>;
}

/// S3 (or S3-compatible) bucket
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub async fn from_config(config: &S3Config) -> Self {
        Self::new(get_s3_client(config).await, config.bucket.clone())
    }

    /// Read a whole object from any bucket the credentials can reach.
    pub async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to fetch s3://{bucket}/{key}: {e}")))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to read s3://{bucket}/{key}: {e}")))?
            .into_bytes();

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let presigning_config = PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create presigning config: {e}")))?;

        let presigned_request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning_config)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to generate presigned URL: {e}")))?;

        Ok(presigned_request.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to delete {key}: {e}")))?;

        tracing::info!(key = %key, "Deleted object from bucket");
        Ok(())
    }
}

/// Build an S3 client from config, falling back to the default credential
/// chain when no static keys are configured.
pub async fn get_s3_client(config: &S3Config) -> Client {
    use aws_sdk_s3::config::{Credentials, Region};

    let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let (Some(access_key_id), Some(secret_access_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "portfolio_service_s3",
        );
        aws_config_builder = aws_config_builder.credentials_provider(credentials);
    }

    if let Some(endpoint) = &config.endpoint {
        aws_config_builder = aws_config_builder.endpoint_url(endpoint);
    }

    let aws_config = aws_config_builder.load().await;

    // S3-compatible stores behind a custom endpoint rarely support virtual-hosted buckets
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.endpoint.is_some())
        .build();

    Client::from_conf(s3_config)
}

/// Object key for an upload: `<section path>/<file name>`.
///
/// The section path loses surrounding slashes. File names must be a single
/// path segment.
pub fn object_key(section_path: &str, file_name: &str) -> Result<String> {
    let section_path = section_path.trim().trim_matches('/');
    let file_name = file_name.trim();

    if section_path.is_empty() {
        return Err(AppError::BadRequest("sectionPath is required".to_string()));
    }
    if section_path.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(AppError::BadRequest(format!("Invalid sectionPath: {section_path}")));
    }
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
    {
        return Err(AppError::BadRequest(format!("Invalid file name: {file_name}")));
    }

    Ok(format!("{section_path}/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_joins_path_and_name() {
        assert_eq!(
            object_key("/travel/japan/", "tokyo.jpg").unwrap(),
            "travel/japan/tokyo.jpg"
        );
        assert_eq!(object_key(" portraits ", " a b.png ").unwrap(), "portraits/a b.png");
    }

    #[test]
    fn test_object_key_rejects_traversal() {
        assert!(object_key("travel", "../etc/passwd").is_err());
        assert!(object_key("travel", "nested/name.jpg").is_err());
        assert!(object_key("travel", r"..\name.jpg").is_err());
        assert!(object_key("travel/../admin", "a.jpg").is_err());
        assert!(object_key("travel//japan", "a.jpg").is_err());
        assert!(object_key("", "a.jpg").is_err());
        assert!(object_key("travel", "").is_err());
    }
}
