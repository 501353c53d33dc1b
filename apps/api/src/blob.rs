//! Blob-store collaborator: holds uploaded resume binaries and issues
//! time-limited download URLs. Backed by S3/MinIO in production.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob store request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), BlobError>;

    /// Time-limited read URL for a stored binary.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError>;
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Creates the bucket if it does not exist yet. "Already exists" and
    /// "already owned by you" both count as success.
    pub async fn ensure_bucket(&self) -> Result<(), BlobError> {
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("Created blob bucket '{}'", self.bucket);
                Ok(())
            }
            Err(err) => {
                let already_there = err
                    .as_service_error()
                    .map(|se| se.is_bucket_already_exists() || se.is_bucket_already_owned_by_you())
                    == Some(true);
                if already_there {
                    Ok(())
                } else {
                    Err(BlobError::Request(format!("{}", DisplayErrorContext(err))))
                }
            }
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), BlobError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| BlobError::Request(format!("{}", DisplayErrorContext(e))))?;
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError> {
        let config = PresigningConfig::expires_in(ttl)
            .map_err(|e| BlobError::Request(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .presigned(config)
            .await
            .map_err(|e| BlobError::Request(format!("{}", DisplayErrorContext(e))))?;
        Ok(presigned.uri().to_string())
    }
}
