use crate::{
    error::{Result, WizardyError},
    storage::traits::ObjectStore,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{error::ProvideErrorMetadata, Client};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Uses the default AWS credential chain (the Lambda execution role).
    pub async fn from_env() -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::new(&aws_config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        log::info!("Downloading s3://{}/{}", bucket, key);

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                log::error!("S3 GetObject error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    WizardyError::StorageError(format!(
                        "S3 service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    WizardyError::StorageError(format!("S3 SDK error: {}", e))
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| WizardyError::StorageError(format!("Failed to read S3 body: {}", e)))?
            .into_bytes();

        Ok(bytes.to_vec())
    }
}
