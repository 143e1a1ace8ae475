//! Downloads user-selected images into scratch files that are removed when
//! the owning [`ScratchImage`] is dropped, whichever way the request ends.

use crate::{
    error::{Result, WizardyError},
    models::ImageData,
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

#[derive(Debug)]
pub struct ScratchImage {
    file: NamedTempFile,
}

impl ScratchImage {
    pub fn create() -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("wizardy-")
            .suffix(".png")
            .tempfile()?;
        Ok(Self { file })
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        use std::io::Write;

        let mut scratch = Self::create()?;
        scratch.file.write_all(bytes)?;
        scratch.file.flush()?;
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn load(&self) -> Result<ImageData> {
        let bytes = tokio::fs::read(self.path()).await?;
        Ok(ImageData::from_bytes(bytes))
    }
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ScratchImage>;
}

#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ScratchImage> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WizardyError::DownloadError(format!("Failed to download image: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(WizardyError::DownloadError(format!(
                "Failed to download image: {}",
                status.as_u16()
            )));
        }

        let scratch = ScratchImage::create()?;
        let mut file = tokio::fs::File::from_std(scratch.file.reopen()?);
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                WizardyError::DownloadError(format!("Failed to read image body: {}", e))
            })?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        log::info!("Image downloaded to {}", scratch.path().display());
        Ok(scratch)
    }
}
