use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the whole object body.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}
