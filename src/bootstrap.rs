//! Cold-start initialization.
//!
//! The service-account key is pulled from object storage, written to the
//! configured scratch path, exported as `GOOGLE_APPLICATION_CREDENTIALS` and
//! used to build the Vertex client. This happens at most once per process:
//! the result sits in a once-cell and every later caller, concurrent or not,
//! gets the same [`Platform`]. A failed attempt leaves the cell empty.

use crate::{
    config::Config,
    download::HttpImageFetcher,
    error::Result,
    storage::{ObjectStore, S3ObjectStore},
    vertex::{auth, VertexClient},
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Everything a handler needs from the outside world.
#[derive(Clone)]
pub struct Platform {
    vertex: VertexClient,
    fetcher: HttpImageFetcher,
}

impl Platform {
    pub fn new(vertex: VertexClient, fetcher: HttpImageFetcher) -> Self {
        Self { vertex, fetcher }
    }

    pub fn vertex(&self) -> &VertexClient {
        &self.vertex
    }

    pub fn fetcher(&self) -> &HttpImageFetcher {
        &self.fetcher
    }
}

pub struct Bootstrap {
    config: Config,
    store: Arc<dyn ObjectStore>,
    http: reqwest::Client,
    platform: OnceCell<Arc<Platform>>,
}

impl Bootstrap {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            store,
            http: reqwest::Client::new(),
            platform: OnceCell::new(),
        }
    }

    /// Configuration from the environment, credentials from S3.
    pub async fn from_env() -> Self {
        let store = S3ObjectStore::from_env().await;
        Self::new(Config::from_env(), Arc::new(store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.platform.initialized()
    }

    pub async fn platform(&self) -> Result<Arc<Platform>> {
        self.platform
            .get_or_try_init(|| self.initialize())
            .await
            .map(Arc::clone)
    }

    async fn initialize(&self) -> Result<Arc<Platform>> {
        let credentials = &self.config.credentials;

        log::info!("🔄 Fetching service credentials...");
        let key = self
            .store
            .get_object(&credentials.bucket, &credentials.object_key)
            .await?;

        if let Some(parent) = credentials.local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&credentials.local_path, &key).await?;
        std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", &credentials.local_path);
        log::info!(
            "✅ Credentials written to {}",
            credentials.local_path.display()
        );

        let tokens = auth::token_provider_from_env(&credentials.local_path, self.http.clone()).await?;
        let vertex = VertexClient::new(
            &self.config.vertex,
            &self.config.models,
            self.http.clone(),
            tokens,
        )?;

        Ok(Arc::new(Platform::new(
            vertex,
            HttpImageFetcher::new(self.http.clone()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CredentialConfig, VertexConfig},
        error::WizardyError,
    };
    use crate::testing::service_account_json;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        calls: AtomicUsize,
        body: Option<String>,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(bucket, "keys-bucket");
            assert_eq!(key, "wizardy.json");
            self.body
                .as_ref()
                .map(|body| body.as_bytes().to_vec())
                .ok_or_else(|| WizardyError::StorageError("NoSuchKey".into()))
        }
    }

    fn config(dir: &tempfile::TempDir, vertex: VertexConfig) -> Config {
        Config::new().with_vertex(vertex).with_credentials(
            CredentialConfig::new()
                .with_object("keys-bucket", "wizardy.json")
                .with_local_path(dir.path().join("keys").join("wizardy.json")),
        )
    }

    #[tokio::test]
    async fn test_credentials_fetched_once_per_process() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            body: Some(service_account_json()),
        });
        let bootstrap = Bootstrap::new(
            config(&dir, VertexConfig::new().with_project("canva-app", "us-central1")),
            store.clone(),
        );

        assert!(!bootstrap.is_initialized());
        let first = bootstrap.platform().await.unwrap();
        let second = bootstrap.platform().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(bootstrap.is_initialized());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        let written =
            std::fs::read_to_string(dir.path().join("keys").join("wizardy.json")).unwrap();
        assert_eq!(written, service_account_json());
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            body: Some(service_account_json()),
        });
        let bootstrap = Bootstrap::new(
            config(&dir, VertexConfig::new().with_project("canva-app", "us-central1")),
            store.clone(),
        );

        let (a, b) = tokio::join!(bootstrap.platform(), bootstrap.platform());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_and_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            body: None,
        });
        let bootstrap = Bootstrap::new(
            config(&dir, VertexConfig::new().with_project("canva-app", "us-central1")),
            store.clone(),
        );

        assert!(matches!(
            bootstrap.platform().await,
            Err(WizardyError::StorageError(_))
        ));
        assert!(bootstrap.platform().await.is_err());
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        assert!(!bootstrap.is_initialized());
    }

    #[tokio::test]
    async fn test_missing_project_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            body: Some(service_account_json()),
        });
        let bootstrap = Bootstrap::new(config(&dir, VertexConfig::new()), store);

        assert!(matches!(
            bootstrap.platform().await,
            Err(WizardyError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_unparseable_private_key_fails_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            body: Some(
                serde_json::json!({"client_email": "x@y", "private_key": "garbage"}).to_string(),
            ),
        });
        let bootstrap = Bootstrap::new(
            config(&dir, VertexConfig::new().with_project("canva-app", "us-central1")),
            store,
        );

        assert!(matches!(
            bootstrap.platform().await,
            Err(WizardyError::AuthError(_))
        ));
        assert!(!bootstrap.is_initialized());
    }
}
