use std::env;
use std::path::PathBuf;

pub const DEFAULT_CREDENTIALS_BUCKET: &str = "hackthon-backend-files-ep-2024";
pub const DEFAULT_CREDENTIALS_KEY: &str = "gemmi-hackthon-2024-e65379c56ff0.json";
pub const DEFAULT_CREDENTIALS_PATH: &str = "/tmp/gemmi-hackthon-2024-e65379c56ff0.json";

pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-001";
pub const DEFAULT_CAPTION_MODEL: &str = "imagetext@001";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";

/// Where the service-account key lives in object storage and where it is
/// written locally before the Vertex client is built.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub bucket: String,
    pub object_key: String,
    pub local_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project_id: Option<String>,
    pub location: Option<String>,
    /// Overrides `https://{location}-aiplatform.googleapis.com/v1`.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub text_model: String,
    pub image_model: String,
    pub caption_model: String,
    pub vision_model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub credentials: CredentialConfig,
    pub vertex: VertexConfig,
    pub models: ModelConfig,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        CredentialConfig {
            bucket: DEFAULT_CREDENTIALS_BUCKET.to_string(),
            object_key: DEFAULT_CREDENTIALS_KEY.to_string(),
            local_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }
}

impl CredentialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        CredentialConfig {
            bucket: env::var("CREDENTIALS_BUCKET").unwrap_or(defaults.bucket),
            object_key: env::var("CREDENTIALS_KEY").unwrap_or(defaults.object_key),
            local_path: env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_path),
        }
    }

    pub fn with_object(mut self, bucket: impl Into<String>, object_key: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self.object_key = object_key.into();
        self
    }

    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = path.into();
        self
    }
}

impl Default for VertexConfig {
    fn default() -> Self {
        VertexConfig {
            project_id: None,
            location: None,
            endpoint: None,
        }
    }
}

impl VertexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        VertexConfig {
            project_id: env::var("PROJECT_ID").ok(),
            location: env::var("LOCATION").ok(),
            endpoint: env::var("VERTEX_ENDPOINT").ok(),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>, location: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self.location = Some(location.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            caption_model: DEFAULT_CAPTION_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        ModelConfig {
            text_model: env::var("TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("IMAGE_MODEL").unwrap_or(defaults.image_model),
            caption_model: env::var("CAPTION_MODEL").unwrap_or(defaults.caption_model),
            vision_model: env::var("VISION_MODEL").unwrap_or(defaults.vision_model),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            credentials: CredentialConfig::default(),
            vertex: VertexConfig::default(),
            models: ModelConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            credentials: CredentialConfig::from_env(),
            vertex: VertexConfig::from_env(),
            models: ModelConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_credentials(mut self, config: CredentialConfig) -> Self {
        self.credentials = config;
        self
    }

    pub fn with_vertex(mut self, config: VertexConfig) -> Self {
        self.vertex = config;
        self
    }

    pub fn with_models(mut self, config: ModelConfig) -> Self {
        self.models = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_defaults_point_at_tmp() {
        let config = CredentialConfig::new();
        assert_eq!(config.bucket, DEFAULT_CREDENTIALS_BUCKET);
        assert_eq!(config.object_key, DEFAULT_CREDENTIALS_KEY);
        assert!(config.local_path.starts_with("/tmp"));
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = Config::new()
            .with_port(9000)
            .with_vertex(VertexConfig::new().with_project("canva-app", "us-central1"))
            .with_credentials(
                CredentialConfig::new()
                    .with_object("bucket", "key.json")
                    .with_local_path("/tmp/key.json"),
            );

        assert_eq!(config.port, Some(9000));
        assert_eq!(config.vertex.project_id.as_deref(), Some("canva-app"));
        assert_eq!(config.vertex.location.as_deref(), Some("us-central1"));
        assert_eq!(config.credentials.bucket, "bucket");
        assert_eq!(config.credentials.local_path, PathBuf::from("/tmp/key.json"));
        assert_eq!(config.models.image_model, DEFAULT_IMAGE_MODEL);
    }
}
