use crate::{
    config::VertexConfig,
    error::{Result, WizardyError},
    vertex::auth::TokenProvider,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Authenticated JSON calls against publisher models of one project/region.
#[derive(Clone)]
pub struct VertexTransport {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    location: String,
    tokens: Arc<dyn TokenProvider>,
}

impl VertexTransport {
    pub fn new(
        config: &VertexConfig,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| WizardyError::ConfigError("PROJECT_ID is not set".into()))?;
        let location = config
            .location
            .clone()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| WizardyError::ConfigError("LOCATION is not set".into()))?;

        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com/v1", location));

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            location,
            tokens,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/projects/{}/locations/{}/publishers/google/models/{}:{}",
            self.base_url, self.project_id, self.location, model, method
        )
    }

    pub async fn invoke<B, R>(&self, model: &str, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.model_url(model, method);
        let token = self.tokens.token().await?;

        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Vertex AI request to {} failed: {:?}", model, e);
                WizardyError::VertexError(format!("Request to {} failed: {}", model, e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WizardyError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            log::error!("Vertex AI {} returned {}: {}", model, status, text);
            return Err(WizardyError::VertexError(format!(
                "{} returned {}: {}",
                model,
                status.as_u16(),
                text
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            WizardyError::ResponseError(format!("Unexpected response from {}: {}", model, e))
        })
    }
}
