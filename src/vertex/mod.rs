pub mod auth;
pub mod image_client;
pub mod text_client;
pub mod traits;
pub mod transport;
pub mod vision_client;

use crate::{
    config::{ModelConfig, VertexConfig},
    error::Result,
};
use std::sync::Arc;

pub use auth::{ServiceAccountCredentials, StaticTokenProvider, TokenProvider};
pub use image_client::ImageClient;
pub use text_client::TextClient;
pub use traits::{ImageCaptioner, ImageGenerator, TextGenerator, VisionAnalyzer};
pub use transport::VertexTransport;
pub use vision_client::VisionClient;

#[derive(Clone)]
pub struct VertexClient {
    text_client: TextClient,
    image_client: ImageClient,
    vision_client: VisionClient,
}

impl VertexClient {
    pub fn new(
        vertex_config: &VertexConfig,
        models: &ModelConfig,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let transport = VertexTransport::new(vertex_config, http, tokens)?;

        log::info!(
            "Vertex AI client ready for project {} in {}",
            transport.project_id(),
            transport.location()
        );

        Ok(Self {
            text_client: TextClient::new(transport.clone(), &models.text_model),
            image_client: ImageClient::new(
                transport.clone(),
                &models.image_model,
                &models.caption_model,
            ),
            vision_client: VisionClient::new(transport, &models.vision_model),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn vision(&self) -> &VisionClient {
        &self.vision_client
    }
}
