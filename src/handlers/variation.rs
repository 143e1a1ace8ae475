//! Direct image generation: the caller's prompt goes to Imagen unmodified.
//! Failures are reported as a bare `Internal Server Error`.

use crate::{
    bootstrap::Platform,
    error::Result,
    handlers::{required, ErrorExposure, GatewayHandler},
    models::{GatewayEvent, ImageGenerationRequest, ResponseBody},
    vertex::ImageGenerator,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct VariationRequest {
    #[serde(rename = "userPromptVariation", default)]
    pub user_prompt_variation: Option<String>,
}

pub struct VariationHandler {
    images: Arc<dyn ImageGenerator>,
}

impl VariationHandler {
    pub fn new(images: Arc<dyn ImageGenerator>) -> Self {
        Self { images }
    }

    pub fn from_platform(platform: &Platform) -> Self {
        Self::new(Arc::new(platform.vertex().image().clone()))
    }
}

#[async_trait]
impl GatewayHandler for VariationHandler {
    fn name(&self) -> &'static str {
        "variation"
    }

    fn exposure(&self) -> ErrorExposure {
        ErrorExposure::Conceal
    }

    async fn process(&self, event: &GatewayEvent) -> Result<ResponseBody> {
        let request: VariationRequest = event.json_body()?;
        let prompt = required(&request.user_prompt_variation, "userPromptVariation")?;
        log::info!("New Image Variation: {}", prompt);

        let image = self
            .images
            .generate_image(ImageGenerationRequest::square(prompt))
            .await?;
        Ok(ResponseBody::image(image.to_data_uri()))
    }
}
