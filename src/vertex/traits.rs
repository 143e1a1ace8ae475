use crate::{
    error::Result,
    models::{
        GeneratedImage, ImageData, ImageGenerationRequest, TextGenerationRequest, VisionRequest,
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the first generated image.
    async fn generate_image(&self, request: ImageGenerationRequest) -> Result<GeneratedImage>;
}

#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    /// Returns the first caption.
    async fn caption(&self, image: &ImageData) -> Result<String>;
}

#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(&self, request: VisionRequest) -> Result<String>;
}
