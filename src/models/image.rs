use crate::models::AspectRatio;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub num_images: u32,
}

impl ImageGenerationRequest {
    /// One square image, the only shape the handlers ask for.
    pub fn square(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::Square,
            num_images: 1,
        }
    }
}

// Wire format of Imagen `:predict`.

#[derive(Debug, Serialize)]
pub struct ImagenInstance<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenParameters {
    pub sample_count: u32,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize)]
pub struct ImagenRequest<'a> {
    pub instances: Vec<ImagenInstance<'a>>,
    pub parameters: ImagenParameters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenPrediction {
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImagenResponse {
    #[serde(default)]
    pub predictions: Vec<ImagenPrediction>,
}

// Wire format of the `imagetext` captioning `:predict`.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub bytes_base64_encoded: String,
}

#[derive(Debug, Serialize)]
pub struct CaptionInstance {
    pub image: EncodedImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionParameters {
    pub sample_count: u32,
    pub language: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CaptionRequest {
    pub instances: Vec<CaptionInstance>,
    pub parameters: CaptionParameters,
}

#[derive(Debug, Deserialize)]
pub struct CaptionResponse {
    #[serde(default)]
    pub predictions: Vec<String>,
}
