use crate::{
    error::{Result, WizardyError},
    logger,
    models::{
        CaptionInstance, CaptionParameters, CaptionRequest, CaptionResponse, EncodedImage,
        GeneratedImage, ImageData, ImageGenerationRequest, ImagenInstance, ImagenParameters,
        ImagenRequest, ImagenResponse,
    },
    vertex::{
        traits::{ImageCaptioner, ImageGenerator},
        transport::VertexTransport,
    },
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct ImageClient {
    transport: VertexTransport,
    generation_model: String,
    caption_model: String,
}

impl ImageClient {
    pub fn new(
        transport: VertexTransport,
        generation_model: impl Into<String>,
        caption_model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            generation_model: generation_model.into(),
            caption_model: caption_model.into(),
        }
    }

    pub async fn generate(&self, request: ImageGenerationRequest) -> Result<GeneratedImage> {
        let payload = ImagenRequest {
            instances: vec![ImagenInstance {
                prompt: &request.prompt,
            }],
            parameters: ImagenParameters {
                sample_count: request.num_images,
                aspect_ratio: request.aspect_ratio,
            },
        };

        log::info!(
            "Generating image with model: {} ({})",
            self.generation_model,
            request.aspect_ratio.as_str()
        );
        let _timer = logger::timer(&format!("{} predict", self.generation_model));

        let response: ImagenResponse = self
            .transport
            .invoke(&self.generation_model, "predict", &payload)
            .await?;

        let image_data = response
            .predictions
            .into_iter()
            .find_map(|prediction| prediction.bytes_base64_encoded)
            .ok_or_else(|| WizardyError::ResponseError("No images generated".into()))?;

        Ok(GeneratedImage { base64: image_data })
    }

    pub async fn caption(&self, image: &ImageData) -> Result<String> {
        let payload = CaptionRequest {
            instances: vec![CaptionInstance {
                image: EncodedImage {
                    bytes_base64_encoded: image.to_base64(),
                },
            }],
            parameters: CaptionParameters {
                sample_count: 1,
                language: "en",
            },
        };

        log::info!("Captioning image with model: {}", self.caption_model);
        let _timer = logger::timer(&format!("{} predict", self.caption_model));

        let response: CaptionResponse = self
            .transport
            .invoke(&self.caption_model, "predict", &payload)
            .await?;

        response
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| WizardyError::ResponseError("No captions generated".into()))
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate_image(&self, request: ImageGenerationRequest) -> Result<GeneratedImage> {
        self.generate(request).await
    }
}

#[async_trait]
impl ImageCaptioner for ImageClient {
    async fn caption(&self, image: &ImageData) -> Result<String> {
        ImageClient::caption(self, image).await
    }
}
