use crate::{
    error::{Result, WizardyError},
    logger,
    models::{Content, GenerateContentRequest, GenerateContentResponse, Part, VisionRequest},
    vertex::{traits::VisionAnalyzer, transport::VertexTransport},
};
use async_trait::async_trait;

/// Multimodal Gemini calls: one image plus one instruction.
#[derive(Clone)]
pub struct VisionClient {
    transport: VertexTransport,
    model: String,
}

impl VisionClient {
    pub fn new(transport: VertexTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub async fn describe(&self, request: VisionRequest) -> Result<String> {
        let payload = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::image(&request.image),
                Part::text(request.instruction),
            ])],
            system_instruction: Some(Content::system(request.system_instruction)),
            generation_config: None,
            safety_settings: Vec::new(),
        };

        log::info!(
            "Analyzing {} image ({} bytes) with model: {}",
            request.image.mime_type,
            request.image.bytes.len(),
            self.model
        );
        let _timer = logger::timer(&format!("{} generateContent", self.model));

        let response: GenerateContentResponse = self
            .transport
            .invoke(&self.model, "generateContent", &payload)
            .await?;

        response.text().ok_or_else(|| {
            WizardyError::ResponseError(format!(
                "{} returned no text ({})",
                self.model,
                response.stop_reason()
            ))
        })
    }
}

#[async_trait]
impl VisionAnalyzer for VisionClient {
    async fn analyze(&self, request: VisionRequest) -> Result<String> {
        self.describe(request).await
    }
}
