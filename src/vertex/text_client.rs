use crate::{
    error::{Result, WizardyError},
    logger,
    models::{Content, GenerateContentRequest, GenerateContentResponse, Part, TextGenerationRequest},
    vertex::{traits::TextGenerator, transport::VertexTransport},
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct TextClient {
    transport: VertexTransport,
    model: String,
}

impl TextClient {
    pub fn new(transport: VertexTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, request: TextGenerationRequest) -> Result<String> {
        let payload = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(request.prompt)])],
            system_instruction: request.system_instruction.map(Content::system),
            generation_config: request.generation_config,
            safety_settings: request.safety_settings,
        };

        log::info!("Invoking text model: {}", self.model);
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
impl TextGenerator for TextClient {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String> {
        self.generate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::VertexConfig,
        models::{GenerationConfig, SafetySetting},
        vertex::auth::StaticTokenProvider,
    };
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/projects/canva-app/locations/us-central1/publishers/google/models/gemini-1.5-flash:generateContent";

    fn client(server: &MockServer) -> TextClient {
        let config = VertexConfig::new()
            .with_project("canva-app", "us-central1")
            .with_endpoint(server.uri());
        let transport = VertexTransport::new(
            &config,
            reqwest::Client::new(),
            Arc::new(StaticTokenProvider::new("ya29.test")),
        )
        .unwrap();
        TextClient::new(transport, "gemini-1.5-flash")
    }

    #[tokio::test]
    async fn test_generate_sends_config_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("authorization", "Bearer ya29.test"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "a beach at dusk"}]}],
                "systemInstruction": {"parts": [{"text": "Refine it."}]},
                "generationConfig": {"topK": 1, "maxOutputTokens": 8192},
                "safetySettings": [{"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "A golden beach at dusk"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = TextGenerationRequest::new("a beach at dusk")
            .with_system_instruction("Refine it.")
            .with_generation_config(GenerationConfig::refiner())
            .with_safety_settings(SafetySetting::block_medium_and_above());

        let text = client(&server).generate(request).await.unwrap();
        assert_eq!(text, "A golden beach at dusk");
    }

    #[tokio::test]
    async fn test_service_error_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("Quota exceeded"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate(TextGenerationRequest::new("hello"))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("Quota exceeded"));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate(TextGenerationRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, WizardyError::ResponseError(ref msg) if msg.contains("SAFETY")));
    }
}
