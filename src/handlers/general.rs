//! Text-and-image handler: refines design prompts with Gemini and renders them
//! with Imagen, or re-imagines an existing picture from its caption.

use crate::{
    bootstrap::Platform,
    download::ImageFetcher,
    error::Result,
    handlers::{required, ErrorExposure, GatewayHandler},
    models::{
        GatewayEvent, GenerationConfig, ImageGenerationRequest, ResponseBody, SafetySetting,
        TextGenerationRequest,
    },
    vertex::{ImageCaptioner, ImageGenerator, TextGenerator},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const REFINER_SYSTEM_INSTRUCTION: &str = "As an expert graphic designer, you’ll assist beginner designers in creating more effective prompts for the Gemini model. Improve this prompt by returning only the refined version without any additional introductory or concluding comments.";

/// Phrase the refiner uses when it has nothing to add.
pub const CLEAR_PROMPT_MARKER: &str = "prompt is clear and detailed";

pub const UNSUPPORTED_ACTION_MESSAGE: &str = "Action not supported yet.";

/// Actions whose fallback prompt comes from a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAction {
    AddPictureFrame,
    AddBorder,
    AddShapedFrame,
    GenerateTransparentShape,
    GenerateShapedImage,
    ImagePanel3d,
    GenerateBackground,
    TextFrame,
}

impl TemplateAction {
    pub const ALL: [TemplateAction; 8] = [
        TemplateAction::AddPictureFrame,
        TemplateAction::AddBorder,
        TemplateAction::AddShapedFrame,
        TemplateAction::GenerateTransparentShape,
        TemplateAction::GenerateShapedImage,
        TemplateAction::ImagePanel3d,
        TemplateAction::GenerateBackground,
        TemplateAction::TextFrame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateAction::AddPictureFrame => "add picture frame",
            TemplateAction::AddBorder => "add border",
            TemplateAction::AddShapedFrame => "add shaped frame",
            TemplateAction::GenerateTransparentShape => "generate transparent shape",
            TemplateAction::GenerateShapedImage => "generate shaped image",
            TemplateAction::ImagePanel3d => "3D image panel",
            TemplateAction::GenerateBackground => "generate background",
            TemplateAction::TextFrame => "text frame",
        }
    }

    pub fn template_prompt(&self, user_prompt: &str) -> String {
        match self {
            TemplateAction::AddPictureFrame => format!(
                "straight picture frame (this must be straight, never sideways or twisted); \
                 the background behind the frame is solid white which contrasts sharply with the frame, \
                 the picture frame takes all the space available in its background and the center of this is empty \
                 (no picture inside it). High-quality resolution, photorealistic. \
                 The borders of the picture frame are made of: {}",
                user_prompt
            ),
            TemplateAction::AddBorder => format!(
                "a space fully covered with an infinite number of the element here described (the theme): {}, \
                 like a seamless texture",
                user_prompt
            ),
            _ => user_prompt.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignAction {
    ChangeBackground,
    ImageVariation,
    Templated(TemplateAction),
    Unsupported(String),
}

impl From<&str> for DesignAction {
    fn from(action: &str) -> Self {
        match action {
            "change background" => DesignAction::ChangeBackground,
            "image variation" => DesignAction::ImageVariation,
            other => TemplateAction::ALL
                .into_iter()
                .find(|template| template.as_str() == other)
                .map(DesignAction::Templated)
                .unwrap_or_else(|| DesignAction::Unsupported(other.to_string())),
        }
    }
}

/// Trusts the refiner unless it reports the prompt needed no work, in which
/// case `fallback` is used instead.
pub fn choose_prompt(refined: String, fallback: String) -> String {
    if refined.contains(CLEAR_PROMPT_MARKER) {
        fallback
    } else {
        refined
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
    #[serde(default)]
    pub selected_image_url: Option<String>,
}

pub struct GeneralHandler {
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    captioner: Arc<dyn ImageCaptioner>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl GeneralHandler {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        captioner: Arc<dyn ImageCaptioner>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            text,
            images,
            captioner,
            fetcher,
        }
    }

    pub fn from_platform(platform: &Platform) -> Self {
        let vertex = platform.vertex();
        Self::new(
            Arc::new(vertex.text().clone()),
            Arc::new(vertex.image().clone()),
            Arc::new(vertex.image().clone()),
            Arc::new(platform.fetcher().clone()),
        )
    }

    async fn refine(&self, user_prompt: &str) -> Result<String> {
        let request = TextGenerationRequest::new(user_prompt)
            .with_system_instruction(REFINER_SYSTEM_INSTRUCTION)
            .with_generation_config(GenerationConfig::refiner())
            .with_safety_settings(SafetySetting::block_medium_and_above());
        self.text.generate_text(request).await
    }

    async fn render(&self, prompt: String) -> Result<ResponseBody> {
        let image = self
            .images
            .generate_image(ImageGenerationRequest::square(prompt))
            .await?;
        Ok(ResponseBody::image(image.to_data_uri()))
    }

    async fn refine_and_render(&self, user_prompt: &str, fallback: String) -> Result<ResponseBody> {
        let refined = self.refine(user_prompt).await?;
        let final_prompt = choose_prompt(refined, fallback);
        log::info!("final_prompt: {}", final_prompt);
        self.render(final_prompt).await
    }

    async fn vary(&self, image_url: &str) -> Result<ResponseBody> {
        let image = {
            let scratch = self.fetcher.fetch(image_url).await?;
            scratch.load().await?
        };

        let caption = self.captioner.caption(&image).await?;
        log::info!("Image caption: {}", caption);
        self.render(caption).await
    }
}

#[async_trait]
impl GatewayHandler for GeneralHandler {
    fn name(&self) -> &'static str {
        "general"
    }

    fn exposure(&self) -> ErrorExposure {
        ErrorExposure::Echo
    }

    async fn process(&self, event: &GatewayEvent) -> Result<ResponseBody> {
        let request: GeneralRequest = event.json_body()?;
        let action = DesignAction::from(request.action.as_deref().unwrap_or_default());

        match action {
            DesignAction::ChangeBackground => {
                let user_prompt = required(&request.user_prompt, "userPrompt")?;
                self.refine_and_render(user_prompt, user_prompt.to_string())
                    .await
            }
            DesignAction::Templated(template) => {
                let user_prompt = required(&request.user_prompt, "userPrompt")?;
                let template_prompt = template.template_prompt(user_prompt);
                self.refine_and_render(user_prompt, template_prompt).await
            }
            DesignAction::ImageVariation => {
                let image_url = required(&request.selected_image_url, "selectedImageUrl")?;
                self.vary(image_url).await
            }
            DesignAction::Unsupported(name) => {
                log::warn!("Unsupported action: {:?}", name);
                Ok(ResponseBody::message(UNSUPPORTED_ACTION_MESSAGE))
            }
        }
    }
}
