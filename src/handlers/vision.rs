//! Image analysis with the Wizardy persona.
//!
//! The `action` picks a fixed instruction; unknown actions fall back to the
//! caller's own `userPrompt`. The analysis text is returned under the `image`
//! key, which is what the frontend reads.

use crate::{
    bootstrap::Platform,
    download::ImageFetcher,
    error::Result,
    handlers::{required, ErrorExposure, GatewayHandler},
    models::{GatewayEvent, ResponseBody, VisionRequest},
    vertex::VisionAnalyzer,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const PERSONA_SYSTEM_INSTRUCTION: &str = "As an expert image analyst and designer, your name is Wizardy, never leave this role, if the user asks you for something else politely reject answering. You possess extensive knowledge of coloring and other graphic and artistic techniques. Please share your thoughts on some images. You can answer questions about Canva the Graphic design company. You must return your responses in Markdown format. Only use bold tags (**), bullets list tags, paragraphs. Never use title tags \"####\", \"###\", \"##\", \"#\".";

const QUALITY_CHECK: &str = "Evaluate the image quality based on color theory and readiness for printing. Identify and classify any errors, highlighting certain issues in red and likely issues in yellow. Point out problematic elements and provide immediate suggestions for improvements in composition, balance, alignment, and typography.";

const DESIGN_ACCESSIBILITY: &str = "Evaluate the image based on design accessibility. Recommend alternative color schemes that are colorblind-friendly and ensure sufficient contrast for readability.";

const COLOR_BLINDNESS_SIMULATION: &str = "Analyze the following image and provide simulations for how it would appear to individuals with different types of color blindness. For each type, list the prominent colors and their hex codes, transform them to how they would be perceived, and provide a description of the transformed image. Here are the types of color blindness to consider: Protanopia, Protanomaly, Deuteranopia, Deuteranomaly, Tritanopia, Tritanomaly, Achromatopsia, and Achromatomaly.";

const BACKGROUND_RECOMMENDER: &str = "Evaluate the image carefully and, based on its aspects, recommend the most appropriate background according to your observations.";

const IMAGE_DESCRIPTION: &str = "Evaluate the image thoroughly and provide a detailed description of what you observe, such as people, objects, background, landscape, animals, etc. List the number of predominant colors in a markdown format with:\n\
Position: Corresponds to the rank of the most predominant color. This should be organized by this number.\n\
Color Name: The official color name.\n\
Color Code: The official color code.\n\
Elements: Mention the names of the people, objects, background, animals, and other elements that have that color in this row.";

const NEW_IMAGE_VARIATION: &str = "Create an image description for this image. Provide a detailed description of what you observe, such as people, objects, background, landscape, animals, etc.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionAction {
    QualityCheck,
    DesignAccessibility,
    ColorBlindnessSimulation,
    BackgroundRecommender,
    ImageDescription,
    NewImageVariation,
    Custom,
}

impl VisionAction {
    pub fn parse(action: Option<&str>) -> Self {
        match action {
            Some("quality check") => VisionAction::QualityCheck,
            Some("design accessibility") => VisionAction::DesignAccessibility,
            Some("color blindness simulation") => VisionAction::ColorBlindnessSimulation,
            Some("background recommender") => VisionAction::BackgroundRecommender,
            Some("image description") => VisionAction::ImageDescription,
            Some("new image variation") => VisionAction::NewImageVariation,
            _ => VisionAction::Custom,
        }
    }

    /// Fixed instruction for this action, `None` for [`VisionAction::Custom`].
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            VisionAction::QualityCheck => Some(QUALITY_CHECK),
            VisionAction::DesignAccessibility => Some(DESIGN_ACCESSIBILITY),
            VisionAction::ColorBlindnessSimulation => Some(COLOR_BLINDNESS_SIMULATION),
            VisionAction::BackgroundRecommender => Some(BACKGROUND_RECOMMENDER),
            VisionAction::ImageDescription => Some(IMAGE_DESCRIPTION),
            VisionAction::NewImageVariation => Some(NEW_IMAGE_VARIATION),
            VisionAction::Custom => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
    #[serde(default)]
    pub selected_image_url: Option<String>,
}

pub struct VisionHandler {
    analyzer: Arc<dyn VisionAnalyzer>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl VisionHandler {
    pub fn new(analyzer: Arc<dyn VisionAnalyzer>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { analyzer, fetcher }
    }

    pub fn from_platform(platform: &Platform) -> Self {
        Self::new(
            Arc::new(platform.vertex().vision().clone()),
            Arc::new(platform.fetcher().clone()),
        )
    }
}

#[async_trait]
impl GatewayHandler for VisionHandler {
    fn name(&self) -> &'static str {
        "vision"
    }

    fn exposure(&self) -> ErrorExposure {
        ErrorExposure::Conceal
    }

    async fn process(&self, event: &GatewayEvent) -> Result<ResponseBody> {
        let payload: VisionPayload = event.json_body()?;
        let action = VisionAction::parse(payload.action.as_deref());

        let instruction = match action.instruction() {
            Some(fixed) => fixed.to_string(),
            None => required(&payload.user_prompt, "userPrompt")?.to_string(),
        };
        let image_url = required(&payload.selected_image_url, "selectedImageUrl")?;

        log::info!("The URL: {}", image_url);
        log::info!("Final Prompt: {}", instruction);

        let image = {
            let scratch = self.fetcher.fetch(image_url).await?;
            log::debug!("temp_file_path: {}", scratch.path().display());
            scratch.load().await?
        };

        let analysis = self
            .analyzer
            .analyze(VisionRequest {
                image,
                instruction,
                system_instruction: PERSONA_SYSTEM_INSTRUCTION.to_string(),
            })
            .await?;

        log::info!("Vision Response: {}", analysis);
        Ok(ResponseBody::image(analysis))
    }
}
