//! Recording fakes of the remote collaborators, for handler tests.

use crate::{
    download::{ImageFetcher, ScratchImage},
    error::{Result, WizardyError},
    models::{
        GatewayResponse, GeneratedImage, ImageData, ImageGenerationRequest, TextGenerationRequest,
        VisionRequest, CORS_HEADERS,
    },
    vertex::{ImageCaptioner, ImageGenerator, TextGenerator, VisionAnalyzer},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Mutex;

pub const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
pub const FAKE_IMAGE_B64: &str = "iVBORw0KGgo=";
pub const TEST_PRIVATE_KEY: &str = include_str!("testdata/service_account_key.pem");

/// A service-account key file with a parseable RSA key.
pub fn service_account_json() -> String {
    json!({
        "type": "service_account",
        "project_id": "canva-app",
        "client_email": "wizardy@canva-app.iam.gserviceaccount.com",
        "private_key": TEST_PRIVATE_KEY
    })
    .to_string()
}

pub fn post_event(body: Value) -> Value {
    json!({
        "version": "2.0",
        "requestContext": {"http": {"method": "POST"}},
        "body": body.to_string(),
        "isBase64Encoded": false
    })
}

pub fn options_event() -> Value {
    json!({
        "version": "2.0",
        "requestContext": {"http": {"method": "OPTIONS"}}
    })
}

pub fn assert_cors(response: &GatewayResponse) {
    for (name, value) in CORS_HEADERS {
        assert_eq!(
            response.headers.get(name).map(String::as_str),
            Some(value),
            "missing CORS header {}",
            name
        );
    }
}

pub fn body_json(response: &GatewayResponse) -> Value {
    serde_json::from_str(&response.body).unwrap()
}

#[derive(Default)]
pub struct FakeText {
    pub reply: String,
    pub failure: Option<String>,
    pub requests: Mutex<Vec<TextGenerationRequest>>,
}

impl FakeText {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        match &self.failure {
            Some(message) => Err(WizardyError::VertexError(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub failure: Option<String>,
    pub requests: Mutex<Vec<ImageGenerationRequest>>,
}

impl FakeImages {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, request: ImageGenerationRequest) -> Result<GeneratedImage> {
        self.requests.lock().unwrap().push(request);
        match &self.failure {
            Some(message) => Err(WizardyError::VertexError(message.clone())),
            None => Ok(GeneratedImage {
                base64: FAKE_IMAGE_B64.to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeCaptioner {
    pub caption: String,
    pub images: Mutex<Vec<ImageData>>,
}

impl FakeCaptioner {
    pub fn replying(caption: &str) -> Self {
        Self {
            caption: caption.to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ImageCaptioner for FakeCaptioner {
    async fn caption(&self, image: &ImageData) -> Result<String> {
        self.images.lock().unwrap().push(image.clone());
        Ok(self.caption.clone())
    }
}

#[derive(Default)]
pub struct FakeVision {
    pub reply: String,
    pub requests: Mutex<Vec<VisionRequest>>,
}

impl FakeVision {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn instructions(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.instruction.clone())
            .collect()
    }
}

#[async_trait]
impl VisionAnalyzer for FakeVision {
    async fn analyze(&self, request: VisionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

/// Serves [`PNG_BYTES`] for every URL, or a fixed HTTP status failure.
#[derive(Default)]
pub struct FakeFetcher {
    pub status: Option<u16>,
    pub urls: Mutex<Vec<String>>,
    pub paths: Mutex<Vec<PathBuf>>,
}

impl FakeFetcher {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn scratch_paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<ScratchImage> {
        self.urls.lock().unwrap().push(url.to_string());
        if let Some(status) = self.status {
            return Err(WizardyError::DownloadError(format!(
                "Failed to download image: {}",
                status
            )));
        }
        let scratch = ScratchImage::from_bytes(&PNG_BYTES)?;
        self.paths.lock().unwrap().push(scratch.path().to_path_buf());
        Ok(scratch)
    }
}
