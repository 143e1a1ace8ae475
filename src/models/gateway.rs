//! API Gateway (HTTP API, payload v2) envelope as delivered to the handlers.

use crate::error::{Result, WizardyError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpContext {
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub http: HttpContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub request_context: RequestContext,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl GatewayEvent {
    pub fn new(method: impl Into<String>, body: Option<String>) -> Self {
        Self {
            request_context: RequestContext {
                http: HttpContext {
                    method: method.into(),
                },
            },
            body,
            is_base64_encoded: false,
        }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| WizardyError::RequestError(format!("Malformed gateway event: {}", e)))
    }

    pub fn method(&self) -> &str {
        &self.request_context.http.method
    }

    pub fn is_preflight(&self) -> bool {
        self.method().eq_ignore_ascii_case("OPTIONS")
    }

    /// Decodes the body (base64 if the gateway flagged it) and parses it as JSON.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .body
            .as_deref()
            .ok_or_else(|| WizardyError::RequestError("Request body is empty".into()))?;

        if self.is_base64_encoded {
            let decoded = STANDARD
                .decode(raw)
                .map_err(|e| WizardyError::RequestError(format!("Invalid base64 body: {}", e)))?;
            Ok(serde_json::from_slice(&decoded)?)
        } else {
            Ok(serde_json::from_str(raw)?)
        }
    }
}

/// The three payload shapes the frontend understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message { message: String },
    Image { image: String },
    Error { error: String },
}

impl ResponseBody {
    pub fn message(message: impl Into<String>) -> Self {
        ResponseBody::Message {
            message: message.into(),
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        ResponseBody::Image {
            image: image.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ResponseBody::Error {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status_code: u16, body: &ResponseBody) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self {
            status_code,
            headers,
            body: serde_json::to_string(body).unwrap_or_default(),
        }
    }

    pub fn ok(body: &ResponseBody) -> Self {
        Self::new(200, body)
    }

    pub fn preflight() -> Self {
        Self::ok(&ResponseBody::message("CORS preflight response"))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(500, &ResponseBody::error(message))
    }

    #[cfg(test)]
    pub fn parsed_body(&self) -> Result<ResponseBody> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
