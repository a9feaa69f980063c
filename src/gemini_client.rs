use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::Config;
use crate::error::InsightError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Anything able to answer a `generateContent` request.
///
/// The HTTP client below is the only production implementation; tests swap in
/// a recording mock.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, InsightError>;
}

pub struct GeminiClient {
    api_key: String,
    endpoint: Url,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Fails with [`InsightError::MissingApiKey`] when no credential is
    /// configured, so no request is ever attempted without one.
    pub fn new(config: &Config) -> Result<Self, InsightError> {
        let api_key = config.api_key.clone().ok_or(InsightError::MissingApiKey)?;
        let endpoint = config
            .generate_content_url()
            .map_err(|e| InsightError::Transport(format!("Invalid Gemini endpoint: {}", e)))?;

        Ok(Self {
            api_key,
            endpoint,
            client: reqwest::Client::new(),
        })
    }

    pub fn model_endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, InsightError> {
        debug!(
            endpoint = %self.endpoint,
            turns = request.contents.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("API request failed with status {}: {}", status, body);
            return Err(service_error(status, &body));
        }

        debug!("Received response from Gemini API: {}", body);

        serde_json::from_str(&body).map_err(|e| {
            InsightError::MalformedResponse(format!("Failed to parse response: {}", e))
        })
    }
}

/// Prefer the message from Gemini's error envelope, fall back to the raw body.
fn service_error(status: StatusCode, body: &str) -> InsightError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    InsightError::service(Some(status.as_u16()), message)
}

// Gemini REST types

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Part kinds this client never sends (function calls, thoughts, ...).
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

/// Base64 payload with its media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }

    /// Text of the first candidate, or `None` when it produced none.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
