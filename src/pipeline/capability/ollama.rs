use serde::{Deserialize, Serialize};

use super::image::encode_base64;
use super::types::{
    normalize_base_url, validate_model_name, CapabilityHealth, CompletionRequest, LlmClient,
    Provider, VisionClient,
};
use super::CapabilityError;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2-vision";

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient for one model.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, CapabilityError> {
        let base_url = normalize_base_url(base_url)?;
        validate_model_name(model)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CapabilityError::Network(e.to_string()))?;

        Ok(Self {
            base_url,
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Result<Self, CapabilityError> {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL, 300)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat(&self, body: &OllamaChatRequest<'_>) -> Result<String, CapabilityError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| CapabilityError::from_transport(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| CapabilityError::MalformedResponse("response has no message".into()))
    }

    fn list_models(&self) -> Result<Vec<String>, CapabilityError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CapabilityError::from_transport(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Request body for Ollama /api/chat
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    /// Base64-encoded images (only for user messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaResponseMessage>,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

fn build_chat_request<'a>(
    model: &'a str,
    request: &CompletionRequest<'a>,
    images: Option<Vec<String>>,
) -> OllamaChatRequest<'a> {
    OllamaChatRequest {
        model,
        messages: vec![
            OllamaChatMessage {
                role: "system",
                content: request.system,
                images: None,
            },
            OllamaChatMessage {
                role: "user",
                content: request.user,
                images,
            },
        ],
        stream: false,
        options: OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        },
    }
}

impl LlmClient for OllamaClient {
    fn generate(&self, request: &CompletionRequest<'_>) -> Result<String, CapabilityError> {
        self.chat(&build_chat_request(&self.model, request, None))
    }

    fn health_check(&self) -> Result<CapabilityHealth, CapabilityError> {
        let models = self.list_models()?;
        let installed = models.iter().any(|m| m.starts_with(&self.model));
        let detail = if installed {
            format!("{} models installed", models.len())
        } else {
            format!("model '{}' is not installed", self.model)
        };
        Ok(CapabilityHealth {
            reachable: true,
            provider: Provider::Ollama,
            model: self.model.clone(),
            detail: Some(detail),
        })
    }
}

impl VisionClient for OllamaClient {
    fn generate_with_image(
        &self,
        request: &CompletionRequest<'_>,
        image_bytes: &[u8],
    ) -> Result<String, CapabilityError> {
        let images = vec![encode_base64(image_bytes)];
        self.chat(&build_chat_request(&self.model, request, Some(images)))
    }
}
