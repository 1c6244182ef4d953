//! Azure OpenAI chat-completions client (hosted deployment).

use serde::{Deserialize, Serialize};

use super::image::image_data_url;
use super::types::{
    normalize_base_url, validate_model_name, CapabilityHealth, CompletionRequest, LlmClient,
    Provider, VisionClient,
};
use super::CapabilityError;

pub const DEFAULT_AZURE_DEPLOYMENT: &str = "gpt-4.1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-12-01-preview";

/// Client for one Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl AzureOpenAiClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: &str,
        timeout_secs: u64,
    ) -> Result<Self, CapabilityError> {
        let endpoint = normalize_base_url(endpoint)?;
        validate_model_name(deployment)?;
        if api_key.trim().is_empty() {
            return Err(CapabilityError::MissingCredential("AZURE_OPENAI_KEY"));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CapabilityError::Network(e.to_string()))?;

        Ok(Self {
            endpoint,
            deployment: deployment.to_string(),
            api_version: api_version.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }

    fn complete(&self, body: &ChatCompletionRequest<'_>) -> Result<String, CapabilityError> {
        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(|e| CapabilityError::from_transport(e, &self.endpoint, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        first_choice_content(parsed)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request<'a>(
    request: &CompletionRequest<'a>,
    user: MessageContent<'a>,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(request.system),
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

fn first_choice_content(response: ChatCompletionResponse) -> Result<String, CapabilityError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CapabilityError::MalformedResponse("response has no choices".into()))?;
    choice
        .message
        .content
        .ok_or_else(|| CapabilityError::MalformedResponse("message content is null".into()))
}

/// Prefer the service's `error.message`; fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

impl LlmClient for AzureOpenAiClient {
    fn generate(&self, request: &CompletionRequest<'_>) -> Result<String, CapabilityError> {
        self.complete(&build_request(request, MessageContent::Text(request.user)))
    }

    fn health_check(&self) -> Result<CapabilityHealth, CapabilityError> {
        let probe = CompletionRequest {
            system: "Reply with OK.",
            user: "ping",
            temperature: 0.0,
            max_tokens: 1,
        };
        self.generate(&probe)?;
        Ok(CapabilityHealth {
            reachable: true,
            provider: Provider::AzureOpenAi,
            model: self.deployment.clone(),
            detail: Some(format!("api-version {}", self.api_version)),
        })
    }
}

impl VisionClient for AzureOpenAiClient {
    fn generate_with_image(
        &self,
        request: &CompletionRequest<'_>,
        image_bytes: &[u8],
    ) -> Result<String, CapabilityError> {
        let parts = vec![
            ContentPart::Text { text: request.user },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image_data_url(image_bytes),
                },
            },
        ];
        self.complete(&build_request(request, MessageContent::Parts(parts)))
    }
}
