use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::CapabilityError;

/// One completion call: instructions plus sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    /// Sampling temperature. Stages use 0.2 to 0.4.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Which backend a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    AzureOpenAi,
    Ollama,
    Mock,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureOpenAi => "azure_openai",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

/// Result of a capability health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityHealth {
    pub reachable: bool,
    pub provider: Provider,
    pub model: String,
    pub detail: Option<String>,
}

/// Text-completion capability (allows mocking).
pub trait LlmClient: Send + Sync {
    fn generate(&self, request: &CompletionRequest<'_>) -> Result<String, CapabilityError>;

    fn health_check(&self) -> Result<CapabilityHealth, CapabilityError>;
}

/// Vision-completion capability: a completion with one embedded image.
pub trait VisionClient: Send + Sync {
    fn generate_with_image(
        &self,
        request: &CompletionRequest<'_>,
        image_bytes: &[u8],
    ) -> Result<String, CapabilityError>;
}

/// A client that serves both text and vision stages.
pub trait CapabilityClient: LlmClient + VisionClient {}

impl<T: LlmClient + VisionClient> CapabilityClient for T {}

/// Validate a model or deployment name before it goes into a request.
///
/// Format: `[namespace/]name[:tag]`, each segment starting alphanumeric.
/// Blocks path traversal, whitespace and shell metacharacters.
pub fn validate_model_name(name: &str) -> Result<(), CapabilityError> {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    let valid = PATTERN.get_or_init(|| {
        regex::Regex::new(
            r"^[a-zA-Z0-9][a-zA-Z0-9._-]*(/[a-zA-Z0-9][a-zA-Z0-9._-]*)?(:[a-zA-Z0-9._-]+)?$",
        )
        .expect("static regex")
    });

    if name.is_empty() || !valid.is_match(name) {
        return Err(CapabilityError::InvalidModelName(name.to_string()));
    }
    Ok(())
}

/// Normalize a base URL: require http(s) and drop trailing slashes.
pub fn normalize_base_url(url: &str) -> Result<String, CapabilityError> {
    let trimmed = url.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| CapabilityError::InvalidUrl(url.to_string()))?;
    if host.is_empty() {
        return Err(CapabilityError::InvalidUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_accepts_simple() {
        assert!(validate_model_name("gpt-4.1").is_ok());
        assert!(validate_model_name("llama3.2-vision:11b").is_ok());
    }

    #[test]
    fn validate_name_accepts_namespaced() {
        assert!(validate_model_name("library/llava:13b").is_ok());
    }

    #[test]
    fn validate_name_rejects_path_traversal() {
        assert!(validate_model_name("../etc/passwd").is_err());
        assert!(validate_model_name("a/b/c").is_err());
    }

    #[test]
    fn validate_name_rejects_shell_injection() {
        assert!(validate_model_name("gpt; rm -rf /").is_err());
        assert!(validate_model_name("gpt 4").is_err());
        assert!(validate_model_name("").is_err());
    }

    #[test]
    fn normalize_url_trims_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:11434/").unwrap(),
            "http://localhost:11434"
        );
        assert_eq!(
            normalize_base_url("https://inspect.openai.azure.com").unwrap(),
            "https://inspect.openai.azure.com"
        );
    }

    #[test]
    fn normalize_url_rejects_missing_scheme() {
        assert!(matches!(
            normalize_base_url("localhost:11434"),
            Err(CapabilityError::InvalidUrl(_))
        ));
        assert!(normalize_base_url("http://").is_err());
    }
}
