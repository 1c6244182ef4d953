use super::types::{CapabilityHealth, CompletionRequest, LlmClient, Provider, VisionClient};
use super::CapabilityError;

/// Mock capability client for testing. Returns a configurable response,
/// or a configured error for every call.
pub struct MockLlmClient {
    outcome: Result<String, CapabilityError>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: Ok(response.to_string()),
        }
    }

    /// A client whose every call fails with `error`.
    pub fn failing(error: CapabilityError) -> Self {
        Self { outcome: Err(error) }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _request: &CompletionRequest<'_>) -> Result<String, CapabilityError> {
        self.outcome.clone()
    }

    fn health_check(&self) -> Result<CapabilityHealth, CapabilityError> {
        self.outcome.as_ref().map_err(Clone::clone)?;
        Ok(CapabilityHealth {
            reachable: true,
            provider: Provider::Mock,
            model: "mock".to_string(),
            detail: None,
        })
    }
}

impl VisionClient for MockLlmClient {
    fn generate_with_image(
        &self,
        _request: &CompletionRequest<'_>,
        _image_bytes: &[u8],
    ) -> Result<String, CapabilityError> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: CompletionRequest<'static> = CompletionRequest {
        system: "system",
        user: "user",
        temperature: 0.3,
        max_tokens: 10,
    };

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        assert_eq!(client.generate(&REQUEST).unwrap(), "test response");
        assert_eq!(
            client.generate_with_image(&REQUEST, b"jpeg").unwrap(),
            "test response"
        );
    }

    #[test]
    fn failing_client_returns_error_everywhere() {
        let client = MockLlmClient::failing(CapabilityError::NotReachable("mock".into()));
        assert!(client.generate(&REQUEST).is_err());
        assert!(client.generate_with_image(&REQUEST, b"jpeg").is_err());
        assert!(client.health_check().is_err());
    }

    #[test]
    fn healthy_mock_reports_provider() {
        let health = MockLlmClient::new("ok").health_check().unwrap();
        assert!(health.reachable);
        assert_eq!(health.provider, Provider::Mock);
    }
}
