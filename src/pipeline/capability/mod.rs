//! External text/vision completion capability.
//!
//! Stages only see the `LlmClient` / `VisionClient` traits. Concrete clients
//! speak HTTP to a hosted chat-completions deployment or a local Ollama
//! instance; `MockLlmClient` stands in for both in tests.

pub mod azure;
pub mod image;
pub mod mock;
pub mod ollama;
pub mod types;

pub use azure::*;
pub use image::*;
pub use mock::*;
pub use ollama::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("AI service is not reachable at {0}")]
    NotReachable(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("AI service returned an error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Unrecognized label in AI response: '{0}'")]
    UnrecognizedLabel(String),

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),

    #[error("Invalid endpoint URL: '{0}'")]
    InvalidUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

impl CapabilityError {
    /// Map a reqwest transport error onto the capability taxonomy.
    pub(crate) fn from_transport(err: reqwest::Error, endpoint: &str, timeout_secs: u64) -> Self {
        if err.is_connect() {
            Self::NotReachable(endpoint.to_string())
        } else if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else {
            Self::Network(err.to_string())
        }
    }
}
