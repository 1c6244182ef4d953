use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::pipeline::capability::{
    AzureOpenAiClient, CapabilityClient, CapabilityError, OllamaClient, DEFAULT_AZURE_API_VERSION,
    DEFAULT_AZURE_DEPLOYMENT, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL,
};

/// Application-level constants
pub const APP_NAME: &str = "AssetInspector";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds before an AI call is abandoned.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 120;

const ENV_PROVIDER: &str = "INSPECTOR_AI_PROVIDER";
const ENV_TIMEOUT: &str = "INSPECTOR_AI_TIMEOUT_SECS";
const ENV_EXAMPLE: &str = "INSPECTOR_EXTRACTION_EXAMPLE";
const ENV_AZURE_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
const ENV_AZURE_KEY: &str = "AZURE_OPENAI_KEY";
const ENV_AZURE_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
const ENV_AZURE_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "asset_inspector=info"
}

/// Get the application data directory
/// ~/AssetInspector/ on all platforms. `None` when no home directory exists.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Get the templates directory (operator-supplied prompt assets)
pub fn templates_dir() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("templates"))
}

/// Extraction example picked up when `INSPECTOR_EXTRACTION_EXAMPLE` is unset.
pub fn default_example_path() -> Option<PathBuf> {
    templates_dir().map(|dir| dir.join("extraction_example.json"))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown AI provider '{0}' (expected 'azure' or 'ollama')")]
    UnknownProvider(String),

    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Backend selection with its connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Azure {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
    Ollama {
        host: String,
        model: String,
    },
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Azure { .. } => "azure",
            Self::Ollama { .. } => "ollama",
        }
    }
}

/// Everything needed to build the capability client and load prompt assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub provider: ProviderKind,
    pub timeout_secs: u64,
    pub extraction_example: Option<PathBuf>,
}

impl AiSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider_name = get(ENV_PROVIDER).unwrap_or_else(|| "azure".to_string());
        let provider = match provider_name.to_ascii_lowercase().as_str() {
            "azure" => ProviderKind::Azure {
                endpoint: get(ENV_AZURE_ENDPOINT).ok_or(ConfigError::Missing(ENV_AZURE_ENDPOINT))?,
                api_key: get(ENV_AZURE_KEY).ok_or(ConfigError::Missing(ENV_AZURE_KEY))?,
                deployment: get(ENV_AZURE_DEPLOYMENT)
                    .unwrap_or_else(|| DEFAULT_AZURE_DEPLOYMENT.to_string()),
                api_version: get(ENV_AZURE_API_VERSION)
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            },
            "ollama" => ProviderKind::Ollama {
                host: get(ENV_OLLAMA_HOST).unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model: get(ENV_OLLAMA_MODEL).unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            },
            _ => return Err(ConfigError::UnknownProvider(provider_name)),
        };

        let timeout_secs = match get(ENV_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_TIMEOUT,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        Ok(Self {
            provider,
            timeout_secs,
            extraction_example: get(ENV_EXAMPLE).map(PathBuf::from),
        })
    }
}

/// Construct the configured capability client.
pub fn build_client(settings: &AiSettings) -> Result<Arc<dyn CapabilityClient>, ConfigError> {
    let client: Arc<dyn CapabilityClient> = match &settings.provider {
        ProviderKind::Azure {
            endpoint,
            api_key,
            deployment,
            api_version,
        } => Arc::new(AzureOpenAiClient::new(
            endpoint,
            api_key,
            deployment,
            api_version,
            settings.timeout_secs,
        )?),
        ProviderKind::Ollama { host, model } => {
            Arc::new(OllamaClient::new(host, model, settings.timeout_secs)?)
        }
    };
    tracing::info!(
        provider = settings.provider.name(),
        timeout_secs = settings.timeout_secs,
        "AI client configured"
    );
    Ok(client)
}
