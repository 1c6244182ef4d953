//! One-shot example asset that anchors the structured extraction schema.
//!
//! The example is a JSON file `{ "input": "...", "output": { ...finding... } }`.
//! A default copy is bundled at compile time; deployments can point
//! `INSPECTOR_EXTRACTION_EXAMPLE` at their own file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::StructuredFinding;

const BUNDLED_EXAMPLE: &str = include_str!("../../assets/extraction_example.json");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Cannot read extraction example {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid extraction example: {0}")]
    Json(String),

    #[error("Extraction example input is empty")]
    EmptyInput,
}

#[derive(Deserialize)]
struct RawExample {
    input: String,
    output: StructuredFinding,
}

/// Validated example pair, with the output pre-rendered for prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionExample {
    input: String,
    output: StructuredFinding,
    rendered_output: String,
}

impl ExtractionExample {
    /// The example shipped with the crate.
    pub fn bundled() -> Self {
        Self::from_json_str(BUNDLED_EXAMPLE).expect("bundled extraction example is valid")
    }

    pub fn from_json_str(json: &str) -> Result<Self, TemplateError> {
        let raw: RawExample =
            serde_json::from_str(json).map_err(|e| TemplateError::Json(e.to_string()))?;
        if raw.input.trim().is_empty() {
            return Err(TemplateError::EmptyInput);
        }
        let rendered_output = serde_json::to_string_pretty(&raw.output)
            .map_err(|e| TemplateError::Json(e.to_string()))?;
        Ok(Self {
            input: raw.input,
            output: raw.output,
            rendered_output,
        })
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let json = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let example = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "loaded extraction example");
        Ok(example)
    }

    /// Load `path` when given, else a default file if it exists, else the bundled copy.
    pub fn resolve(path: Option<&Path>, default_path: &Path) -> Result<Self, TemplateError> {
        match path {
            Some(p) => Self::load(p),
            None if default_path.is_file() => Self::load(default_path),
            None => Ok(Self::bundled()),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &StructuredFinding {
        &self.output
    }

    pub fn rendered_output(&self) -> &str {
        &self.rendered_output
    }
}
