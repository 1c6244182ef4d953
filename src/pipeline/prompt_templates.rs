//! Prompt templates and sampling parameters for each analysis stage.

use crate::models::{AuditStatus, UrgencyLevel};
use crate::pipeline::capability::CompletionRequest;
use crate::pipeline::extraction_example::ExtractionExample;

// ═══════════════════════════════════════════════════════════
// Stage parameters
// ═══════════════════════════════════════════════════════════

/// Sampling parameters for one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StageParams {
    pub fn request<'a>(&self, system: &'a str, user: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            system,
            user,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// A single label is expected back.
pub const URGENCY_PARAMS: StageParams = StageParams {
    temperature: 0.2,
    max_tokens: 10,
};

pub const SUMMARY_PARAMS: StageParams = StageParams {
    temperature: 0.4,
    max_tokens: 200,
};

pub const EXTRACTION_PARAMS: StageParams = StageParams {
    temperature: 0.3,
    max_tokens: 800,
};

pub const PHOTO_PARAMS: StageParams = StageParams {
    temperature: 0.3,
    max_tokens: 200,
};

/// Words in inspector comments that escalate urgency regardless of status.
pub const OVERRIDE_KEYWORDS: &[&str] = &[
    "unsafe",
    "dangerous",
    "immediate",
    "hazard",
    "risk",
    "emergency",
];

// ═══════════════════════════════════════════════════════════
// System prompts
// ═══════════════════════════════════════════════════════════

pub const URGENCY_SYSTEM: &str = "You are an asset inspection analyst.";

pub const SUMMARY_SYSTEM: &str = "You are a technical writer for inspection reports.";

pub const EXTRACTION_SYSTEM: &str = "Return only valid JSON.";

pub const PHOTO_SYSTEM: &str =
    "You are an expert industrial equipment inspector with years of experience.";

// ═══════════════════════════════════════════════════════════
// User prompts
// ═══════════════════════════════════════════════════════════

/// Classification prompt: base mapping plus keyword override, one label back.
pub fn urgency_prompt(comments: &str, status: AuditStatus) -> String {
    let mapping: String = AuditStatus::all()
        .iter()
        .map(|s| format!("- \"{s}\" status = {} urgency\n", s.base_urgency()))
        .collect();
    let keywords = OVERRIDE_KEYWORDS.join(", ");
    let labels = label_list(UrgencyLevel::all());

    format!(
        "You are an expert industrial asset inspector. Analyze this audit and determine urgency.\n\
         \n\
         Audit Status: {status}\n\
         Inspector Comments: {comments}\n\
         \n\
         Rules:\n\
         {mapping}\
         - Override if comments mention: {keywords}\n\
         \n\
         Return ONLY: {labels}"
    )
}

pub fn summary_prompt(comments: &str, status: AuditStatus, photo_count: u32) -> String {
    format!(
        "Summarize this inspection in 2-3 professional sentences.\n\
         \n\
         Status: {status}\n\
         Comments: {comments}\n\
         Photos: {photo_count}\n\
         \n\
         Focus on: condition, key findings, recommendations."
    )
}

/// One-shot structured extraction prompt anchored by `example`.
pub fn extraction_prompt(
    example: &ExtractionExample,
    comments: &str,
    status: AuditStatus,
    urgency: UrgencyLevel,
) -> String {
    format!(
        "Convert inspection notes to JSON format.\n\
         \n\
         EXAMPLE INPUT:\n\
         {example_input}\n\
         \n\
         EXAMPLE OUTPUT:\n\
         {example_output}\n\
         \n\
         NOW PROCESS:\n\
         Status: {status}\n\
         Urgency: {urgency}\n\
         Notes: {comments}\n\
         \n\
         Return ONLY valid JSON with same structure. No markdown.",
        example_input = example.input(),
        example_output = example.rendered_output(),
    )
}

pub fn photo_prompt(status_context: &str) -> String {
    format!(
        "You are an expert industrial asset inspector analyzing an inspection photo.\n\
         \n\
         The asset has been marked as: {status_context}\n\
         \n\
         Analyze this image and provide a brief technical assessment (2-3 sentences) focusing on:\n\
         - Visible condition of the equipment/asset\n\
         - Any notable defects, wear, corrosion, or damage you observe\n\
         - Safety concerns if visible\n\
         - Maintenance recommendations based on what you see\n\
         \n\
         Be specific about what you observe in the image. Keep it professional and concise."
    )
}

fn label_list(levels: &[UrgencyLevel]) -> String {
    match levels.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            let head: Vec<&str> = rest.iter().map(|l| l.as_str()).collect();
            format!("{}, or {}", head.join(", "), last)
        }
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
