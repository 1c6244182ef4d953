use serde::{Deserialize, Serialize};

use super::enums::{AuditStatus, UrgencyLevel};

/// Inspector input to the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInput {
    pub raw_comments: String,
    pub audit_status: AuditStatus,
    pub photo_count: u32,
}

impl AuditInput {
    pub fn new(raw_comments: impl Into<String>, audit_status: AuditStatus, photo_count: u32) -> Self {
        Self {
            raw_comments: raw_comments.into(),
            audit_status,
            photo_count,
        }
    }
}

/// Audit submission as sent by the inspection client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSubmission {
    pub asset_id: i64,
    pub inspector_id: i64,
    pub audit_status: AuditStatus,
    pub raw_comments: String,
    #[serde(default)]
    pub voice_file_url: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

impl AuditSubmission {
    /// Photo count is the number of uploaded photo URLs.
    pub fn to_input(&self) -> AuditInput {
        AuditInput {
            raw_comments: self.raw_comments.clone(),
            audit_status: self.audit_status,
            photo_count: u32::try_from(self.photo_urls.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Complete result of the audit analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub urgency_level: UrgencyLevel,
    pub summary: String,
    pub structured_output: StructuredFinding,
}

/// Fixed-shape decision record synthesized from inspection notes.
///
/// Every field is required on decode: a generated document missing a key,
/// or carrying one with the wrong type, is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFinding {
    pub executive_summary: String,
    pub condition_assessment: ConditionAssessment,
    pub findings: Vec<String>,
    pub issues_identified: Vec<String>,
    pub recommendations: Vec<String>,
    pub next_actions: NextActions,
    pub safety_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionAssessment {
    pub overall_status: String,
    pub urgency_level: String,
    pub safety_risk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextActions {
    pub create_workorder: bool,
    pub priority: String,
    pub maintenance_required: bool,
}

/// Top-level keys of a serialized [`StructuredFinding`].
pub const STRUCTURED_FINDING_KEYS: [&str; 7] = [
    "executive_summary",
    "condition_assessment",
    "findings",
    "issues_identified",
    "recommendations",
    "next_actions",
    "safety_notes",
];
