use std::sync::Arc;

use super::photo::analyze_photo;
use super::structured::extract_structured;
use super::summary::summarize;
use super::urgency::classify_urgency;
use crate::models::{AnalysisResult, AuditInput};
use crate::pipeline::capability::{CapabilityClient, LlmClient};
use crate::pipeline::extraction_example::ExtractionExample;

/// Run the audit analysis stages in order:
/// urgency → summary → structured extraction (which consumes the urgency).
pub fn analyze_audit<L: LlmClient + ?Sized>(
    llm: &L,
    example: &ExtractionExample,
    input: &AuditInput,
) -> AnalysisResult {
    let _span = tracing::info_span!(
        "analyze_audit",
        status = %input.audit_status,
        photo_count = input.photo_count,
        comments_len = input.raw_comments.len(),
    )
    .entered();
    let start = std::time::Instant::now();

    let urgency_level = classify_urgency(llm, &input.raw_comments, input.audit_status);
    let summary = summarize(
        llm,
        &input.raw_comments,
        input.audit_status,
        input.photo_count,
    );
    let structured_output = extract_structured(
        llm,
        example,
        &input.raw_comments,
        input.audit_status,
        urgency_level,
    );

    tracing::info!(
        urgency = %urgency_level,
        elapsed_ms = %start.elapsed().as_millis(),
        "audit analysis complete"
    );

    AnalysisResult {
        urgency_level,
        summary,
        structured_output,
    }
}

/// Entry points for callers: one capability client and one extraction
/// example, both fixed at construction. Holds no mutable state, so one
/// instance serves concurrent audit and photo requests.
#[derive(Clone)]
pub struct AnalysisPipeline {
    client: Arc<dyn CapabilityClient>,
    example: ExtractionExample,
}

impl AnalysisPipeline {
    pub fn new(client: Arc<dyn CapabilityClient>, example: ExtractionExample) -> Self {
        Self { client, example }
    }

    pub fn analyze_audit(&self, input: &AuditInput) -> AnalysisResult {
        analyze_audit(self.client.as_ref(), &self.example, input)
    }

    pub fn analyze_photo(&self, image_bytes: &[u8], status_context: &str) -> String {
        analyze_photo(self.client.as_ref(), image_bytes, status_context)
    }

    pub fn client(&self) -> &dyn CapabilityClient {
        self.client.as_ref()
    }

    pub fn example(&self) -> &ExtractionExample {
        &self.example
    }
}
