use crate::models::AuditStatus;
use crate::pipeline::capability::LlmClient;
use crate::pipeline::prompt_templates::{summary_prompt, SUMMARY_PARAMS, SUMMARY_SYSTEM};

/// Short narrative of the inspection. Any capability error yields
/// [`fallback_summary`]; response quality is not judged.
pub fn summarize<L: LlmClient + ?Sized>(
    llm: &L,
    comments: &str,
    status: AuditStatus,
    photo_count: u32,
) -> String {
    let _span = tracing::info_span!("summary_stage", status = %status, photo_count).entered();

    let prompt = summary_prompt(comments, status, photo_count);
    match llm.generate(&SUMMARY_PARAMS.request(SUMMARY_SYSTEM, &prompt)) {
        Ok(text) => {
            let text = text.trim().to_string();
            tracing::info!(summary_len = text.len(), "summary generated");
            text
        }
        Err(e) => {
            tracing::warn!(error = %e, "summary generation failed, using template");
            fallback_summary(status, photo_count)
        }
    }
}

pub fn fallback_summary(status: AuditStatus, photo_count: u32) -> String {
    format!("Asset inspection completed with {status} status. {photo_count} photos documented.")
}
