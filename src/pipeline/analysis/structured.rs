use crate::models::{
    AuditStatus, ConditionAssessment, NextActions, StructuredFinding, UrgencyLevel,
};
use crate::pipeline::capability::{CapabilityError, LlmClient};
use crate::pipeline::extraction_example::ExtractionExample;
use crate::pipeline::prompt_templates::{extraction_prompt, EXTRACTION_PARAMS, EXTRACTION_SYSTEM};

/// Characters of raw comments quoted in the fallback executive summary.
const SUMMARY_EXCERPT_CHARS: usize = 100;
/// Characters of raw comments carried into fallback safety notes.
const SAFETY_EXCERPT_CHARS: usize = 200;

/// Extract a structured finding from inspection notes.
///
/// The generated document must decode into [`StructuredFinding`] exactly;
/// transport errors, syntax errors and shape mismatches all yield
/// [`fallback_structured_finding`].
pub fn extract_structured<L: LlmClient + ?Sized>(
    llm: &L,
    example: &ExtractionExample,
    comments: &str,
    status: AuditStatus,
    urgency: UrgencyLevel,
) -> StructuredFinding {
    let _span =
        tracing::info_span!("extraction_stage", status = %status, urgency = %urgency).entered();

    match request_finding(llm, example, comments, status, urgency) {
        Ok(finding) => {
            tracing::info!(
                findings = finding.findings.len(),
                issues = finding.issues_identified.len(),
                "structured finding extracted"
            );
            finding
        }
        Err(e) => {
            tracing::warn!(error = %e, "structured extraction failed, synthesizing finding");
            fallback_structured_finding(comments, status, urgency)
        }
    }
}

fn request_finding<L: LlmClient + ?Sized>(
    llm: &L,
    example: &ExtractionExample,
    comments: &str,
    status: AuditStatus,
    urgency: UrgencyLevel,
) -> Result<StructuredFinding, CapabilityError> {
    let prompt = extraction_prompt(example, comments, status, urgency);
    let response = llm.generate(&EXTRACTION_PARAMS.request(EXTRACTION_SYSTEM, &prompt))?;
    parse_structured_finding(&response)
}

/// Strip a surrounding fenced code block and its optional language tag.
/// Unfenced text is returned trimmed.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match after_open.find("```") {
        Some(end) => &after_open[..end],
        None => after_open,
    };
    body.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        .trim()
}

/// Strict decode: every key present with the right type.
pub fn parse_structured_finding(response: &str) -> Result<StructuredFinding, CapabilityError> {
    serde_json::from_str(strip_code_fence(response))
        .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))
}

/// Deterministic finding built from status, urgency and a comment excerpt.
pub fn fallback_structured_finding(
    comments: &str,
    status: AuditStatus,
    urgency: UrgencyLevel,
) -> StructuredFinding {
    let issues_identified = if status == AuditStatus::Good {
        Vec::new()
    } else {
        vec!["Review needed".to_string()]
    };
    let safety_risk = if urgency.is_elevated() { "Pending" } else { "None" };
    let safety_notes = if comments.is_empty() {
        "Standard inspection.".to_string()
    } else {
        truncate_chars(comments, SAFETY_EXCERPT_CHARS).to_string()
    };

    StructuredFinding {
        executive_summary: format!(
            "Inspection: {status}. {}",
            truncate_chars(comments, SUMMARY_EXCERPT_CHARS)
        ),
        condition_assessment: ConditionAssessment {
            overall_status: status.to_string(),
            urgency_level: urgency.to_string(),
            safety_risk: safety_risk.to_string(),
        },
        findings: vec![format!("Status: {status}")],
        issues_identified,
        recommendations: vec!["Standard maintenance".to_string()],
        next_actions: NextActions {
            create_workorder: urgency.is_elevated(),
            priority: urgency.to_string(),
            maintenance_required: status.requires_maintenance(),
        },
        safety_notes,
    }
}

/// First `max` characters of `text`, never splitting a code point.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STRUCTURED_FINDING_KEYS;
    use crate::pipeline::capability::MockLlmClient;

    fn example_json() -> String {
        ExtractionExample::bundled().rendered_output().to_string()
    }

    fn assert_all_keys(finding: &StructuredFinding) {
        let value = serde_json::to_value(finding).unwrap();
        for key in STRUCTURED_FINDING_KEYS {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    // ── strip_code_fence ──

    #[test]
    fn strips_tagged_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_untagged_fence() {
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_tag_without_newline() {
        assert_eq!(strip_code_fence("```json{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn unclosed_fence_is_tolerated() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn fenced_and_bare_parse_identically() {
        let bare = example_json();
        let fenced = format!("```json\n{bare}\n```");
        assert_eq!(
            parse_structured_finding(&fenced).unwrap(),
            parse_structured_finding(&bare).unwrap()
        );
    }

    // ── primary path ──

    #[test]
    fn valid_response_is_returned() {
        let client = MockLlmClient::new(&example_json());
        let finding = extract_structured(
            &client,
            &ExtractionExample::bundled(),
            "all good",
            AuditStatus::Good,
            UrgencyLevel::Low,
        );
        assert_eq!(&finding, ExtractionExample::bundled().output());
    }

    #[test]
    fn malformed_json_falls_back() {
        let client = MockLlmClient::new("{\"executive_summary\": ");
        let finding = extract_structured(
            &client,
            &ExtractionExample::bundled(),
            "cracked insulator",
            AuditStatus::Poor,
            UrgencyLevel::High,
        );
        assert_eq!(finding.findings, vec!["Status: Poor"]);
        assert_all_keys(&finding);
    }

    #[test]
    fn partial_shape_falls_back() {
        let client = MockLlmClient::new(r#"{"executive_summary": "ok", "findings": []}"#);
        let finding = extract_structured(
            &client,
            &ExtractionExample::bundled(),
            "minor scuffs",
            AuditStatus::Fair,
            UrgencyLevel::Medium,
        );
        assert_eq!(finding, fallback_structured_finding("minor scuffs", AuditStatus::Fair, UrgencyLevel::Medium));
    }

    #[test]
    fn mistyped_field_falls_back() {
        let mut value: serde_json::Value = serde_json::from_str(&example_json()).unwrap();
        value["next_actions"]["create_workorder"] = serde_json::json!("no");
        let client = MockLlmClient::new(&value.to_string());
        let finding = extract_structured(
            &client,
            &ExtractionExample::bundled(),
            "",
            AuditStatus::Good,
            UrgencyLevel::Low,
        );
        assert_eq!(finding.recommendations, vec!["Standard maintenance"]);
    }

    #[test]
    fn capability_error_falls_back() {
        let client = MockLlmClient::failing(CapabilityError::Network("reset".into()));
        let finding = extract_structured(
            &client,
            &ExtractionExample::bundled(),
            "gate hinge bent",
            AuditStatus::Fair,
            UrgencyLevel::Medium,
        );
        assert_all_keys(&finding);
        assert_eq!(finding.executive_summary, "Inspection: Fair. gate hinge bent");
    }

    // ── fallback ──

    #[test]
    fn fallback_good_low() {
        let finding = fallback_structured_finding("all fine", AuditStatus::Good, UrgencyLevel::Low);
        assert!(finding.issues_identified.is_empty());
        assert!(!finding.next_actions.create_workorder);
        assert!(!finding.next_actions.maintenance_required);
        assert_eq!(finding.next_actions.priority, "Low");
        assert_eq!(finding.condition_assessment.safety_risk, "None");
    }

    #[test]
    fn fallback_critical_critical() {
        let finding = fallback_structured_finding(
            "arcing at bushing",
            AuditStatus::Critical,
            UrgencyLevel::Critical,
        );
        assert_eq!(finding.issues_identified.len(), 1);
        assert!(finding.next_actions.create_workorder);
        assert!(finding.next_actions.maintenance_required);
        assert_eq!(finding.condition_assessment.safety_risk, "Pending");
        assert_eq!(finding.condition_assessment.overall_status, "Critical");
        assert_eq!(finding.safety_notes, "arcing at bushing");
    }

    #[test]
    fn fallback_fair_high_opens_workorder_without_maintenance() {
        let finding = fallback_structured_finding("", AuditStatus::Fair, UrgencyLevel::High);
        assert!(finding.next_actions.create_workorder);
        assert!(!finding.next_actions.maintenance_required);
        assert_eq!(finding.safety_notes, "Standard inspection.");
    }

    #[test]
    fn fallback_truncates_comments() {
        let comments = "x".repeat(500);
        let finding = fallback_structured_finding(&comments, AuditStatus::Poor, UrgencyLevel::High);
        assert_eq!(finding.executive_summary, format!("Inspection: Poor. {}", "x".repeat(100)));
        assert_eq!(finding.safety_notes.chars().count(), 200);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let comments = "é".repeat(150);
        assert_eq!(truncate_chars(&comments, 100).chars().count(), 100);
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn fallback_always_complete() {
        for status in AuditStatus::all() {
            for urgency in UrgencyLevel::all() {
                assert_all_keys(&fallback_structured_finding("notes", *status, *urgency));
            }
        }
    }
}
