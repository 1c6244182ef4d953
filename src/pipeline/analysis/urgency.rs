use crate::models::{AuditStatus, UrgencyLevel};
use crate::pipeline::capability::{CapabilityError, LlmClient};
use crate::pipeline::prompt_templates::{
    urgency_prompt, OVERRIDE_KEYWORDS, URGENCY_PARAMS, URGENCY_SYSTEM,
};

/// Classify audit urgency. Never fails: any capability error or
/// unrecognized label degrades to [`fallback_urgency`].
pub fn classify_urgency<L: LlmClient + ?Sized>(
    llm: &L,
    comments: &str,
    status: AuditStatus,
) -> UrgencyLevel {
    let _span = tracing::info_span!("urgency_stage", status = %status).entered();

    match request_urgency(llm, comments, status) {
        Ok(level) => {
            tracing::info!(urgency = %level, "urgency classified");
            level
        }
        Err(e) => {
            let level = fallback_urgency(status);
            let keywords = override_keywords_in(comments);
            tracing::warn!(
                error = %e,
                fallback = %level,
                ignored_keywords = ?keywords,
                "urgency classification failed, using status mapping"
            );
            level
        }
    }
}

/// Status-only urgency. Ignores the keyword override, so it is a degraded
/// answer compared to a successful classification.
pub fn fallback_urgency(status: AuditStatus) -> UrgencyLevel {
    status.base_urgency()
}

/// Accept exactly one of the four labels (case-sensitive, whitespace trimmed).
pub fn parse_urgency_label(response: &str) -> Result<UrgencyLevel, CapabilityError> {
    let label = response.trim();
    label
        .parse()
        .map_err(|_| CapabilityError::UnrecognizedLabel(label.to_string()))
}

/// Override keywords present in `comments` (case-sensitive).
pub fn override_keywords_in(comments: &str) -> Vec<&'static str> {
    OVERRIDE_KEYWORDS
        .iter()
        .copied()
        .filter(|k| comments.contains(k))
        .collect()
}

fn request_urgency<L: LlmClient + ?Sized>(
    llm: &L,
    comments: &str,
    status: AuditStatus,
) -> Result<UrgencyLevel, CapabilityError> {
    let prompt = urgency_prompt(comments, status);
    let response = llm.generate(&URGENCY_PARAMS.request(URGENCY_SYSTEM, &prompt))?;
    parse_urgency_label(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::capability::{
        CapabilityHealth, CompletionRequest, MockLlmClient, Provider,
    };

    /// Stub that follows the classification prompt contract: base mapping
    /// from the status line, escalated to Critical on any override keyword.
    struct RuleFollowingClient;

    impl LlmClient for RuleFollowingClient {
        fn generate(&self, request: &CompletionRequest<'_>) -> Result<String, CapabilityError> {
            let status_line = request
                .user
                .lines()
                .find_map(|l| l.strip_prefix("Audit Status: "))
                .ok_or_else(|| CapabilityError::MalformedResponse("no status".into()))?;
            let comments = request
                .user
                .lines()
                .find_map(|l| l.strip_prefix("Inspector Comments: "))
                .unwrap_or("");
            let status: AuditStatus = status_line
                .parse()
                .map_err(|_| CapabilityError::MalformedResponse(status_line.into()))?;
            let level = if override_keywords_in(comments).is_empty() {
                status.base_urgency()
            } else {
                UrgencyLevel::Critical
            };
            Ok(level.to_string())
        }

        fn health_check(&self) -> Result<CapabilityHealth, CapabilityError> {
            Ok(CapabilityHealth {
                reachable: true,
                provider: Provider::Mock,
                model: "rules".into(),
                detail: None,
            })
        }
    }

    #[test]
    fn fallback_mapping_is_exact() {
        assert_eq!(fallback_urgency(AuditStatus::Good), UrgencyLevel::Low);
        assert_eq!(fallback_urgency(AuditStatus::Fair), UrgencyLevel::Medium);
        assert_eq!(fallback_urgency(AuditStatus::Poor), UrgencyLevel::High);
        assert_eq!(fallback_urgency(AuditStatus::Critical), UrgencyLevel::Critical);
    }

    #[test]
    fn accepts_exact_label() {
        let client = MockLlmClient::new("High");
        assert_eq!(
            classify_urgency(&client, "loose panel", AuditStatus::Good),
            UrgencyLevel::High
        );
    }

    #[test]
    fn trims_whitespace_around_label() {
        let client = MockLlmClient::new("  Medium\n");
        assert_eq!(
            classify_urgency(&client, "", AuditStatus::Good),
            UrgencyLevel::Medium
        );
    }

    #[test]
    fn lowercase_label_falls_back() {
        let client = MockLlmClient::new("high");
        assert_eq!(
            classify_urgency(&client, "", AuditStatus::Fair),
            UrgencyLevel::Medium
        );
    }

    #[test]
    fn verbose_answer_falls_back() {
        let client = MockLlmClient::new("Urgency: High");
        assert_eq!(
            classify_urgency(&client, "", AuditStatus::Poor),
            UrgencyLevel::High
        );
        assert!(matches!(
            parse_urgency_label("Urgency: High"),
            Err(CapabilityError::UnrecognizedLabel(_))
        ));
    }

    #[test]
    fn capability_error_falls_back_to_status() {
        let client = MockLlmClient::failing(CapabilityError::Timeout(30));
        for status in AuditStatus::all() {
            assert_eq!(
                classify_urgency(&client, "unsafe wiring", *status),
                status.base_urgency()
            );
        }
    }

    #[test]
    fn override_keywords_never_lower_urgency() {
        let client = RuleFollowingClient;
        for status in AuditStatus::all() {
            for keyword in OVERRIDE_KEYWORDS {
                let comments = format!("fence intact but {keyword} near gate");
                let level = classify_urgency(&client, &comments, *status);
                assert!(level >= status.base_urgency(), "{status} / {keyword}");
            }
        }
    }

    #[test]
    fn no_keywords_follows_base_mapping() {
        let client = RuleFollowingClient;
        let level = classify_urgency(&client, "everything looks great", AuditStatus::Good);
        assert_eq!(level, UrgencyLevel::Low);
    }

    #[test]
    fn keyword_matching_is_case_sensitive() {
        assert_eq!(override_keywords_in("UNSAFE ladder"), Vec::<&str>::new());
        assert_eq!(override_keywords_in("unsafe ladder, fire hazard"), vec!["unsafe", "hazard"]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let client = MockLlmClient::new("Critical");
        let first = classify_urgency(&client, "emergency shutoff jammed", AuditStatus::Fair);
        let second = classify_urgency(&client, "emergency shutoff jammed", AuditStatus::Fair);
        assert_eq!(first, second);
    }
}
