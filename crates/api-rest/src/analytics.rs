//! Session analytics events.
//!
//! Emitted as structured `tracing` events on the `analytics` target so a subscriber can
//! route them separately from operational logs. Nothing is emitted without a session id.

use serde_json::Value;

pub(crate) const TARGET: &str = "analytics";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AnalyticsEvent {
    UploadComplete,
    StandardizationRun,
    SessionReport,
    AgentVerification,
}

impl AnalyticsEvent {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::UploadComplete => "UPLOAD_COMPLETE",
            Self::StandardizationRun => "STANDARDIZATION_RUN",
            Self::SessionReport => "SESSION_REPORT",
            Self::AgentVerification => "AGENT_VERIFICATION",
        }
    }
}

/// Records `event` for `session_id`. Returns whether anything was emitted.
pub(crate) fn log_event(session_id: Option<&str>, event: AnalyticsEvent, data: Value) -> bool {
    let Some(session_id) = session_id else {
        return false;
    };
    tracing::info!(
        target: TARGET,
        session_id,
        event_type = event.as_str(),
        data = %data,
        "analytics event"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skipped_without_session() {
        assert!(!log_event(None, AnalyticsEvent::UploadComplete, json!({})));
        assert!(log_event(
            Some("s-1"),
            AnalyticsEvent::StandardizationRun,
            json!({ "standard": "us_cdc" })
        ));
    }

    #[test]
    fn event_names() {
        assert_eq!(AnalyticsEvent::UploadComplete.as_str(), "UPLOAD_COMPLETE");
        assert_eq!(AnalyticsEvent::AgentVerification.as_str(), "AGENT_VERIFICATION");
    }
}
