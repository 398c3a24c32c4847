//! crates/eer_form/src/outcome.rs
//! Values exchanged between the store and the network side: submission
//! outcomes, blocked-submission reasons, user-facing messages and the
//! classifier's suggestion.

use core::fmt;

use serde::{Deserialize, Serialize};

use eer_core::Trigger;

/// Result of one submission attempt. Failures are values, not errors: the
/// store turns every variant into a `SubmissionMessage`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server answered 2xx. `event_id` is the id the server assigned to the
    /// stored event, when its reply carried one.
    Success { status: u16, event_id: Option<String> },
    /// Server answered with any other status.
    HttpError { status: u16, status_text: String, body: String },
    /// The request never completed (DNS, refused, timeout, TLS, ...).
    NetworkError { message: String },
}

impl SubmitOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success { .. })
    }

    /// Message shown to the reporter for this outcome.
    pub fn message(&self) -> SubmissionMessage {
        match self {
            SubmitOutcome::Success { .. } => SubmissionMessage::success("Event submitted successfully!"),
            SubmitOutcome::HttpError { status, status_text, .. } => SubmissionMessage::error(format!(
                "Submission failed: {status} - {status_text}. Please check the console for details."
            )),
            SubmitOutcome::NetworkError { .. } => SubmissionMessage::error(
                "Error: Request failed. This might be a network issue or a CORS policy problem on the server. Check the browser console.",
            ),
        }
    }
}

/// Why a submission did not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitBlocked {
    Invalid { error_count: usize },
    InFlight,
}

impl fmt::Display for SubmitBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBlocked::Invalid { error_count } => {
                write!(f, "report has {error_count} validation error(s)")
            }
            SubmitBlocked::InFlight => f.write_str("a submission is already in flight"),
        }
    }
}

impl std::error::Error for SubmitBlocked {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// Last status line shown next to the submit button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMessage {
    pub severity: Severity,
    pub text: String,
}

impl SubmissionMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { severity: Severity::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { severity: Severity::Error, text: text.into() }
    }

    /// Shown when a submit is attempted with validation errors.
    pub fn fix_errors() -> Self {
        Self::error("Please fix the errors before submitting.")
    }
}

impl fmt::Display for SubmissionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Classifier suggestion for a narrative. Needs are taken as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub trigger: Trigger,
    pub priority_needs: [String; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_messages() {
        let ok = SubmitOutcome::Success { status: 201, event_id: None }.message();
        assert_eq!(ok.severity, Severity::Success);
        assert_eq!(ok.text, "Event submitted successfully!");

        let http = SubmitOutcome::HttpError {
            status: 422,
            status_text: "Unprocessable Entity".into(),
            body: "{}".into(),
        }
        .message();
        assert_eq!(http.severity, Severity::Error);
        assert_eq!(
            http.text,
            "Submission failed: 422 - Unprocessable Entity. Please check the console for details."
        );

        let net = SubmitOutcome::NetworkError { message: "connection refused".into() }.message();
        assert_eq!(net.severity, Severity::Error);
        assert!(net.text.starts_with("Error: Request failed."));
    }

    #[test]
    fn classification_wire_shape() {
        let c: Classification = serde_json::from_str(
            r#"{"trigger":"natural_disaster","priorityNeeds":["Shelter","Water","Health"]}"#,
        )
        .unwrap();
        assert_eq!(c.trigger, Trigger::NaturalDisaster);
        assert_eq!(c.priority_needs[2], "Health");
    }
}
