use thiserror::Error;

/// Failures surfaced by the recurrence and time-of-day core.
///
/// Display paths never return these directly: invalid times fall back
/// to the documented defaults, assignments without a date are excluded
/// and unknown repetition types describe as "No schedule". Callers that
/// validate user input (forms, the CLI) get the typed error instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid time format: {input:?} (expected 24-hour HH:MM)")]
    InvalidTimeFormat { input: String },

    #[error("assignment {assignment} has neither a due date nor a scheduled date")]
    MissingRelevantDate { assignment: String },

    #[error("unrecognized repetition type: {kind:?}")]
    UnrecognizedRepetitionType { kind: String },

    #[error("invalid repetition config: {reason}")]
    InvalidRepetition { reason: String },
}

impl CoreError {
    pub(crate) fn invalid_time(input: &str) -> Self {
        Self::InvalidTimeFormat {
            input: input.to_string(),
        }
    }

    pub(crate) fn invalid_repetition(reason: impl Into<String>) -> Self {
        Self::InvalidRepetition {
            reason: reason.into(),
        }
    }
}
