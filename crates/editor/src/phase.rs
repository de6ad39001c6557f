//! Editor lifecycle shared by every rule editor.

use brokerage_events::RuleEvent;
use serde::Serialize;

/// Where an editor is in its edit/submit cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum EditorPhase {
    /// Nothing entered yet, or just reset after a successful submit.
    #[default]
    Idle,
    /// Fields are being filled in.
    Editing,
    /// Client-side checks are running.
    Validating,
    /// A request to the store is outstanding.
    Submitting,
    /// The last submit failed; the draft is kept and `message` is shown.
    Failed { message: String },
}

impl EditorPhase {
    /// Whether the submit control must be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self, EditorPhase::Validating | EditorPhase::Submitting)
    }

    /// Error text to display, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            EditorPhase::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Transition taken whenever a field changes.
    pub(crate) fn touch(&mut self) {
        if !self.is_busy() {
            *self = EditorPhase::Editing;
        }
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        *self = EditorPhase::Failed {
            message: message.into(),
        };
    }
}

/// Result of a confirmed mutation.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// Body returned by the store (`null` when empty).
    pub response: serde_json::Value,
    /// The event published for the mutation.
    pub event: RuleEvent,
}
