//! Bulk deletion of the rules listed for one scope.

use std::sync::Arc;

use brokerage_core::scope::RuleScope;
use brokerage_core::selection::RuleSelection;
use brokerage_core::types::DbId;
use brokerage_events::{EventBus, RuleEvent};
use brokerage_store::RuleStore;

use crate::error::EditorError;
use crate::phase::{EditorPhase, SubmitOutcome};

pub struct RuleDeletion {
    scope: RuleScope,
    selection: RuleSelection,
    phase: EditorPhase,
    store: Arc<dyn RuleStore>,
    bus: Arc<EventBus>,
}

impl RuleDeletion {
    pub fn new(scope: RuleScope, store: Arc<dyn RuleStore>, bus: Arc<EventBus>) -> Self {
        Self {
            scope,
            selection: RuleSelection::new(),
            phase: EditorPhase::Idle,
            store,
            bus,
        }
    }

    pub fn selection(&self) -> &RuleSelection {
        &self.selection
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn toggle_one(&mut self, id: DbId) -> bool {
        self.phase.touch();
        self.selection.toggle_one(id)
    }

    pub fn toggle_all(&mut self, visible: &[DbId]) {
        self.selection.toggle_all(visible);
        self.phase.touch();
    }

    pub fn can_submit(&self) -> bool {
        !self.phase.is_busy() && !self.selection.is_empty()
    }

    /// Delete every selected rule and clear the selection.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, EditorError> {
        if self.phase.is_busy() {
            return Err(EditorError::Busy);
        }
        let ids = match self.selection.ids() {
            Ok(ids) => ids,
            Err(err) => {
                self.phase.fail(err.to_string());
                return Err(err.into());
            }
        };

        self.phase = EditorPhase::Submitting;
        match self.store.delete(&ids).await {
            Ok(()) => {
                tracing::info!(scope = %self.scope, count = ids.len(), "Rules deleted");
                let event = RuleEvent::deleted(self.scope, ids);
                self.bus.publish(event.clone());
                self.selection.clear();
                self.phase = EditorPhase::Idle;
                Ok(SubmitOutcome {
                    response: serde_json::Value::Null,
                    event,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, scope = %self.scope, "Rule deletion failed");
                self.phase.fail(err.user_message());
                Err(err.into())
            }
        }
    }
}
