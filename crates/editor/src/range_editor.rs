//! Range rule form: draft fields, validation, and submission.

use std::sync::Arc;

use brokerage_core::payload::CarRulePayload;
use brokerage_core::range::{validate_against_rules, RangeDraft};
use brokerage_core::rules::CarRules;
use brokerage_core::scope::{PlanScope, VehicleCondition};
use brokerage_events::{EventBus, RuleEvent};
use brokerage_store::RuleStore;

use crate::error::EditorError;
use crate::phase::{EditorPhase, SubmitOutcome};

/// Editor for adding RANGE rules to one plan scope.
pub struct RangeRuleEditor {
    scope: PlanScope,
    draft: RangeDraft,
    phase: EditorPhase,
    store: Arc<dyn RuleStore>,
    bus: Arc<EventBus>,
}

impl RangeRuleEditor {
    pub fn new(scope: PlanScope, store: Arc<dyn RuleStore>, bus: Arc<EventBus>) -> Self {
        Self {
            scope,
            draft: RangeDraft::default(),
            phase: EditorPhase::Idle,
            store,
            bus,
        }
    }

    pub fn scope(&self) -> PlanScope {
        self.scope
    }

    pub fn draft(&self) -> &RangeDraft {
        &self.draft
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn set_from(&mut self, from: Option<f64>) {
        self.draft.from = from;
        self.phase.touch();
    }

    pub fn set_to(&mut self, to: Option<f64>) {
        self.draft.to = to;
        self.phase.touch();
    }

    pub fn set_condition(&mut self, condition: Option<VehicleCondition>) {
        self.draft.condition = condition;
        self.phase.touch();
    }

    pub fn set_percentage(&mut self, percentage: Option<f64>) {
        self.draft.percentage = percentage;
        self.phase.touch();
    }

    /// Replace the whole draft at once.
    pub fn set_draft(&mut self, draft: RangeDraft) {
        self.draft = draft;
        self.phase.touch();
    }

    pub fn can_submit(&self) -> bool {
        !self.phase.is_busy()
    }

    /// Forget an abandoned in-flight submission so the form can be used again.
    pub fn abandon(&mut self) {
        if self.phase.is_busy() {
            self.phase = EditorPhase::Editing;
        }
    }

    /// Validate the draft against `existing` and send it to the store.
    ///
    /// `existing` is the current listing of this editor's plan scope. On
    /// success the draft is cleared and an upsert event is published for
    /// the draft's condition scope. On failure the draft is kept.
    pub async fn submit(&mut self, existing: &CarRules) -> Result<SubmitOutcome, EditorError> {
        if self.phase.is_busy() {
            return Err(EditorError::Busy);
        }

        self.phase = EditorPhase::Validating;
        let valid = match validate_against_rules(&self.draft, existing) {
            Ok(valid) => valid,
            Err(err) => {
                tracing::info!(error = %err, "Range rule rejected");
                self.phase.fail(err.to_string());
                return Err(err.into());
            }
        };

        let payload: CarRulePayload = valid.into_payload(self.scope).into();
        let rule_scope = payload.scope();

        self.phase = EditorPhase::Submitting;
        match self.store.upsert(&payload).await {
            Ok(response) => {
                let event = RuleEvent::upserted(rule_scope, payload.rule_type(), None);
                self.bus.publish(event.clone());
                self.draft.clear();
                self.phase = EditorPhase::Idle;
                tracing::info!(
                    plan_id = rule_scope.plan_id,
                    insurance_company_id = rule_scope.insurance_company_id,
                    condition = %rule_scope.condition,
                    from = valid.from,
                    to = valid.to,
                    "Range rule added",
                );
                Ok(SubmitOutcome { response, event })
            }
            Err(err) => {
                tracing::warn!(error = %err, scope = %rule_scope, "Range rule submission failed");
                self.phase.fail(err.user_message());
                Err(err.into())
            }
        }
    }
}
