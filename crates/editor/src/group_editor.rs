//! Group rule dialog: cascading car pickers over the catalog, the
//! create/append composer, and submission.

use std::sync::Arc;

use brokerage_core::catalog::CarMake;
use brokerage_core::group::{ComposerMode, GroupComposer, GroupOption};
use brokerage_core::payload::CarRulePayload;
use brokerage_core::rules::GroupRule;
use brokerage_core::scope::{PlanScope, VehicleCondition};
use brokerage_core::types::DbId;
use brokerage_events::{EventBus, RuleEvent};
use brokerage_store::{CarCatalog, RuleStore};

use crate::error::EditorError;
use crate::phase::{EditorPhase, SubmitOutcome};

/// Editor for creating or extending GROUP rules of one condition.
pub struct GroupRuleEditor {
    scope: PlanScope,
    composer: GroupComposer,
    makes: Vec<CarMake>,
    phase: EditorPhase,
    open: bool,
    store: Arc<dyn RuleStore>,
    catalog: Arc<dyn CarCatalog>,
    bus: Arc<EventBus>,
}

impl GroupRuleEditor {
    pub fn new(
        scope: PlanScope,
        condition: VehicleCondition,
        existing: Vec<GroupRule>,
        store: Arc<dyn RuleStore>,
        catalog: Arc<dyn CarCatalog>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            scope,
            composer: GroupComposer::new(condition, existing),
            makes: Vec::new(),
            phase: EditorPhase::Idle,
            open: false,
            store,
            catalog,
            bus,
        }
    }

    pub fn composer(&self) -> &GroupComposer {
        &self.composer
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn makes(&self) -> &[CarMake] {
        &self.makes
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the dialog. The draft is kept until a reset.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Refresh the known group rules (append targets, duplicate names).
    ///
    /// Names created through this editor stay reserved until this is
    /// called with a listing that includes them.
    pub fn set_existing_rules(&mut self, existing: Vec<GroupRule>) {
        self.composer.set_existing_rules(existing);
    }

    pub fn existing_group_names(&self) -> Vec<GroupOption> {
        self.composer.existing_group_names()
    }

    // ---- composer fields ----

    pub fn set_mode(&mut self, mode: ComposerMode) {
        self.composer.set_mode(mode);
        self.phase.touch();
    }

    pub fn set_group_name(&mut self, name: impl Into<String>) -> Result<(), EditorError> {
        self.composer.set_group_name(name)?;
        self.phase.touch();
        Ok(())
    }

    pub fn set_percentage(&mut self, percentage: f64) -> Result<(), EditorError> {
        self.composer.set_percentage(percentage)?;
        self.phase.touch();
        Ok(())
    }

    pub fn select_existing(&mut self, rule_id: DbId) -> Result<(), EditorError> {
        self.composer.select_existing(rule_id)?;
        self.phase.touch();
        Ok(())
    }

    pub fn toggle_year(&mut self, year: i32) -> bool {
        self.phase.touch();
        self.composer.toggle_year(year)
    }

    pub fn set_years(&mut self, years: impl IntoIterator<Item = i32>) {
        self.composer.set_years(years);
        self.phase.touch();
    }

    // ---- catalog-backed pickers ----

    /// Load the make list once per dialog.
    pub async fn load_makes(&mut self) -> Result<&[CarMake], EditorError> {
        if self.makes.is_empty() {
            self.makes = self.catalog.makes().await?;
        }
        Ok(&self.makes)
    }

    /// Select a make and fetch its models. Clearing the make clears models.
    pub async fn select_make(&mut self, make_id: Option<DbId>) -> Result<(), EditorError> {
        self.composer.set_make(make_id);
        self.phase.touch();
        if let Some(id) = make_id {
            let models = self.catalog.models(id).await?;
            self.composer.set_models(models);
        }
        Ok(())
    }

    /// Select a model and fetch its years. Clearing the model clears years.
    pub async fn select_model(&mut self, model_id: Option<DbId>) -> Result<(), EditorError> {
        self.composer.set_model(model_id);
        self.phase.touch();
        if let Some(id) = model_id {
            let years = self.catalog.years(id).await?;
            self.composer.set_available_years(&years);
        }
        Ok(())
    }

    // ---- submission ----

    pub fn can_submit(&self) -> bool {
        !self.phase.is_busy() && self.composer.can_submit()
    }

    /// Send the composed group to the store.
    ///
    /// On success the scope is invalidated, every transient field is reset,
    /// and the dialog closes.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, EditorError> {
        if self.phase.is_busy() {
            return Err(EditorError::Busy);
        }

        self.phase = EditorPhase::Validating;
        let payload: CarRulePayload = match self.composer.build_payload(self.scope) {
            Ok(payload) => payload.into(),
            Err(err) => {
                tracing::info!(error = %err, "Group rule rejected");
                self.phase.fail(err.to_string());
                return Err(err.into());
            }
        };
        let rule_scope = payload.scope();

        self.phase = EditorPhase::Submitting;
        match self.store.upsert(&payload).await {
            Ok(response) => {
                let event = RuleEvent::upserted(rule_scope, payload.rule_type(), payload.id());
                self.bus.publish(event.clone());
                tracing::info!(
                    plan_id = rule_scope.plan_id,
                    insurance_company_id = rule_scope.insurance_company_id,
                    condition = %rule_scope.condition,
                    rule_id = ?payload.id(),
                    group_name = self.composer.group_name(),
                    "Group rule saved",
                );
                self.composer.mark_submitted();
                self.composer.reset();
                self.phase = EditorPhase::Idle;
                self.close();
                Ok(SubmitOutcome { response, event })
            }
            Err(err) => {
                tracing::warn!(error = %err, scope = %rule_scope, "Group rule submission failed");
                self.phase.fail(err.user_message());
                Err(err.into())
            }
        }
    }
}
