//! Group rule composition.
//!
//! [`GroupComposer`] holds the draft of a GROUP rule in one of two modes:
//! creating a new named group, or appending a car spec to an existing
//! group rule. Make, model, and year selections cascade: changing the make
//! clears the model, and changing the model clears the years.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{CarModel, ModelYear};
use crate::error::RuleValidationError;
use crate::payload::{CarSpecPayload, GroupEntryPayload, GroupRulePayload};
use crate::rules::GroupRule;
use crate::scope::{InsuranceType, PlanScope, VehicleCondition};
use crate::types::DbId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposerMode {
    #[default]
    Create,
    Append,
}

/// An existing group the user may append to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOption {
    pub rule_id: DbId,
    pub name: String,
}

/// Draft state of the group rule editor for one vehicle condition.
#[derive(Debug, Clone)]
pub struct GroupComposer {
    condition: VehicleCondition,
    existing: Vec<GroupRule>,
    /// Names created through this composer since `existing` was last set.
    created_names: BTreeSet<String>,
    mode: ComposerMode,
    group_name: String,
    percentage: f64,
    selected_rule_id: Option<DbId>,
    make_id: Option<DbId>,
    models: Vec<CarModel>,
    model_id: Option<DbId>,
    available_years: Vec<i32>,
    selected_years: BTreeSet<i32>,
}

impl GroupComposer {
    /// Start a composer in create mode over the scope's known group rules.
    pub fn new(condition: VehicleCondition, existing: Vec<GroupRule>) -> Self {
        Self {
            condition,
            existing,
            created_names: BTreeSet::new(),
            mode: ComposerMode::Create,
            group_name: String::new(),
            percentage: 0.0,
            selected_rule_id: None,
            make_id: None,
            models: Vec::new(),
            model_id: None,
            available_years: Vec::new(),
            selected_years: BTreeSet::new(),
        }
    }

    pub fn condition(&self) -> VehicleCondition {
        self.condition
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn selected_rule_id(&self) -> Option<DbId> {
        self.selected_rule_id
    }

    pub fn make_id(&self) -> Option<DbId> {
        self.make_id
    }

    pub fn model_id(&self) -> Option<DbId> {
        self.model_id
    }

    pub fn models(&self) -> &[CarModel] {
        &self.models
    }

    pub fn available_years(&self) -> &[i32] {
        &self.available_years
    }

    /// Selected years in ascending order.
    pub fn selected_years(&self) -> Vec<i32> {
        self.selected_years.iter().copied().collect()
    }

    pub fn existing_rules(&self) -> &[GroupRule] {
        &self.existing
    }

    /// Replace the known group rules after the scope's listing refreshed.
    pub fn set_existing_rules(&mut self, existing: Vec<GroupRule>) {
        self.existing = existing;
        self.created_names.clear();
    }

    /// Record that the current draft was accepted by the store, so the
    /// same name is rejected until the listing is refreshed.
    pub fn mark_submitted(&mut self) {
        if self.mode == ComposerMode::Create {
            self.created_names
                .insert(self.group_name.trim().to_string());
        }
    }

    /// Append targets: one option per (rule, group name), without repeats.
    pub fn existing_group_names(&self) -> Vec<GroupOption> {
        let mut seen = BTreeSet::new();
        let mut options = Vec::new();
        for rule in &self.existing {
            for group in &rule.groups {
                if seen.insert((rule.id, group.group_name.clone())) {
                    options.push(GroupOption {
                        rule_id: rule.id,
                        name: group.group_name.clone(),
                    });
                }
            }
        }
        options
    }

    // ---- mode ----

    /// Switch between create and append. Leaving append mode drops the
    /// name and percentage copied from the selected rule.
    pub fn set_mode(&mut self, mode: ComposerMode) {
        if self.mode == ComposerMode::Append && mode == ComposerMode::Create {
            self.clear_group_fields();
        }
        self.mode = mode;
    }

    fn clear_group_fields(&mut self) {
        self.group_name.clear();
        self.percentage = 0.0;
        self.selected_rule_id = None;
    }

    pub fn set_group_name(&mut self, name: impl Into<String>) -> Result<(), RuleValidationError> {
        self.ensure_create_mode("group name")?;
        self.group_name = name.into();
        Ok(())
    }

    pub fn set_percentage(&mut self, percentage: f64) -> Result<(), RuleValidationError> {
        self.ensure_create_mode("percentage")?;
        self.percentage = percentage;
        Ok(())
    }

    /// Pick the group rule to append to, copying its name and percentage.
    pub fn select_existing(&mut self, rule_id: DbId) -> Result<(), RuleValidationError> {
        if self.mode != ComposerMode::Append {
            return Err(RuleValidationError::NotInAppendMode);
        }
        let rule = self
            .existing
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or(RuleValidationError::UnknownGroupRule(rule_id))?;

        self.group_name = rule.primary_group_name().unwrap_or_default().to_string();
        self.percentage = rule.percentage;
        self.selected_rule_id = Some(rule_id);
        Ok(())
    }

    fn ensure_create_mode(&self, field: &'static str) -> Result<(), RuleValidationError> {
        match self.mode {
            ComposerMode::Create => Ok(()),
            ComposerMode::Append => Err(RuleValidationError::ReadOnlyInAppendMode { field }),
        }
    }

    // ---- cascading car selection ----

    /// Select (or clear) the make. Always drops the model and year state.
    pub fn set_make(&mut self, make_id: Option<DbId>) {
        self.make_id = make_id;
        self.models.clear();
        self.model_id = None;
        self.available_years.clear();
        self.selected_years.clear();
    }

    /// Install the model list fetched for the current make.
    ///
    /// Returns `false` and keeps the list empty when no make is selected.
    pub fn set_models(&mut self, models: Vec<CarModel>) -> bool {
        if self.make_id.is_none() {
            return false;
        }
        self.models = models;
        true
    }

    /// Select (or clear) the model. Always drops the year state.
    pub fn set_model(&mut self, model_id: Option<DbId>) {
        self.model_id = model_id;
        self.available_years.clear();
        self.selected_years.clear();
    }

    /// Install the years fetched for the current model.
    pub fn set_available_years(&mut self, years: &[ModelYear]) -> bool {
        if self.model_id.is_none() {
            return false;
        }
        self.available_years = years.iter().map(|y| y.year).collect();
        true
    }

    /// Toggle one year in the selection. Returns whether it is now selected.
    pub fn toggle_year(&mut self, year: i32) -> bool {
        if self.selected_years.remove(&year) {
            false
        } else {
            self.selected_years.insert(year);
            true
        }
    }

    /// Replace the whole year selection.
    pub fn set_years(&mut self, years: impl IntoIterator<Item = i32>) {
        self.selected_years = years.into_iter().collect();
    }

    // ---- submission ----

    /// Whether every field required for submission is present.
    pub fn can_submit(&self) -> bool {
        self.missing_requirement().is_none()
    }

    fn missing_requirement(&self) -> Option<RuleValidationError> {
        if self.mode == ComposerMode::Append && self.selected_rule_id.is_none() {
            return Some(RuleValidationError::MissingAppendTarget);
        }
        if self.group_name.trim().is_empty()
            || self.make_id.is_none()
            || self.model_id.is_none()
            || self.selected_years.is_empty()
        {
            return Some(RuleValidationError::IncompleteGroupSelection);
        }
        None
    }

    /// Build the upsert body: one group entry holding one car spec.
    ///
    /// In append mode the body carries the selected rule id so the store
    /// extends that rule. In create mode the group name must not already
    /// be used by a rule of this scope.
    pub fn build_payload(&self, scope: PlanScope) -> Result<GroupRulePayload, RuleValidationError> {
        if let Some(err) = self.missing_requirement() {
            return Err(err);
        }
        let (Some(make_id), Some(model_id)) = (self.make_id, self.model_id) else {
            return Err(RuleValidationError::IncompleteGroupSelection);
        };

        let group_name = self.group_name.trim().to_string();
        if self.mode == ComposerMode::Create
            && (self.created_names.contains(&group_name)
                || self.existing.iter().any(|r| r.has_group_named(&group_name)))
        {
            return Err(RuleValidationError::DuplicateGroupName(group_name));
        }

        let id = match self.mode {
            ComposerMode::Create => None,
            ComposerMode::Append => self.selected_rule_id,
        };

        Ok(GroupRulePayload {
            id,
            percentage: self.percentage,
            condition: self.condition,
            insurance_type: InsuranceType::Car,
            plan_id: scope.plan_id,
            insurance_company_id: scope.insurance_company_id,
            groups: vec![GroupEntryPayload {
                group_name,
                cars: vec![CarSpecPayload {
                    make_id,
                    model_id,
                    years: self.selected_years(),
                }],
            }],
        })
    }

    /// Clear every transient field and return to create mode.
    pub fn reset(&mut self) {
        self.set_make(None);
        self.clear_group_fields();
        self.mode = ComposerMode::Create;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GroupEntry;
    use assert_matches::assert_matches;

    fn economy_rule() -> GroupRule {
        GroupRule {
            id: 7,
            percentage: 10.0,
            condition: VehicleCondition::Used,
            created_at: None,
            groups: vec![GroupEntry {
                group_name: "Economy".into(),
                cars: vec![],
            }],
        }
    }

    fn filled(composer: &mut GroupComposer) {
        composer.set_make(Some(5));
        composer.set_model(Some(12));
        composer.set_years([2019, 2018]);
    }

    #[test]
    fn create_builds_single_entry_with_single_car() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_group_name("Economy").unwrap();
        composer.set_percentage(15.0).unwrap();
        filled(&mut composer);

        let payload = composer.build_payload(PlanScope::new(1, 2)).unwrap();
        assert!(payload.id.is_none());
        assert_eq!(payload.percentage, 15.0);
        assert_eq!(payload.groups.len(), 1);
        assert_eq!(payload.groups[0].group_name, "Economy");
        assert_eq!(payload.groups[0].cars.len(), 1);
        assert_eq!(payload.groups[0].cars[0].make_id, 5);
        assert_eq!(payload.groups[0].cars[0].model_id, 12);
        assert_eq!(payload.groups[0].cars[0].years, vec![2018, 2019]);
    }

    #[test]
    fn append_reuses_name_and_percentage_of_selected_rule() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_mode(ComposerMode::Append);
        composer.select_existing(7).unwrap();
        filled(&mut composer);

        assert_eq!(composer.group_name(), "Economy");
        assert_eq!(composer.percentage(), 10.0);

        let payload = composer.build_payload(PlanScope::new(1, 2)).unwrap();
        assert_eq!(payload.id, Some(7));
        assert_eq!(payload.percentage, 10.0);
        assert_eq!(payload.groups[0].group_name, "Economy");
    }

    #[test]
    fn append_without_target_cannot_submit() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_mode(ComposerMode::Append);
        filled(&mut composer);
        assert!(!composer.can_submit());
        assert_matches!(
            composer.build_payload(PlanScope::new(1, 2)),
            Err(RuleValidationError::MissingAppendTarget)
        );
    }

    #[test]
    fn append_fields_are_read_only() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_mode(ComposerMode::Append);
        assert_matches!(
            composer.set_group_name("Other"),
            Err(RuleValidationError::ReadOnlyInAppendMode { field: "group name" })
        );
        assert_matches!(
            composer.set_percentage(3.0),
            Err(RuleValidationError::ReadOnlyInAppendMode { .. })
        );
    }

    #[test]
    fn selecting_unknown_rule_fails() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_mode(ComposerMode::Append);
        assert_matches!(
            composer.select_existing(99),
            Err(RuleValidationError::UnknownGroupRule(99))
        );
        assert!(composer.selected_rule_id().is_none());
    }

    #[test]
    fn switching_back_to_create_clears_append_context() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_mode(ComposerMode::Append);
        composer.select_existing(7).unwrap();

        composer.set_mode(ComposerMode::Create);
        assert_eq!(composer.group_name(), "");
        assert_eq!(composer.percentage(), 0.0);
        assert!(composer.selected_rule_id().is_none());

        composer.set_mode(ComposerMode::Create);
        assert_eq!(composer.mode(), ComposerMode::Create);
        assert_eq!(composer.group_name(), "");
    }

    #[test]
    fn submitted_name_is_taken_until_listing_refreshes() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_group_name("Compact").unwrap();
        composer.set_percentage(4.0).unwrap();
        filled(&mut composer);
        composer.build_payload(PlanScope::new(1, 1)).unwrap();
        composer.mark_submitted();
        composer.reset();

        composer.set_group_name(" Compact ").unwrap();
        composer.set_percentage(6.0).unwrap();
        filled(&mut composer);
        assert_matches!(
            composer.build_payload(PlanScope::new(1, 1)),
            Err(RuleValidationError::DuplicateGroupName(ref name)) if name == "Compact"
        );

        composer.set_existing_rules(vec![]);
        assert!(composer.build_payload(PlanScope::new(1, 1)).is_ok());
    }

    #[test]
    fn reselecting_create_keeps_typed_fields() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_group_name("Compact").unwrap();
        composer.set_percentage(4.0).unwrap();

        composer.set_mode(ComposerMode::Create);
        assert_eq!(composer.group_name(), "Compact");
        assert_eq!(composer.percentage(), 4.0);
    }

    #[test]
    fn reset_clears_typed_fields_in_create_mode() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_group_name("Compact").unwrap();
        composer.set_percentage(4.0).unwrap();
        filled(&mut composer);

        composer.reset();
        assert_eq!(composer.mode(), ComposerMode::Create);
        assert_eq!(composer.group_name(), "");
        assert_eq!(composer.percentage(), 0.0);
        assert_eq!(composer.make_id(), None);
        assert!(composer.selected_years().is_empty());
    }

    #[test]
    fn changing_make_clears_model_state() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_make(Some(5));
        assert!(composer.set_models(vec![CarModel {
            id: 12,
            name: "Corolla".into()
        }]));
        composer.set_model(Some(12));
        composer.set_available_years(&[ModelYear { id: None, year: 2018 }]);
        composer.toggle_year(2018);

        composer.set_make(Some(5));
        assert!(composer.model_id().is_none());
        assert!(composer.models().is_empty());
        assert!(composer.available_years().is_empty());
        assert!(composer.selected_years().is_empty());
    }

    #[test]
    fn changing_model_clears_years() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_make(Some(5));
        composer.set_model(Some(12));
        composer.set_available_years(&[ModelYear { id: None, year: 2018 }]);
        composer.toggle_year(2018);

        composer.set_model(Some(13));
        assert!(composer.selected_years().is_empty());
        assert!(composer.available_years().is_empty());
        assert_eq!(composer.model_id(), Some(13));
    }

    #[test]
    fn models_and_years_require_parent_selection() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        assert!(!composer.set_models(vec![CarModel {
            id: 1,
            name: "X".into()
        }]));
        assert!(composer.models().is_empty());
        assert!(!composer.set_available_years(&[ModelYear { id: None, year: 2020 }]));
    }

    #[test]
    fn toggle_year_flips_membership() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        assert!(composer.toggle_year(2020));
        assert!(!composer.toggle_year(2020));
        assert!(composer.selected_years().is_empty());
    }

    #[test]
    fn create_rejects_duplicate_group_name() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_group_name("Economy").unwrap();
        filled(&mut composer);
        assert_matches!(
            composer.build_payload(PlanScope::new(1, 2)),
            Err(RuleValidationError::DuplicateGroupName(name)) if name == "Economy"
        );
    }

    #[test]
    fn incomplete_selection_cannot_submit() {
        let mut composer = GroupComposer::new(VehicleCondition::New, vec![]);
        composer.set_group_name("Economy").unwrap();
        composer.set_make(Some(5));
        composer.set_model(Some(12));
        assert!(!composer.can_submit());
        composer.toggle_year(2018);
        assert!(composer.can_submit());
        composer.set_group_name("   ").unwrap();
        assert!(!composer.can_submit());
    }

    #[test]
    fn existing_group_names_are_deduplicated() {
        let mut rule = economy_rule();
        rule.groups.push(rule.groups[0].clone());
        let composer = GroupComposer::new(VehicleCondition::Used, vec![rule]);
        assert_eq!(
            composer.existing_group_names(),
            vec![GroupOption {
                rule_id: 7,
                name: "Economy".into()
            }]
        );
    }

    #[test]
    fn reset_returns_to_empty_create_mode() {
        let mut composer = GroupComposer::new(VehicleCondition::Used, vec![economy_rule()]);
        composer.set_mode(ComposerMode::Append);
        composer.select_existing(7).unwrap();
        filled(&mut composer);

        composer.reset();
        assert_eq!(composer.mode(), ComposerMode::Create);
        assert!(composer.make_id().is_none());
        assert!(composer.selected_years().is_empty());
        assert_eq!(composer.group_name(), "");
        assert!(!composer.can_submit());
    }
}
