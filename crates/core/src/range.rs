//! Range rule validation.
//!
//! A candidate range is admitted when every field is present, `to > from`,
//! and its lower bound does not fall inside any existing closed interval of
//! the same vehicle condition. Only the new `from` is checked: a candidate
//! whose upper bound reaches into an existing range is still admitted.

use serde::{Deserialize, Serialize};

use crate::error::RuleValidationError;
use crate::payload::RangeRulePayload;
use crate::rules::{CarRules, RangeRule};
use crate::scope::{PlanScope, VehicleCondition};

/// Form state of a range rule while it is being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeDraft {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub condition: Option<VehicleCondition>,
    pub percentage: Option<f64>,
}

impl RangeDraft {
    pub fn new(from: f64, to: f64, condition: VehicleCondition, percentage: f64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            condition: Some(condition),
            percentage: Some(percentage),
        }
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A range that passed client-side validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub from: f64,
    pub to: f64,
    pub condition: VehicleCondition,
    pub percentage: f64,
}

impl ValidRange {
    pub fn into_payload(self, scope: PlanScope) -> RangeRulePayload {
        RangeRulePayload::new(scope, self.condition, self.from, self.to, self.percentage)
    }
}

/// `from` may legitimately be zero; `to` and `percentage` may not.
fn present(value: Option<f64>, zero_allowed: bool) -> Option<f64> {
    value.filter(|v| v.is_finite() && (zero_allowed || *v != 0.0))
}

/// The first existing rule whose closed interval contains `from`.
pub fn find_overlap(from: f64, existing: &[RangeRule]) -> Option<&RangeRule> {
    existing.iter().find(|r| r.contains(from))
}

/// Validate `draft` against the ranges already stored for its condition.
///
/// `existing` must hold the ranges of the draft's own condition partition;
/// use [`validate_against_rules`] to pick the partition from a listing.
pub fn validate_range(
    draft: &RangeDraft,
    existing: &[RangeRule],
) -> Result<ValidRange, RuleValidationError> {
    let (Some(from), Some(to), Some(condition), Some(percentage)) = (
        present(draft.from, true),
        present(draft.to, false),
        draft.condition,
        present(draft.percentage, false),
    ) else {
        return Err(RuleValidationError::IncompleteFields);
    };

    if to <= from {
        return Err(RuleValidationError::InvertedRange { from, to });
    }

    if let Some(rule) = find_overlap(from, existing) {
        return Err(RuleValidationError::OverlappingRange {
            from,
            rule_id: rule.id,
            existing_from: rule.from,
            existing_to: rule.to,
        });
    }

    Ok(ValidRange {
        from,
        to,
        condition,
        percentage,
    })
}

/// Validate `draft` against the partition of `rules` matching its condition.
pub fn validate_against_rules(
    draft: &RangeDraft,
    rules: &CarRules,
) -> Result<ValidRange, RuleValidationError> {
    let existing = draft
        .condition
        .map(|c| rules.ranges(c))
        .unwrap_or(&[]);
    validate_range(draft, existing)
}
