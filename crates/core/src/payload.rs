//! Upsert bodies for `POST /rules/car`.
//!
//! [`CarRulePayload`] is a tagged union on `ruleType`; each variant carries
//! only the fields meaningful for that rule kind. Bodies are checked with
//! [`CarRulePayload::validate_boundary`] before they leave the process.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::RuleValidationError;
use crate::scope::{InsuranceType, PlanScope, RuleScope, VehicleCondition};
use crate::types::DbId;

/// Maximum length accepted for a group name.
pub const MAX_GROUP_NAME_LEN: u64 = 200;

/// Body of a RANGE upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_range_bounds"))]
pub struct RangeRulePayload {
    /// Present when replacing an existing rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    pub from: f64,
    pub to: f64,
    #[serde(rename = "type")]
    pub condition: VehicleCondition,
    #[serde(rename = "persitage")]
    pub percentage: f64,
    pub insurance_type: InsuranceType,
    pub plan_id: DbId,
    pub insurance_company_id: DbId,
}

impl RangeRulePayload {
    pub fn new(
        scope: PlanScope,
        condition: VehicleCondition,
        from: f64,
        to: f64,
        percentage: f64,
    ) -> Self {
        Self {
            id: None,
            from,
            to,
            condition,
            percentage,
            insurance_type: InsuranceType::Car,
            plan_id: scope.plan_id,
            insurance_company_id: scope.insurance_company_id,
        }
    }
}

fn validate_range_bounds(payload: &RangeRulePayload) -> Result<(), ValidationError> {
    if !payload.from.is_finite() || !payload.to.is_finite() || payload.to <= payload.from {
        return Err(ValidationError::new("inverted_range"));
    }
    Ok(())
}

/// One car spec inside a group entry of an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarSpecPayload {
    pub make_id: DbId,
    pub model_id: DbId,
    #[validate(length(min = 1))]
    pub years: Vec<i32>,
}

/// One named group inside a GROUP upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntryPayload {
    #[validate(length(min = 1, max = MAX_GROUP_NAME_LEN))]
    pub group_name: String,
    #[validate(length(min = 1), nested)]
    pub cars: Vec<CarSpecPayload>,
}

/// Body of a GROUP upsert. With `id` set the store extends that rule
/// instead of creating a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupRulePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(rename = "persitage")]
    pub percentage: f64,
    #[serde(rename = "type")]
    pub condition: VehicleCondition,
    pub insurance_type: InsuranceType,
    pub plan_id: DbId,
    pub insurance_company_id: DbId,
    #[validate(length(min = 1), nested)]
    pub groups: Vec<GroupEntryPayload>,
}

/// Tagged union of car rule upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ruleType")]
pub enum CarRulePayload {
    #[serde(rename = "RANGE")]
    Range(RangeRulePayload),
    #[serde(rename = "GROUP")]
    Group(GroupRulePayload),
}

impl CarRulePayload {
    pub fn rule_type(&self) -> &'static str {
        match self {
            Self::Range(_) => "RANGE",
            Self::Group(_) => "GROUP",
        }
    }

    /// Existing rule id when the upsert replaces or extends a rule.
    pub fn id(&self) -> Option<DbId> {
        match self {
            Self::Range(p) => p.id,
            Self::Group(p) => p.id,
        }
    }

    pub fn scope(&self) -> RuleScope {
        let (plan_id, insurance_company_id, condition) = match self {
            Self::Range(p) => (p.plan_id, p.insurance_company_id, p.condition),
            Self::Group(p) => (p.plan_id, p.insurance_company_id, p.condition),
        };
        PlanScope::new(plan_id, insurance_company_id).with_condition(condition)
    }

    /// Structural checks run right before the request is sent.
    pub fn validate_boundary(&self) -> Result<(), RuleValidationError> {
        let result = match self {
            Self::Range(p) => p.validate(),
            Self::Group(p) => p.validate(),
        };
        result.map_err(|errs| RuleValidationError::Payload(errs.to_string()))
    }
}

impl From<RangeRulePayload> for CarRulePayload {
    fn from(payload: RangeRulePayload) -> Self {
        Self::Range(payload)
    }
}

impl From<GroupRulePayload> for CarRulePayload {
    fn from(payload: GroupRulePayload) -> Self {
        Self::Group(payload)
    }
}
