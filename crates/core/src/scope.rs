//! Rule scoping: insurance type, vehicle condition, and the
//! (plan, company, condition) tuple every car rule lives under.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Line of insurance a plan or rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsuranceType {
    Car,
    Health,
    Life,
}

impl InsuranceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Health => "HEALTH",
            Self::Life => "LIFE",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsuranceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAR" => Ok(Self::Car),
            "HEALTH" => Ok(Self::Health),
            "LIFE" => Ok(Self::Life),
            other => Err(CoreError::Validation(format!(
                "Invalid insurance type '{other}'. Must be one of: CAR, HEALTH, LIFE"
            ))),
        }
    }
}

/// Whether a rule prices new or used vehicles.
///
/// Rules of different conditions never interact: overlap and group-name
/// checks only look at the partition matching the candidate's condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCondition {
    New,
    Used,
}

impl VehicleCondition {
    /// Both conditions, in display order.
    pub const ALL: [VehicleCondition; 2] = [VehicleCondition::New, VehicleCondition::Used];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
        }
    }
}

impl fmt::Display for VehicleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "used" => Ok(Self::Used),
            other => Err(CoreError::Validation(format!(
                "Invalid vehicle condition '{other}'. Must be one of: new, used"
            ))),
        }
    }
}

/// The (plan, company) pair a rule listing is fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanScope {
    pub plan_id: DbId,
    pub insurance_company_id: DbId,
}

impl PlanScope {
    pub fn new(plan_id: DbId, insurance_company_id: DbId) -> Self {
        Self {
            plan_id,
            insurance_company_id,
        }
    }

    /// Narrow to a single vehicle-condition partition.
    pub fn with_condition(self, condition: VehicleCondition) -> RuleScope {
        RuleScope {
            plan_id: self.plan_id,
            insurance_company_id: self.insurance_company_id,
            condition,
        }
    }
}

/// The unit of overlap checking, uniqueness, and cache invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleScope {
    pub plan_id: DbId,
    pub insurance_company_id: DbId,
    pub condition: VehicleCondition,
}

impl RuleScope {
    pub fn plan_scope(&self) -> PlanScope {
        PlanScope::new(self.plan_id, self.insurance_company_id)
    }
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plan={} company={} condition={}",
            self.plan_id, self.insurance_company_id, self.condition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn condition_parses_case_insensitively() {
        assert_eq!("NEW".parse::<VehicleCondition>().unwrap(), VehicleCondition::New);
        assert_eq!(" used ".parse::<VehicleCondition>().unwrap(), VehicleCondition::Used);
    }

    #[test]
    fn condition_rejects_unknown_value() {
        let err = "salvage".parse::<VehicleCondition>().unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("salvage"));
    }

    #[test]
    fn insurance_type_parses_any_case() {
        assert_eq!("car".parse::<InsuranceType>().unwrap(), InsuranceType::Car);
        assert_matches!(
            "pet".parse::<InsuranceType>(),
            Err(CoreError::Validation(ref msg)) if msg.contains("CAR, HEALTH, LIFE")
        );
    }

    #[test]
    fn wire_names_match_store_contract() {
        assert_eq!(serde_json::to_value(VehicleCondition::Used).unwrap(), "used");
        assert_eq!(serde_json::to_value(InsuranceType::Car).unwrap(), "CAR");
    }

    #[test]
    fn plan_scope_narrows_to_rule_scope() {
        let scope = PlanScope::new(3, 9).with_condition(VehicleCondition::New);
        assert_eq!(scope.plan_id, 3);
        assert_eq!(scope.insurance_company_id, 9);
        assert_eq!(scope.condition, VehicleCondition::New);
        assert_eq!(scope.plan_scope(), PlanScope::new(3, 9));
    }
}
