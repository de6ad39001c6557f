//! Car pricing rules as returned by the Rule Store.
//!
//! Field names follow the store's JSON (`persitage` for the percentage,
//! `type` for the vehicle condition).

use serde::{Deserialize, Serialize};

use crate::scope::VehicleCondition;
use crate::types::{DbId, Timestamp};

/// A pricing rule keyed by a numeric value interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRule {
    pub id: DbId,
    pub from: f64,
    pub to: f64,
    #[serde(rename = "persitage")]
    pub percentage: f64,
    #[serde(rename = "type")]
    pub condition: VehicleCondition,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl RangeRule {
    /// Whether `value` lies in the closed interval `[from, to]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.from && value <= self.to
    }
}

/// Display name attached to a make or model inside a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// One (make, model, years) membership entry of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSpec {
    pub make_id: DbId,
    pub model_id: DbId,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<NamedRef>,
}

/// A named group of car specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntry {
    pub group_name: String,
    #[serde(default)]
    pub cars: Vec<CarSpec>,
}

/// A pricing rule keyed by explicit make/model/year membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRule {
    pub id: DbId,
    #[serde(rename = "persitage")]
    pub percentage: f64,
    #[serde(rename = "type")]
    pub condition: VehicleCondition,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

impl GroupRule {
    /// The name the rule is listed under: its first group entry's name.
    pub fn primary_group_name(&self) -> Option<&str> {
        self.groups.first().map(|g| g.group_name.as_str())
    }

    /// Whether any entry of this rule is named `name`.
    pub fn has_group_named(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.group_name == name)
    }
}

/// All rules of one vehicle condition within a plan scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRulePartition {
    #[serde(default)]
    pub range: Vec<RangeRule>,
    #[serde(default)]
    pub groups: Vec<GroupRule>,
}

impl CarRulePartition {
    pub fn is_empty(&self) -> bool {
        self.range.is_empty() && self.groups.is_empty()
    }

    /// Ids of every rule in the partition, ranges first.
    pub fn rule_ids(&self) -> Vec<DbId> {
        self.range
            .iter()
            .map(|r| r.id)
            .chain(self.groups.iter().map(|g| g.id))
            .collect()
    }
}

/// Car rules of a plan scope, split by vehicle condition.
///
/// The store omits a partition entirely when it has no rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<CarRulePartition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<CarRulePartition>,
}

impl CarRules {
    pub fn partition(&self, condition: VehicleCondition) -> Option<&CarRulePartition> {
        match condition {
            VehicleCondition::New => self.new.as_ref(),
            VehicleCondition::Used => self.used.as_ref(),
        }
    }

    /// Range rules of `condition`, empty when the partition is absent.
    pub fn ranges(&self, condition: VehicleCondition) -> &[RangeRule] {
        self.partition(condition)
            .map(|p| p.range.as_slice())
            .unwrap_or(&[])
    }

    /// Group rules of `condition`, empty when the partition is absent.
    pub fn groups(&self, condition: VehicleCondition) -> &[GroupRule] {
        self.partition(condition)
            .map(|p| p.groups.as_slice())
            .unwrap_or(&[])
    }

    /// Rebuild a listing from separately held partitions.
    pub fn from_partitions(
        new: Option<CarRulePartition>,
        used: Option<CarRulePartition>,
    ) -> Self {
        Self { new, used }
    }
}

/// Response of `GET /rules/getRules`.
///
/// Health and life rules are returned alongside but not interpreted here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesListing {
    #[serde(default)]
    pub health: Vec<serde_json::Value>,
    #[serde(default)]
    pub life: Vec<serde_json::Value>,
    #[serde(default)]
    pub car: CarRules,
}
