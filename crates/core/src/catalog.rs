//! Read-only lookup data used while composing rules: car makes, models,
//! model years, and insurance plans.

use serde::{Deserialize, Serialize};

use crate::scope::InsuranceType;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarMake {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: DbId,
    pub name: String,
}

/// A production year offered for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelYear {
    #[serde(default)]
    pub id: Option<DbId>,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: DbId,
    pub name: String,
    pub insurance_type: InsuranceType,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub recommend: bool,
    #[serde(default)]
    pub for_health_groups: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Response of `GET /insurance-plans/getAll`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlansResponse {
    #[serde(default)]
    pub results: Vec<Plan>,
}

/// Plans that car rules can be attached to, in listing order.
pub fn car_plans(plans: &[Plan]) -> impl Iterator<Item = &Plan> {
    plans
        .iter()
        .filter(|p| p.insurance_type == InsuranceType::Car)
}

/// The plan selected when a rule screen opens: the first car plan.
pub fn default_car_plan(plans: &[Plan]) -> Option<&Plan> {
    car_plans(plans).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: DbId, insurance_type: InsuranceType) -> Plan {
        Plan {
            id,
            name: format!("plan-{id}"),
            insurance_type,
            hint: None,
            description: vec![],
            recommend: false,
            for_health_groups: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn default_plan_skips_other_insurance_types() {
        let plans = vec![
            plan(1, InsuranceType::Health),
            plan(2, InsuranceType::Car),
            plan(3, InsuranceType::Car),
        ];
        assert_eq!(default_car_plan(&plans).map(|p| p.id), Some(2));
        assert_eq!(car_plans(&plans).count(), 2);
    }

    #[test]
    fn no_car_plan_yields_none() {
        let plans = vec![plan(1, InsuranceType::Life)];
        assert!(default_car_plan(&plans).is_none());
    }

    #[test]
    fn plans_response_tolerates_sparse_plan_objects() {
        let body = serde_json::json!({
            "results": [{"id": 4, "name": "Gold", "insuranceType": "CAR"}]
        });
        let parsed: PlansResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.results[0].insurance_type, InsuranceType::Car);
        assert!(parsed.results[0].description.is_empty());
    }
}
