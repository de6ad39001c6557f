//! Store seams used by the editors.

use async_trait::async_trait;
use brokerage_core::catalog::{CarMake, CarModel, ModelYear};
use brokerage_core::payload::CarRulePayload;
use brokerage_core::rules::CarRules;
use brokerage_core::scope::PlanScope;
use brokerage_core::types::DbId;

use crate::api::{StoreClient, StoreError};

/// Persistence of car rules.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Create, replace, or extend a rule. Returns the store's response body.
    async fn upsert(&self, payload: &CarRulePayload) -> Result<serde_json::Value, StoreError>;

    /// Delete rules by id.
    async fn delete(&self, ids: &[DbId]) -> Result<(), StoreError>;

    /// Current car rules of a plan scope.
    async fn car_rules(&self, scope: PlanScope) -> Result<CarRules, StoreError>;
}

/// Make/model/year lookups backing the group composer's cascading pickers.
#[async_trait]
pub trait CarCatalog: Send + Sync {
    async fn makes(&self) -> Result<Vec<CarMake>, StoreError>;

    async fn models(&self, make_id: DbId) -> Result<Vec<CarModel>, StoreError>;

    async fn years(&self, model_id: DbId) -> Result<Vec<ModelYear>, StoreError>;
}

#[async_trait]
impl RuleStore for StoreClient {
    async fn upsert(&self, payload: &CarRulePayload) -> Result<serde_json::Value, StoreError> {
        self.upsert_car_rule(payload).await
    }

    async fn delete(&self, ids: &[DbId]) -> Result<(), StoreError> {
        self.delete_car_rules(ids).await
    }

    async fn car_rules(&self, scope: PlanScope) -> Result<CarRules, StoreError> {
        Ok(self.get_rules(scope).await?.car)
    }
}

#[async_trait]
impl CarCatalog for StoreClient {
    async fn makes(&self) -> Result<Vec<CarMake>, StoreError> {
        self.get_makes().await
    }

    async fn models(&self, make_id: DbId) -> Result<Vec<CarModel>, StoreError> {
        self.get_models(make_id).await
    }

    async fn years(&self, model_id: DbId) -> Result<Vec<ModelYear>, StoreError> {
        self.get_years(model_id).await
    }
}
