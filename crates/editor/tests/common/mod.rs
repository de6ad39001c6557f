//! In-memory store and catalog for editor tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use brokerage_core::catalog::{CarMake, CarModel, ModelYear};
use brokerage_core::payload::CarRulePayload;
use brokerage_core::rules::{CarRulePartition, CarRules, GroupEntry, GroupRule, RangeRule};
use brokerage_core::scope::{PlanScope, VehicleCondition};
use brokerage_core::types::DbId;
use brokerage_events::EventBus;
use brokerage_store::{CarCatalog, RuleStore, StoreError};
use serde_json::json;
use tokio::sync::Notify;

pub const SCOPE: PlanScope = PlanScope {
    plan_id: 3,
    insurance_company_id: 9,
};

pub const TOYOTA: DbId = 5;
pub const COROLLA: DbId = 12;

#[derive(Default)]
pub struct FakeStore {
    pub rules: Mutex<CarRules>,
    pub upserts: Mutex<Vec<CarRulePayload>>,
    pub deletes: Mutex<Vec<Vec<DbId>>>,
    pub listing_calls: AtomicUsize,
    /// When set, mutations fail with this store message.
    pub fail_with: Mutex<Option<String>>,
    /// When set, upserts wait for a notification before answering.
    pub hold: Option<Arc<Notify>>,
    /// When set, listings wait for a notification before answering.
    pub listing_hold: Option<Arc<Notify>>,
}

impl FakeStore {
    pub fn with_rules(rules: CarRules) -> Self {
        Self {
            rules: Mutex::new(rules),
            ..Self::default()
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> Vec<CarRulePayload> {
        self.upserts.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<StoreError> {
        self.fail_with
            .lock()
            .unwrap()
            .clone()
            .map(|message| StoreError::Api {
                status: 400,
                body: json!({ "message": message }).to_string(),
                message: Some(message),
            })
    }
}

#[async_trait]
impl RuleStore for FakeStore {
    async fn upsert(&self, payload: &CarRulePayload) -> Result<serde_json::Value, StoreError> {
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.upserts.lock().unwrap().push(payload.clone());
        Ok(json!({ "id": payload.id().unwrap_or(42) }))
    }

    async fn delete(&self, ids: &[DbId]) -> Result<(), StoreError> {
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.deletes.lock().unwrap().push(ids.to_vec());
        Ok(())
    }

    async fn car_rules(&self, _scope: PlanScope) -> Result<CarRules, StoreError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.listing_hold {
            hold.notified().await;
        }
        Ok(self.rules.lock().unwrap().clone())
    }
}

#[async_trait]
impl CarCatalog for FakeStore {
    async fn makes(&self) -> Result<Vec<CarMake>, StoreError> {
        Ok(vec![
            CarMake {
                id: TOYOTA,
                name: "Toyota".into(),
            },
            CarMake {
                id: 6,
                name: "Honda".into(),
            },
        ])
    }

    async fn models(&self, make_id: DbId) -> Result<Vec<CarModel>, StoreError> {
        Ok(match make_id {
            TOYOTA => vec![
                CarModel {
                    id: COROLLA,
                    name: "Corolla".into(),
                },
                CarModel {
                    id: 13,
                    name: "Camry".into(),
                },
            ],
            _ => Vec::new(),
        })
    }

    async fn years(&self, model_id: DbId) -> Result<Vec<ModelYear>, StoreError> {
        Ok(match model_id {
            COROLLA => [2018, 2019, 2020]
                .into_iter()
                .map(|year| ModelYear { id: None, year })
                .collect(),
            _ => Vec::new(),
        })
    }
}

pub fn range(id: DbId, from: f64, to: f64, condition: VehicleCondition) -> RangeRule {
    RangeRule {
        id,
        from,
        to,
        percentage: 5.0,
        condition,
        created_at: None,
    }
}

pub fn economy_rule() -> GroupRule {
    GroupRule {
        id: 7,
        percentage: 10.0,
        condition: VehicleCondition::Used,
        created_at: None,
        groups: vec![GroupEntry {
            group_name: "Economy".into(),
            cars: Vec::new(),
        }],
    }
}

/// Used cars: range `[0, 10000]` (id 1) and group "Economy" (id 7).
/// New cars: one range `[0, 5000]` (id 2).
pub fn seeded_rules() -> CarRules {
    CarRules::from_partitions(
        Some(CarRulePartition {
            range: vec![range(2, 0.0, 5000.0, VehicleCondition::New)],
            groups: Vec::new(),
        }),
        Some(CarRulePartition {
            range: vec![range(1, 0.0, 10000.0, VehicleCondition::Used)],
            groups: vec![economy_rule()],
        }),
    )
}

pub fn fixture() -> (Arc<FakeStore>, Arc<EventBus>) {
    (
        Arc::new(FakeStore::with_rules(seeded_rules())),
        Arc::new(EventBus::default()),
    )
}
