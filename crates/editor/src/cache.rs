//! Per-scope cache of rule listings.
//!
//! Listings are fetched per plan scope and stored per condition
//! partition. An invalidation for one [`RuleScope`] drops that partition
//! only; the next read refetches.
//!
//! Every invalidation also bumps a generation for its scope (or a global
//! epoch for [`Invalidation::All`]). A fetch that was in flight when its
//! scope was invalidated still returns its result to the caller but does
//! not write it back.

use std::collections::HashMap;
use std::sync::Arc;

use brokerage_core::rules::{CarRulePartition, CarRules};
use brokerage_core::scope::{PlanScope, RuleScope, VehicleCondition};
use brokerage_events::{Invalidation, ScopedReceiver};
use brokerage_store::{RuleStore, StoreError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub struct RuleListingCache {
    store: Arc<dyn RuleStore>,
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<RuleScope, CarRulePartition>,
    generations: HashMap<RuleScope, u64>,
    epoch: u64,
}

impl CacheState {
    fn generation(&self, scope: RuleScope) -> (u64, u64) {
        (self.epoch, self.generations.get(&scope).copied().unwrap_or(0))
    }
}

impl RuleListingCache {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            store,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Car rules of `scope`, served from cache when both partitions are held.
    pub async fn car_rules(&self, scope: PlanScope) -> Result<CarRules, StoreError> {
        if let Some(rules) = self.cached(scope).await {
            return Ok(rules);
        }

        let started = {
            let state = self.state.read().await;
            VehicleCondition::ALL.map(|condition| state.generation(scope.with_condition(condition)))
        };

        tracing::debug!(
            plan_id = scope.plan_id,
            insurance_company_id = scope.insurance_company_id,
            "Fetching rule listing",
        );
        let rules = self.store.car_rules(scope).await?;

        let mut state = self.state.write().await;
        for (condition, generation) in VehicleCondition::ALL.into_iter().zip(started) {
            let rule_scope = scope.with_condition(condition);
            if state.generation(rule_scope) != generation {
                tracing::debug!(scope = %rule_scope, "Discarding listing fetched before invalidation");
                continue;
            }
            let partition = rules.partition(condition).cloned().unwrap_or_default();
            state.entries.insert(rule_scope, partition);
        }
        Ok(rules)
    }

    /// One condition partition of a scope.
    pub async fn partition(&self, scope: RuleScope) -> Result<CarRulePartition, StoreError> {
        let rules = self.car_rules(scope.plan_scope()).await?;
        Ok(rules.partition(scope.condition).cloned().unwrap_or_default())
    }

    pub async fn is_cached(&self, scope: RuleScope) -> bool {
        self.state.read().await.entries.contains_key(&scope)
    }

    pub async fn invalidate(&self, invalidation: Invalidation) {
        let mut state = self.state.write().await;
        match invalidation {
            Invalidation::Scope(scope) => {
                state.entries.remove(&scope);
                *state.generations.entry(scope).or_insert(0) += 1;
                tracing::debug!(%scope, "Rule listing invalidated");
            }
            Invalidation::All => {
                state.entries.clear();
                state.epoch += 1;
                tracing::debug!("All rule listings invalidated");
            }
        }
    }

    /// Apply invalidations from `receiver` until the bus closes.
    pub fn spawn_listener(self: Arc<Self>, mut receiver: ScopedReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(invalidation) = receiver.recv().await {
                self.invalidate(invalidation).await;
            }
            tracing::debug!("Rule event bus closed, cache listener exiting");
        })
    }

    async fn cached(&self, scope: PlanScope) -> Option<CarRules> {
        let state = self.state.read().await;
        let entries = &state.entries;
        let new = entries.get(&scope.with_condition(VehicleCondition::New))?;
        let used = entries.get(&scope.with_condition(VehicleCondition::Used))?;
        Some(CarRules::from_partitions(
            Some(new.clone()),
            Some(used.clone()),
        ))
    }
}
