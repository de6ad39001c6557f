//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries [`RuleEvent`]s from the editors to whatever holds
//! rule listings. Each event names the exact [`RuleScope`] it touched;
//! listeners drop cached data for that scope only.

use brokerage_core::scope::{PlanScope, RuleScope};
use brokerage_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

// ---------------------------------------------------------------------------
// RuleEvent
// ---------------------------------------------------------------------------

/// What happened to the rules of a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleEventKind {
    /// A rule was created, replaced, or extended.
    Upserted {
        rule_type: String,
        /// Id of the replaced or extended rule; `None` for a new rule.
        rule_id: Option<DbId>,
    },
    /// Rules were deleted by id.
    Deleted { ids: Vec<DbId> },
}

/// A rule mutation confirmed by the Rule Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvent {
    pub scope: RuleScope,
    #[serde(flatten)]
    pub kind: RuleEventKind,
    /// When the mutation was acknowledged (UTC).
    pub timestamp: Timestamp,
}

impl RuleEvent {
    pub fn upserted(scope: RuleScope, rule_type: impl Into<String>, rule_id: Option<DbId>) -> Self {
        Self {
            scope,
            kind: RuleEventKind::Upserted {
                rule_type: rule_type.into(),
                rule_id,
            },
            timestamp: Utc::now(),
        }
    }

    pub fn deleted(scope: RuleScope, ids: Vec<DbId>) -> Self {
        Self {
            scope,
            kind: RuleEventKind::Deleted { ids },
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Shared via `Arc<EventBus>` between editors (publishers) and caches or
/// views (subscribers).
///
/// ```rust
/// use brokerage_core::scope::{PlanScope, VehicleCondition};
/// use brokerage_events::bus::{EventBus, RuleEvent};
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
///
/// let scope = PlanScope::new(1, 2).with_condition(VehicleCondition::New);
/// bus.publish(RuleEvent::upserted(scope, "RANGE", None));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RuleEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped;
    /// scoped receivers then report [`Invalidation::All`].
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: RuleEvent) {
        tracing::debug!(scope = %event.scope, kind = ?event.kind, "Publishing rule event");
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to every event on the bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RuleEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to events of one plan scope, or of every scope with `None`.
    pub fn subscribe_scoped(&self, filter: Option<PlanScope>) -> ScopedReceiver {
        ScopedReceiver {
            receiver: self.sender.subscribe(),
            filter,
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// ScopedReceiver
// ---------------------------------------------------------------------------

/// What a listener must refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Only this scope changed.
    Scope(RuleScope),
    /// Events were missed; everything held may be stale.
    All,
}

/// A subscription that yields invalidations for matching scopes only.
pub struct ScopedReceiver {
    receiver: broadcast::Receiver<RuleEvent>,
    filter: Option<PlanScope>,
}

impl ScopedReceiver {
    /// Wait for the next relevant invalidation.
    ///
    /// Returns `None` once the bus has been dropped.
    pub async fn recv(&mut self) -> Option<Invalidation> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.matches(&event.scope) {
                        return Some(Invalidation::Scope(event.scope));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Rule event receiver lagged");
                    return Some(Invalidation::All);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn matches(&self, scope: &RuleScope) -> bool {
        self.filter.map_or(true, |f| f == scope.plan_scope())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
