//! Rule mutation events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RuleEvent`]: a rule mutation tagged with the [`RuleScope`] it
//!   touched, so listeners refresh only the affected scope.
//! - [`ScopedReceiver`]: a subscription filtered to one plan scope.
//!
//! [`RuleScope`]: brokerage_core::scope::RuleScope

pub mod bus;

pub use bus::{EventBus, Invalidation, RuleEvent, RuleEventKind, ScopedReceiver};
