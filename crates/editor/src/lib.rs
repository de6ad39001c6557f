//! Rule editors: validation, submission, and scope invalidation wired
//! together.
//!
//! Each editor owns its draft exclusively and moves through
//! [`EditorPhase`]: `Idle → Editing → Validating → Submitting`, ending in
//! `Idle` after a confirmed mutation or `Failed` with a message to show.
//! Confirmed mutations are announced on the
//! [`EventBus`](brokerage_events::EventBus); [`RuleListingCache`] listens
//! and drops only the affected scope.

pub mod cache;
pub mod deletion;
pub mod error;
pub mod group_editor;
pub mod phase;
pub mod range_editor;

pub use cache::RuleListingCache;
pub use deletion::RuleDeletion;
pub use error::EditorError;
pub use group_editor::GroupRuleEditor;
pub use phase::{EditorPhase, SubmitOutcome};
pub use range_editor::RangeRuleEditor;
