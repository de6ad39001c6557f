//! REST client for the Rule Store and its car/plan catalog endpoints.
//!
//! - [`StoreClient`]: typed wrappers over the HTTP endpoints.
//! - [`RuleStore`] / [`CarCatalog`]: the seams editors depend on, so
//!   they can run against an in-memory store in tests.
//! - [`StoreConfig`]: connection settings loaded from the environment.

pub mod api;
pub mod config;
pub mod store;

pub use api::{StoreClient, StoreError, GENERIC_ERROR_MESSAGE};
pub use config::{ConfigError, StoreConfig};
pub use store::{CarCatalog, RuleStore};
