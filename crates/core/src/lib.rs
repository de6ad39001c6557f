//! Domain model and client-side rule logic for car pricing rules.
//!
//! Pure logic only: no I/O. The store client and editors live in the
//! `brokerage-store` and `brokerage-editor` crates.

pub mod catalog;
pub mod error;
pub mod group;
pub mod payload;
pub mod range;
pub mod rules;
pub mod scope;
pub mod selection;
pub mod types;
