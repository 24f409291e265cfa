//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - typed cells and resolved series (`Value`, `ResolvedSeries`)
//! - request scoping (`Scope`, `ScopeKind`, `Source`)
//! - dataset families and their mount policy (`DatasetKind`)

pub mod types;

pub use types::*;
