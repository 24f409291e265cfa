//! `covid-curves` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - loaders are reusable from other front-ends (notebooks, dashboards)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod field;
pub mod io;
pub mod loader;
pub mod patch;
pub mod plot;
pub mod refresh;
pub mod report;
pub mod schema;
pub mod scope;
