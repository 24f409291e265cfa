//! Input/output helpers.
//!
//! - dataset mount of per-day CSV snapshots (`mount`)
//! - series exports to CSV (`export`)
//! - series JSON read/write (`series`)

pub mod export;
pub mod mount;
pub mod series;

pub use export::*;
pub use mount::{Dataset, Snapshot, mount_dataset};
pub use series::*;
