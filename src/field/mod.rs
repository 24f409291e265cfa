//! Field resolution: requested field name -> aligned time series.
//!
//! - `parse`: field-name grammar producing a `FieldExpr` tree
//! - `eval`: evaluation of a `FieldExpr` over scope-filtered rows

pub mod eval;
pub mod parse;

pub use eval::resolve;
pub use parse::{FieldExpr, Vocabulary, parse_field};
