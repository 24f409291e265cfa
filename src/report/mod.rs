//! Reporting utilities: series summaries and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the loaders stay free of presentation concerns
//! - output changes are localized (golden tests live next to the formatting)

use crate::domain::{ResolvedSeries, Value};

pub mod format;

pub use format::{format_series_table, format_summary};

/// Headline numbers of one resolved series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub days: usize,
    pub first_day: Option<String>,
    pub last_day: Option<String>,
    pub latest: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn summarize(series: &ResolvedSeries) -> SeriesSummary {
    let numeric: Vec<f64> = series.numeric_points().into_iter().map(|(_, y)| y).collect();
    let min = numeric.iter().copied().reduce(f64::min);
    let max = numeric.iter().copied().reduce(f64::max);

    SeriesSummary {
        days: series.len(),
        first_day: series.time.first().cloned(),
        last_day: series.time.last().cloned(),
        latest: series.values.last().cloned(),
        min,
        max,
    }
}
