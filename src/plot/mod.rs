//! Line charts of resolved series.
//!
//! - `ascii`: fixed-grid terminal chart (deterministic, golden-tested)
//! - `svg`: file chart rendered with Plotters
//!
//! Both put the day index on the x axis and label it with the series' dates.

use crate::domain::LabeledSeries;

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_chart;
pub use svg::render_svg_chart;

/// Chart settings shared by the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub title: Option<String>,
    /// Pixels for SVG output.
    pub width: u32,
    pub height: u32,
    pub x_desc: String,
    pub y_desc: String,
    /// Number of date labels on the x axis.
    pub x_labels: usize,
    pub line_width: u32,
    pub legend: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            title: None,
            width: 1024,
            height: 600,
            x_desc: "date".to_string(),
            y_desc: String::new(),
            x_labels: 8,
            line_width: 2,
            legend: true,
        }
    }
}

/// Number of days spanned by the longest series.
pub(crate) fn day_count(series: &[LabeledSeries]) -> usize {
    series.iter().map(|s| s.series.len()).max().unwrap_or(0)
}

/// Date labels of the longest series.
pub(crate) fn day_labels(series: &[LabeledSeries]) -> &[String] {
    series
        .iter()
        .max_by_key(|s| s.series.len())
        .map(|s| s.series.time.as_slice())
        .unwrap_or(&[])
}

/// Value range over every numeric point, padded by `frac` of the span.
pub(crate) fn value_range(series: &[LabeledSeries], frac: f64) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in series {
        for (_, y) in s.series.numeric_points() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    let (min_y, max_y) = if !(min_y.is_finite() && max_y.is_finite()) {
        (0.0, 1.0)
    } else if max_y > min_y {
        (min_y, max_y)
    } else {
        (min_y - 0.5, max_y + 0.5)
    };
    pad_range(min_y, max_y, frac)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResolvedSeries, Scope, Value};

    fn series(values: Vec<Value>) -> LabeledSeries {
        LabeledSeries {
            field: "totale_casi".to_string(),
            scope: Scope::National,
            series: ResolvedSeries {
                time: (1..=values.len()).map(|d| format!("2020-03-{d:02}")).collect(),
                values,
            },
        }
    }

    #[test]
    fn flat_series_still_gets_a_range() {
        let (lo, hi) = value_range(&[series(vec![Value::Int(7), Value::Int(7)])], 0.0);
        assert!(lo < 7.0 && hi > 7.0);
    }

    #[test]
    fn text_values_do_not_count() {
        let s = series(vec![Value::Int(1), Value::Text("n/a".into()), Value::Int(3)]);
        let (lo, hi) = value_range(&[s.clone()], 0.0);
        assert!((lo - 1.0).abs() < 1e-9 && (hi - 3.0).abs() < 1e-9);
        assert_eq!(day_count(&[s]), 3);
    }
}
