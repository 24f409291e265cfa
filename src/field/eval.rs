//! Evaluation of parsed fields over scope-filtered rows.
//!
//! Every variant keeps the row alignment: the output has one value per input
//! row, so the day labels are computed once and shared by all derived series.

use crate::domain::{LabelFormat, ResolvedSeries, Value};
use crate::error::LoadError;
use crate::field::parse::FieldExpr;
use crate::schema::{ColumnSchema, Row, RowView};

/// Absolute tolerance under which a divisor counts as zero.
const ZERO_TOL: f64 = 1e-8;

pub fn near_zero(x: f64) -> bool {
    x.abs() <= ZERO_TOL
}

/// Resolve `expr` into an aligned `(time, values)` pair.
pub fn resolve(
    expr: &FieldExpr,
    schema: &'static ColumnSchema,
    rows: &[Row],
    labels: LabelFormat,
) -> Result<ResolvedSeries, LoadError> {
    let time = rows
        .iter()
        .map(|row| {
            RowView::new(schema, row)
                .date()
                .map(|d| labels.render(d))
                .unwrap_or_default()
        })
        .collect();
    let values = evaluate(expr, schema, rows)?;
    Ok(ResolvedSeries { time, values })
}

/// Evaluate `expr` to one value per row.
pub fn evaluate(expr: &FieldExpr, schema: &ColumnSchema, rows: &[Row]) -> Result<Vec<Value>, LoadError> {
    match expr {
        FieldExpr::Literal(name) => {
            let idx = schema
                .index_of(name)
                .ok_or_else(|| LoadError::FieldName(name.clone()))?;
            rows.iter()
                .map(|row| {
                    row.cells
                        .get(idx)
                        .cloned()
                        .ok_or_else(|| LoadError::FieldName(name.clone()))
                })
                .collect()
        }
        FieldExpr::AbsoluteIncrement(inner) => {
            let values = evaluate(inner, schema, rows)?;
            absolute_increment(&values).ok_or_else(|| LoadError::FieldName(expr.to_string()))
        }
        FieldExpr::RelativeIncrement(inner) => {
            let values = numbers(&evaluate(inner, schema, rows)?, expr)?;
            Ok(relative_increment(&values, 1.0))
        }
        FieldExpr::PercentageRelativeIncrement(inner) => {
            let values = numbers(&evaluate(inner, schema, rows)?, expr)?;
            Ok(relative_increment(&values, 100.0))
        }
        FieldExpr::Ratio {
            numerator,
            denominator,
            scale,
        } => {
            let num = numbers(&evaluate(numerator, schema, rows)?, expr)?;
            let den = numbers(&evaluate(denominator, schema, rows)?, expr)?;
            Ok(ratio(&num, &den, *scale))
        }
    }
}

fn numbers(values: &[Value], expr: &FieldExpr) -> Result<Vec<f64>, LoadError> {
    values
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| LoadError::FieldName(expr.to_string()))
}

/// `d[0] = 0`, `d[i] = v[i] - v[i-1]`.
///
/// Integer series stay integer. `None` if a value is not numeric.
pub fn absolute_increment(values: &[Value]) -> Option<Vec<Value>> {
    if values.iter().all(|v| matches!(v, Value::Int(_))) {
        let ints: Vec<i64> = values
            .iter()
            .filter_map(|v| match v {
                Value::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        let mut out = Vec::with_capacity(ints.len());
        for (i, v) in ints.iter().enumerate() {
            out.push(Value::Int(if i == 0 { 0 } else { v - ints[i - 1] }));
        }
        return Some(out);
    }

    let floats = values.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>()?;
    let mut out = Vec::with_capacity(floats.len());
    for (i, v) in floats.iter().enumerate() {
        out.push(Value::Float(if i == 0 { 0.0 } else { v - floats[i - 1] }));
    }
    Some(out)
}

/// `d[0] = 0`, `d[i] = scale * (v[i] - v[i-1]) / v[i-1]`, or 0 when
/// `v[i-1]` is (nearly) zero.
pub fn relative_increment(values: &[f64], scale: f64) -> Vec<Value> {
    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        let d = if i == 0 {
            0.0
        } else {
            let prev = values[i - 1];
            if near_zero(prev) { 0.0 } else { scale * (v - prev) / prev }
        };
        out.push(Value::Float(d));
    }
    out
}

/// `r[i] = scale * num[i] / den[i]`, or 0 when `den[i]` is (nearly) zero.
pub fn ratio(num: &[f64], den: &[f64], scale: f64) -> Vec<Value> {
    num.iter()
        .zip(den)
        .map(|(n, d)| Value::Float(if near_zero(*d) { 0.0 } else { scale * n / d }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::parse::{ITALIAN, parse_field};
    use crate::schema::ITALY_COUNTRY;
    use chrono::NaiveDate;

    fn national_rows(positives: &[i64], cases: &[i64], swabs: &[i64]) -> Vec<Row> {
        (0..positives.len())
            .map(|i| {
                let day = NaiveDate::from_ymd_opt(2020, 2, 24 + i as u32).unwrap();
                let mut cells = vec![Value::Date(day), Value::Text("ITA".into())];
                cells.extend([0, 0, 0, 0].map(Value::Int));
                cells.push(Value::Int(positives[i]));
                cells.extend([0, 0, 0].map(Value::Int));
                cells.push(Value::Int(cases[i]));
                cells.push(Value::Int(swabs[i]));
                Row { cells }
            })
            .collect()
    }

    fn floats(series: &ResolvedSeries) -> Vec<f64> {
        series.values.iter().map(|v| v.as_f64().unwrap()).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    fn run(field: &str, rows: &[Row]) -> ResolvedSeries {
        let expr = parse_field(field, &ITALY_COUNTRY, &ITALIAN).unwrap();
        resolve(&expr, &ITALY_COUNTRY, rows, LabelFormat::Full).unwrap()
    }

    #[test]
    fn literal_reads_typed_cells() {
        let rows = national_rows(&[100, 150, 135], &[1, 2, 3], &[10, 20, 30]);
        let series = run("totale_attualmente_positivi", &rows);
        assert_eq!(series.time, ["2020-02-24", "2020-02-25", "2020-02-26"]);
        assert_eq!(series.values, [Value::Int(100), Value::Int(150), Value::Int(135)]);

        let dates = run("data", &rows);
        assert_eq!(dates.values[0], Value::Date(NaiveDate::from_ymd_opt(2020, 2, 24).unwrap()));
        assert_eq!(run("stato", &rows).values[2], Value::Text("ITA".into()));
    }

    #[test]
    fn increments_of_currently_positive() {
        let rows = national_rows(&[100, 150, 135], &[1, 2, 3], &[10, 20, 30]);

        let abs = run("incremento_totale_attualmente_positivi", &rows);
        assert_eq!(abs.values, [Value::Int(0), Value::Int(50), Value::Int(-15)]);
        assert_eq!(abs.time.len(), abs.values.len());

        let rel = run("incremento_relativo_totale_attualmente_positivi", &rows);
        assert_close(&floats(&rel), &[0.0, 0.5, -0.1]);

        let pct = run("incremento_relativo_percentuale_totale_attualmente_positivi", &rows);
        assert_close(&floats(&pct), &[0.0, 50.0, -10.0]);
    }

    #[test]
    fn relative_increment_from_zero_is_zero() {
        let values = [0.0, 5.0, 1e-9, 2.0];
        let out: Vec<f64> = relative_increment(&values, 1.0)
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_close(&out, &[0.0, 0.0, (1e-9 - 5.0) / 5.0, 0.0]);
    }

    #[test]
    fn ratio_of_positive_swabs() {
        let rows = national_rows(&[0, 0, 0, 0], &[0, 5, 20, 20], &[0, 50, 100, 100]);

        let frac = run("frazione_tamponi_positivi", &rows);
        assert_close(&floats(&frac), &[0.0, 0.1, 0.2, 0.2]);

        let pct = run("percentuale_tamponi_positivi", &rows);
        assert_close(&floats(&pct), &[0.0, 10.0, 20.0, 20.0]);

        // Daily increments: cases [0, 5, 15, 0], swabs [0, 50, 50, 0].
        let new_frac = run("frazione_nuovi_tamponi_positivi", &rows);
        assert_close(&floats(&new_frac), &[0.0, 0.1, 0.3, 0.0]);
    }

    #[test]
    fn float_series_increment_as_floats() {
        let values = [Value::Float(1.5), Value::Int(2), Value::Float(4.0)];
        let out = absolute_increment(&values).unwrap();
        assert_eq!(out, [Value::Float(0.0), Value::Float(0.5), Value::Float(2.0)]);
        assert!(absolute_increment(&[Value::Text("x".into())]).is_none());
    }

    #[test]
    fn empty_rows_give_empty_series() {
        let series = run("incremento_relativo_totale_casi", &[]);
        assert!(series.is_empty());
        assert!(series.time.is_empty());
    }
}
