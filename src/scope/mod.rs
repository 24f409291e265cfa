//! Scope filter: one row per mounted day for the requested scope.
//!
//! Named scopes match the designated name column exactly (case-sensitive, no
//! trimming). A day on which the scope is absent aborts the whole request:
//! a partial series is never returned.

use crate::domain::{Scope, ScopeKind, Value};
use crate::error::LoadError;
use crate::io::mount::{Dataset, Snapshot};
use crate::schema::{ColumnSchema, Row, RowView};

/// Extract the rows relevant to `scope`, one per snapshot, in dataset order.
pub fn filter(dataset: &Dataset, scope: &Scope) -> Result<Vec<Row>, LoadError> {
    let schema = dataset.schema;

    let (kind, name) = match (scope.kind(), scope.name()) {
        (Some(kind), Some(name)) => (kind, name),
        _ => return national_rows(dataset),
    };

    let column = schema.scope_column(kind).ok_or_else(|| {
        LoadError::RequestConflict(format!(
            "a {} scope is not available for {}.",
            kind.to_string().to_lowercase(),
            dataset.kind.display_name()
        ))
    })?;

    if dataset.snapshots.is_empty() {
        return Err(LoadError::ScopeNotFound {
            kind,
            name: name.to_string(),
        });
    }

    let aggregate = kind == ScopeKind::Country;

    dataset
        .snapshots
        .iter()
        .map(|snapshot| {
            let matching: Vec<&Row> = snapshot
                .rows
                .iter()
                .filter(|row| RowView::new(schema, row).text(column) == Some(name))
                .collect();

            match matching.as_slice() {
                [] => Err(LoadError::ScopeNotFound {
                    kind,
                    name: name.to_string(),
                }),
                [row] => Ok((*row).clone()),
                rows if aggregate => Ok(sum_rows(schema, rows)),
                rows => Err(LoadError::ScopeAmbiguous {
                    kind,
                    name: name.to_string(),
                    date: snapshot.describe(schema),
                    count: rows.len(),
                }),
            }
        })
        .collect()
}

/// Whole-country rows: each national snapshot holds exactly one total row.
fn national_rows(dataset: &Dataset) -> Result<Vec<Row>, LoadError> {
    if !dataset.schema.scope_columns.is_empty() {
        return Err(LoadError::RequestConflict(format!(
            "{} needs a named scope.",
            dataset.kind.display_name()
        )));
    }

    dataset
        .snapshots
        .iter()
        .map(|snapshot: &Snapshot| {
            snapshot
                .rows
                .first()
                .cloned()
                .ok_or_else(|| LoadError::parse(&snapshot.path, "snapshot has no data rows"))
        })
        .collect()
}

/// Roll several rows of one day into a single row.
///
/// Additive (count) columns are summed; every other column keeps the value of
/// the first row.
pub fn sum_rows(schema: &ColumnSchema, rows: &[&Row]) -> Row {
    let mut out = match rows.first() {
        Some(first) => (*first).clone(),
        None => return Row { cells: Vec::new() },
    };

    for (idx, column) in schema.columns.iter().enumerate() {
        if !column.additive {
            continue;
        }
        let total = rows
            .iter()
            .filter_map(|r| r.cells.get(idx))
            .fold(None, |acc: Option<Value>, v| match (acc, v) {
                (None, v) => Some(v.clone()),
                (Some(Value::Int(a)), Value::Int(b)) => Some(Value::Int(a + b)),
                (Some(a), b) => Some(Value::Float(a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0))),
            });
        if let (Some(total), Some(cell)) = (total, out.cells.get_mut(idx)) {
            *cell = total;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatasetKind;
    use crate::schema::{ITALY_REGION, WORLD};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn date(day: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(2020, 3, day).unwrap())
    }

    fn region_row(day: u32, name: &str, cases: i64) -> Row {
        let mut cells = vec![
            date(day),
            Value::Text("ITA".into()),
            Value::Int(3),
            Value::Text(name.into()),
            Value::Float(45.0),
            Value::Float(9.0),
        ];
        cells.extend((0..8).map(|_| Value::Int(0)));
        cells.push(Value::Int(cases));
        cells.push(Value::Int(cases * 10));
        Row { cells }
    }

    fn world_row(day: u32, province: &str, country: &str, confirmed: i64) -> Row {
        Row {
            cells: vec![
                Value::Text(province.into()),
                Value::Text(country.into()),
                date(day),
                Value::Int(confirmed),
                Value::Int(1),
                Value::Int(0),
                Value::Float(30.0 + confirmed as f64),
                Value::Float(110.0),
            ],
        }
    }

    fn dataset(kind: DatasetKind, days: Vec<Vec<Row>>) -> Dataset {
        Dataset {
            kind,
            schema: crate::schema::ColumnSchema::for_dataset(kind),
            snapshots: days
                .into_iter()
                .enumerate()
                .map(|(i, rows)| Snapshot {
                    path: PathBuf::from(format!("day{i}.csv")),
                    rows,
                })
                .collect(),
        }
    }

    #[test]
    fn region_present_every_day_yields_one_row_per_day() {
        let ds = dataset(
            DatasetKind::ItalyRegions,
            (1..=3)
                .map(|d| vec![region_row(d, "Veneto", 5), region_row(d, "Lombardia", d as i64)])
                .collect(),
        );
        let rows = filter(&ds, &Scope::Region("Lombardia".into())).unwrap();
        assert_eq!(rows.len(), ds.len());
        for row in &rows {
            assert_eq!(RowView::new(&ITALY_REGION, row).text("denominazione_regione"), Some("Lombardia"));
        }
    }

    #[test]
    fn missing_region_fails_naming_it() {
        let ds = dataset(DatasetKind::ItalyRegions, vec![vec![region_row(1, "Veneto", 5)]]);
        let err = filter(&ds, &Scope::Region("Nonexistent".into())).unwrap_err();
        assert!(err.to_string().contains("Nonexistent"));
        assert!(matches!(err, LoadError::ScopeNotFound { kind: ScopeKind::Region, .. }));
    }

    #[test]
    fn named_scope_over_no_snapshots_is_not_found() {
        let ds = dataset(DatasetKind::ItalyRegions, Vec::new());
        let err = filter(&ds, &Scope::Region("Nonexistent".into())).unwrap_err();
        assert!(matches!(err, LoadError::ScopeNotFound { kind: ScopeKind::Region, .. }));
    }

    #[test]
    fn missing_on_a_single_day_fails_fast() {
        let ds = dataset(
            DatasetKind::ItalyRegions,
            vec![
                vec![region_row(1, "Veneto", 5)],
                vec![region_row(2, "Lombardia", 5)],
            ],
        );
        let err = filter(&ds, &Scope::Region("Veneto".into())).unwrap_err();
        assert!(matches!(err, LoadError::ScopeNotFound { .. }));
    }

    #[test]
    fn names_match_exactly() {
        let ds = dataset(DatasetKind::ItalyRegions, vec![vec![region_row(1, "Lombardia", 5)]]);
        assert!(filter(&ds, &Scope::Region("lombardia".into())).is_err());
        assert!(filter(&ds, &Scope::Region("Lombardia ".into())).is_err());
    }

    #[test]
    fn world_country_sums_counts_and_keeps_first_attributes() {
        let ds = dataset(
            DatasetKind::World,
            vec![vec![
                world_row(1, "Hubei", "China", 100),
                world_row(1, "Guangdong", "China", 20),
                world_row(1, "", "Italy", 3),
            ]],
        );
        let rows = filter(&ds, &Scope::Country("China".into())).unwrap();
        assert_eq!(rows.len(), 1);
        let view = RowView::new(&WORLD, &rows[0]);
        assert_eq!(view.get("Confirmed"), Some(&Value::Int(120)));
        assert_eq!(view.get("Deaths"), Some(&Value::Int(2)));
        assert_eq!(view.get("Latitude"), Some(&Value::Float(130.0)));
        assert_eq!(view.text("Province/State"), Some("Hubei"));
    }

    #[test]
    fn duplicate_province_rows_are_ambiguous() {
        let ds = dataset(
            DatasetKind::World,
            vec![vec![world_row(1, "Hubei", "China", 1), world_row(1, "Hubei", "China", 2)]],
        );
        let err = filter(&ds, &Scope::Province("Hubei".into())).unwrap_err();
        assert!(matches!(err, LoadError::ScopeAmbiguous { count: 2, .. }));
    }

    #[test]
    fn national_scope_needs_national_dataset() {
        let ds = dataset(DatasetKind::World, vec![vec![world_row(1, "Hubei", "China", 1)]]);
        assert!(matches!(filter(&ds, &Scope::National), Err(LoadError::RequestConflict(_))));
    }
}
