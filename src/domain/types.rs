//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while resolving fields
//! - exported to JSON/CSV
//! - reloaded later for plotting

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One typed cell of a daily snapshot (or one point of a resolved series).
///
/// Serialized untagged so a series JSON file reads naturally:
/// `[12, 0.5, "2020-03-01", "ITA"]`.
///
/// Decoding tries the variants in order, so any string in `YYYY-MM-DD` form
/// reads back as `Date`, including a `Text` cell that only looks like a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// Numeric view of the value (`None` for dates and text).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Date(_) | Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Which upstream data source a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Italian Civil Protection data (national, regional, provincial).
    Italy,
    /// Johns Hopkins CSSE global daily reports.
    World,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Italy, Source::World];

    pub fn display_name(self) -> &'static str {
        match self {
            Source::Italy => "italy",
            Source::World => "world",
        }
    }
}

/// One mountable dataset family: a directory of per-day CSV snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    ItalyCountry,
    ItalyRegions,
    ItalyProvinces,
    World,
}

impl DatasetKind {
    /// Directory holding the snapshots, relative to the data root.
    pub fn relative_dir(self) -> &'static str {
        match self {
            DatasetKind::ItalyCountry => "italy/dati-andamento-nazionale",
            DatasetKind::ItalyRegions => "italy/dati-regioni",
            DatasetKind::ItalyProvinces => "italy/dati-province",
            DatasetKind::World => "world/csse_covid_19_data/csse_covid_19_daily_reports",
        }
    }

    /// File-name pattern (a single `*` wildcard) selecting the snapshots.
    pub fn file_pattern(self) -> &'static str {
        match self {
            DatasetKind::ItalyCountry => "dpc-covid19-ita-andamento-nazionale-*.csv",
            DatasetKind::ItalyRegions => "dpc-covid19-ita-regioni-*.csv",
            DatasetKind::ItalyProvinces => "dpc-covid19-ita-province-*.csv",
            DatasetKind::World => "*.csv",
        }
    }

    /// How many of the most recent snapshots to leave out of the mount.
    ///
    /// The Italian repository publishes the current day before it is complete.
    pub fn drop_last(self) -> usize {
        match self {
            DatasetKind::ItalyCountry | DatasetKind::ItalyRegions | DatasetKind::ItalyProvinces => 1,
            DatasetKind::World => 0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DatasetKind::ItalyCountry => "Italy",
            DatasetKind::ItalyRegions => "the Italian regions",
            DatasetKind::ItalyProvinces => "the Italian provinces",
            DatasetKind::World => "global data",
        }
    }
}

/// Geographic granularity of a named scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Region,
    Province,
    Country,
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ScopeKind::Region => "Region",
            ScopeKind::Province => "Province",
            ScopeKind::Country => "Country",
        };
        f.write_str(label)
    }
}

/// Geographic scope of a request.
///
/// `National` is the whole-country total of the Italian dataset; the world
/// dataset always needs a named `Country` or `Province`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    National,
    Region(String),
    Province(String),
    Country(String),
}

impl Scope {
    /// Build a scope from optional CLI-style parts.
    ///
    /// At most one part may be given; none means the national scope.
    pub fn from_parts(
        region: Option<String>,
        province: Option<String>,
        country: Option<String>,
    ) -> Result<Scope, crate::error::LoadError> {
        match (region, province, country) {
            (None, None, None) => Ok(Scope::National),
            (Some(r), None, None) => Ok(Scope::Region(r)),
            (None, Some(p), None) => Ok(Scope::Province(p)),
            (None, None, Some(c)) => Ok(Scope::Country(c)),
            _ => Err(crate::error::LoadError::RequestConflict(
                "at most one of region, province or country may be given.".to_string(),
            )),
        }
    }

    pub fn kind(&self) -> Option<ScopeKind> {
        match self {
            Scope::National => None,
            Scope::Region(_) => Some(ScopeKind::Region),
            Scope::Province(_) => Some(ScopeKind::Province),
            Scope::Country(_) => Some(ScopeKind::Country),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Scope::National => None,
            Scope::Region(n) | Scope::Province(n) | Scope::Country(n) => Some(n),
        }
    }

    /// Human-readable label (legend entries, log lines).
    pub fn label(&self) -> &str {
        self.name().unwrap_or("Italy")
    }
}

/// How day labels are rendered in a resolved series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelFormat {
    /// `YYYY-MM-DD`
    #[default]
    Full,
    /// `MM-DD`
    MonthDay,
}

impl LabelFormat {
    pub fn render(self, date: NaiveDate) -> String {
        match self {
            LabelFormat::Full => date.format("%Y-%m-%d").to_string(),
            LabelFormat::MonthDay => date.format("%m-%d").to_string(),
        }
    }
}

/// Output of field resolution: one value per mounted day, in date order.
///
/// Invariant: `time.len() == values.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSeries {
    pub time: Vec<String>,
    pub values: Vec<Value>,
}

impl ResolvedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(day index, value)` pairs for the numeric points of the series.
    pub fn numeric_points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_f64().map(|y| (i as f64, y)))
            .filter(|(_, y)| y.is_finite())
            .collect()
    }
}

/// A resolved series together with what was asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub field: String,
    pub scope: Scope,
    pub series: ResolvedSeries,
}

impl LabeledSeries {
    /// Compact legend entry: region shorthand when one exists, else the name.
    pub fn legend(&self) -> String {
        let name = self.scope.label();
        crate::config::shorthand(name).unwrap_or(name).to_string()
    }
}

/// Portable series file (`covid load --export-json`, `covid plot --input`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesFile {
    pub tool: String,
    pub source: Source,
    #[serde(flatten)]
    pub series: LabeledSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parts_are_mutually_exclusive() {
        assert_eq!(Scope::from_parts(None, None, None).unwrap(), Scope::National);
        assert_eq!(
            Scope::from_parts(Some("Lombardia".into()), None, None).unwrap(),
            Scope::Region("Lombardia".into())
        );
        let err = Scope::from_parts(Some("Lombardia".into()), Some("Bergamo".into()), None).unwrap_err();
        assert!(matches!(err, crate::error::LoadError::RequestConflict(_)));
    }

    #[test]
    fn values_round_trip_through_json() {
        let values = vec![
            Value::Int(12),
            Value::Float(0.5),
            Value::Float(50.0),
            Value::Date(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()),
            Value::Text("ITA".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn label_formats() {
        let d = NaiveDate::from_ymd_opt(2020, 2, 24).unwrap();
        assert_eq!(LabelFormat::Full.render(d), "2020-02-24");
        assert_eq!(LabelFormat::MonthDay.render(d), "02-24");
    }
}
