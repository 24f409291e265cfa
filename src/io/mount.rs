//! Dataset mount: per-day CSV snapshots into ordered in-memory tables.
//!
//! Mounting is a pure function of the directory state. Caching a mounted
//! dataset is the loader's job, not this module's.
//!
//! Snapshot files must carry a fixed-width, zero-padded date in their names:
//! lexicographic order of the names is taken as chronological order.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

use crate::domain::{DatasetKind, Value};
use crate::error::LoadError;
use crate::schema::{ColumnSchema, ColumnType, Row, RowView};

/// One file's worth of rows (all scopes on a single day).
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub rows: Vec<Row>,
}

impl Snapshot {
    /// Day of the snapshot, taken from its first row.
    pub fn date(&self, schema: &'static ColumnSchema) -> Option<NaiveDate> {
        self.rows.first().and_then(|r| RowView::new(schema, r).date())
    }

    /// Short description used in error messages.
    pub fn describe(&self, schema: &'static ColumnSchema) -> String {
        match self.date(schema) {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => self.path.display().to_string(),
        }
    }
}

/// A mounted dataset family, snapshots in date order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub schema: &'static ColumnSchema,
    pub snapshots: Vec<Snapshot>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Mount the dataset family `kind` found below the data root.
pub fn mount_dataset(root: &Path, kind: DatasetKind) -> Result<Dataset, LoadError> {
    let dir = root.join(kind.relative_dir());
    let schema = ColumnSchema::for_dataset(kind);
    let snapshots = mount(&dir, kind.file_pattern(), schema, kind.drop_last())?;
    Ok(Dataset {
        kind,
        schema,
        snapshots,
    })
}

/// Read every file of `dir` matching `pattern`, sorted by name, minus the
/// `drop_last` most recent ones.
pub fn mount(
    dir: &Path,
    pattern: &str,
    schema: &'static ColumnSchema,
    drop_last: usize,
) -> Result<Vec<Snapshot>, LoadError> {
    let mut files = list_snapshot_files(dir, pattern)?;
    let keep = files.len().saturating_sub(drop_last);
    files.truncate(keep);

    files
        .into_iter()
        .map(|path| {
            let rows = read_snapshot(&path, schema)?;
            debug!(file = %path.display(), rows = rows.len(), "mounted snapshot");
            Ok(Snapshot { path, rows })
        })
        .collect()
}

/// Files of `dir` whose names match `pattern`, in lexicographic order.
pub fn list_snapshot_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| matches_pattern(n, pattern));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Match a file name against a pattern holding at most one `*`.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len() && name.starts_with(prefix) && name.ends_with(suffix)
        }
        None => name == pattern,
    }
}

/// Parse one snapshot file against its schema.
pub fn read_snapshot(path: &Path, schema: &'static ColumnSchema) -> Result<Vec<Row>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::parse(path, format!("failed to read header: {e}")))?
        .clone();
    check_header(&headers, schema).map_err(|msg| LoadError::parse(path, msg))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| LoadError::parse(path, format!("line {line}: {e}")))?;
        let row =
            parse_record(&record, schema).map_err(|msg| LoadError::parse(path, format!("line {line}: {msg}")))?;
        rows.push(row);
    }

    Ok(rows)
}

fn check_header(headers: &StringRecord, schema: &ColumnSchema) -> Result<(), String> {
    if headers.len() != schema.len() {
        return Err(format!(
            "expected {} columns, found {} in header",
            schema.len(),
            headers.len()
        ));
    }

    for (found, column) in headers.iter().zip(schema.columns) {
        // Strip a UTF-8 BOM on the first header if an exporter left one.
        let found = found.trim().trim_start_matches('\u{feff}');
        if found != column.name {
            return Err(format!("expected column `{}`, found `{found}`", column.name));
        }
    }

    Ok(())
}

fn parse_record(record: &StringRecord, schema: &ColumnSchema) -> Result<Row, String> {
    if record.len() != schema.len() {
        return Err(format!("expected {} fields, found {}", schema.len(), record.len()));
    }

    let cells = record
        .iter()
        .zip(schema.columns)
        .map(|(raw, column)| parse_cell(raw, column.ty).map_err(|e| format!("column `{}`: {e}", column.name)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row { cells })
}

/// Coerce a raw cell according to its declared column type.
///
/// Empty numeric cells read as zero: upstream leaves counts blank when none
/// were reported.
pub fn parse_cell(raw: &str, ty: ColumnType) -> Result<Value, String> {
    match ty {
        ColumnType::Text => Ok(Value::Text(raw.to_string())),
        ColumnType::Date => parse_date(raw).map(Value::Date),
        ColumnType::Int => {
            let s = raw.trim();
            if s.is_empty() {
                return Ok(Value::Int(0));
            }
            if let Ok(v) = s.parse::<i64>() {
                return Ok(Value::Int(v));
            }
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Value::Int(v as i64)),
                _ => Err(format!("invalid integer '{raw}'")),
            }
        }
        ColumnType::Float => {
            let s = raw.trim();
            if s.is_empty() {
                return Ok(Value::Float(0.0));
            }
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                _ => Err(format!("invalid number '{raw}'")),
            }
        }
    }
}

/// Parse the day of a timestamp cell.
///
/// The first 10 characters are read as `YYYY-MM-DD`. Early world reports use
/// US forms (`1/22/2020 17:00`), accepted as a fallback.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        return Ok(d);
    }

    let day = raw.split([' ', 'T']).next().unwrap_or(raw);
    // Two-digit years first: `%Y` would read `20` as year 20.
    const US_FMTS: [&str; 2] = ["%m/%d/%y", "%m/%d/%Y"];
    for fmt in US_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(day, fmt) {
            return Ok(d);
        }
    }

    Err(format!("invalid date '{raw}'"))
}
