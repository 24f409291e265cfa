//! Read/write series JSON files.
//!
//! A series file holds one resolved series plus what was asked for (source,
//! field, scope), so it can be plotted later without the data repositories.
//! The schema is defined by `domain::SeriesFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{LabeledSeries, SeriesFile, Source};
use crate::error::AppError;

/// Write a series JSON file.
pub fn write_series_json(path: &Path, source: Source, series: &LabeledSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create series JSON '{}': {e}", path.display())))?;

    let doc = SeriesFile {
        tool: "covid".to_string(),
        source,
        series: series.clone(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write series JSON: {e}")))?;

    Ok(())
}

/// Read a series JSON file.
pub fn read_series_json(path: &Path) -> Result<SeriesFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open series JSON '{}': {e}", path.display())))?;
    let doc: SeriesFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(4, format!("Invalid series JSON: {e}")))?;

    if doc.series.series.time.len() != doc.series.series.values.len() {
        return Err(AppError::new(
            4,
            format!(
                "Invalid series JSON '{}': {} labels for {} values.",
                path.display(),
                doc.series.series.time.len(),
                doc.series.series.values.len()
            ),
        ));
    }
    Ok(doc)
}
