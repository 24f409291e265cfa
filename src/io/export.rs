//! Export resolved series to CSV.
//!
//! Long format (one row per series and day) so series of different sources
//! or lengths fit in one file and load easily in spreadsheets.

use std::path::Path;

use crate::domain::LabeledSeries;
use crate::error::AppError;

/// Write `series` to a CSV file with columns `field,scope,date,value`.
pub fn write_series_csv(path: &Path, series: &[LabeledSeries]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["field", "scope", "date", "value"])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for s in series {
        for (date, value) in s.series.time.iter().zip(&s.series.values) {
            let value = value.to_string();
            writer
                .write_record([s.field.as_str(), s.scope.label(), date.as_str(), value.as_str()])
                .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}
