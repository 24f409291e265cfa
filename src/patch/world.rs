//! Patches for the CSSE global daily reports.
//!
//! Known defects:
//! - China is labelled `Mainland China` in early reports
//! - early files lack the `Latitude`/`Longitude` columns
//! - a province/country pair reported once is missing from some other days
//! - `Last Update` holds the upstream update time, not the report day

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{DatasetKind, Source};
use crate::error::LoadError;
use crate::io::mount::list_snapshot_files;
use crate::patch::{Patch, RawTable};
use crate::schema::WORLD;

const PROVINCE: usize = 0;
const COUNTRY: usize = 1;
const LAST_UPDATE: usize = 2;

pub struct WorldPatcher {
    dir: PathBuf,
}

impl WorldPatcher {
    /// Patcher for the daily reports below the data root.
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(DatasetKind::World.relative_dir()),
        }
    }

    pub fn run(&self) -> Result<(), LoadError> {
        let files = list_snapshot_files(&self.dir, DatasetKind::World.file_pattern())?;
        let mut tables = files
            .iter()
            .map(|p| RawTable::read(p))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Apply patch replace_mainland_china ...");
        replace_mainland_china(&mut tables);
        info!("Apply patch fill_header ...");
        fill_header(&mut tables);
        info!("Apply patch fill_data ...");
        fill_data(&mut tables);
        info!("Apply patch check_date ...");
        check_date(&mut tables);

        let mut written = 0usize;
        for table in &tables {
            if table.write_if_changed()? {
                written += 1;
            }
        }
        info!(files = tables.len(), written, "world patches applied");
        Ok(())
    }
}

impl Patch for WorldPatcher {
    fn patch(&self, _source: Source) -> Result<(), LoadError> {
        self.run()
    }
}

/// Day of a report, from its `MM-DD-YYYY.csv` file name.
pub fn report_date(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, "%m-%d-%Y").ok()
}

pub fn replace_mainland_china(tables: &mut [RawTable]) {
    for table in tables {
        let mut changed = false;
        for row in table.data_rows_mut() {
            if let Some(country) = row.get_mut(COUNTRY) {
                if country == "Mainland China" {
                    *country = "China".to_string();
                    changed = true;
                }
            }
        }
        table.changed |= changed;
    }
}

pub fn fill_header(tables: &mut [RawTable]) {
    let width = WORLD.len();
    for table in tables {
        let Some(header) = table.records.first_mut() else {
            continue;
        };
        if header.len() == width - 2 {
            header.push("Latitude".to_string());
            header.push("Longitude".to_string());
            table.changed = true;
        }

        let mut changed = false;
        for row in table.data_rows_mut() {
            if row.len() < width {
                row.resize(width, String::new());
                changed = true;
            }
        }
        table.changed |= changed;
    }
}

/// Give every file a row for every province/country pair seen in any file.
///
/// Missing pairs get a zero row dated with the file's own report day.
pub fn fill_data(tables: &mut [RawTable]) {
    let all_pairs: BTreeSet<(String, String)> = tables.iter().flat_map(|t| pairs(t)).collect();

    for table in tables {
        let Some(date) = report_date(&table.path) else {
            warn!(file = %table.path.display(), "no report date in file name, skipping fill_data");
            continue;
        };
        let present = pairs(table);
        let date = date.format("%Y-%m-%d").to_string();

        for (province, country) in all_pairs.difference(&present) {
            table.records.push(vec![
                province.clone(),
                country.clone(),
                date.clone(),
                "0".to_string(),
                "0".to_string(),
                "0".to_string(),
                "0.0".to_string(),
                "0.0".to_string(),
            ]);
            table.changed = true;
        }
    }
}

/// Set `Last Update` of every row to the file's report day.
pub fn check_date(tables: &mut [RawTable]) {
    for table in tables {
        let Some(date) = report_date(&table.path) else {
            warn!(file = %table.path.display(), "no report date in file name, skipping check_date");
            continue;
        };
        let date = date.format("%Y-%m-%d").to_string();

        let mut changed = false;
        for row in table.data_rows_mut() {
            if let Some(cell) = row.get_mut(LAST_UPDATE) {
                if *cell != date {
                    *cell = date.clone();
                    changed = true;
                }
            }
        }
        table.changed |= changed;
    }
}

fn pairs(table: &RawTable) -> BTreeSet<(String, String)> {
    table
        .records
        .iter()
        .skip(1)
        .filter_map(|row| Some((row.get(PROVINCE)?.clone(), row.get(COUNTRY)?.clone())))
        .collect()
}
