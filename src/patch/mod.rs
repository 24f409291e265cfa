//! Repairs of known upstream defects, applied to the snapshot files on disk.
//!
//! Every patch is idempotent: running it again on patched files changes
//! nothing, and files are only rewritten when their content changes.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::Source;
use crate::error::LoadError;

pub mod world;

pub use world::WorldPatcher;

/// Collaborator rewriting the on-disk snapshots of a source.
pub trait Patch {
    fn patch(&self, source: Source) -> Result<(), LoadError>;
}

/// Patch for sources without known defects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPatch;

impl Patch for NoPatch {
    fn patch(&self, _source: Source) -> Result<(), LoadError> {
        Ok(())
    }
}

/// A snapshot file held as raw records (header first) while patches run.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub records: Vec<Vec<String>>,
    pub changed: bool,
}

impl RawTable {
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| LoadError::parse(path, e.to_string()))?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            path: path.to_path_buf(),
            records,
            changed: false,
        })
    }

    /// Write the table back if any patch touched it.
    pub fn write_if_changed(&self) -> Result<bool, LoadError> {
        if !self.changed {
            return Ok(false);
        }

        let to_io = |e: csv::Error| LoadError::io(&self.path, std::io::Error::other(e));
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(to_io)?;
        for record in &self.records {
            writer.write_record(record).map_err(to_io)?;
        }
        writer.flush().map_err(|e| LoadError::io(&self.path, e))?;
        Ok(true)
    }

    pub fn data_rows_mut(&mut self) -> &mut [Vec<String>] {
        match self.records.split_first_mut() {
            Some((_, rows)) => rows,
            None => &mut [],
        }
    }
}
