use std::path::{Path, PathBuf};

use crate::domain::{DatasetKind, ResolvedSeries, Scope, Source};
use crate::error::LoadError;
use crate::loader::{DatasetSlot, Loader, Preparation, load_from};

/// Loader for the CSSE global daily reports.
///
/// Requests name a country (rows of the day summed) or a province.
pub struct WorldLoader {
    root: PathBuf,
    prep: Preparation,
    reports: DatasetSlot,
}

impl WorldLoader {
    pub fn new(root: &Path, prep: Preparation) -> Self {
        Self {
            root: root.to_path_buf(),
            prep,
            reports: DatasetSlot::default(),
        }
    }
}

impl Loader for WorldLoader {
    fn source(&self) -> Source {
        Source::World
    }

    fn load(&mut self, field: &str, scope: &Scope) -> Result<ResolvedSeries, LoadError> {
        match scope {
            Scope::Country(_) | Scope::Province(_) => {}
            Scope::National => {
                return Err(LoadError::RequestConflict(
                    "the world data needs a country or a province.".to_string(),
                ));
            }
            Scope::Region(name) => {
                return Err(LoadError::RequestConflict(format!(
                    "region '{name}' requested from the world data; use a country or a province."
                )));
            }
        }

        load_from(
            &mut self.prep,
            &mut self.reports,
            &self.root,
            Source::World,
            DatasetKind::World,
            field,
            scope,
        )
    }
}
