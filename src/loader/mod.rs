//! Time-series loaders: mount + scope filter + field resolution behind a
//! single `load(field, scope)` call.
//!
//! Each loader refreshes and patches its data at most once, before the first
//! mount, and keeps every dataset it mounted for the rest of its lifetime.
//! `LoaderRegistry` is the composition root: it owns one loader per source.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::config::DataConfig;
use crate::domain::{DatasetKind, LabelFormat, ResolvedSeries, Scope, Source};
use crate::error::LoadError;
use crate::field::{Vocabulary, parse_field, resolve};
use crate::io::mount::{Dataset, mount_dataset};
use crate::patch::{NoPatch, Patch, WorldPatcher};
use crate::refresh::{GitRefresher, Refresh};
use crate::schema::ColumnSchema;

pub mod italy;
pub mod world;

pub use italy::ItalyLoader;
pub use world::WorldLoader;

/// Uniform contract of the per-source loaders.
pub trait Loader {
    fn source(&self) -> Source;

    /// Resolve `field` for `scope`, one value per mounted day.
    fn load(&mut self, field: &str, scope: &Scope) -> Result<ResolvedSeries, LoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Pull the upstream repository before the first mount.
    pub update_data: bool,
    /// Run the source's patches before the first mount.
    pub apply_patches: bool,
    pub label_format: LabelFormat,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            update_data: true,
            apply_patches: false,
            label_format: LabelFormat::Full,
        }
    }
}

/// Refresh and patch collaborators of a loader, run once before first use.
pub struct Preparation {
    refresher: Box<dyn Refresh>,
    patcher: Box<dyn Patch>,
    options: LoaderOptions,
    refreshed: bool,
    patched: bool,
}

impl Preparation {
    pub fn new(refresher: Box<dyn Refresh>, patcher: Box<dyn Patch>, options: LoaderOptions) -> Self {
        Self {
            refresher,
            patcher,
            options,
            refreshed: false,
            patched: false,
        }
    }

    /// Refresh (best effort) and patch the data of `source`.
    ///
    /// The refresh is attempted once per loader whatever its outcome. A failed
    /// patch is retried on the next call.
    pub fn ensure(&mut self, source: Source) -> Result<(), LoadError> {
        if !self.refreshed {
            self.refreshed = true;
            if self.options.update_data {
                info!("Update {} data ...", source.display_name());
                if let Err(err) = self.refresher.refresh(source) {
                    warn!("Unable to update {} data, using local copy: {err}", source.display_name());
                }
            }
        }

        if !self.patched {
            if self.options.apply_patches {
                info!("Patch {} data ...", source.display_name());
                self.patcher.patch(source)?;
            }
            self.patched = true;
        }
        Ok(())
    }

    pub fn label_format(&self) -> LabelFormat {
        self.options.label_format
    }
}

/// Mount-once slot for one dataset family.
#[derive(Debug, Default)]
pub struct DatasetSlot {
    dataset: Option<Dataset>,
}

impl DatasetSlot {
    pub fn get_or_mount(&mut self, root: &Path, kind: DatasetKind) -> Result<&Dataset, LoadError> {
        let dataset = match self.dataset.take() {
            Some(dataset) => dataset,
            None => {
                info!("Mount data for {} ...", kind.display_name());
                let dataset = mount_dataset(root, kind)?;
                info!("Mounted {} snapshots for {}", dataset.len(), kind.display_name());
                dataset
            }
        };
        Ok(&*self.dataset.insert(dataset))
    }

    pub fn is_mounted(&self) -> bool {
        self.dataset.is_some()
    }
}

/// Shared tail of every loader: parse against the family's schema first (so
/// a bad field name never touches the disk), then mount, filter and resolve.
pub(crate) fn load_from(
    prep: &mut Preparation,
    slot: &mut DatasetSlot,
    root: &Path,
    source: Source,
    kind: DatasetKind,
    field: &str,
    scope: &Scope,
) -> Result<ResolvedSeries, LoadError> {
    let schema = ColumnSchema::for_dataset(kind);
    let expr = parse_field(field, schema, Vocabulary::for_source(source))?;

    prep.ensure(source)?;
    let dataset = slot.get_or_mount(root, kind)?;

    info!("Load '{field}' for {}", scope.label());
    let rows = crate::scope::filter(dataset, scope)?;
    resolve(&expr, schema, &rows, prep.label_format())
}

/// Explicit name -> loader mapping, built on demand and owned by the caller.
pub struct LoaderRegistry {
    config: DataConfig,
    options: LoaderOptions,
    loaders: HashMap<Source, Box<dyn Loader>>,
}

impl LoaderRegistry {
    pub fn new(config: DataConfig, options: LoaderOptions) -> Self {
        Self {
            config,
            options,
            loaders: HashMap::new(),
        }
    }

    /// Register a custom loader for its source (replaces any existing one).
    pub fn insert(&mut self, loader: Box<dyn Loader>) {
        self.loaders.insert(loader.source(), loader);
    }

    /// The loader for `source`, created on first request.
    pub fn get(&mut self, source: Source) -> &mut dyn Loader {
        let config = &self.config;
        let options = self.options;
        let loader = self
            .loaders
            .entry(source)
            .or_insert_with(|| default_loader(source, config, options));
        &mut **loader
    }

    pub fn load(&mut self, source: Source, field: &str, scope: &Scope) -> Result<ResolvedSeries, LoadError> {
        self.get(source).load(field, scope)
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }
}

fn default_loader(source: Source, config: &DataConfig, options: LoaderOptions) -> Box<dyn Loader> {
    let refresher = Box::new(GitRefresher::new(config.repo(source).clone()));
    match source {
        Source::Italy => {
            let prep = Preparation::new(refresher, Box::new(NoPatch), options);
            Box::new(ItalyLoader::new(config.root(), prep))
        }
        Source::World => {
            let prep = Preparation::new(refresher, Box::new(WorldPatcher::new(config.root())), options);
            Box::new(WorldLoader::new(config.root(), prep))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    use crate::domain::{DatasetKind, Source};
    use crate::refresh::{Refresh, RefreshError};

    /// Refresh collaborator counting its calls, optionally failing.
    #[derive(Clone, Default)]
    pub struct CountingRefresh {
        pub calls: Rc<Cell<usize>>,
        pub fail: bool,
    }

    impl Refresh for CountingRefresh {
        fn refresh(&self, _source: Source) -> Result<(), RefreshError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(RefreshError::Git {
                    step: "pull".to_string(),
                    status: "exit status: 1".to_string(),
                    log: "refresh.log".into(),
                });
            }
            Ok(())
        }
    }

    pub fn write_snapshot(root: &Path, kind: DatasetKind, name: &str, content: &str) {
        let dir = root.join(kind.relative_dir());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }
}
