//! Data locations and upstream repositories.
//!
//! Resolved from the environment (optionally a `.env` file):
//!
//! - `COVID_DATA_DIR`: data root (default `data`)
//! - `COVID_ITALY_BRANCH` / `COVID_WORLD_BRANCH`: branches to pull (default `master`)

use std::path::{Path, PathBuf};

use crate::domain::Source;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BRANCH: &str = "master";

const ITALY_REMOTE: &str = "https://github.com/pcm-dpc/COVID-19.git";
const WORLD_REMOTE: &str = "https://github.com/CSSEGISandData/COVID-19.git";

/// One upstream git repository mirrored below the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    pub dir: PathBuf,
    pub remote: String,
    pub branch: String,
    pub logfile: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub root: PathBuf,
    pub italy: RepoConfig,
    pub world: RepoConfig,
}

impl DataConfig {
    /// Build the configuration from the environment.
    ///
    /// `data_dir` (e.g. from the CLI) takes precedence over `COVID_DATA_DIR`.
    pub fn from_env(data_dir: Option<PathBuf>) -> Self {
        dotenvy::dotenv().ok();

        let root = data_dir
            .or_else(|| std::env::var_os("COVID_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let italy_branch = std::env::var("COVID_ITALY_BRANCH").unwrap_or_else(|_| DEFAULT_BRANCH.to_string());
        let world_branch = std::env::var("COVID_WORLD_BRANCH").unwrap_or_else(|_| DEFAULT_BRANCH.to_string());

        Self::with_branches(root, italy_branch, world_branch)
    }

    /// Configuration rooted at `root` with default branches.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self::with_branches(root.into(), DEFAULT_BRANCH.to_string(), DEFAULT_BRANCH.to_string())
    }

    fn with_branches(root: PathBuf, italy_branch: String, world_branch: String) -> Self {
        let italy = RepoConfig {
            dir: root.join("italy"),
            remote: ITALY_REMOTE.to_string(),
            branch: italy_branch,
            logfile: root.join("italy.log"),
        };
        let world = RepoConfig {
            dir: root.join("world"),
            remote: WORLD_REMOTE.to_string(),
            branch: world_branch,
            logfile: root.join("world.log"),
        };
        Self { root, italy, world }
    }

    pub fn repo(&self, source: Source) -> &RepoConfig {
        match source {
            Source::Italy => &self.italy,
            Source::World => &self.world,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Short legend label for Italy and its regions (`Lombardia` -> `LOM`).
///
/// Provinces carry their own abbreviation in the `sigla_provincia` column.
pub fn shorthand(name: &str) -> Option<&'static str> {
    const TABLE: [(&str, &str); 22] = [
        ("Italy", "ITA"),
        ("Abruzzo", "ABR"),
        ("Basilicata", "BAS"),
        ("P.A. Bolzano", "BZ"),
        ("Calabria", "CAL"),
        ("Campania", "CAM"),
        ("Emilia Romagna", "ER"),
        ("Friuli Venezia Giulia", "FVG"),
        ("Lazio", "LAZ"),
        ("Liguria", "LIG"),
        ("Lombardia", "LOM"),
        ("Marche", "MAR"),
        ("Molise", "MOL"),
        ("Piemonte", "PIE"),
        ("Puglia", "PUG"),
        ("Sardegna", "SAR"),
        ("Sicilia", "SIC"),
        ("Toscana", "TOS"),
        ("P.A. Trento", "TN"),
        ("Umbria", "UM"),
        ("Valle d'Aosta", "VDA"),
        ("Veneto", "VEN"),
    ];
    TABLE.iter().find(|(n, _)| *n == name).map(|(_, s)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_below_root() {
        let cfg = DataConfig::at("/tmp/covid");
        assert_eq!(cfg.italy.dir, PathBuf::from("/tmp/covid/italy"));
        assert_eq!(cfg.world.logfile, PathBuf::from("/tmp/covid/world.log"));
        assert_eq!(cfg.repo(Source::World).branch, "master");
    }

    #[test]
    fn region_shorthands() {
        assert_eq!(shorthand("Lombardia"), Some("LOM"));
        assert_eq!(shorthand("Italy"), Some("ITA"));
        assert_eq!(shorthand("Bergamo"), None);
    }
}
