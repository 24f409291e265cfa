//! Best-effort refresh of the upstream data repositories.
//!
//! A refresh failure never aborts a load: the loader logs it and carries on
//! with whatever data is already on disk.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::info;

use crate::config::RepoConfig;
use crate::domain::Source;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Could not open log file '{}': {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not run `git {step}`: {source}")]
    Spawn {
        step: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {step}` failed ({status}). Please see {}.", log.display())]
    Git { step: String, status: String, log: PathBuf },
}

/// Collaborator fetching the latest upstream data for a source.
pub trait Refresh {
    fn refresh(&self, source: Source) -> Result<(), RefreshError>;
}

/// Refresh that does nothing (offline runs, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

impl Refresh for NoRefresh {
    fn refresh(&self, _source: Source) -> Result<(), RefreshError> {
        Ok(())
    }
}

/// Clone-or-pull of a git repository, output appended to a log file.
#[derive(Debug, Clone)]
pub struct GitRefresher {
    repo: RepoConfig,
}

impl GitRefresher {
    pub fn new(repo: RepoConfig) -> Self {
        Self { repo }
    }
}

impl Refresh for GitRefresher {
    fn refresh(&self, source: Source) -> Result<(), RefreshError> {
        let repo = &self.repo;

        if !repo.dir.is_dir() {
            info!("Clone the {} repository into {} ...", source.display_name(), repo.dir.display());
            let parent = repo.dir.parent().unwrap_or(Path::new("."));
            std::fs::create_dir_all(parent).map_err(|e| RefreshError::Spawn {
                step: "clone".to_string(),
                source: e,
            })?;
            let target = repo.dir.to_string_lossy();
            run_git(parent, &["clone", repo.remote.as_str(), target.as_ref()], &repo.logfile)?;
        }

        info!("Refresh the {} repository {} ...", source.display_name(), repo.dir.display());
        run_git(&repo.dir, &["checkout", repo.branch.as_str()], &repo.logfile)?;
        run_git(&repo.dir, &["pull"], &repo.logfile)?;
        Ok(())
    }
}

fn open_log(path: &Path) -> Result<File, RefreshError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RefreshError::Log {
            path: path.to_path_buf(),
            source: e,
        })
}

fn run_git(cwd: &Path, args: &[&str], logfile: &Path) -> Result<(), RefreshError> {
    let step = args.first().copied().unwrap_or_default().to_string();

    let stdout = open_log(logfile)?;
    let stderr = stdout.try_clone().map_err(|e| RefreshError::Log {
        path: logfile.to_path_buf(),
        source: e,
    })?;

    let status = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .status()
        .map_err(|e| RefreshError::Spawn {
            step: step.clone(),
            source: e,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(RefreshError::Git {
            step,
            status: status.to_string(),
            log: logfile.to_path_buf(),
        })
    }
}
