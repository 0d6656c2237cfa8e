// src/repository/prune.rs

//! Version retention
//!
//! Archives are grouped by (name, architecture) across the whole pool and
//! only the newest `keep_versions` of each group survive.

use super::{archives, Repository};
use crate::error::{Error, Result};
use crate::packages;
use crate::version;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Versions kept per (name, architecture) when no positive count is given
pub const DEFAULT_KEEP_VERSIONS: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    /// Versions to keep per group; zero means [`DEFAULT_KEEP_VERSIONS`]
    pub keep_versions: usize,
    /// Report what would be deleted without touching the pool
    pub dry_run: bool,
}

impl PruneOptions {
    pub fn effective_keep(&self) -> usize {
        if self.keep_versions == 0 {
            DEFAULT_KEEP_VERSIONS
        } else {
            self.keep_versions
        }
    }
}

/// Outcome of a prune run
///
/// In a dry run `deleted` lists the archives that would have been removed.
#[derive(Debug, Default)]
pub struct PruneResult {
    pub kept: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

impl Repository {
    /// Delete all but the newest versions of every package in the pool
    ///
    /// Every archive is read before anything is removed, so a single
    /// unreadable archive leaves the pool untouched.
    pub fn prune(&self, options: PruneOptions) -> Result<PruneResult> {
        let keep = options.effective_keep();
        let pool = self.pool_dir();
        info!("Pruning {} (keeping {} versions)", pool.display(), keep);

        let mut groups: BTreeMap<(String, String), Vec<(String, PathBuf)>> = BTreeMap::new();
        for path in archives(&pool) {
            let path = path?;
            let record = packages::extract(&path).map_err(|e| Error::package(&path, e))?;
            groups
                .entry((record.name, record.architecture))
                .or_default()
                .push((record.version, path));
        }

        let mut result = PruneResult::default();
        for ((name, arch), mut builds) in groups {
            builds.sort_by(|a, b| version::compare(&b.0, &a.0));

            for (index, (ver, path)) in builds.into_iter().enumerate() {
                if index < keep {
                    result.kept.push(path);
                } else {
                    debug!("Pruning {} {} ({})", name, ver, arch);
                    result.deleted.push(path);
                }
            }
        }

        if options.dry_run {
            for path in &result.deleted {
                info!("Would delete {}", path.display());
            }
            return Ok(result);
        }

        for path in &result.deleted {
            info!("Deleting {}", path.display());
            fs::remove_file(path).map_err(|e| Error::io(path, e))?;
            remove_empty_parents(path, &pool)?;
        }

        info!(
            "Pruned {} archives, kept {}",
            result.deleted.len(),
            result.kept.len()
        );
        Ok(result)
    }
}

/// Remove directories left empty by a deletion
///
/// `pool` and the `pool/<component>` directories are never removed.
fn remove_empty_parents(path: &Path, pool: &Path) -> Result<()> {
    let mut dir = path.parent();
    while let Some(current) = dir {
        let inside_component = current.starts_with(pool)
            && current != pool
            && current.parent() != Some(pool);
        if !inside_component {
            break;
        }
        let mut entries = fs::read_dir(current).map_err(|e| Error::io(current, e))?;
        if entries.next().is_some() {
            break;
        }
        debug!("Removing empty directory {}", current.display());
        fs::remove_dir(current).map_err(|e| Error::io(current, e))?;
        dir = current.parent();
    }
    Ok(())
}
