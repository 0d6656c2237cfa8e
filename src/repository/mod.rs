// src/repository/mod.rs

//! Local repository management
//!
//! This module provides functionality for:
//! - Creating the `dists/` and `pool/` skeleton
//! - Placing archives into the pool
//! - Regenerating `Packages` and `Release` indices from the pool
//! - Pruning old versions

pub mod config;
pub mod index;
pub mod pool;
pub mod prune;
pub mod release;

pub use config::RepositoryConfig;
pub use pool::{archives, deb_filename, pool_path, pool_prefix, relative_path, POOL_DIR};
pub use prune::{PruneOptions, PruneResult, DEFAULT_KEEP_VERSIONS};
pub use release::{render_release, ReleaseEntry, RELEASE_DATE_FORMAT};

use crate::error::{Error, Result};
use crate::packages::{self, PackageRecord};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Name of the index tree under the repository root
pub const DISTS_DIR: &str = "dists";

/// An archive that has been placed in the pool
#[derive(Debug, Clone)]
pub struct PoolEntry {
    /// Absolute location of the archive
    pub path: PathBuf,
    /// Metadata with `filename` set to the repository-relative pool path
    pub record: PackageRecord,
}

/// Handle on a repository root directory
///
/// The handle only carries the root and configuration. All package state is
/// read from the filesystem by each operation.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    config: RepositoryConfig,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>, config: RepositoryConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// `<root>/pool`
    pub fn pool_dir(&self) -> PathBuf {
        self.root.join(POOL_DIR)
    }

    /// `<root>/dists/<dist>`
    pub fn dist_dir(&self, dist: &str) -> PathBuf {
        self.root.join(DISTS_DIR).join(dist)
    }

    /// `<root>/dists/<dist>/<component>/binary-<arch>`
    pub fn binary_dir(&self, dist: &str, component: &str, arch: &str) -> PathBuf {
        self.dist_dir(dist)
            .join(component)
            .join(format!("binary-{arch}"))
    }

    /// Create the directory skeleton
    ///
    /// Every configured (distribution, component, architecture) gets an index
    /// directory holding an empty `Packages` file if none exists yet. Running
    /// this again changes nothing.
    pub fn init(&self) -> Result<()> {
        info!("Initializing repository at {}", self.root.display());

        for dist in &self.config.distributions {
            for component in &self.config.components {
                for arch in &self.config.architectures {
                    let dir = self.binary_dir(dist, component, arch);
                    create_dir_all(&dir)?;

                    let packages = dir.join(index::PACKAGES_FILE);
                    if !packages.exists() {
                        debug!("Creating empty {}", packages.display());
                        File::create(&packages).map_err(|e| Error::io(&packages, e))?;
                    }
                }
            }
        }

        for component in &self.config.components {
            create_dir_all(&self.pool_dir().join(component))?;
        }

        Ok(())
    }

    /// Copy an archive into the pool
    ///
    /// The archive is extracted first, so a malformed file never reaches the
    /// pool. An archive with the same name, version and architecture is
    /// replaced.
    pub fn add_package(&self, archive: &Path, component: &str) -> Result<PoolEntry> {
        if !self.config.components.iter().any(|c| c == component) {
            return Err(Error::UnknownComponent(component.to_string()));
        }

        let mut record = packages::extract(archive)?;
        let dest = self
            .root
            .join(pool_path(component, &record.name, &deb_filename(&record)));

        if dest.exists() {
            if same_file(archive, &dest) {
                debug!("{} is already in the pool", archive.display());
            } else {
                info!("Updating existing pool file {}", dest.display());
                copy_atomic(archive, &dest)?;
            }
        } else {
            info!("Adding {} to pool as {}", archive.display(), dest.display());
            copy_atomic(archive, &dest)?;
        }

        record.filename = relative_path(&self.root, &dest);
        Ok(PoolEntry { path: dest, record })
    }
}

fn create_dir_all(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write `data` to `dest` through a temporary file in the same directory
pub(crate) fn write_atomic(dest: &Path, data: &[u8]) -> Result<()> {
    let mut temp = temp_beside(dest)?;
    temp.write_all(data).map_err(|e| Error::io(temp.path(), e))?;
    persist(temp, dest)
}

fn copy_atomic(src: &Path, dest: &Path) -> Result<()> {
    let mut input = File::open(src).map_err(|e| Error::io(src, e))?;
    let mut temp = temp_beside(dest)?;
    io::copy(&mut input, &mut temp).map_err(|e| Error::io(src, e))?;
    persist(temp, dest)
}

pub(crate) fn temp_beside(dest: &Path) -> Result<NamedTempFile> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    create_dir_all(dir)?;
    NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))
}

pub(crate) fn persist(temp: NamedTempFile, dest: &Path) -> Result<()> {
    temp.persist(dest)
        .map(|_| ())
        .map_err(|e| Error::io(dest, e.error))
}
