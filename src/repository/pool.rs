// src/repository/pool.rs

//! Pool layout
//!
//! Archives live at `pool/<component>/<prefix>/<name>/<name>_<version>_<arch>.deb`.
//! The prefix is `lib` plus one character for library packages and the first
//! character of the name otherwise, matching the Debian archive.

use crate::error::{Error, Result};
use crate::packages::{PackageRecord, DEB_SUFFIX};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the pool directory under the repository root
pub const POOL_DIR: &str = "pool";

/// Subdirectory under the component that groups `name`
pub fn pool_prefix(name: &str) -> &str {
    let take = if name.starts_with("lib") && name.chars().count() > 3 {
        4
    } else {
        1
    };

    match name.char_indices().nth(take) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

/// Repository-relative path of an archive in the pool
pub fn pool_path(component: &str, name: &str, filename: &str) -> PathBuf {
    [POOL_DIR, component, pool_prefix(name), name, filename]
        .iter()
        .collect()
}

/// Canonical archive file name: `<name>_<version>_<arch>.deb`
pub fn deb_filename(record: &PackageRecord) -> String {
    format!(
        "{}_{}_{}{}",
        record.name, record.version, record.architecture, DEB_SUFFIX
    )
}

/// `path` relative to `root`, joined with `/` as APT expects
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Lazily walk `dir` for package archives, in sorted order
///
/// Symlinks to archives are included; the link itself is reported. A
/// missing directory yields nothing. The walk holds no state beyond the
/// iterator itself, so it can simply be run again.
pub fn archives(dir: &Path) -> impl Iterator<Item = Result<PathBuf>> + '_ {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_archive = !entry.file_type().is_dir()
                    && entry.file_name().to_string_lossy().ends_with(DEB_SUFFIX)
                    && entry.path().is_file();
                is_archive.then(|| Ok(entry.into_path()))
            }
            Err(e) if e.depth() == 0 && is_not_found(&e) => None,
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Some(Err(Error::io(path, io::Error::from(e))))
            }
        })
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound)
}
