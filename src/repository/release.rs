// src/repository/release.rs

//! `Release` manifest generation

use super::{relative_path, write_atomic, Repository, RepositoryConfig};
use crate::error::{Error, Result};
use crate::hash::{digest_file, FileDigests};
use chrono::{DateTime, Utc};
use std::io;
use std::path::PathBuf;
use tracing::info;
use walkdir::WalkDir;

pub const RELEASE_FILE: &str = "Release";

/// Date format of the `Date:` field, always in UTC
pub const RELEASE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// A file listed in the checksum blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Path relative to `dists/<dist>/`, `/`-separated
    pub path: String,
    pub digests: FileDigests,
}

impl Repository {
    /// Digest every `Packages*` file under `dists/<dist>/`, in path order
    pub fn release_entries(&self, dist: &str) -> Result<Vec<ReleaseEntry>> {
        let dist_dir = self.dist_dir(dist);
        let mut entries = Vec::new();

        for entry in WalkDir::new(&dist_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dist_dir.as_path()).to_path_buf();
                Error::io(path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file()
                || !entry.file_name().to_string_lossy().starts_with("Packages")
            {
                continue;
            }

            let Some(path) = relative_path(&dist_dir, entry.path()) else {
                continue;
            };
            entries.push(ReleaseEntry {
                path,
                digests: digest_file(entry.path())?,
            });
        }

        Ok(entries)
    }

    /// Write `dists/<dist>/Release` stamped with the current time
    pub fn build_release(&self, dist: &str) -> Result<PathBuf> {
        self.build_release_at(dist, Utc::now())
    }

    /// Write `dists/<dist>/Release` with an explicit date
    pub fn build_release_at(&self, dist: &str, date: DateTime<Utc>) -> Result<PathBuf> {
        let entries = self.release_entries(dist)?;
        let content = render_release(self.config(), dist, &entries, date);

        let path = self.dist_dir(dist).join(RELEASE_FILE);
        write_atomic(&path, content.as_bytes())?;
        info!("Wrote {} ({} files)", path.display(), entries.len());
        Ok(path)
    }
}

/// Render a Release manifest
///
/// `Suite` and `Codename` are both the distribution name. The checksum
/// blocks list every entry with its size right-aligned to 16 columns.
pub fn render_release(
    config: &RepositoryConfig,
    dist: &str,
    entries: &[ReleaseEntry],
    date: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("Origin: {}", config.origin),
        format!("Label: {}", config.label),
        format!("Suite: {dist}"),
        format!("Codename: {dist}"),
        format!("Architectures: {}", config.architectures.join(" ")),
        format!("Components: {}", config.components.join(" ")),
        format!("Description: {}", config.description),
        format!("Date: {}", date.format(RELEASE_DATE_FORMAT)),
    ];

    let blocks: [(&str, fn(&FileDigests) -> &str); 3] = [
        ("MD5Sum", |d| d.md5.as_str()),
        ("SHA1", |d| d.sha1.as_str()),
        ("SHA256", |d| d.sha256.as_str()),
    ];
    for (title, digest) in blocks {
        lines.push(format!("{title}:"));
        lines.extend(entries.iter().map(|entry| {
            format!(
                " {} {:>16} {}",
                digest(&entry.digests),
                entry.digests.size,
                entry.path
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
