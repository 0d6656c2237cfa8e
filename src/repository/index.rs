// src/repository/index.rs

//! `Packages` index generation
//!
//! Each `dists/<dist>/<comp>/binary-<arch>/` directory gets a `Packages`
//! file listing every pool archive of that architecture or of `all`, plus a
//! gzip copy. An xz copy is attempted as well; failing to produce it only
//! logs a warning.

use super::{relative_path, write_atomic, Repository};
use crate::error::{Error, Result};
use crate::packages::{self, PackageRecord};
use crate::version;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use xz2::write::XzEncoder;

pub const PACKAGES_FILE: &str = "Packages";

/// Architecture value that matches every architecture index
pub const ARCH_ALL: &str = "all";

const XZ_PRESET: u32 = 6;

impl Repository {
    /// Extract metadata for every archive under `pool/<component>`
    ///
    /// Any unreadable archive aborts the scan with [`Error::Package`] naming
    /// the offending file.
    pub fn scan_component(&self, component: &str) -> Result<Vec<PackageRecord>> {
        let dir = self.pool_dir().join(component);
        debug!("Scanning {}", dir.display());

        let mut records = Vec::new();
        for path in super::archives(&dir) {
            let path = path?;
            let mut record = packages::extract(&path).map_err(|e| Error::package(&path, e))?;
            record.filename = relative_path(self.root(), &path);
            records.push(record);
        }
        Ok(records)
    }

    /// Regenerate all `Packages` indices of `dist`
    ///
    /// Returns the index files written, in the order they were written.
    pub fn build_index(&self, dist: &str) -> Result<Vec<PathBuf>> {
        info!("Building package indices for {}", dist);

        let mut written = Vec::new();
        for component in &self.config().components {
            let records = self.scan_component(component)?;

            for arch in &self.config().architectures {
                let mut selected: Vec<&PackageRecord> = records
                    .iter()
                    .filter(|r| r.architecture == *arch || r.architecture == ARCH_ALL)
                    .collect();
                sort_records(&mut selected);

                let dir = self.binary_dir(dist, component, arch);
                written.extend(write_indices(&dir, &render_packages(&selected))?);
                info!(
                    "Wrote {} entries to {}",
                    selected.len(),
                    dir.join(PACKAGES_FILE).display()
                );
            }
        }

        Ok(written)
    }
}

/// Order by name, then newest version first
pub fn sort_records(records: &mut [&PackageRecord]) {
    records.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| version::compare(&b.version, &a.version))
    });
}

/// Render stanzas, each followed by a blank line
pub fn render_packages(records: &[&PackageRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_control_string());
        out.push('\n');
    }
    out
}

fn write_indices(dir: &Path, content: &str) -> Result<Vec<PathBuf>> {
    let plain = dir.join(PACKAGES_FILE);
    write_atomic(&plain, content.as_bytes())?;

    let gz = dir.join(format!("{PACKAGES_FILE}.gz"));
    let compressed = gzip(content.as_bytes()).map_err(|e| Error::io(&gz, e))?;
    write_atomic(&gz, &compressed)?;

    let mut written = vec![plain, gz];

    let xz = dir.join(format!("{PACKAGES_FILE}.xz"));
    match xz_compress(content.as_bytes())
        .map_err(|e| Error::io(&xz, e))
        .and_then(|data| write_atomic(&xz, &data))
    {
        Ok(()) => written.push(xz),
        Err(e) => {
            warn!("Skipping {}: {}", xz.display(), e);
            // A stale copy would disagree with Packages
            if let Err(e) = fs::remove_file(&xz)
                && e.kind() != io::ErrorKind::NotFound
            {
                warn!("Failed to remove stale {}: {}", xz.display(), e);
            }
        }
    }

    Ok(written)
}

/// Gzip with a zeroed header timestamp, so equal input gives equal output
fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

fn xz_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = XzEncoder::new(Vec::new(), XZ_PRESET);
    encoder.write_all(data)?;
    encoder.finish()
}
