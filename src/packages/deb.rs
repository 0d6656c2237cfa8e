// src/packages/deb.rs

//! Debian package metadata extraction
//!
//! A `.deb` is an ar archive holding `debian-binary`, `control.tar*` and
//! `data.tar*`. Only the control archive is read. The whole file is digested
//! in one streaming pass before it is parsed.

use crate::error::{Error, Result};
use crate::hash::digest_reader;
use crate::packages::control::ControlParagraph;
use crate::packages::record::PackageRecord;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// File suffix of binary package archives
pub const DEB_SUFFIX: &str = ".deb";

/// Compression of the `control.tar` member, derived from its suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Zstd,
    Bzip2,
    Lzma,
}

impl Compression {
    /// Classify a member name such as `control.tar.gz`
    ///
    /// Returns `None` for suffixes that are not a known compression.
    pub fn from_member_name(member: &str) -> Option<Self> {
        let suffix = member.strip_prefix("control.tar")?;
        match suffix {
            "" => Some(Self::None),
            ".gz" => Some(Self::Gzip),
            ".xz" => Some(Self::Xz),
            ".zst" => Some(Self::Zstd),
            ".bz2" => Some(Self::Bzip2),
            ".lzma" => Some(Self::Lzma),
            _ => None,
        }
    }

    /// Whether members with this compression can be decoded
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::None | Self::Gzip)
    }
}

/// Extract the package record from a `.deb` file
///
/// The returned record carries the archive size and digests but no pool
/// filename.
pub fn extract(path: &Path) -> Result<PackageRecord> {
    debug!("Parsing Debian package: {}", path.display());

    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let digests = digest_reader(&mut file).map_err(|e| Error::io(path, e))?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| Error::io(path, e))?;

    let content = extract_control_file(path, file)?;
    let mut record = PackageRecord::from_paragraph(&ControlParagraph::parse(&content));

    for (field, value) in [
        ("Package", &record.name),
        ("Version", &record.version),
        ("Architecture", &record.architecture),
    ] {
        if value.is_empty() {
            return Err(Error::MissingField {
                path: path.to_path_buf(),
                field,
            });
        }
    }

    record.set_digests(digests);

    debug!(
        "Parsed DEB package: {} version {} ({}, {} bytes)",
        record.name, record.version, record.architecture, record.size
    );

    Ok(record)
}

/// Locate the first `control.tar*` member and return its `control` file
fn extract_control_file(path: &Path, file: File) -> Result<String> {
    let mut archive = ar::Archive::new(file);

    while let Some(entry) = archive.next_entry() {
        let entry = entry.map_err(|e| Error::MalformedArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let identifier = String::from_utf8_lossy(entry.header().identifier()).to_string();
        let member = identifier.trim_end_matches('/');

        if member.starts_with("control.tar") {
            debug!("Found control member {} in {}", member, path.display());
            return read_control_member(path, member, entry);
        }
    }

    Err(Error::ControlArchiveNotFound {
        path: path.to_path_buf(),
    })
}

/// Decompress the control member and find `control` in the tar stream
fn read_control_member<R: Read>(path: &Path, member: &str, data: R) -> Result<String> {
    let compression = Compression::from_member_name(member)
        .filter(Compression::is_supported)
        .ok_or_else(|| Error::UnsupportedCompression {
            path: path.to_path_buf(),
            member: member.to_string(),
        })?;

    match compression {
        Compression::Gzip => find_control_in_tar(path, member, GzDecoder::new(data)),
        _ => find_control_in_tar(path, member, data),
    }
}

fn find_control_in_tar<R: Read>(path: &Path, member: &str, reader: R) -> Result<String> {
    let archive_err = |e: std::io::Error| Error::ControlArchive {
        path: path.to_path_buf(),
        member: member.to_string(),
        source: e,
    };

    let mut archive = Archive::new(reader);
    for entry in archive.entries().map_err(archive_err)? {
        let mut entry = entry.map_err(archive_err)?;

        let entry_path = entry.path().map_err(archive_err)?.to_string_lossy().to_string();
        let name = entry_path.strip_prefix("./").unwrap_or(&entry_path);

        if name == "control" {
            let mut content = Vec::new();
            entry.read_to_end(&mut content).map_err(archive_err)?;
            return Ok(String::from_utf8_lossy(&content).into_owned());
        }
    }

    Err(Error::ControlFileNotFound {
        path: path.to_path_buf(),
    })
}
