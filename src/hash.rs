// src/hash.rs

//! Streaming content digests
//!
//! APT indices carry MD5, SHA-1 and SHA-256 for every file. All three are
//! computed in a single pass over the data.

use crate::error::{Error, Result};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Size and digests of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDigests {
    pub size: u64,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

/// Computes MD5, SHA-1 and SHA-256 simultaneously
///
/// Implements [`Write`] so it can be the sink of [`io::copy`].
#[derive(Default)]
pub struct MultiDigester {
    size: u64,
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
}

impl MultiDigester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed data into all digesters
    pub fn update(&mut self, data: &[u8]) {
        self.size += data.len() as u64;
        self.md5.update(data);
        self.sha1.update(data);
        self.sha256.update(data);
    }

    /// Consume the digester and return hex digests
    pub fn finish(self) -> FileDigests {
        FileDigests {
            size: self.size,
            md5: format!("{:x}", self.md5.finalize()),
            sha1: format!("{:x}", self.sha1.finalize()),
            sha256: format!("{:x}", self.sha256.finalize()),
        }
    }
}

impl Write for MultiDigester {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Digest everything readable from `reader`
pub fn digest_reader<R: Read>(reader: &mut R) -> io::Result<FileDigests> {
    let mut digester = MultiDigester::new();
    io::copy(reader, &mut digester)?;
    Ok(digester.finish())
}

/// Digest a file on disk
pub fn digest_file(path: &Path) -> Result<FileDigests> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    digest_reader(&mut file).map_err(|e| Error::io(path, e))
}
