// src/packages/record.rs

//! Binary package metadata as carried in `Packages` indices

use crate::hash::FileDigests;
use crate::packages::control::{parse_paragraphs, ControlParagraph};

/// Metadata of one binary package archive
///
/// Produced by the extractor from a `.deb`, or read back from a `Packages`
/// index. `name`, `version` and `architecture` are never empty for records
/// produced by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub architecture: String,
    pub maintainer: Option<String>,
    pub description: Option<String>,
    pub depends: Option<String>,
    pub pre_depends: Option<String>,
    pub recommends: Option<String>,
    pub suggests: Option<String>,
    pub conflicts: Option<String>,
    pub provides: Option<String>,
    pub replaces: Option<String>,
    pub section: Option<String>,
    pub priority: Option<String>,
    pub homepage: Option<String>,
    /// Installed size in KB
    pub installed_size: Option<u64>,
    /// Archive size in bytes
    pub size: u64,
    pub md5sum: String,
    pub sha1: String,
    pub sha256: String,
    /// Path relative to the repository root, once placed in the pool
    pub filename: Option<String>,
}

impl PackageRecord {
    /// Build a record from a parsed stanza
    ///
    /// Unknown fields are ignored. Unparseable `Installed-Size` or `Size`
    /// values are dropped rather than treated as errors.
    pub fn from_paragraph(paragraph: &ControlParagraph) -> Self {
        let mut record = Self::default();

        for (field, value) in paragraph.fields() {
            let text = Some(value.to_string());
            match field {
                "Package" => record.name = value.to_string(),
                "Version" => record.version = value.to_string(),
                "Architecture" => record.architecture = value.to_string(),
                "Maintainer" => record.maintainer = text,
                "Description" => record.description = text,
                "Depends" => record.depends = text,
                "Pre-Depends" => record.pre_depends = text,
                "Recommends" => record.recommends = text,
                "Suggests" => record.suggests = text,
                "Conflicts" => record.conflicts = text,
                "Provides" => record.provides = text,
                "Replaces" => record.replaces = text,
                "Section" => record.section = text,
                "Priority" => record.priority = text,
                "Homepage" => record.homepage = text,
                "Installed-Size" => record.installed_size = value.parse().ok(),
                "Size" => record.size = value.parse().unwrap_or_default(),
                "MD5sum" => record.md5sum = value.to_string(),
                "SHA1" => record.sha1 = value.to_string(),
                "SHA256" => record.sha256 = value.to_string(),
                "Filename" => record.filename = text,
                _ => {}
            }
        }

        record
    }

    /// Stanza in `Packages` field order
    pub fn to_paragraph(&self) -> ControlParagraph {
        let mut p = ControlParagraph::new();
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();

        p.add_field("Package", self.name.as_str());
        p.add_field("Version", self.version.as_str());
        p.add_field("Architecture", self.architecture.as_str());
        p.add_field("Maintainer", opt(&self.maintainer));
        if let Some(installed_size) = self.installed_size.filter(|size| *size > 0) {
            p.add_field("Installed-Size", installed_size.to_string());
        }
        p.add_field("Pre-Depends", opt(&self.pre_depends));
        p.add_field("Depends", opt(&self.depends));
        p.add_field("Recommends", opt(&self.recommends));
        p.add_field("Suggests", opt(&self.suggests));
        p.add_field("Conflicts", opt(&self.conflicts));
        p.add_field("Provides", opt(&self.provides));
        p.add_field("Replaces", opt(&self.replaces));
        p.add_field("Section", opt(&self.section));
        p.add_field("Priority", opt(&self.priority));
        p.add_field("Homepage", opt(&self.homepage));
        p.add_field("Filename", opt(&self.filename));
        p.add_field("Size", self.size.to_string());
        p.add_field("MD5sum", self.md5sum.as_str());
        p.add_field("SHA1", self.sha1.as_str());
        p.add_field("SHA256", self.sha256.as_str());
        p.add_field("Description", opt(&self.description));

        p
    }

    /// The record as a `Packages` stanza, without the separating blank line
    pub fn to_control_string(&self) -> String {
        self.to_paragraph().to_control_string()
    }

    /// Copy archive size and digests into the record
    pub fn set_digests(&mut self, digests: FileDigests) {
        self.size = digests.size;
        self.md5sum = digests.md5;
        self.sha1 = digests.sha1;
        self.sha256 = digests.sha256;
    }
}

/// Read every record of a rendered `Packages` file
pub fn parse_packages_index(content: &str) -> Vec<PackageRecord> {
    parse_paragraphs(content)
        .iter()
        .map(PackageRecord::from_paragraph)
        .collect()
}
