// src/test_utils.rs

//! Helpers for building `.deb` fixtures in unit tests

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::Path;

/// Minimal control stanza for a package
pub fn control(name: &str, version: &str, architecture: &str) -> String {
    format!(
        "Package: {name}\nVersion: {version}\nArchitecture: {architecture}\n\
         Maintainer: Test User <test@example.com>\nInstalled-Size: 12\n\
         Description: test package {name}\n Longer description.\n"
    )
}

/// Write a `.deb` whose control archive is stored as `member`
///
/// A `.gz` member is gzip-compressed; anything else is stored as plain tar bytes.
pub fn write_deb_with_member(path: &Path, control: &str, member: &str) {
    let mut tar_builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(control.len() as u64);
    header.set_mode(0o644);
    tar_builder
        .append_data(&mut header, "./control", control.as_bytes())
        .unwrap();
    let control_tar = tar_builder.into_inner().unwrap();

    let control_member = if member.ends_with(".gz") {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&control_tar).unwrap();
        encoder.finish().unwrap()
    } else {
        control_tar
    };

    write_ar(
        path,
        &[("debian-binary", &b"2.0\n"[..]), (member, control_member.as_slice())],
    );
}

/// Write an ar archive with the given members, in order
pub fn write_ar(path: &Path, members: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut builder = ar::Builder::new(file);

    for (name, data) in members {
        builder
            .append(&ar::Header::new(name.as_bytes().to_vec(), data.len() as u64), *data)
            .unwrap();
    }
}

/// Write a gzip-compressed `.deb` for the given package
pub fn write_deb(path: &Path, name: &str, version: &str, architecture: &str) {
    write_deb_with_member(path, &control(name, version, architecture), "control.tar.gz");
}
