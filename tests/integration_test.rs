// tests/integration_test.rs

//! Integration tests for aptpool
//!
//! These tests drive a repository on disk end to end: add, index, release,
//! prune and sign.

use aptpool::packages::parse_packages_index;
use aptpool::repository::{PruneOptions, Repository, RepositoryConfig};
use aptpool::signing::{sign_release, ReleaseSigner};
use aptpool::Error;
use chrono::{TimeZone, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn build_deb(path: &Path, control: &str, member: &str) {
    let mut tar_builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(control.len() as u64);
    header.set_mode(0o644);
    tar_builder
        .append_data(&mut header, "./control", control.as_bytes())
        .unwrap();
    let mut data = tar_builder.into_inner().unwrap();

    if member.ends_with(".gz") {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data).unwrap();
        data = encoder.finish().unwrap();
    }

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut builder = ar::Builder::new(fs::File::create(path).unwrap());
    builder
        .append(&ar::Header::new(b"debian-binary".to_vec(), 4), &b"2.0\n"[..])
        .unwrap();
    builder
        .append(
            &ar::Header::new(member.as_bytes().to_vec(), data.len() as u64),
            data.as_slice(),
        )
        .unwrap();
}

fn incoming_deb(dir: &Path, name: &str, version: &str, arch: &str) -> PathBuf {
    let path = dir.join("incoming").join(format!("{name}-{version}-{arch}.deb"));
    let control = format!(
        "Package: {name}\nVersion: {version}\nArchitecture: {arch}\n\
         Maintainer: Jane Doe <jane@example.org>\nDepends: libc6 (>= 2.31)\n\
         Section: utils\nPriority: optional\n\
         Description: {name} tool\n Does things.\n .\n More things.\n"
    );
    build_deb(&path, &control, "control.tar.gz");
    path
}

fn setup() -> (TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let config = RepositoryConfig {
        origin: "Example".to_string(),
        label: "Example Repo".to_string(),
        architectures: vec!["amd64".to_string(), "arm64".to_string()],
        distributions: vec!["stable".to_string()],
        ..Default::default()
    };
    let repo = Repository::new(dir.path().join("repo"), config);
    repo.init().unwrap();
    (dir, repo)
}

fn packages_path(repo: &Repository, arch: &str) -> PathBuf {
    repo.binary_dir("stable", "main", arch).join("Packages")
}

#[test]
fn test_add_index_release_flow() {
    let (dir, repo) = setup();

    for (name, version, arch) in [
        ("hello", "1.0-1", "amd64"),
        ("hello", "1.0-1", "arm64"),
        ("libfoo", "2:0.9", "amd64"),
        ("docs", "3.1", "all"),
    ] {
        let deb = incoming_deb(dir.path(), name, version, arch);
        repo.add_package(&deb, "main").unwrap();
    }

    assert!(repo
        .root()
        .join("pool/main/libf/libfoo/libfoo_2:0.9_amd64.deb")
        .is_file());
    assert!(repo.root().join("pool/main/h/hello/hello_1.0-1_arm64.deb").is_file());

    let written = repo.build_index("stable").unwrap();
    assert!(written.contains(&packages_path(&repo, "amd64")));

    let content = fs::read_to_string(packages_path(&repo, "amd64")).unwrap();
    let records = parse_packages_index(&content);
    let names: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.name.as_str(), r.architecture.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("docs", "all"), ("hello", "amd64"), ("libfoo", "amd64")]
    );

    let hello = &records[1];
    assert_eq!(
        hello.filename.as_deref(),
        Some("pool/main/h/hello/hello_1.0-1_amd64.deb")
    );
    assert_eq!(hello.depends.as_deref(), Some("libc6 (>= 2.31)"));
    assert_eq!(
        hello.description.as_deref(),
        Some("hello tool\n Does things.\n .\n More things.")
    );
    let pool_file = repo.root().join(hello.filename.as_deref().unwrap());
    assert_eq!(hello.size, fs::metadata(&pool_file).unwrap().len());
    assert_eq!(hello.sha256.len(), 64);

    // Gzip copy matches the plain index
    let gz = fs::read(repo.binary_dir("stable", "main", "amd64").join("Packages.gz")).unwrap();
    let mut decoded = String::new();
    GzDecoder::new(&gz[..]).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, content);

    let release_path = repo.build_release("stable").unwrap();
    let release = fs::read_to_string(release_path).unwrap();
    assert!(release.starts_with("Origin: Example\nLabel: Example Repo\nSuite: stable\nCodename: stable\n"));
    assert!(release.contains("Architectures: amd64 arm64\n"));
    assert!(release.contains("Components: main\n"));
    for block in ["MD5Sum:\n", "SHA1:\n", "SHA256:\n"] {
        assert!(release.contains(block));
    }
    assert!(release.contains(" main/binary-amd64/Packages\n"));
    assert!(release.contains(" main/binary-amd64/Packages.gz\n"));
    assert!(release.contains(" main/binary-arm64/Packages\n"));
    assert!(!release.contains("Release\n"));
}

#[test]
fn test_regeneration_is_stable() {
    let (dir, repo) = setup();
    let deb = incoming_deb(dir.path(), "hello", "1.0", "amd64");
    repo.add_package(&deb, "main").unwrap();

    let date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    repo.build_index("stable").unwrap();
    let release_one = fs::read(repo.build_release_at("stable", date).unwrap()).unwrap();
    let packages_one = fs::read(packages_path(&repo, "amd64")).unwrap();
    let gz_one = fs::read(packages_path(&repo, "amd64").with_extension("gz")).unwrap();

    repo.build_index("stable").unwrap();
    let release_two = fs::read(repo.build_release_at("stable", date).unwrap()).unwrap();

    assert_eq!(packages_one, fs::read(packages_path(&repo, "amd64")).unwrap());
    assert_eq!(
        gz_one,
        fs::read(packages_path(&repo, "amd64").with_extension("gz")).unwrap()
    );
    assert_eq!(release_one, release_two);
}

#[test]
fn test_prune_then_reindex() {
    let (dir, repo) = setup();
    for version in ["1.0", "2.0", "1.5"] {
        let deb = incoming_deb(dir.path(), "hello", version, "amd64");
        repo.add_package(&deb, "main").unwrap();
    }

    let pool = repo.root().join("pool/main/h/hello");
    let dry = repo
        .prune(PruneOptions {
            keep_versions: 2,
            dry_run: true,
        })
        .unwrap();
    assert_eq!(dry.deleted, vec![pool.join("hello_1.0_amd64.deb")]);
    assert!(pool.join("hello_1.0_amd64.deb").exists());

    let result = repo
        .prune(PruneOptions {
            keep_versions: 2,
            dry_run: false,
        })
        .unwrap();
    assert_eq!(result.deleted, vec![pool.join("hello_1.0_amd64.deb")]);
    assert!(!pool.join("hello_1.0_amd64.deb").exists());

    repo.build_index("stable").unwrap();
    let records = parse_packages_index(&fs::read_to_string(packages_path(&repo, "amd64")).unwrap());
    let versions: Vec<&str> = records.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(versions, vec!["2.0", "1.5"]);
}

#[test]
fn test_unsupported_control_compression_aborts_scan() {
    let (_dir, repo) = setup();
    let good = repo.root().join("pool/main/h/hello/hello_1.0_amd64.deb");
    build_deb(
        &good,
        "Package: hello\nVersion: 1.0\nArchitecture: amd64\n",
        "control.tar.gz",
    );
    let bad = repo.root().join("pool/main/z/zstd/zstd_1.0_amd64.deb");
    build_deb(
        &bad,
        "Package: zstd\nVersion: 1.0\nArchitecture: amd64\n",
        "control.tar.zst",
    );

    let err = repo.build_index("stable").unwrap_err();
    match &err {
        Error::Package { path, .. } => assert_eq!(path, &bad),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        err.root_cause(),
        Error::UnsupportedCompression { member, .. } if member == "control.tar.zst"
    ));

    // Index from init is left as it was
    assert_eq!(fs::read(packages_path(&repo, "amd64")).unwrap(), b"");

    let err = repo.prune(PruneOptions::default()).unwrap_err();
    assert!(matches!(err.root_cause(), Error::UnsupportedCompression { .. }));
    assert!(good.exists());
}

struct StubSigner;

impl ReleaseSigner for StubSigner {
    fn sign_detached(&self, _input: &Path, output: &Path) -> aptpool::Result<()> {
        fs::write(output, "-----BEGIN PGP SIGNATURE-----\n").unwrap();
        Ok(())
    }

    fn sign_inline(&self, input: &Path, output: &Path) -> aptpool::Result<()> {
        let body = fs::read_to_string(input).unwrap();
        fs::write(output, format!("-----BEGIN PGP SIGNED MESSAGE-----\n{body}")).unwrap();
        Ok(())
    }
}

#[test]
fn test_sign_release_after_build() {
    let (_dir, repo) = setup();
    repo.build_index("stable").unwrap();
    repo.build_release("stable").unwrap();

    let signed = sign_release(&StubSigner, &repo.dist_dir("stable")).unwrap();
    assert_eq!(signed.detached, repo.dist_dir("stable").join("Release.gpg"));
    let inline = fs::read_to_string(&signed.inline).unwrap();
    assert!(inline.contains("Origin: Example\n"));
}
