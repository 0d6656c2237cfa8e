// src/signing.rs

//! Release signing
//!
//! APT accepts either a detached `Release.gpg` next to `Release` or a
//! clearsigned `InRelease`. Both are produced here through a
//! [`ReleaseSigner`]; [`GpgSigner`] drives the `gpg` binary.

use crate::error::{Error, Result};
use crate::repository::release::RELEASE_FILE;
use crate::repository::{persist, temp_beside};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

pub const DETACHED_SIGNATURE_FILE: &str = "Release.gpg";
pub const INLINE_SIGNATURE_FILE: &str = "InRelease";

/// Environment variable holding the key passphrase, if any
pub const PASSPHRASE_ENV: &str = "GPG_PASSPHRASE";

/// Produces armored OpenPGP signatures
pub trait ReleaseSigner {
    /// Write a detached signature of `input` to `output`
    fn sign_detached(&self, input: &Path, output: &Path) -> Result<()>;

    /// Write a clearsigned copy of `input` to `output`
    fn sign_inline(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Signer backed by the `gpg` command line tool
#[derive(Debug, Clone)]
pub struct GpgSigner {
    program: String,
    key_id: Option<String>,
    passphrase: Option<String>,
}

impl GpgSigner {
    /// Sign with `key_id`, or gpg's default key when `None`
    ///
    /// The passphrase is taken from `GPG_PASSPHRASE` when set.
    pub fn new(key_id: Option<String>) -> Self {
        Self {
            program: "gpg".to_string(),
            key_id,
            passphrase: std::env::var(PASSPHRASE_ENV).ok().filter(|p| !p.is_empty()),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_passphrase(mut self, passphrase: Option<String>) -> Self {
        self.passphrase = passphrase;
        self
    }

    fn args(&self, mode: &str, input: &Path, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["--batch", "--yes", "--armor", mode, "--output"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(output.display().to_string());

        if let Some(key) = &self.key_id {
            args.push("--default-key".to_string());
            args.push(key.clone());
        }
        if self.passphrase.is_some() {
            args.extend(
                ["--pinentry-mode", "loopback", "--passphrase-fd", "0"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }

        args.push(input.display().to_string());
        args
    }

    fn run(&self, mode: &str, input: &Path, output: &Path) -> Result<()> {
        let args = self.args(mode, input, output);
        debug!("Running {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Signing(format!("failed to run {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Some(passphrase) = &self.passphrase
        {
            stdin
                .write_all(passphrase.as_bytes())
                .map_err(|e| Error::Signing(format!("failed to pass passphrase: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Signing(format!("failed to wait for {}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(Error::Signing(format!(
                "{} {} exited with {}: {}",
                self.program,
                mode,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl ReleaseSigner for GpgSigner {
    fn sign_detached(&self, input: &Path, output: &Path) -> Result<()> {
        self.run("--detach-sign", input, output)
    }

    fn sign_inline(&self, input: &Path, output: &Path) -> Result<()> {
        self.run("--clearsign", input, output)
    }
}

/// Files written by [`sign_release`]
#[derive(Debug, Clone)]
pub struct SignedRelease {
    pub detached: PathBuf,
    pub inline: PathBuf,
}

/// Sign `<dist_dir>/Release` into `Release.gpg` and `InRelease`
///
/// Each signature is written to a temporary file beside its destination and
/// renamed into place, so clients never see a partial file.
pub fn sign_release(signer: &dyn ReleaseSigner, dist_dir: &Path) -> Result<SignedRelease> {
    let release = dist_dir.join(RELEASE_FILE);
    if !release.is_file() {
        return Err(Error::io(
            &release,
            std::io::Error::new(std::io::ErrorKind::NotFound, "Release has not been built"),
        ));
    }

    let detached = dist_dir.join(DETACHED_SIGNATURE_FILE);
    let temp = temp_beside(&detached)?;
    signer.sign_detached(&release, temp.path())?;
    persist(temp, &detached)?;

    let inline = dist_dir.join(INLINE_SIGNATURE_FILE);
    let temp = temp_beside(&inline)?;
    signer.sign_inline(&release, temp.path())?;
    persist(temp, &inline)?;

    info!("Signed {}", release.display());
    Ok(SignedRelease { detached, inline })
}
