// src/lib.rs

//! aptpool
//!
//! Manages a local binary-package repository that APT clients can consume.
//!
//! # Architecture
//!
//! - Extraction: `.deb` archives are opened, digested, and their control stanza parsed
//! - Ordering: Debian version comparison decides which build is newest
//! - Pool: archives live under `pool/<component>/<prefix>/<name>/`
//! - Indices: `Packages` (plain, gzip, xz) and `Release` files are regenerated from the pool
//! - Pruning: only the newest N builds of each (name, architecture) are kept
//!
//! The filesystem is the only state. Every operation rescans the pool.

mod error;
pub mod hash;
pub mod packages;
pub mod repository;
pub mod signing;
pub mod version;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
