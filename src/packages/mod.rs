// src/packages/mod.rs

//! Debian binary package support
//!
//! This module reads `.deb` archives into [`PackageRecord`]s and converts
//! records to and from control stanzas.

pub mod control;
pub mod deb;
pub mod record;

pub use deb::{extract, DEB_SUFFIX};
pub use record::{parse_packages_index, PackageRecord};
