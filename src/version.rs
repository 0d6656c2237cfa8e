// src/version.rs

//! Debian package version parsing and ordering
//!
//! Versions have the form `[epoch:]upstream[-revision]`. Ordering follows dpkg:
//! epochs compare numerically, then upstream and revision are compared with the
//! alternating non-digit / digit algorithm.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A decomposed Debian version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub epoch: u64,
    pub upstream: String,
    /// Empty when the version has no revision
    pub revision: String,
}

impl Version {
    /// Parse a version string, rejecting an empty upstream part
    pub fn parse(s: &str) -> Result<Self> {
        let (epoch, upstream, revision) = split(s);
        if upstream.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        Ok(Self {
            epoch,
            upstream: upstream.to_string(),
            revision: revision.to_string(),
        })
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.upstream)?;
        if !self.revision.is_empty() {
            write!(f, "-{}", self.revision)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_part(&self.upstream, &other.upstream))
            .then_with(|| compare_part(&self.revision, &other.revision))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split a version string into (epoch, upstream, revision)
///
/// Never fails: a string without a numeric `N:` prefix has epoch 0, and a
/// string without a hyphen (or with nothing after the last one) has no revision.
pub fn split(s: &str) -> (u64, &str, &str) {
    let (epoch, rest) = match s.split_once(':') {
        Some((digits, rest)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            match digits.parse::<u64>() {
                Ok(epoch) => (epoch, rest),
                Err(_) => (0, s),
            }
        }
        _ => (0, s),
    };

    match rest.rsplit_once('-') {
        Some((upstream, revision)) if !upstream.is_empty() && !revision.is_empty() => {
            (epoch, upstream, revision)
        }
        _ => (epoch, rest, ""),
    }
}

/// Compare two version strings
pub fn compare(a: &str, b: &str) -> Ordering {
    let (epoch_a, upstream_a, revision_a) = split(a);
    let (epoch_b, upstream_b, revision_b) = split(b);

    epoch_a
        .cmp(&epoch_b)
        .then_with(|| compare_part(upstream_a, upstream_b))
        .then_with(|| compare_part(revision_a, revision_b))
}

/// Sort version strings newest first
pub fn sort_descending<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| compare(b.as_ref(), a.as_ref()));
}

/// Rank of a character in a non-digit run; `None` is the end of the run
///
/// `~` ranks below the end of the run, letters above it, and everything else
/// above all letters.
fn order_key(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(c) => i32::from(c) + 256,
    }
}

/// Compare an upstream version or revision with the dpkg algorithm
fn compare_part(mut a: &str, mut b: &str) -> Ordering {
    while !a.is_empty() || !b.is_empty() {
        let (text_a, rest_a) = take_run(a, false);
        let (text_b, rest_b) = take_run(b, false);

        let ord = compare_non_digits(text_a, text_b);
        if ord != Ordering::Equal {
            return ord;
        }

        let (num_a, rest_a) = take_run(rest_a, true);
        let (num_b, rest_b) = take_run(rest_b, true);

        let ord = compare_digits(num_a, num_b);
        if ord != Ordering::Equal {
            return ord;
        }

        a = rest_a;
        b = rest_b;
    }

    Ordering::Equal
}

/// Split off the leading run of digits (or non-digits)
fn take_run(s: &str, digits: bool) -> (&str, &str) {
    let end = s
        .bytes()
        .position(|c| c.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn compare_non_digits(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    (0..a.len().max(b.len()))
        .map(|i| (order_key(a.get(i).copied()), order_key(b.get(i).copied())))
        .find(|(x, y)| x != y)
        .map_or(Ordering::Equal, |(x, y)| x.cmp(&y))
}

/// Numeric comparison of digit runs of any length
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_table() {
        let cases = [
            ("1.0", "2.0", Ordering::Less),
            ("2.0", "1.0", Ordering::Greater),
            ("1.0", "1.0", Ordering::Equal),
            ("1.0.1", "1.0.2", Ordering::Less),
            ("1.0.10", "1.0.9", Ordering::Greater),
            ("1.0.0", "1.0", Ordering::Greater),
            ("1:1.0", "2.0", Ordering::Greater),
            ("2.0", "1:1.0", Ordering::Less),
            ("1:1.0", "1:2.0", Ordering::Less),
            ("2:1.0", "1:2.0", Ordering::Greater),
            ("1.0-1", "1.0-2", Ordering::Less),
            ("1.0-2", "1.0-1", Ordering::Greater),
            ("1.0-1", "1.0-1", Ordering::Equal),
            ("1:1.0-1", "1:1.0-2", Ordering::Less),
            ("2:1.0-1", "1:2.0-1", Ordering::Greater),
            ("1.0~beta", "1.0", Ordering::Less),
            ("1.0~alpha", "1.0~beta", Ordering::Less),
            ("1.0~1", "1.0", Ordering::Less),
            ("1.0a", "1.0b", Ordering::Less),
            ("1.0alpha", "1.0beta", Ordering::Less),
            ("1.0.0~rc1", "1.0.0", Ordering::Less),
            ("1.0.0", "1.0.0~rc1", Ordering::Greater),
            ("1.0+dfsg", "1.0", Ordering::Greater),
            ("1.0a", "1.0+", Ordering::Less),
            ("1.01", "1.1", Ordering::Equal),
            ("1.0", "1.0-0", Ordering::Equal),
        ];

        for (a, b, expected) in cases {
            assert_eq!(compare(a, b), expected, "compare({a:?}, {b:?})");
        }
    }

    #[test]
    fn test_split() {
        assert_eq!(split("1.0"), (0, "1.0", ""));
        assert_eq!(split("1.0-1"), (0, "1.0", "1"));
        assert_eq!(split("1:1.0"), (1, "1.0", ""));
        assert_eq!(split("1:1.0-1"), (1, "1.0", "1"));
        assert_eq!(split("2:1.0.0-ubuntu1"), (2, "1.0.0", "ubuntu1"));
        // Revision is everything after the last hyphen
        assert_eq!(split("1.0-rc-2"), (0, "1.0-rc", "2"));
        // Non-numeric prefix before a colon belongs to upstream
        assert_eq!(split("a:1.0"), (0, "a:1.0", ""));
        assert_eq!(split("1.0-"), (0, "1.0-", ""));
    }

    #[test]
    fn test_parse_and_display() {
        let version = Version::parse("2:1.0.0-ubuntu1").unwrap();
        assert_eq!(version.epoch, 2);
        assert_eq!(version.upstream, "1.0.0");
        assert_eq!(version.revision, "ubuntu1");
        assert_eq!(version.to_string(), "2:1.0.0-ubuntu1");

        let version: Version = "0:3.4".parse().unwrap();
        assert_eq!(version.to_string(), "3.4");

        assert!(matches!(Version::parse(""), Err(Error::InvalidVersion(_))));
        assert!(Version::parse("3:").is_err());
    }

    #[test]
    fn test_version_ord_matches_compare() {
        let a = Version::parse("1.0~rc1-1").unwrap();
        let b = Version::parse("1.0-1").unwrap();
        assert!(a < b);
        assert_eq!(a.cmp(&b), compare("1.0~rc1-1", "1.0-1"));
    }

    #[test]
    fn test_ordering_is_consistent() {
        let versions = [
            "1.0", "1.0.0", "1.0~rc1", "1.0~~", "1.0~", "1.0a", "1.0+b1", "1:0.1", "0:1.0",
            "1.0-1", "1.0-1ubuntu1", "1.0-1~bpo1", "2.0", "10", "9.9.9", "1.0-0", "1.00",
        ];

        for a in versions {
            assert_eq!(compare(a, a), Ordering::Equal);
            for b in versions {
                assert_eq!(compare(a, b), compare(b, a).reverse(), "{a} vs {b}");
                for c in versions {
                    if compare(a, b) != Ordering::Greater && compare(b, c) != Ordering::Greater {
                        assert_ne!(compare(a, c), Ordering::Greater, "{a} <= {b} <= {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_sort_descending() {
        let mut versions = vec!["1.0", "2.0~beta", "1:0.5", "1.5", "2.0"];
        sort_descending(&mut versions);
        assert_eq!(versions, vec!["1:0.5", "2.0", "2.0~beta", "1.5", "1.0"]);
    }

    #[test]
    fn test_long_digit_runs() {
        assert_eq!(
            compare("1.99999999999999999999999", "1.100000000000000000000000"),
            Ordering::Less
        );
    }
}
