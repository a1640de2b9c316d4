// src/version/mod.rs

//! Version handling for catalog components
//!
//! Component versions are a dotted-integer main sequence with an optional
//! pre-release tag after the first `-`:
//! - "3.2.0" → main=[3, 2, 0], pre=None
//! - "3.2.0-pre.12" → main=[3, 2, 0], pre=Some(["pre", "12"])
//!
//! Ordering rules:
//! 1. Main sequences compare element-wise as integers; a longer sequence wins
//!    when the shared prefix is equal.
//! 2. At equal main sequences a release beats any pre-release.
//! 3. Pre-release tags compare element-wise: numerically when both elements
//!    are integers, as strings otherwise; more elements wins on a tie.
//!
//! Host platform versions use a different ordering entirely, see [`host`].

pub mod host;

pub use host::HostVersion;

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// A parsed component version
#[derive(Debug, Clone, Eq)]
pub struct ComponentVersion {
    pub main: Vec<u64>,
    pub pre: Option<Vec<String>>,
}

impl ComponentVersion {
    /// Parse a component version string
    ///
    /// Fails when any main-sequence element is not a non-negative integer.
    pub fn parse(s: &str) -> Result<Self> {
        let (main_str, pre_str) = match s.split_once('-') {
            Some((main, pre)) => (main, Some(pre)),
            None => (s, None),
        };

        let main = main_str
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| Error::VersionParse {
                    version: s.to_string(),
                    reason: format!("non-numeric component '{}'", part),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pre = pre_str.map(|tag| tag.split('.').map(str::to_string).collect());

        Ok(Self { main, pre })
    }

    /// Whether this version carries a pre-release tag
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }
}

fn compare_tag_part(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

impl Ord for ComponentVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.main.iter().zip(&other.main) {
            match a.cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        match self.main.len().cmp(&other.main.len()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match compare_tag_part(x, y) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
        }
    }
}

impl PartialOrd for ComponentVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the ordering so "pre.01" and "pre.1" agree with `cmp`.
impl PartialEq for ComponentVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main: Vec<String> = self.main.iter().map(u64::to_string).collect();
        write!(f, "{}", main.join("."))?;
        if let Some(ref pre) = self.pre {
            write!(f, "-{}", pre.join("."))?;
        }
        Ok(())
    }
}

/// Whether `new` is strictly newer than `old`
pub fn is_newer(old: &str, new: &str) -> Result<bool> {
    let old = ComponentVersion::parse(old)?;
    let new = ComponentVersion::parse(new)?;
    Ok(new > old)
}

/// Pick the newest of a set of version strings
///
/// Returns `Ok(None)` for an empty set and fails on the first unparseable entry.
pub fn newest<'a, I>(versions: I) -> Result<Option<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, ComponentVersion)> = None;
    for candidate in versions {
        let parsed = ComponentVersion::parse(candidate)?;
        let replace = match best {
            Some((_, ref current)) => parsed > *current,
            None => true,
        };
        if replace {
            best = Some((candidate, parsed));
        }
    }
    Ok(best.map(|(s, _)| s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_ordering() {
        assert!(is_newer("3.2.0", "3.2.1").unwrap());
        assert!(!is_newer("3.2.1", "3.2.0").unwrap());
        assert!(!is_newer("3.2.0", "3.2.0").unwrap());
    }

    #[test]
    fn test_release_beats_prerelease() {
        assert!(is_newer("3.2.0-pre.5", "3.2.0").unwrap());
        assert!(!is_newer("3.2.0", "3.2.0-pre.5").unwrap());
    }

    #[test]
    fn test_numeric_tag_comparison() {
        // "12" sorts below "5" as a string; numeric comparison must win
        assert!(is_newer("3.2.0-pre.5", "3.2.0-pre.12").unwrap());
        assert!(!is_newer("3.2.0-pre.12", "3.2.0-pre.5").unwrap());
    }

    #[test]
    fn test_string_tag_comparison() {
        assert!(is_newer("1.0.0-alpha", "1.0.0-beta").unwrap());
        assert!(is_newer("1.0.0-pre.1", "1.0.0-pre.1.1").unwrap());
    }

    #[test]
    fn test_longer_main_sequence_wins() {
        assert!(is_newer("1.0", "1.0.0").unwrap());
        assert!(!is_newer("1.0.0.1", "1.0.0").unwrap());
    }

    #[test]
    fn test_main_beats_prerelease_tag() {
        assert!(is_newer("3.1.9", "3.2.0-pre.1").unwrap());
    }

    #[test]
    fn test_non_numeric_main_is_error() {
        let err = is_newer("3.x.0", "3.2.0").unwrap_err();
        assert!(matches!(err, Error::VersionParse { .. }));
        assert!(ComponentVersion::parse("^3.0.0").is_err());
        assert!(ComponentVersion::parse("").is_err());
    }

    #[test]
    fn test_tag_equality_follows_ordering() {
        let a = ComponentVersion::parse("1.0.0-pre.01").unwrap();
        let b = ComponentVersion::parse("1.0.0-pre.1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_newest() {
        let versions = ["3.0.0", "3.2.0-pre.12", "3.1.0", "3.2.0-pre.5"];
        assert_eq!(newest(versions).unwrap(), Some("3.2.0-pre.12"));
        assert_eq!(newest(Vec::<&str>::new()).unwrap(), None);
    }

    #[test]
    fn test_display_round_trips_shape() {
        let v = ComponentVersion::parse("4.0.0-pre.2").unwrap();
        assert_eq!(v.to_string(), "4.0.0-pre.2");
        assert!(v.is_prerelease());
    }
}
