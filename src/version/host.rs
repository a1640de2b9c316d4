// src/version/host.rs

//! Host platform (editor) version tuples
//!
//! Format: `major.minor.patch[<type><build>]`, e.g. "2022.3.5f1" or "6000.0.1f1".
//! The release type is one of `a` (alpha), `b` (beta), `f` (final) or
//! `p` (patch) and compares by character code. A bare "6000.0.0" has release
//! type `'\0'` and build 0, so it sorts below every alpha of that version.
//! Anything after the build number's digits (the `c1` of "2022.3.48f1c1") is
//! ignored.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RELEASE_TYPES: &[char] = &['a', 'b', 'f', 'p'];

/// Release type of a version written without one
pub const NO_RELEASE_TYPE: char = '\0';

/// A parsed host version
///
/// Field order is the comparison priority; the derived ordering is the
/// lexicographic tuple ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub release_type: char,
    pub build: u32,
}

impl HostVersion {
    pub fn new(major: u32, minor: u32, patch: u32, release_type: char, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            release_type,
            build,
        }
    }

    /// Parse a host version string
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |reason: &str| Error::VersionParse {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        let (numeric, suffix) = match s.find(RELEASE_TYPES) {
            Some(pos) => (&s[..pos], Some(&s[pos..])),
            None => (s, None),
        };

        let parts: Vec<&str> = numeric.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("expected major.minor.patch"));
        }
        let number = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| invalid(&format!("non-numeric component '{}'", part)))
        };
        let major = number(parts[0])?;
        let minor = number(parts[1])?;
        let patch = number(parts[2])?;

        let (release_type, build) = match suffix {
            Some(rest) => {
                let mut chars = rest.chars();
                // find() guarantees the first char is a release type
                let release_type = chars.next().unwrap_or(NO_RELEASE_TYPE);
                let tail = chars.as_str();
                let digits_end = tail
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(tail.len());
                let build = match (&tail[..digits_end], tail.is_empty()) {
                    (_, true) => 0,
                    ("", false) => return Err(invalid("build number must start with a digit")),
                    (digits, false) => number(digits)?,
                };
                (release_type, build)
            }
            None => (NO_RELEASE_TYPE, 0),
        };

        Ok(Self::new(major, minor, patch, release_type, build))
    }
}

impl FromStr for HostVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HostVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<HostVersion> for String {
    fn from(v: HostVersion) -> Self {
        v.to_string()
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.release_type != NO_RELEASE_TYPE {
            write!(f, "{}{}", self.release_type, self.build)?;
        }
        Ok(())
    }
}
