use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Represents a semantic version with major, minor, and patch components.
///
/// Ordering is purely numeric and component-wise: major, then minor, then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Represents the type of semantic version bump to apply.
///
/// Variants are declared in ascending precedence so that `Patch < Minor < Major`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    Patch,
    Minor,
    Major,
}

impl Version {
    /// Creates a new Version with the specified major, minor, and patch components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parses a strict `major.minor.patch` string.
    ///
    /// Each component must be a non-empty run of ASCII digits; signs, whitespace,
    /// prefixes and pre-release suffixes are all rejected.
    ///
    /// # Example
    /// ```
    /// use git_release::version::Version;
    /// assert_eq!(Version::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
    /// assert!(Version::parse("v1.2.3").is_err());
    /// assert!(Version::parse("1.2").is_err());
    /// ```
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || ReleaseError::InvalidVersion(version.to_string());

        let mut parts = version.split('.');
        let mut next_component = || -> Result<u32> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<u32>().map_err(|_| invalid())
        };

        let major = next_component()?;
        let minor = next_component()?;
        let patch = next_component()?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Version::new(major, minor, patch))
    }

    /// Extracts a version from a tag-like string.
    ///
    /// Tries a strict parse first. Otherwise keeps only ASCII digits and dots and
    /// pads missing trailing components with zeros, so `v2` becomes `2.0.0` and
    /// `v2.1` becomes `2.1.0`. Returns `None` for more than three components,
    /// an empty component, or nothing left to parse.
    ///
    /// # Example
    /// ```
    /// use git_release::version::Version;
    /// assert_eq!(Version::clean("v2"), Some(Version::new(2, 0, 0)));
    /// assert_eq!(Version::clean("release-2.1"), Some(Version::new(2, 1, 0)));
    /// assert_eq!(Version::clean("v1."), None);
    /// ```
    pub fn clean(tag_like: &str) -> Option<Self> {
        if let Ok(version) = Version::parse(tag_like) {
            return Some(version);
        }

        let digits: String = tag_like
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let padded = match digits.matches('.').count() {
            0 => format!("{}.0.0", digits),
            1 => format!("{}.0", digits),
            2 => digits,
            _ => return None,
        };

        Version::parse(&padded).ok()
    }

    /// Bump version according to bump type
    ///
    /// Fails with [`ReleaseError::InvalidVersion`] when the bumped component
    /// would not fit in a `u32`.
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        let next = |component: u32| {
            component.checked_add(1).ok_or_else(|| {
                ReleaseError::InvalidVersion(format!("{} cannot take a {} bump", self, bump_type))
            })
        };

        Ok(match bump_type {
            VersionBump::Major => Version::new(next(self.major)?, 0, 0),
            VersionBump::Minor => Version::new(self.major, next(self.minor)?, 0),
            VersionBump::Patch => Version::new(self.major, self.minor, next(self.patch)?),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl VersionBump {
    /// Lowercase name as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VersionBump {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(ReleaseError::config(format!(
                "Unknown bump level '{}', expected major, minor or patch",
                other
            ))),
        }
    }
}

/// Compares two strict `major.minor.patch` strings numerically.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

/// Parses `version`, applies `bump_type` and renders the result.
pub fn bump_version(version: &str, bump_type: VersionBump) -> Result<String> {
    Ok(Version::parse(version)?.bump(bump_type)?.to_string())
}
