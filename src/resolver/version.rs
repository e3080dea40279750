//! NuGet version requirements.
//!
//! Only the subset of NuGet range syntax that can be answered without a
//! package feed is supported: a bare version (minimum) and an exact `[X]`
//! pin. Everything else is reported as unsupported instead of guessed.

use std::path::Path;

use semver::{BuildMetadata, Version};
use thiserror::Error;

use crate::util::fs::subdirectories;

/// Errors produced while turning a requirement into a concrete version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version requirement")]
    Empty,

    #[error("unresolved property `{0}` in version requirement")]
    UnresolvedMacro(String),

    #[error("version ranges are not supported: `{0}`")]
    RangeUnsupported(String),

    #[error("wildcard versions are not supported: `{0}`")]
    WildcardUnsupported(String),

    #[error("malformed version range `{0}`: must start with `[` or `(` and end with `]` or `)`")]
    InvalidDelimiters(String),

    #[error("version `{0}` is not installed and floating minimum versions are not supported")]
    FloatingUnsupported(String),

    #[error("no installed version satisfies minimum `{requirement}`")]
    MinimumNotInstalled {
        requirement: String,
        available: Vec<String>,
    },

    #[error("invalid version `{0}`")]
    Invalid(String),
}

/// A parsed version requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequirement {
    /// `[X]`: exactly this version.
    Exact(String),
    /// `X`: this version or anything newer.
    Minimum(String),
}

impl VersionRequirement {
    pub fn version(&self) -> &str {
        match self {
            VersionRequirement::Exact(v) | VersionRequirement::Minimum(v) => v,
        }
    }
}

fn has_range_delimiters(s: &str) -> bool {
    s.starts_with(['[', '(']) || s.ends_with([']', ')'])
}

/// Parse a `PackageReference` / assets-file version string.
pub fn parse_requirement(raw: &str) -> Result<VersionRequirement, VersionError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(VersionError::Empty);
    }
    if s.contains("$(") {
        return Err(VersionError::UnresolvedMacro(s.to_string()));
    }

    let ranged = has_range_delimiters(s);
    if s.contains('*') {
        return Err(if ranged {
            VersionError::RangeUnsupported(s.to_string())
        } else {
            VersionError::WildcardUnsupported(s.to_string())
        });
    }

    if !ranged {
        return Ok(VersionRequirement::Minimum(s.to_string()));
    }

    if !s.starts_with(['[', '(']) || !s.ends_with([']', ')']) {
        return Err(VersionError::InvalidDelimiters(s.to_string()));
    }
    if s.contains(',') {
        return Err(VersionError::RangeUnsupported(s.to_string()));
    }
    if s.starts_with('[') && s.ends_with(']') {
        let inner = s[1..s.len() - 1].trim();
        if inner.is_empty() {
            return Err(VersionError::Empty);
        }
        return Ok(VersionRequirement::Exact(inner.to_string()));
    }

    Err(VersionError::RangeUnsupported(s.to_string()))
}

/// Turn a requirement into the version directory to load from `package_dir`
/// (`<cache>/<name>`).
///
/// An exact pin is trusted as-is. A minimum is used when that exact version
/// is installed; otherwise the lowest installed version at or above it is
/// picked when `floating_minimum` is enabled.
pub fn resolve_installed(
    package_dir: &Path,
    requirement: &VersionRequirement,
    floating_minimum: bool,
) -> Result<String, VersionError> {
    let wanted = match requirement {
        VersionRequirement::Exact(v) => return Ok(v.clone()),
        VersionRequirement::Minimum(v) => v,
    };

    if let Some(dir) = installed_dir(package_dir, wanted) {
        return Ok(dir);
    }

    if !floating_minimum {
        return Err(VersionError::FloatingUnsupported(wanted.clone()));
    }

    let minimum =
        parse_version_lenient(wanted).ok_or_else(|| VersionError::Invalid(wanted.clone()))?;

    let installed: Vec<(Version, String)> = subdirectories(package_dir)
        .into_iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter_map(|name| parse_version_lenient(&name).map(|v| (v, name)))
        .collect();

    installed
        .iter()
        .filter(|(v, _)| *v >= minimum)
        .min_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, name)| name.clone())
        .ok_or_else(|| VersionError::MinimumNotInstalled {
            requirement: wanted.clone(),
            available: installed.into_iter().map(|(_, name)| name).collect(),
        })
}

/// The cache stores versions lower-cased; accept either spelling.
fn installed_dir(package_dir: &Path, version: &str) -> Option<String> {
    [version.to_string(), version.to_ascii_lowercase()]
        .into_iter()
        .find(|v| package_dir.join(v).is_dir())
}

/// Drop a surrounding exact-pin bracket: `[1.2.3]` => `1.2.3`.
pub fn strip_exact(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| !inner.contains(','))
        .map(str::trim)
        .unwrap_or(s)
}

/// Whether two requirement strings name the same version.
pub fn versions_match(a: &str, b: &str) -> bool {
    let (a, b) = (strip_exact(a), strip_exact(b));
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    match (parse_version_lenient(a), parse_version_lenient(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Parse a version string, allowing for incomplete versions and NuGet's
/// four-part form (the fourth part is kept as build metadata).
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();

    // Try exact parse first
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    // Prerelease tags are only understood on the three-part form above
    if s.contains('-') {
        return None;
    }

    let parts: Vec<u64> = s
        .split('.')
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;

    match parts.as_slice() {
        [major] => Some(Version::new(*major, 0, 0)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        [major, minor, patch, revision] => {
            let mut v = Version::new(*major, *minor, *patch);
            if *revision != 0 {
                v.build = BuildMetadata::new(&revision.to_string()).ok()?;
            }
            Some(v)
        }
        _ => None,
    }
}
