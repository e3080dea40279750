//! Transitive package closure.
//!
//! Starting from a project's direct package references, repeatedly pull in
//! the dependencies listed for each known package in the project's lock
//! manifest until nothing changes.

use std::fmt;
use std::str::FromStr;

use crate::core::package::{Origin, PackageRequirement, PackageSet};
use crate::resolver::assets::NugetDependency;
use crate::resolver::version::{parse_version_lenient, strip_exact, versions_match};

/// What to do when a dependency names a package that is already in the set
/// with a different version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// A higher transitive requirement replaces a lower transitive one.
    /// Direct references are never replaced.
    #[default]
    HighestWins,
    /// The first requirement recorded for a name is kept.
    KeepFirst,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "highest" => Ok(ConflictPolicy::HighestWins),
            "first" => Ok(ConflictPolicy::KeepFirst),
            _ => Err(format!(
                "invalid conflict policy '{}'; expected 'highest' or 'first'",
                s
            )),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::HighestWins => write!(f, "highest"),
            ConflictPolicy::KeepFirst => write!(f, "first"),
        }
    }
}

/// Outcome of a closure expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureStats {
    /// Passes that changed the set.
    pub iterations: usize,
    /// Packages added as transitive requirements.
    pub added: usize,
    /// Transitive requirements raised to a higher version.
    pub upgraded: usize,
}

fn find_record<'a>(
    records: &'a [NugetDependency],
    req: &PackageRequirement,
) -> Option<&'a NugetDependency> {
    records
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(&req.name) && versions_match(&r.version, &req.version))
}

/// `candidate` is strictly newer than `current`. Unparseable versions never
/// compare as newer.
fn is_newer(candidate: &str, current: &str) -> bool {
    match (
        parse_version_lenient(strip_exact(candidate)),
        parse_version_lenient(strip_exact(current)),
    ) {
        (Some(candidate), Some(current)) => candidate > current,
        _ => false,
    }
}

/// Expand `set` to its transitive closure over `records`.
///
/// Running it again on an already expanded set changes nothing.
pub fn expand(
    set: &mut PackageSet,
    records: &[NugetDependency],
    policy: ConflictPolicy,
) -> ClosureStats {
    let mut stats = ClosureStats::default();

    loop {
        let mut changed = false;
        let snapshot: Vec<PackageRequirement> = set.iter().cloned().collect();

        for req in &snapshot {
            let Some(record) = find_record(records, req) else {
                continue;
            };

            for (name, version) in &record.dependencies {
                let Some(existing) = set.get(name) else {
                    tracing::debug!("{} {} pulls in {} {}", req.name, req.version, name, version);
                    set.insert(PackageRequirement::transitive(name, version));
                    stats.added += 1;
                    changed = true;
                    continue;
                };

                if versions_match(&existing.version, version) {
                    continue;
                }

                let replace = policy == ConflictPolicy::HighestWins
                    && existing.origin == Origin::Transitive
                    && is_newer(version, &existing.version);

                if replace {
                    tracing::debug!(
                        "{} raised from {} to {} (required by {})",
                        existing.name,
                        existing.version,
                        version,
                        req.name
                    );
                    set.set_version(name, version.clone());
                    stats.upgraded += 1;
                    changed = true;
                } else {
                    tracing::debug!(
                        "{} keeps {} ({} wants {})",
                        existing.name,
                        existing.version,
                        req.name,
                        version
                    );
                }
            }
        }

        if !changed {
            break;
        }
        stats.iterations += 1;
    }

    stats
}
