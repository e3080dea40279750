//! Package references owned by a project.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Where a package requirement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Declared by a `<PackageReference>` in the project itself.
    Direct,
    /// Pulled in while computing the dependency closure.
    Transitive,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Direct => write!(f, "direct"),
            Origin::Transitive => write!(f, "transitive"),
        }
    }
}

/// A single package requirement: name plus version or version range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRequirement {
    pub name: String,
    pub version: String,
    pub origin: Origin,
}

impl PackageRequirement {
    pub fn direct(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageRequirement {
            name: name.into(),
            version: version.into(),
            origin: Origin::Direct,
        }
    }

    pub fn transitive(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageRequirement {
            name: name.into(),
            version: version.into(),
            origin: Origin::Transitive,
        }
    }
}

/// Package name -> one chosen requirement.
///
/// Package IDs are case-insensitive, so entries are keyed by the lower-cased
/// name while the declared spelling is kept for display and file lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    entries: BTreeMap<String, PackageRequirement>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl PackageSet {
    pub fn new() -> Self {
        PackageSet {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a requirement unless one with the same name already exists.
    ///
    /// Returns `false` (and leaves the set untouched) on a duplicate.
    pub fn insert(&mut self, req: PackageRequirement) -> bool {
        use std::collections::btree_map::Entry;

        match self.entries.entry(key(&req.name)) {
            Entry::Vacant(slot) => {
                slot.insert(req);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Replace the version of an existing entry. Returns the previous version.
    pub fn set_version(&mut self, name: &str, version: impl Into<String>) -> Option<String> {
        self.entries
            .get_mut(&key(name))
            .map(|entry| std::mem::replace(&mut entry.version, version.into()))
    }

    pub fn get(&self, name: &str) -> Option<&PackageRequirement> {
        self.entries.get(&key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&key(name))
    }

    /// Iterate requirements in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageRequirement> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PackageSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl FromIterator<PackageRequirement> for PackageSet {
    fn from_iter<T: IntoIterator<Item = PackageRequirement>>(iter: T) -> Self {
        let mut set = PackageSet::new();
        for req in iter {
            set.insert(req);
        }
        set
    }
}
