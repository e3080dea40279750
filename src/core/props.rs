//! `Directory.Build.props` property inheritance.
//!
//! MSBuild imports the nearest `Directory.Build.props` above a project.
//! Only plain `<PropertyGroup>` children are understood here: each one
//! becomes a `$(Name)` macro that project files can use as a whole value.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::language::{parse_nullable, LanguageVersion};
use crate::util::fs::read_to_string;

/// File name searched for in every ancestor of a project directory.
pub const PROPS_FILE_NAME: &str = "Directory.Build.props";

/// `$(Name)` -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    values: BTreeMap<String, String>,
}

/// Normalize `Name` or `$(Name)` to the `$(Name)` key form.
fn macro_key(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("$(") && name.ends_with(')') {
        name.to_string()
    } else {
        format!("$({})", name)
    }
}

impl PropertyMap {
    pub fn new() -> Self {
        PropertyMap::default()
    }

    /// Collect the properties of a props (or project) document.
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(xml)?;
        Ok(Self::from_document(&doc))
    }

    /// Every attribute-less child of every `<PropertyGroup>`; later
    /// definitions override earlier ones.
    pub fn from_document(doc: &roxmltree::Document<'_>) -> Self {
        let mut map = PropertyMap::new();
        for group in doc
            .root_element()
            .children()
            .filter(|n| n.has_tag_name("PropertyGroup"))
        {
            for prop in group.children().filter(|n| n.is_element()) {
                if prop.attributes().next().is_some() {
                    continue;
                }
                let value = prop.text().unwrap_or("").trim();
                map.insert(prop.tag_name().name(), value);
            }
        }
        map
    }

    /// Load one props file.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = read_to_string(path)?;
        Self::parse(&xml).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(macro_key(name), value.into());
    }

    /// Look up by `Name` or `$(Name)`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&macro_key(name)).map(String::as_str)
    }

    /// Replace a whole-value `$(Name)` reference; anything else is returned
    /// unchanged, as is a reference to an unknown property.
    pub fn substitute<'a>(&'a self, value: &'a str) -> &'a str {
        let trimmed = value.trim();
        if trimmed.starts_with("$(") && trimmed.ends_with(')') {
            if let Some(resolved) = self.get(trimmed) {
                return resolved;
            }
        }
        value
    }

    /// Layer `other` on top of `self`.
    pub fn overlay(&self, other: &PropertyMap) -> PropertyMap {
        let mut merged = self.clone();
        merged
            .values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Inherited language version; the baseline when unset or unknown.
    pub fn language_version(&self) -> LanguageVersion {
        LanguageVersion::BASELINE.with_override(self.get("LangVersion"))
    }

    /// Inherited nullable context; disabled when unset.
    pub fn nullable(&self) -> bool {
        parse_nullable(self.get("Nullable"), false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Nearest `Directory.Build.props` at or above `start`.
pub fn find_props_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROPS_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Caches parsed props files by path so sibling projects share one read.
#[derive(Debug, Default)]
pub struct PropsCache {
    by_file: HashMap<PathBuf, PropertyMap>,
    empty: PropertyMap,
}

impl PropsCache {
    pub fn new() -> Self {
        PropsCache::default()
    }

    /// Properties inherited by a project in `dir`.
    pub fn for_dir(&mut self, dir: &Path) -> Result<&PropertyMap> {
        let Some(path) = find_props_file(dir) else {
            tracing::debug!("no {} above {}", PROPS_FILE_NAME, dir.display());
            return Ok(&self.empty);
        };

        if !self.by_file.contains_key(&path) {
            tracing::info!("using {}", path.display());
            let map = PropertyMap::load(&path)?;
            self.by_file.insert(path.clone(), map);
        }

        Ok(&self.by_file[&path])
    }

    /// Number of distinct props files read so far.
    pub fn files_read(&self) -> usize {
        self.by_file.len()
    }
}
