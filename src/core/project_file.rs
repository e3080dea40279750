//! `.csproj` reading.
//!
//! Only SDK-style projects are understood. The subset read here is the one
//! needed to compile a project outside MSBuild: target framework, language
//! settings, project and package references and the source file set.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::framework::TargetFramework;
use crate::core::language::LanguageVersion;
use crate::core::package::{PackageRequirement, PackageSet};
use crate::core::props::PropertyMap;
use crate::core::workspace::{DEFAULT_INTERMEDIATE_DIR, SUPPORTED_SDK};
use crate::util::fs::{from_msbuild_path, normalize_path};

/// Why a project file was rejected. Never fatal on its own: the referencing
/// project drops the reference and carries on.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed project file {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{} is not an MSBuild project (root element `{element}`)", .path.display())]
    NotAProject { path: PathBuf, element: String },

    #[error("{} has no Sdk attribute; only SDK-style projects are supported", .path.display())]
    MissingSdk { path: PathBuf },

    #[error("{} uses unsupported SDK `{sdk}`", .path.display())]
    UnsupportedSdk { path: PathBuf, sdk: String },

    #[error("{} does not declare a target framework", .path.display())]
    MissingTargetFramework { path: PathBuf },

    #[error("{} has no source files", .path.display())]
    NoSources { path: PathBuf },
}

/// The parsed contents of one project file.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub target_framework: TargetFramework,
    pub language_version: LanguageVersion,
    pub nullable: bool,
    /// Intermediate directory relative to the project directory.
    pub intermediate_dir: PathBuf,
    pub default_compile_items: bool,
    /// `ProjectReference Include` values, `/`-separated, in document order.
    pub project_references: Vec<PathBuf>,
    pub packages: PackageSet,
    /// `Compile Remove` patterns, `/`-separated, relative to the project.
    pub compile_remove: Vec<String>,
    /// `Compile Include` patterns, `/`-separated, relative to the project.
    pub compile_include: Vec<String>,
    /// Absolute source paths; filled by [`ProjectFile::collect_sources`].
    pub sources: Vec<PathBuf>,
}

fn is_false(value: Option<&str>) -> bool {
    value.map(|v| v.trim().eq_ignore_ascii_case("false")).unwrap_or(false)
}

fn split_items(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('\\', "/"))
}

impl ProjectFile {
    /// Read and parse `path`, then collect its sources.
    pub fn read(
        path: &Path,
        inherited: &PropertyMap,
        excluded_dirs: &[String],
    ) -> Result<Self, DescriptorError> {
        let xml = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut project = Self::parse(path, &xml, inherited)?;
        project.collect_sources(excluded_dirs)?;
        Ok(project)
    }

    /// Parse project XML. `path` locates the project directory and is used
    /// in errors; the filesystem is not touched.
    pub fn parse(path: &Path, xml: &str, inherited: &PropertyMap) -> Result<Self, DescriptorError> {
        let doc = roxmltree::Document::parse(xml).map_err(|source| DescriptorError::Xml {
            path: path.to_path_buf(),
            source,
        })?;

        let root = doc.root_element();
        if !root.has_tag_name("Project") {
            return Err(DescriptorError::NotAProject {
                path: path.to_path_buf(),
                element: root.tag_name().name().to_string(),
            });
        }
        match root.attribute("Sdk") {
            None => {
                return Err(DescriptorError::MissingSdk {
                    path: path.to_path_buf(),
                })
            }
            Some(sdk) if !sdk.trim().eq_ignore_ascii_case(SUPPORTED_SDK) => {
                return Err(DescriptorError::UnsupportedSdk {
                    path: path.to_path_buf(),
                    sdk: sdk.to_string(),
                })
            }
            Some(_) => {}
        }

        let local = PropertyMap::from_document(&doc);
        let scope = inherited.overlay(&local);

        let target_framework = scope
            .get("TargetFramework")
            .map(|tf| scope.substitute(tf).trim().to_string())
            .filter(|tf| !tf.is_empty())
            .or_else(|| {
                let all = scope.get("TargetFrameworks")?;
                let first = scope.substitute(all).split(';').map(str::trim).find(|s| !s.is_empty())?;
                tracing::info!("{} is multi-targeted ({}); using {}", path.display(), all, first);
                Some(first.to_string())
            })
            .map(|tf| TargetFramework::parse(&tf))
            .ok_or_else(|| DescriptorError::MissingTargetFramework {
                path: path.to_path_buf(),
            })?;

        let intermediate_dir = scope
            .get("BaseIntermediateOutputPath")
            .map(|p| from_msbuild_path(scope.substitute(p)))
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERMEDIATE_DIR));

        let mut project = ProjectFile {
            path: path.to_path_buf(),
            target_framework,
            language_version: scope.language_version(),
            nullable: scope.nullable(),
            intermediate_dir,
            default_compile_items: !is_false(scope.get("EnableDefaultCompileItems")),
            project_references: Vec::new(),
            packages: PackageSet::new(),
            compile_remove: Vec::new(),
            compile_include: Vec::new(),
            sources: Vec::new(),
        };

        for item in root
            .children()
            .filter(|n| n.has_tag_name("ItemGroup"))
            .flat_map(|group| group.children().filter(|n| n.is_element()))
        {
            match item.tag_name().name() {
                "ProjectReference" => {
                    if let Some(include) = item.attribute("Include") {
                        project
                            .project_references
                            .extend(split_items(include).map(PathBuf::from));
                    }
                }
                "PackageReference" => {
                    let Some(name) = item.attribute("Include").map(str::trim).filter(|s| !s.is_empty())
                    else {
                        continue;
                    };

                    let version = item.attribute("Version").or_else(|| {
                        item.children()
                            .find(|c| c.has_tag_name("Version"))
                            .and_then(|c| c.text())
                    });
                    let Some(version) = version.map(str::trim).filter(|v| !v.is_empty()) else {
                        tracing::warn!("{}: package {} has no version; skipped", path.display(), name);
                        continue;
                    };

                    let version = scope.substitute(version).trim();
                    if version.contains("$(") {
                        tracing::warn!(
                            "{}: package {} uses undefined property {}",
                            path.display(),
                            name,
                            version
                        );
                    }

                    if !project.packages.insert(PackageRequirement::direct(name, version)) {
                        tracing::warn!(
                            "{}: package {} referenced more than once; keeping the first",
                            path.display(),
                            name
                        );
                    }
                }
                "Compile" => {
                    if let Some(remove) = item.attribute("Remove") {
                        project.compile_remove.extend(split_items(remove));
                    }
                    if let Some(include) = item.attribute("Include") {
                        project.compile_include.extend(split_items(include));
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(
            "{}: {} / C# {} / {} project refs / {} packages",
            path.display(),
            project.target_framework,
            project.language_version,
            project.project_references.len(),
            project.packages.len()
        );

        Ok(project)
    }

    /// Directory containing the project file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Fill `sources` from the default scan and `Compile` items.
    pub fn collect_sources(&mut self, excluded_dirs: &[String]) -> Result<(), DescriptorError> {
        let dir = normalize_path(self.dir());
        let mut sources = Vec::new();

        if self.default_compile_items {
            let intermediate = normalize_path(&dir.join(&self.intermediate_dir));
            let walker = WalkDir::new(&dir).follow_links(true).into_iter().filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !excluded_dirs.iter().any(|x| *x == name) && e.path() != intermediate.as_path()
            });

            for entry in walker.filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && has_cs_extension(entry.path()) {
                    sources.push(normalize_path(entry.path()));
                }
            }
        }

        for pattern in &self.compile_include {
            match glob::glob(&anchored_pattern(&dir, pattern)) {
                Ok(paths) => {
                    for path in paths.filter_map(|p| p.ok()) {
                        if path.is_file() {
                            sources.push(normalize_path(&path));
                        }
                    }
                }
                Err(e) => tracing::warn!("{}: bad Compile Include `{}`: {}", self.path.display(), pattern, e),
            }
        }

        let removes: Vec<Pattern> = self
            .compile_remove
            .iter()
            .filter_map(|pattern| {
                match Pattern::new(&anchored_pattern(&dir, pattern)) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!("{}: bad Compile Remove `{}`: {}", self.path.display(), pattern, e);
                        None
                    }
                }
            })
            .collect();

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        sources.retain(|src| !removes.iter().any(|p| p.matches_path_with(src, options)));

        sources.sort();
        sources.dedup();

        if sources.is_empty() {
            return Err(DescriptorError::NoSources {
                path: self.path.clone(),
            });
        }

        self.sources = sources;
        Ok(())
    }
}

/// Absolute glob for a project-relative item pattern. The literal leading
/// components are normalized (so `..` works) and escaped.
fn anchored_pattern(dir: &Path, pattern: &str) -> String {
    let mut literal = PathBuf::new();
    let mut rest: Vec<&str> = Vec::new();
    for component in pattern.split('/').filter(|c| !c.is_empty()) {
        if rest.is_empty() && !component.contains(['*', '?', '[']) {
            literal.push(component);
        } else {
            rest.push(component);
        }
    }

    let mut full = Pattern::escape(&normalize_path(&dir.join(literal)).to_string_lossy());
    for component in rest {
        full.push('/');
        full.push_str(component);
    }
    full
}

fn has_cs_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("cs"))
        .unwrap_or(false)
}
