//! On-disk fixtures for discovery and resolution tests.
//!
//! Layout under the temporary directory:
//!
//! ```text
//! ws/        workspace root (projects live here)
//! packages/  extracted package cache
//! dotnet/    dotnet installation root
//! mono/      mono library root
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tempfile::TempDir;

use crate::core::workspace::{Workspace, ASSETS_FILE_NAME, DEFAULT_INTERMEDIATE_DIR};
use crate::resolver::assemblies::{DOTNET_EXTRAS, MSCORLIB, NETSTANDARD};
use crate::sources::runtime::NETCORE_APP_DIR;
use crate::util::config::{Config, DEFAULT_MONO_FACADES};

/// One `project.assets.json` entry: name, version, dependencies.
pub type AssetRecord<'a> = (&'a str, &'a str, &'a [(&'a str, &'a str)]);

/// A temporary workspace with its own package cache and runtimes.
pub struct Fixture {
    _tmp: TempDir,
    root: PathBuf,
    base: PathBuf,
    config: Config,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().to_path_buf();
        let root = base.join("ws");
        fs::create_dir_all(&root).unwrap();

        let mut config = Config::default();
        config.packages.cache_dir = Some(base.join("packages"));
        config.runtime.dotnet_root = Some(base.join("dotnet"));
        config.runtime.mono_root = Some(base.join("mono"));

        Fixture {
            _tmp: tmp,
            root,
            base,
            config,
        }
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Workspace rooted at the fixture root, starting there.
    pub fn workspace(&self) -> Workspace {
        Workspace::with_config(&self.root, None, self.config.clone()).unwrap()
    }

    /// Workspace rooted at the fixture root, starting in `dir`.
    pub fn workspace_at(&self, dir: &str) -> Workspace {
        Workspace::with_config(&self.root, Some(Path::new(dir)), self.config.clone()).unwrap()
    }

    /// Write a file relative to the workspace root.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.root.join(rel), content)
    }

    /// Write `<dir>/<name>.csproj` and a single `<dir>/<name>.cs`.
    pub fn project(
        &self,
        dir: &str,
        name: &str,
        tfm: &str,
        references: &[&str],
        packages: &[(&str, &str)],
    ) -> PathBuf {
        let mut xml = String::from("<Project Sdk=\"Microsoft.NET.Sdk\">\n");
        xml.push_str(&format!(
            "  <PropertyGroup>\n    <TargetFramework>{}</TargetFramework>\n  </PropertyGroup>\n",
            tfm
        ));

        if !references.is_empty() {
            xml.push_str("  <ItemGroup>\n");
            for r in references {
                xml.push_str(&format!("    <ProjectReference Include=\"{}\" />\n", r));
            }
            xml.push_str("  </ItemGroup>\n");
        }

        if !packages.is_empty() {
            xml.push_str("  <ItemGroup>\n");
            for (package, version) in packages {
                xml.push_str(&format!(
                    "    <PackageReference Include=\"{}\" Version=\"{}\" />\n",
                    package, version
                ));
            }
            xml.push_str("  </ItemGroup>\n");
        }
        xml.push_str("</Project>\n");

        let dir = self.root.join(dir);
        write_file(&dir.join(format!("{}.cs", name)), &format!("class {} {{ }}\n", name));
        write_file(&dir.join(format!("{}.csproj", name)), &xml)
    }

    /// Write `<dir>/obj/project.assets.json` with a single target.
    pub fn assets(&self, dir: &str, records: &[AssetRecord<'_>]) -> PathBuf {
        let mut libraries = Map::new();
        for (name, version, deps) in records {
            let mut entry = Map::new();
            entry.insert("type".to_string(), json!("package"));
            if !deps.is_empty() {
                let deps: Map<String, Value> = deps
                    .iter()
                    .map(|(n, v)| (n.to_string(), json!(v)))
                    .collect();
                entry.insert("dependencies".to_string(), Value::Object(deps));
            }
            libraries.insert(format!("{}/{}", name, version), Value::Object(entry));
        }

        let doc = json!({
            "version": 3,
            "targets": { "net6.0": libraries },
        });
        let path = self
            .root
            .join(dir)
            .join(DEFAULT_INTERMEDIATE_DIR)
            .join(ASSETS_FILE_NAME);
        write_file(&path, &serde_json::to_string_pretty(&doc).unwrap())
    }

    /// Install `<name>.dll` for one variant of a package.
    pub fn package(&self, name: &str, version: &str, variant: &str) -> PathBuf {
        let path = self
            .packages_dir()
            .join(name.to_ascii_lowercase())
            .join(version)
            .join("lib")
            .join(variant)
            .join(format!("{}.dll", name));
        write_file(&path, "")
    }

    /// Install a dotnet shared runtime with the usual extras.
    pub fn dotnet_runtime(&self, version: &str) -> PathBuf {
        let dir = self.base.join("dotnet").join(NETCORE_APP_DIR).join(version);
        for dll in DOTNET_EXTRAS.iter().chain([&NETSTANDARD]) {
            write_file(&dir.join(dll), "");
        }
        dir
    }

    /// Install a mono reference-assembly directory plus the facades.
    pub fn mono_runtime(&self, api: &str) -> PathBuf {
        let root = self.base.join("mono");
        write_file(&root.join(DEFAULT_MONO_FACADES).join(NETSTANDARD), "");
        let dir = root.join(api);
        write_file(&dir.join(MSCORLIB), "");
        dir
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.base.join("packages")
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
