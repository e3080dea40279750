//! CLI integration tests for sdkgraph.
//!
//! Each test builds a workspace, a package cache and a dotnet installation
//! in a temporary directory and runs the binary against them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temporary workspace plus the directories the binary is pointed at.
struct Env {
    tmp: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Env {
            tmp: TempDir::new().unwrap(),
        };
        fs::create_dir_all(env.ws()).unwrap();
        fs::create_dir_all(env.tmp.path().join("home")).unwrap();
        env
    }

    fn ws(&self) -> PathBuf {
        self.tmp.path().join("ws")
    }

    fn packages(&self) -> PathBuf {
        self.tmp.path().join("packages")
    }

    fn dotnet(&self) -> PathBuf {
        self.tmp.path().join("dotnet")
    }

    /// The sdkgraph binary, isolated from the user's configuration.
    fn sdkgraph(&self) -> Command {
        let home = self.tmp.path().join("home");
        let mut cmd = Command::cargo_bin("sdkgraph").unwrap();
        cmd.current_dir(self.ws())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env_remove("NUGET_PACKAGES")
            .env_remove("DOTNET_ROOT")
            .arg("--no-color")
            .arg("--packages")
            .arg(self.packages())
            .arg("--dotnet-root")
            .arg(self.dotnet());
        cmd
    }

    fn write(&self, rel: &str, content: &str) {
        write_file(&self.ws().join(rel), content);
    }

    fn project(&self, dir: &str, name: &str, tfm: &str, refs: &[&str], packages: &[(&str, &str)]) {
        let mut xml = format!(
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>{}</TargetFramework>\n  </PropertyGroup>\n  <ItemGroup>\n",
            tfm
        );
        for r in refs {
            xml.push_str(&format!("    <ProjectReference Include=\"{}\" />\n", r));
        }
        for (p, v) in packages {
            xml.push_str(&format!("    <PackageReference Include=\"{}\" Version=\"{}\" />\n", p, v));
        }
        xml.push_str("  </ItemGroup>\n</Project>\n");

        let base = if dir.is_empty() { String::new() } else { format!("{}/", dir) };
        self.write(&format!("{}{}.csproj", base, name), &xml);
        self.write(&format!("{}{}.cs", base, name), &format!("class {} {{ }}\n", name));
    }

    fn package(&self, name: &str, version: &str, variant: &str) {
        let dir = self
            .packages()
            .join(name.to_ascii_lowercase())
            .join(version)
            .join("lib")
            .join(variant);
        write_file(&dir.join(format!("{}.dll", name)), "");
    }

    fn dotnet_runtime(&self, version: &str) {
        let dir = self.dotnet().join("shared/Microsoft.NETCore.App").join(version);
        for dll in [
            "System.Private.CoreLib.dll",
            "System.Runtime.dll",
            "System.Console.dll",
            "netstandard.dll",
        ] {
            write_file(&dir.join(dll), "");
        }
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const ASSETS_P_Q: &str = r#"{
  "version": 3,
  "targets": {
    "net6.0": {
      "P/1.0.0": { "type": "package", "dependencies": { "Q": "2.0.0" } },
      "Q/2.0.0": { "type": "package" }
    }
  }
}"#;

// ============================================================================
// sdkgraph resolve
// ============================================================================

#[test]
fn test_resolve_without_project_fails() {
    let env = Env::new();

    env.sdkgraph()
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: no project found"))
        .stderr(predicate::str::contains("help:"));
}

#[test]
fn test_resolve_prints_runtime_and_assemblies() {
    let env = Env::new();
    env.dotnet_runtime("6.0.7");
    env.project("", "App", "net6.0", &[], &[("P", "1.0.0")]);
    env.write("obj/project.assets.json", ASSETS_P_Q);
    env.package("P", "1.0.0", "net6.0");
    env.package("Q", "2.0.0", "netstandard2.0");

    env.sdkgraph()
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("runtime: dotnet net6.0"))
        .stdout(predicate::str::contains("App.csproj [net6.0"))
        .stdout(predicate::str::contains("Q 2.0.0 (transitive)"))
        .stdout(predicate::str::contains("P.dll"))
        .stdout(predicate::str::contains("Q.dll"))
        .stdout(predicate::str::contains("netstandard.dll"))
        .stdout(predicate::str::contains("System.Runtime.dll"));
}

#[test]
fn test_resolve_json() {
    let env = Env::new();
    env.dotnet_runtime("6.0.7");
    env.project("App", "App", "net6.0", &["../Lib/Lib.csproj"], &[]);
    env.project("Lib", "Lib", "netstandard2.0", &[], &[]);

    let output = env
        .sdkgraph()
        .args(["resolve", "App", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root"], "App/App.csproj");
    assert_eq!(json["runtime"]["flavor"], "dotnet");
    assert_eq!(json["projects"].as_array().unwrap().len(), 2);
    assert_eq!(json["projects"][0]["name"], "Lib/Lib.csproj");
}

#[test]
fn test_resolve_from_other_directory() {
    let env = Env::new();
    env.dotnet_runtime("6.0.7");
    env.project("src/App", "App", "net6.0", &[], &[]);

    env.sdkgraph()
        .args(["-C", "src/App", "resolve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("App.csproj [net6.0"));
}

#[test]
fn test_resolve_cycle_fails() {
    let env = Env::new();
    env.project("A", "A", "net6.0", &["../B/B.csproj"], &[]);
    env.project("B", "B", "net6.0", &["../A/A.csproj"], &[]);

    env.sdkgraph()
        .args(["resolve", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "project reference cycle: A/A.csproj -> B/B.csproj -> A/A.csproj",
        ));
}

#[test]
fn test_resolve_version_range_fails() {
    let env = Env::new();
    env.dotnet_runtime("6.0.7");
    env.project("", "App", "net6.0", &[], &[("P", "[1.0,2.0)")]);
    env.package("P", "1.0.0", "net6.0");

    env.sdkgraph()
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot resolve version `[1.0,2.0)` of package `P`"))
        .stderr(predicate::str::contains("[1.2.3]"));
}

#[test]
fn test_resolve_missing_runtime_fails() {
    let env = Env::new();
    env.project("", "App", "net6.0", &[], &[]);

    env.sdkgraph()
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("System.Private.CoreLib.dll"));
}

// ============================================================================
// sdkgraph tree
// ============================================================================

#[test]
fn test_tree_marks_repeated_projects() {
    let env = Env::new();
    env.project("", "App", "net6.0", &["A/A.csproj", "B/B.csproj"], &[]);
    env.project("A", "A", "netstandard2.0", &["../C/C.csproj"], &[]);
    env.project("B", "B", "netstandard2.0", &["../C/C.csproj"], &[]);
    env.project("C", "C", "netstandard2.0", &[], &[]);

    env.sdkgraph()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("App.csproj [net6.0]\n├── A/A.csproj [netstandard2.0]"))
        .stdout(predicate::str::contains("│   ├── C/C.csproj [netstandard2.0]\n├── B/B.csproj"))
        .stdout(predicate::str::contains("│   ├── C/C.csproj [netstandard2.0] (*)"));
}

#[test]
fn test_tree_depth_limit() {
    let env = Env::new();
    env.project("", "App", "net6.0", &["A/A.csproj"], &[]);
    env.project("A", "A", "netstandard2.0", &["../C/C.csproj"], &[]);
    env.project("C", "C", "netstandard2.0", &[], &[]);

    env.sdkgraph()
        .args(["tree", "--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("├── A/A.csproj"))
        .stdout(predicate::str::contains("C/C.csproj").not());
}

#[test]
fn test_tree_unknown_project() {
    let env = Env::new();
    env.project("", "App", "net6.0", &[], &[]);

    env.sdkgraph()
        .args(["tree", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project `Nope` not found"));
}

// ============================================================================
// sdkgraph packages
// ============================================================================

#[test]
fn test_packages_lists_closure() {
    let env = Env::new();
    env.project("", "App", "net6.0", &[], &[("P", "1.0.0")]);
    env.write("obj/project.assets.json", ASSETS_P_Q);

    env.sdkgraph()
        .arg("packages")
        .assert()
        .success()
        .stdout(predicate::str::contains("App.csproj (2 package(s), 1 transitive, 1 iteration(s))"))
        .stdout(predicate::str::contains("  P 1.0.0\n"))
        .stdout(predicate::str::contains("  Q 2.0.0 (transitive)"));
}

#[test]
fn test_packages_without_assets_warns() {
    let env = Env::new();
    env.project("", "App", "net6.0", &[], &[("P", "1.0.0")]);

    env.sdkgraph()
        .arg("packages")
        .assert()
        .success()
        .stdout(predicate::str::contains("App.csproj (1 package(s), 0 transitive, 0 iteration(s))"))
        .stderr(predicate::str::contains("project.assets.json"));
}

// ============================================================================
// sdkgraph completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let env = Env::new();

    env.sdkgraph()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sdkgraph"));
}
