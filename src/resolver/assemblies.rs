//! Package closure -> assembly file paths.

use std::path::PathBuf;

use crate::core::framework::{select_variant, RuntimeFlavor, VariantFamily};
use crate::core::package::PackageSet;
use crate::core::runtime::RuntimeConfig;
use crate::resolver::errors::ResolveError;
use crate::resolver::version::{parse_requirement, resolve_installed, VersionError};
use crate::sources::{PackageCache, RuntimeLibraries};

/// Core libraries every dotnet compilation needs.
pub const DOTNET_EXTRAS: &[&str] = &[
    "System.Private.CoreLib.dll",
    "System.Runtime.dll",
    "System.Console.dll",
];

pub const MSCORLIB: &str = "mscorlib.dll";
pub const NETSTANDARD: &str = "netstandard.dll";

/// Resolves a project's packages against the package cache and the runtime.
pub struct AssemblyResolver<'a> {
    cache: &'a PackageCache,
    runtime_libs: &'a RuntimeLibraries,
    runtime: &'a RuntimeConfig,
    floating_minimum: bool,
}

impl<'a> AssemblyResolver<'a> {
    pub fn new(
        cache: &'a PackageCache,
        runtime_libs: &'a RuntimeLibraries,
        runtime: &'a RuntimeConfig,
    ) -> Self {
        AssemblyResolver {
            cache,
            runtime_libs,
            runtime,
            floating_minimum: false,
        }
    }

    pub fn floating_minimum(mut self, enabled: bool) -> Self {
        self.floating_minimum = enabled;
        self
    }

    /// Absolute paths of every assembly `packages` needs, runtime core
    /// libraries included, without duplicates.
    pub fn resolve(&self, packages: &PackageSet) -> Result<Vec<PathBuf>, ResolveError> {
        let target = self.runtime.target_framework();
        let flavor = self.runtime.flavor();

        let mut libraries = Vec::new();
        let mut needs_netstandard = false;
        let mut needs_mscorlib = false;

        for pkg in packages.iter() {
            let version_error = |source: VersionError| ResolveError::Version {
                package: pkg.name.clone(),
                requirement: pkg.version.clone(),
                source,
            };
            // Unsupported syntax fails even when the package is never loaded.
            let requirement = parse_requirement(&pkg.version).map_err(version_error)?;
            let file_name = format!("{}.dll", pkg.name);

            if let Some(provided) = self.runtime_libs.find(&file_name) {
                tracing::debug!("{} is provided by the runtime", pkg.name);
                libraries.push(provided);
                continue;
            }

            if !self.cache.is_installed(&pkg.name) {
                tracing::warn!(
                    "package {} not found in {}",
                    pkg.name,
                    self.cache.root().display()
                );
                continue;
            }

            let version = resolve_installed(
                &self.cache.package_dir(&pkg.name),
                &requirement,
                self.floating_minimum,
            )
            .map_err(version_error)?;

            let variants = self.cache.variants(&pkg.name, &version);
            if variants.is_empty() {
                tracing::warn!("package {} {} has no lib directory", pkg.name, version);
                continue;
            }

            let Some(variant) = select_variant(variants.iter().map(String::as_str), target, flavor) else {
                tracing::warn!(
                    "package {} {} has no assemblies usable from {} (has: {})",
                    pkg.name,
                    version,
                    target,
                    variants.join(", ")
                );
                continue;
            };

            match variant.family {
                VariantFamily::Standard => needs_netstandard = true,
                VariantFamily::Legacy => needs_mscorlib = true,
                VariantFamily::Core => {}
            }

            let dlls = match self.cache.assemblies(&pkg.name, &version, &variant.moniker) {
                Ok(dlls) => dlls,
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    continue;
                }
            };

            let chosen = dlls
                .iter()
                .find(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().eq_ignore_ascii_case(&file_name))
                        .unwrap_or(false)
                })
                .or_else(|| dlls.first());

            match chosen {
                Some(path) => {
                    tracing::debug!("{} {} -> {}", pkg.name, version, path.display());
                    libraries.push(path.clone());
                }
                None => tracing::warn!(
                    "package {} {} has no assemblies in lib/{}",
                    pkg.name,
                    version,
                    variant.moniker
                ),
            }
        }

        let mut extras: Vec<&str> = Vec::new();
        if flavor == RuntimeFlavor::Mono || needs_mscorlib {
            extras.push(MSCORLIB);
        }
        if flavor == RuntimeFlavor::DotNet {
            extras.extend_from_slice(DOTNET_EXTRAS);
        }
        if needs_netstandard {
            extras.push(NETSTANDARD);
        }

        for library in extras {
            let path = self.runtime_libs.find(library).ok_or_else(|| {
                ResolveError::MissingRuntimeLibrary {
                    library: library.to_string(),
                    flavor,
                    target: target.to_string(),
                    searched: self.runtime_libs.candidates(library),
                }
            })?;
            libraries.push(path);
        }

        let mut seen = std::collections::HashSet::new();
        libraries.retain(|p| seen.insert(p.clone()));
        Ok(libraries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::framework::TargetFramework;
    use crate::core::language::LanguageVersion;
    use crate::core::package::PackageRequirement;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    struct Env {
        _tmp: TempDir,
        cache: PackageCache,
        runtime_libs: RuntimeLibraries,
        runtime: RuntimeConfig,
    }

    fn dotnet_env() -> Env {
        let tmp = TempDir::new().unwrap();
        let runtime_dir = tmp.path().join("dotnet/shared/Microsoft.NETCore.App/6.0.7");
        for dll in DOTNET_EXTRAS.iter().chain([&NETSTANDARD, &"System.Memory.dll"]) {
            touch(&runtime_dir.join(dll));
        }
        let cache = PackageCache::new(tmp.path().join("packages"));
        Env {
            runtime_libs: RuntimeLibraries::new(runtime_dir, None),
            runtime: RuntimeConfig::new(
                RuntimeFlavor::DotNet,
                TargetFramework::parse("net6.0"),
                LanguageVersion::default(),
            ),
            cache,
            _tmp: tmp,
        }
    }

    #[test]
    fn test_no_packages_yields_extras() {
        let env = dotnet_env();
        let resolver = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime);
        let libs = resolver.resolve(&PackageSet::new()).unwrap();
        let names: Vec<_> = libs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, DOTNET_EXTRAS);
    }

    #[test]
    fn test_runtime_provided_assembly_wins() {
        let env = dotnet_env();
        touch(&env.cache.root().join("system.memory/4.5.4/lib/netstandard2.0/System.Memory.dll"));

        let packages: PackageSet = [PackageRequirement::transitive("System.Memory", "4.5.4")]
            .into_iter()
            .collect();
        let libs = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime)
            .resolve(&packages)
            .unwrap();

        assert_eq!(libs[0], env.runtime_libs.dir().join("System.Memory.dll"));
        // Not taken from the package, so netstandard.dll is not needed.
        assert_eq!(libs.len(), 1 + DOTNET_EXTRAS.len());
    }

    #[test]
    fn test_standard_variant_adds_netstandard() {
        let env = dotnet_env();
        let lib = env.cache.root().join("newtonsoft.json/13.0.1/lib");
        touch(&lib.join("net45/Newtonsoft.Json.dll"));
        touch(&lib.join("netstandard2.0/Aaa.Helper.dll"));
        touch(&lib.join("netstandard2.0/Newtonsoft.Json.dll"));

        let packages: PackageSet = [PackageRequirement::direct("Newtonsoft.Json", "[13.0.1]")]
            .into_iter()
            .collect();
        let libs = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime)
            .resolve(&packages)
            .unwrap();

        assert_eq!(libs[0], lib.join("netstandard2.0/Newtonsoft.Json.dll"));
        assert!(libs.last().unwrap().ends_with(NETSTANDARD));
    }

    #[test]
    fn test_missing_package_and_variant_are_skipped() {
        let env = dotnet_env();
        touch(&env.cache.root().join("winonly/1.0.0/lib/net6.0-windows7.0/WinOnly.dll"));

        let packages: PackageSet = [
            PackageRequirement::direct("Missing", "1.0.0"),
            PackageRequirement::direct("WinOnly", "1.0.0"),
        ]
        .into_iter()
        .collect();
        let libs = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime)
            .resolve(&packages)
            .unwrap();
        assert_eq!(libs.len(), DOTNET_EXTRAS.len());
    }

    #[test]
    fn test_version_errors_are_fatal() {
        let env = dotnet_env();
        touch(&env.cache.root().join("p/1.0.0/lib/net6.0/P.dll"));

        let packages: PackageSet = [PackageRequirement::direct("P", "[1.0,2.0)")]
            .into_iter()
            .collect();
        let err = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime)
            .resolve(&packages)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Version { ref package, .. } if package == "P"));
    }

    #[test]
    fn test_unsupported_syntax_fails_without_cache_entry() {
        let env = dotnet_env();
        let resolver = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime);

        for requirement in ["[1.0,2.0)", "1.*", "(1.0]"] {
            let packages: PackageSet = [PackageRequirement::direct("NotCached", requirement)]
                .into_iter()
                .collect();
            let err = resolver.resolve(&packages).unwrap_err();
            assert!(
                matches!(err, ResolveError::Version { ref package, .. } if package == "NotCached"),
                "{} should be rejected",
                requirement
            );
        }
    }

    #[test]
    fn test_range_on_runtime_provided_package_fails() {
        let env = dotnet_env();
        let packages: PackageSet = [PackageRequirement::transitive("System.Memory", "[4.5,)")]
            .into_iter()
            .collect();
        let err = AssemblyResolver::new(&env.cache, &env.runtime_libs, &env.runtime)
            .resolve(&packages)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Version { .. }));
    }

    #[test]
    fn test_standard_target_without_packages_needs_no_netstandard() {
        let tmp = TempDir::new().unwrap();
        let runtime_dir = tmp.path().join("dotnet/shared/Microsoft.NETCore.App/6.0.7");
        for dll in DOTNET_EXTRAS {
            touch(&runtime_dir.join(dll));
        }
        let cache = PackageCache::new(tmp.path().join("packages"));
        let runtime_libs = RuntimeLibraries::new(runtime_dir, None);
        let runtime = RuntimeConfig::new(
            RuntimeFlavor::DotNet,
            TargetFramework::parse("netstandard2.0"),
            LanguageVersion::default(),
        );

        let libs = AssemblyResolver::new(&cache, &runtime_libs, &runtime)
            .resolve(&PackageSet::new())
            .unwrap();
        assert_eq!(libs.len(), DOTNET_EXTRAS.len());
        assert!(!libs.iter().any(|p| p.ends_with(NETSTANDARD)));
    }

    #[test]
    fn test_missing_extra_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let cache = PackageCache::new(tmp.path().join("packages"));
        let runtime_libs = RuntimeLibraries::new(tmp.path().join("4.6.1-api"), None);
        let runtime = RuntimeConfig::new(
            RuntimeFlavor::Mono,
            TargetFramework::parse("net472"),
            LanguageVersion::default(),
        );

        let err = AssemblyResolver::new(&cache, &runtime_libs, &runtime)
            .resolve(&PackageSet::new())
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingRuntimeLibrary { ref library, .. } if library == MSCORLIB));
    }
}
