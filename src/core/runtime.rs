//! Runtime configuration shared by every project in a graph.

use serde::Serialize;

use crate::core::framework::{RuntimeFlavor, TargetFramework};
use crate::core::language::LanguageVersion;

/// Which runtime the project set compiles against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    flavor: RuntimeFlavor,
    target_framework: TargetFramework,
    language_version: LanguageVersion,
}

impl RuntimeConfig {
    pub fn new(
        flavor: RuntimeFlavor,
        target_framework: TargetFramework,
        language_version: LanguageVersion,
    ) -> Self {
        RuntimeConfig {
            flavor,
            target_framework,
            language_version,
        }
    }

    /// Select the runtime from the root project's target framework and the
    /// language versions of all projects.
    ///
    /// The flavor follows the target unless `forced`; the language version is
    /// the highest any project asks for.
    pub fn select<I>(root_target: &TargetFramework, languages: I, forced: Option<RuntimeFlavor>) -> Self
    where
        I: IntoIterator<Item = LanguageVersion>,
    {
        let derived = RuntimeFlavor::for_target(root_target);
        let flavor = match forced {
            Some(flavor) if flavor != derived => {
                tracing::info!("runtime forced to {} (target {} implies {})", flavor, root_target, derived);
                flavor
            }
            _ => derived,
        };

        let language_version = languages
            .into_iter()
            .max()
            .unwrap_or(LanguageVersion::BASELINE);

        tracing::info!(
            "runtime: {} / {} / C# {}",
            flavor,
            root_target,
            language_version
        );

        RuntimeConfig::new(flavor, root_target.clone(), language_version)
    }

    pub fn flavor(&self) -> RuntimeFlavor {
        self.flavor
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    pub fn language_version(&self) -> LanguageVersion {
        self.language_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_mono_for_framework_target() {
        let cfg = RuntimeConfig::select(
            &TargetFramework::parse("net472"),
            [LanguageVersion::CSharp7_3, LanguageVersion::CSharp9],
            None,
        );
        assert_eq!(cfg.flavor(), RuntimeFlavor::Mono);
        assert_eq!(cfg.target_framework().moniker(), "net472");
        assert_eq!(cfg.language_version(), LanguageVersion::CSharp9);
    }

    #[test]
    fn test_select_dotnet_and_max_language() {
        let cfg = RuntimeConfig::select(
            &TargetFramework::parse("net6.0"),
            [LanguageVersion::Latest, LanguageVersion::CSharp10, LanguageVersion::Preview],
            None,
        );
        assert_eq!(cfg.flavor(), RuntimeFlavor::DotNet);
        assert_eq!(cfg.language_version(), LanguageVersion::Latest);
    }

    #[test]
    fn test_forced_flavor() {
        let cfg = RuntimeConfig::select(
            &TargetFramework::parse("netcoreapp2.1"),
            std::iter::empty(),
            Some(RuntimeFlavor::DotNet),
        );
        assert_eq!(cfg.flavor(), RuntimeFlavor::DotNet);
        assert_eq!(cfg.language_version(), LanguageVersion::BASELINE);
    }
}
