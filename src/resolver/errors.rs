//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::framework::RuntimeFlavor;
use crate::resolver::assets::AssetsError;
use crate::resolver::version::VersionError;
use crate::util::diagnostic::{suggestions, Diagnostic, Subject};

/// Fatal error while turning a project's packages into assemblies.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot resolve version of `{package}`")]
    Version {
        package: String,
        requirement: String,
        #[source]
        source: VersionError,
    },

    #[error(transparent)]
    Assets(#[from] AssetsError),

    #[error("`{library}` not found for {flavor} / {target}")]
    MissingRuntimeLibrary {
        library: String,
        flavor: RuntimeFlavor,
        target: String,
        searched: Vec<PathBuf>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Version {
                package,
                requirement,
                source,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "cannot resolve version `{}` of package `{}`",
                    requirement, package
                ))
                .about(Subject::Package {
                    name: package.clone(),
                    requirement: requirement.clone(),
                })
                .note(source.to_string());

                match source {
                    VersionError::MinimumNotInstalled { available, .. } if !available.is_empty() => {
                        diag = diag.note(format!("installed versions: {}", available.join(", ")));
                    }
                    VersionError::UnresolvedMacro(_) => {
                        diag = diag.suggest("Define the property in the project or in Directory.Build.props");
                    }
                    VersionError::FloatingUnsupported(_) => {
                        diag = diag
                            .suggest(suggestions::RESTORE)
                            .suggest("Set `floating_minimum = true` under [resolve] in config.toml");
                    }
                    _ => {}
                }

                diag.suggest(suggestions::PIN_VERSION)
            }

            ResolveError::Assets(err) => Diagnostic::error(err.to_string())
                .about(Subject::Path(err.path().to_path_buf()))
                .suggest(suggestions::RESTORE),

            ResolveError::MissingRuntimeLibrary {
                library,
                flavor,
                target,
                searched,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "`{}` not found for {} / {}",
                    library, flavor, target
                ));

                for path in searched {
                    diag = diag.note(format!("looked at {}", path.display()));
                }

                diag.suggest(suggestions::RUNTIME_DIRS)
            }
        }
    }
}
