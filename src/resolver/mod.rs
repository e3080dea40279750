//! Package resolution.
//!
//! Turns each project's direct package references into a transitive closure
//! (from the restore step's lock manifest) and then into assembly paths on
//! disk. All inputs are read up front; nothing here downloads packages.

pub mod assemblies;
pub mod assets;
pub mod closure;
pub mod errors;
pub mod version;

pub use assemblies::AssemblyResolver;
pub use assets::{AssetsError, LockManifest, NugetDependency};
pub use closure::{expand, ClosureStats, ConflictPolicy};
pub use errors::ResolveError;
pub use version::{parse_requirement, resolve_installed, VersionError, VersionRequirement};
