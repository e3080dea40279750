//! Where assemblies come from.
//!
//! Two read-only sources are consulted: the local NuGet package cache and the
//! directories of the installed runtime.

pub mod packages;
pub mod runtime;

pub use packages::PackageCache;
pub use runtime::RuntimeLibraries;
