//! High-level operations.
//!
//! This module contains the implementation of sdkgraph commands.

pub mod discover;
pub mod load;

pub use discover::{discover, Discovered};
pub use load::{load_references, load_workspace, resolve_packages, PackageClosure};
