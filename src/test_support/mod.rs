//! Test utilities for sdkgraph unit tests.
//!
//! Provides [`fixtures::Fixture`], an on-disk workspace in a temporary
//! directory together with a package cache and runtime installations
//! the loader can be pointed at.

pub mod fixtures;

pub use fixtures::Fixture;
