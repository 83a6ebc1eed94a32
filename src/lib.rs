//! ninjagen - Ninja build scripts from multi-configuration C/C++ project models
//!
//! This crate provides the project model, the toolchain descriptions and the
//! build graph compiler behind the `ninjagen` command.

pub mod core;
pub mod ninja;
pub mod ops;
pub mod toolchain;
pub mod util;

/// Test utilities and fixtures for ninjagen unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{manifest::Manifest, project::Project, workspace::Workspace};
pub use ninja::{generate, BuildGraph, GenerateError, GenerateWarning, Generation};
pub use util::context::GlobalContext;
