//! Core data structures for ninjagen.
//!
//! This module contains the project model the generator works from:
//! - Target and file kinds
//! - Platform profiles and configurations with layered settings
//! - Projects and the workspace that owns them
//! - The ninjagen.toml reader

pub mod configuration;
pub mod errors;
pub mod manifest;
pub mod platform;
pub mod project;
pub mod target;
pub mod workspace;

pub use configuration::{Configuration, ResolvedSettings, Settings};
pub use errors::ModelError;
pub use manifest::{find_manifest, Manifest, ModelOptions, MANIFEST_NAME};
pub use platform::{PlatformProfile, TargetOs, ToolchainKind};
pub use project::{Project, SourceFile};
pub use target::TargetKind;
pub use workspace::Workspace;
