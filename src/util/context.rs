//! Global context for ninjagen operations.
//!
//! Provides centralized access to the working directory, the manifest
//! location and the layered tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::{find_manifest, MANIFEST_NAME};
use crate::util::config::{self, Config, CONFIG_DIR};
use crate::util::diagnostic::suggestions;

/// Global context containing paths and environment.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global ninjagen data (~/.ninjagen/)
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            home: config::global_config_dir(),
        }
    }

    /// Use `home` instead of `~/.ninjagen`.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the ninjagen home directory (~/.ninjagen/), if a home exists.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    /// Make `path` absolute against the working directory.
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Locate the manifest: `explicit` when given (a file or a directory
    /// holding ninjagen.toml), otherwise the nearest ninjagen.toml at or
    /// above the working directory.
    pub fn find_manifest(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            let path = self.absolutize(path);
            let path = if path.is_dir() {
                path.join(MANIFEST_NAME)
            } else {
                path
            };
            if !path.is_file() {
                bail!(
                    "could not find `{}`\n{}",
                    path.display(),
                    suggestions::NO_MANIFEST
                );
            }
            return Ok(path);
        }

        match find_manifest(&self.cwd) {
            Some(path) => Ok(path),
            None => bail!(
                "could not find `{}` in `{}` or any parent directory\n{}",
                MANIFEST_NAME,
                self.cwd.display(),
                suggestions::NO_MANIFEST
            ),
        }
    }

    /// Configuration for the workspace rooted at `manifest_dir`: global
    /// settings overridden by `.ninjagen/config.toml` next to the manifest.
    pub fn load_config(&self, manifest_dir: &Path) -> Config {
        let project = manifest_dir.join(CONFIG_DIR).join("config.toml");
        config::load_config(self.config_path().as_deref(), &project)
    }
}
