//! Configuration file support for ninjagen.
//!
//! ninjagen reads two configuration file locations:
//! - Global: `~/.ninjagen/config.toml` - User-wide defaults
//! - Project: `.ninjagen/config.toml` next to ninjagen.toml - Project overrides
//!
//! Project config takes precedence over global config; command line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::{TargetOs, ToolchainKind};

/// Directory holding ninjagen's own files.
pub const CONFIG_DIR: &str = ".ninjagen";

/// ninjagen configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generate: GenerateConfig,
}

/// Defaults for `ninjagen generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenerateConfig {
    /// Toolchain family (gcc, clang, msvc, emcc)
    pub toolchain: Option<String>,

    /// OS family of the native platform (windows, linux, macos, web)
    pub target_os: Option<String>,

    /// Treat unrecognized source files as errors
    pub strict: Option<bool>,

    /// Also write compile_commands.json
    pub compile_commands: Option<bool>,

    /// Build directory, relative to the manifest directory
    pub build_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let generate = other.generate;
        if generate.toolchain.is_some() {
            self.generate.toolchain = generate.toolchain;
        }
        if generate.target_os.is_some() {
            self.generate.target_os = generate.target_os;
        }
        if generate.strict.is_some() {
            self.generate.strict = generate.strict;
        }
        if generate.compile_commands.is_some() {
            self.generate.compile_commands = generate.compile_commands;
        }
        if generate.build_dir.is_some() {
            self.generate.build_dir = generate.build_dir;
        }
    }

    /// Parse the configured toolchain. Invalid values are reported and
    /// ignored.
    pub fn toolchain(&self) -> Option<ToolchainKind> {
        parse_or_warn(self.generate.toolchain.as_deref(), "generate.toolchain")
    }

    /// Parse the configured target OS. Invalid values are reported and
    /// ignored.
    pub fn target_os(&self) -> Option<TargetOs> {
        parse_or_warn(self.generate.target_os.as_deref(), "generate.target-os")
    }
}

fn parse_or_warn<T>(value: Option<&str>, key: &str) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match value?.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("ignoring config key `{}`: {}", key, e);
            None
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.ninjagen/config.toml)
/// 2. Global config (~/.ninjagen/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global ninjagen config directory (~/.ninjagen).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.ninjagen/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.ninjagen/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}
