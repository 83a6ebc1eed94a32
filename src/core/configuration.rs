//! Build configurations and layered settings.
//!
//! Settings are declared at four layers: workspace, workspace configuration,
//! project and project configuration. They are flattened once per
//! (project, configuration) pair into a [`ResolvedSettings`] value, so later
//! stages never walk back up the layers.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::platform::PlatformProfile;

/// Optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimize {
    #[default]
    #[serde(alias = "none")]
    Off,
    Size,
    #[serde(alias = "on")]
    Speed,
    Full,
}

/// Warning level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Warnings {
    #[default]
    Default,
    Extra,
    Off,
}

/// One layer of build settings. Lists accumulate across layers, scalars
/// declared at a more specific layer win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Preprocessor defines, `NAME` or `NAME=VALUE`
    pub defines: Vec<String>,
    #[serde(alias = "includedirs")]
    pub include_dirs: Vec<PathBuf>,
    #[serde(alias = "libdirs")]
    pub lib_dirs: Vec<PathBuf>,
    /// Flags for every compiled file
    pub cflags: Vec<String>,
    /// Flags for C++ files only
    pub cxxflags: Vec<String>,
    pub ldflags: Vec<String>,
    /// System libraries, appended last on the link line
    #[serde(alias = "links")]
    pub system_libs: Vec<String>,
    pub optimize: Option<Optimize>,
    pub symbols: Option<bool>,
    pub warnings: Option<Warnings>,
}

impl Settings {
    /// Default settings implied by a conventional configuration name.
    pub fn preset(config_name: &str) -> Settings {
        match config_name.to_ascii_lowercase().as_str() {
            "debug" => Settings {
                symbols: Some(true),
                ..Settings::default()
            },
            "release" => Settings {
                optimize: Some(Optimize::Speed),
                ..Settings::default()
            },
            _ => Settings::default(),
        }
    }
}

/// Settings flattened for one (project, configuration) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSettings {
    pub defines: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub ldflags: Vec<String>,
    pub system_libs: Vec<String>,
    pub optimize: Optimize,
    pub symbols: bool,
    pub warnings: Warnings,
}

impl ResolvedSettings {
    /// Flatten layers, least specific first.
    pub fn resolve<'a>(layers: impl IntoIterator<Item = &'a Settings>) -> ResolvedSettings {
        let mut out = ResolvedSettings::default();
        for layer in layers {
            extend_unique(&mut out.defines, &layer.defines);
            extend_unique(&mut out.include_dirs, &layer.include_dirs);
            extend_unique(&mut out.lib_dirs, &layer.lib_dirs);
            // Flags may legitimately repeat (e.g. `-framework Foo`), keep them all.
            out.cflags.extend(layer.cflags.iter().cloned());
            out.cxxflags.extend(layer.cxxflags.iter().cloned());
            out.ldflags.extend(layer.ldflags.iter().cloned());
            extend_unique(&mut out.system_libs, &layer.system_libs);
            if let Some(o) = layer.optimize {
                out.optimize = o;
            }
            if let Some(s) = layer.symbols {
                out.symbols = s;
            }
            if let Some(w) = layer.warnings {
                out.warnings = w;
            }
        }
        out
    }
}

fn extend_unique<T: Clone + PartialEq>(dst: &mut Vec<T>, src: &[T]) {
    for item in src {
        if !dst.contains(item) {
            dst.push(item.clone());
        }
    }
}

/// A configuration axis: configuration name crossed with a platform profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub name: String,
    pub platform: PlatformProfile,
}

impl Configuration {
    pub fn new(name: impl Into<String>, platform: PlatformProfile) -> Self {
        Configuration {
            name: name.into(),
            platform,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.name, self.platform.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_accumulate_and_override() {
        let ws = Settings {
            defines: vec!["WS".into()],
            optimize: Some(Optimize::Size),
            cflags: vec!["-Wall".into()],
            ..Settings::default()
        };
        let cfg = Settings {
            defines: vec!["NDEBUG".into(), "WS".into()],
            optimize: Some(Optimize::Speed),
            ..Settings::default()
        };
        let prj = Settings {
            cflags: vec!["-Wall".into()],
            symbols: Some(false),
            ..Settings::default()
        };

        let resolved = ResolvedSettings::resolve([&ws, &cfg, &prj]);
        assert_eq!(resolved.defines, vec!["WS", "NDEBUG"]);
        assert_eq!(resolved.optimize, Optimize::Speed);
        assert_eq!(resolved.cflags, vec!["-Wall", "-Wall"]);
        assert!(!resolved.symbols);
    }

    #[test]
    fn test_presets() {
        let debug = ResolvedSettings::resolve([&Settings::preset("Debug")]);
        assert!(debug.symbols);
        assert_eq!(debug.optimize, Optimize::Off);

        let release = ResolvedSettings::resolve([&Settings::preset("release")]);
        assert!(!release.symbols);
        assert_eq!(release.optimize, Optimize::Speed);

        assert_eq!(Settings::preset("profile"), Settings::default());
    }
}
