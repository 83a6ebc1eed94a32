//! Platform profiles - which OS family we produce binaries for and which
//! toolchain produces them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system family of the produced artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Windows,
    #[serde(alias = "posix", alias = "unix")]
    Linux,
    #[serde(alias = "macosx", alias = "darwin", alias = "apple")]
    Macos,
    /// Emscripten-class WebAssembly targets
    #[serde(alias = "emscripten", alias = "wasm")]
    Web,
}

impl TargetOs {
    /// The OS this generator binary was compiled for.
    pub fn host() -> TargetOs {
        if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "macos") {
            TargetOs::Macos
        } else {
            TargetOs::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Linux => "linux",
            TargetOs::Macos => "macos",
            TargetOs::Web => "web",
        }
    }

    /// Whether the platform can load shared libraries at run time.
    pub fn supports_shared_libs(&self) -> bool {
        !matches!(self, TargetOs::Web)
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, TargetOs::Windows)
    }

    /// Platforms whose shared objects need position independent code.
    pub fn needs_pic(&self) -> bool {
        matches!(self, TargetOs::Linux)
    }

    /// The toolchain assumed when none is configured.
    pub fn default_toolchain(&self) -> ToolchainKind {
        match self {
            TargetOs::Windows => ToolchainKind::Msvc,
            TargetOs::Macos => ToolchainKind::Clang,
            TargetOs::Linux => ToolchainKind::Gcc,
            TargetOs::Web => ToolchainKind::Emscripten,
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" | "win64" => Ok(TargetOs::Windows),
            "linux" | "posix" | "unix" => Ok(TargetOs::Linux),
            "macos" | "macosx" | "darwin" | "apple" => Ok(TargetOs::Macos),
            "web" | "emscripten" | "wasm" => Ok(TargetOs::Web),
            _ => Err(format!(
                "unknown target os `{}`, valid values: windows, linux, macos, web",
                s
            )),
        }
    }
}

/// Compiler family used to spell commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainKind {
    Gcc,
    Clang,
    Msvc,
    #[serde(alias = "emcc")]
    Emscripten,
}

impl ToolchainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainKind::Gcc => "gcc",
            ToolchainKind::Clang => "clang",
            ToolchainKind::Msvc => "msvc",
            ToolchainKind::Emscripten => "emcc",
        }
    }
}

impl fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolchainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" | "gnu" => Ok(ToolchainKind::Gcc),
            "clang" | "llvm" => Ok(ToolchainKind::Clang),
            "msvc" | "cl" | "vs" => Ok(ToolchainKind::Msvc),
            "emcc" | "emscripten" => Ok(ToolchainKind::Emscripten),
            _ => Err(format!(
                "unknown toolchain `{}`, valid values: gcc, clang, msvc, emcc",
                s
            )),
        }
    }
}

/// How a linker is told that a set of static libraries reference each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkGroupStyle {
    /// `--start-group` / `--end-group`
    Directive,
    /// List the group members once more for every member.
    Repeat,
    /// The linker rescans every archive on its own (link.exe, ld64).
    #[serde(alias = "none")]
    Unordered,
}

/// Paths to the tools of a toolchain, when the defaults are not wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOverrides {
    pub cc: Option<String>,
    pub cxx: Option<String>,
    pub ar: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "as")]
    pub assembler: Option<String>,
}

/// A platform axis of the workspace: OS family plus toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Name used in directory names and aggregate targets.
    pub name: String,
    pub os: TargetOs,
    pub toolchain: ToolchainKind,
    /// Overrides the toolchain's own link group capability.
    pub link_groups: Option<LinkGroupStyle>,
    pub tools: ToolOverrides,
}

impl PlatformProfile {
    pub fn new(name: impl Into<String>, os: TargetOs, toolchain: ToolchainKind) -> Self {
        PlatformProfile {
            name: name.into(),
            os,
            toolchain,
            link_groups: None,
            tools: ToolOverrides::default(),
        }
    }

    /// The profile used when the workspace declares no platforms.
    pub fn native(toolchain: Option<ToolchainKind>) -> Self {
        let os = TargetOs::host();
        PlatformProfile::new("native", os, toolchain.unwrap_or(os.default_toolchain()))
    }

    pub fn with_link_groups(mut self, style: LinkGroupStyle) -> Self {
        self.link_groups = Some(style);
        self
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.os, self.toolchain)
    }
}
