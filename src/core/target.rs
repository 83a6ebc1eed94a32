//! Target definitions - what gets built.
//!
//! A project produces exactly one artifact per configuration: a console
//! application, a windowed application, a static library or a shared library.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The kind of target being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Console executable
    #[serde(alias = "app", alias = "exe", alias = "ConsoleApp")]
    ConsoleApp,

    /// GUI executable (different link subsystem on Windows)
    #[serde(alias = "WindowedApp")]
    WindowedApp,

    /// Static library (.a / .lib)
    #[serde(alias = "staticlib", alias = "StaticLib")]
    StaticLib,

    /// Shared/dynamic library (.so / .dylib / .dll)
    #[serde(alias = "sharedlib", alias = "SharedLib")]
    SharedLib,
}

impl TargetKind {
    /// Check if this is an executable (console or windowed).
    pub fn is_application(&self) -> bool {
        matches!(self, TargetKind::ConsoleApp | TargetKind::WindowedApp)
    }

    /// Check if the terminal edge is a link (as opposed to an archive).
    pub fn needs_link(&self) -> bool {
        !matches!(self, TargetKind::StaticLib)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::ConsoleApp => "console-app",
            TargetKind::WindowedApp => "windowed-app",
            TargetKind::StaticLib => "static-lib",
            TargetKind::SharedLib => "shared-lib",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source language of a compiled file, which picks the link driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    C,
    Cxx,
}

/// What a listed file is, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    C,
    Cxx,
    /// GNU assembler source (`.s`, `.S`)
    GnuAsm,
    /// Microsoft macro assembler source (`.asm`)
    Masm,
    /// Headers are listed for IDEs but never compiled.
    Header,
    Unknown,
}

impl FileKind {
    /// Classify a path by extension. `.C` (upper case) is C++.
    pub fn of(path: &Path) -> FileKind {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileKind::Unknown;
        };

        match ext {
            "c" => FileKind::C,
            "C" | "cc" | "cpp" | "cxx" | "c++" | "cp" | "CPP" => FileKind::Cxx,
            "s" | "S" => FileKind::GnuAsm,
            "asm" => FileKind::Masm,
            "h" | "hh" | "hpp" | "hxx" | "h++" | "inl" | "ipp" | "tpp" => FileKind::Header,
            _ => FileKind::Unknown,
        }
    }

    /// The language whose driver links objects of this kind.
    pub fn language(&self) -> Language {
        match self {
            FileKind::Cxx => Language::Cxx,
            _ => Language::C,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::of(Path::new("src/main.c")), FileKind::C);
        assert_eq!(FileKind::of(Path::new("src/main.cpp")), FileKind::Cxx);
        assert_eq!(FileKind::of(Path::new("src/main.C")), FileKind::Cxx);
        assert_eq!(FileKind::of(Path::new("asm/test.S")), FileKind::GnuAsm);
        assert_eq!(FileKind::of(Path::new("asm/test.asm")), FileKind::Masm);
        assert_eq!(FileKind::of(Path::new("include/a.hpp")), FileKind::Header);
        assert_eq!(FileKind::of(Path::new("README.md")), FileKind::Unknown);
        assert_eq!(FileKind::of(Path::new("Makefile")), FileKind::Unknown);
    }

    #[test]
    fn test_target_kind_parse() {
        #[derive(Deserialize)]
        struct Wrap {
            kind: TargetKind,
        }

        let w: Wrap = toml::from_str("kind = \"static-lib\"").unwrap();
        assert_eq!(w.kind, TargetKind::StaticLib);
        let w: Wrap = toml::from_str("kind = \"app\"").unwrap();
        assert_eq!(w.kind, TargetKind::ConsoleApp);
        let w: Wrap = toml::from_str("kind = \"WindowedApp\"").unwrap();
        assert_eq!(w.kind, TargetKind::WindowedApp);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(TargetKind::WindowedApp.is_application());
        assert!(!TargetKind::StaticLib.needs_link());
        assert!(TargetKind::SharedLib.needs_link());
    }
}
