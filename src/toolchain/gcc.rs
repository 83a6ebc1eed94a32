//! GCC-style toolchains: GCC, Clang and Emscripten.

use crate::core::configuration::{Optimize, ResolvedSettings, Warnings};
use crate::core::platform::{LinkGroupStyle, TargetOs, ToolOverrides, ToolchainKind};
use crate::core::target::{FileKind, Language, TargetKind};
use crate::ninja::naming::Artifact;
use crate::toolchain::{tool, DepsFormat, RuleKind, RuleTemplate, Toolchain};

/// GCC/Clang/Emscripten toolchain.
#[derive(Debug, Clone)]
pub struct GccToolchain {
    family: ToolchainKind,
    os: TargetOs,
    cc: String,
    cxx: String,
    ar: String,
}

impl GccToolchain {
    /// Create a toolchain of `family`, using `tools` where set.
    pub fn new(family: ToolchainKind, os: TargetOs, tools: &ToolOverrides) -> Self {
        let (cc, cxx, ar) = match family {
            ToolchainKind::Clang => ("clang", "clang++", "ar"),
            ToolchainKind::Emscripten => ("emcc", "em++", "emar"),
            _ => ("gcc", "g++", "ar"),
        };

        GccToolchain {
            family,
            os,
            cc: tools.cc.clone().unwrap_or_else(|| cc.to_string()),
            cxx: tools.cxx.clone().unwrap_or_else(|| cxx.to_string()),
            ar: tools.ar.clone().unwrap_or_else(|| ar.to_string()),
        }
    }

    fn driver(&self, lang: Language) -> String {
        let path = match lang {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
        };
        tool(path, self.shell())
    }

    fn compile_template(&self, kind: RuleKind, lang: Language, label: &str) -> RuleTemplate {
        RuleTemplate::new(
            kind,
            format!(
                "{} $flags -MMD -MF $out.d -c $in -o $out",
                self.driver(lang)
            ),
            format!("{} $out", label),
        )
        .with_deps(DepsFormat::Gcc, Some("$out.d"))
    }
}

impl Toolchain for GccToolchain {
    fn kind(&self) -> ToolchainKind {
        self.family
    }

    fn os(&self) -> TargetOs {
        self.os
    }

    fn object_extension(&self) -> &'static str {
        "o"
    }

    fn compile_rule(&self, file: FileKind) -> Option<RuleTemplate> {
        match file {
            FileKind::C => Some(self.compile_template(RuleKind::Cc, Language::C, "cc")),
            FileKind::Cxx => Some(self.compile_template(RuleKind::Cxx, Language::Cxx, "cxx")),
            // The C driver preprocesses `.S` and assembles `.s`.
            FileKind::GnuAsm => Some(self.compile_template(RuleKind::GnuAs, Language::C, "as")),
            FileKind::Masm | FileKind::Header | FileKind::Unknown => None,
        }
    }

    fn archive_rule(&self) -> RuleTemplate {
        let ar = tool(&self.ar, self.shell());
        // `ar` appends to an existing archive, so stale members must go.
        let command = if self.os.is_windows() {
            format!("{} rcs $out $in", ar)
        } else {
            format!("rm -f $out && {} rcs $out $in", ar)
        };
        RuleTemplate::new(RuleKind::Archive, command, "ar $out")
    }

    fn link_rule(&self, kind: TargetKind, driver: Language) -> RuleTemplate {
        let driver = self.driver(driver);
        match (kind, self.os) {
            (TargetKind::SharedLib, TargetOs::Windows) => RuleTemplate::new(
                RuleKind::LinkShared,
                format!(
                    "{} -shared $ldflags -o $out -Wl,--out-implib,$implib $in $libs",
                    driver
                ),
                "link $out",
            ),
            (TargetKind::SharedLib, TargetOs::Macos) => RuleTemplate::new(
                RuleKind::LinkShared,
                format!("{} -dynamiclib $ldflags -o $out $in $libs", driver),
                "link $out",
            ),
            (TargetKind::SharedLib, _) => RuleTemplate::new(
                RuleKind::LinkShared,
                format!("{} -shared $ldflags -o $out $in $libs", driver),
                "link $out",
            ),
            // emcc writes `name.wasm` next to the loader it is asked for.
            (_, TargetOs::Web) => RuleTemplate::new(
                RuleKind::Link,
                format!("{} $ldflags -o $loader $in $libs", driver),
                "link $out",
            ),
            _ => RuleTemplate::new(
                RuleKind::Link,
                format!("{} $ldflags -o $out $in $libs", driver),
                "link $out",
            ),
        }
    }

    fn symlink_rule(&self) -> Option<RuleTemplate> {
        if self.os.is_windows() {
            return None;
        }
        Some(RuleTemplate::new(
            RuleKind::Symlink,
            "ln -sf $target $out",
            "symlink $out",
        ))
    }

    fn link_group_style(&self) -> LinkGroupStyle {
        match (self.family, self.os) {
            // ld64 resolves archives in any order.
            (_, TargetOs::Macos) => LinkGroupStyle::Unordered,
            (ToolchainKind::Emscripten, _) => LinkGroupStyle::Repeat,
            _ => LinkGroupStyle::Directive,
        }
    }

    fn group_markers(&self) -> Option<(&'static str, &'static str)> {
        if self.os == TargetOs::Macos {
            return None;
        }
        Some(("-Wl,--start-group", "-Wl,--end-group"))
    }

    fn compile_flags(&self, settings: &ResolvedSettings, pic: bool) -> Vec<String> {
        let mut flags = Vec::new();

        flags.push(
            match settings.optimize {
                Optimize::Off => "-O0",
                Optimize::Size => "-Os",
                Optimize::Speed => "-O2",
                Optimize::Full => "-O3",
            }
            .to_string(),
        );

        if settings.symbols {
            flags.push("-g".to_string());
        }

        match settings.warnings {
            Warnings::Default => {}
            Warnings::Extra => {
                flags.push("-Wall".to_string());
                flags.push("-Wextra".to_string());
            }
            Warnings::Off => flags.push("-w".to_string()),
        }

        if pic && self.os.needs_pic() {
            flags.push("-fPIC".to_string());
        }

        flags
    }

    fn define_flag(&self, define: &str) -> String {
        format!("-D{}", define)
    }

    fn include_flag(&self, dir: &str) -> String {
        format!("-I{}", dir)
    }

    fn link_flags(&self, settings: &ResolvedSettings, kind: TargetKind) -> Vec<String> {
        let mut flags = Vec::new();
        if kind == TargetKind::WindowedApp && self.os.is_windows() {
            flags.push("-mwindows".to_string());
        }
        if settings.symbols && self.os == TargetOs::Web {
            flags.push("-g".to_string());
        }
        flags
    }

    fn lib_dir_flag(&self, dir: &str) -> String {
        format!("-L{}", dir)
    }

    fn system_lib_flag(&self, lib: &str) -> String {
        // Paths and explicit flags are passed through untouched.
        if lib.starts_with('-') || lib.contains('/') || lib.contains('.') {
            lib.to_string()
        } else {
            format!("-l{}", lib)
        }
    }

    fn shared_lib_flags(&self, artifact: &Artifact) -> Vec<String> {
        match self.os {
            TargetOs::Linux => vec![format!("-Wl,-soname,{}", artifact.soname())],
            TargetOs::Macos => vec![format!(
                "-Wl,-install_name,@rpath/{}",
                artifact.file_name()
            )],
            _ => Vec::new(),
        }
    }

    fn rpath_flag(&self, relative_dir: &str) -> Option<String> {
        let origin = match self.os {
            TargetOs::Linux => "$ORIGIN",
            TargetOs::Macos => "@loader_path",
            _ => return None,
        };
        if relative_dir.is_empty() || relative_dir == "." {
            Some(format!("-Wl,-rpath,{}", origin))
        } else {
            Some(format!("-Wl,-rpath,{}/{}", origin, relative_dir))
        }
    }
}
