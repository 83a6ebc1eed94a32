//! MSVC toolchain (cl.exe, lib.exe, link.exe, ml64.exe).

use crate::core::configuration::{Optimize, ResolvedSettings, Warnings};
use crate::core::platform::{LinkGroupStyle, TargetOs, ToolOverrides, ToolchainKind};
use crate::core::target::{FileKind, Language, TargetKind};
use crate::ninja::escape::ShellStyle;
use crate::toolchain::{tool, DepsFormat, RuleKind, RuleTemplate, Toolchain};

/// Microsoft Visual C++ toolchain.
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    os: TargetOs,
    cl: String,
    lib: String,
    link: String,
    ml: String,
}

impl MsvcToolchain {
    pub fn new(os: TargetOs, tools: &ToolOverrides) -> Self {
        // cl compiles both languages; `cxx` only matters if set alone.
        let cl = tools
            .cc
            .clone()
            .or_else(|| tools.cxx.clone())
            .unwrap_or_else(|| "cl".to_string());

        MsvcToolchain {
            os,
            cl,
            lib: tools.ar.clone().unwrap_or_else(|| "lib".to_string()),
            link: tools.link.clone().unwrap_or_else(|| "link".to_string()),
            ml: tools
                .assembler
                .clone()
                .unwrap_or_else(|| "ml64".to_string()),
        }
    }

    fn quoted(&self, path: &str) -> String {
        tool(path, ShellStyle::Windows)
    }

    fn compile_template(&self, kind: RuleKind, label: &str) -> RuleTemplate {
        RuleTemplate::new(
            kind,
            format!(
                "{} /nologo /showIncludes $flags /c $in /Fo$out",
                self.quoted(&self.cl)
            ),
            format!("{} $out", label),
        )
        .with_deps(DepsFormat::Msvc, None)
    }
}

impl Toolchain for MsvcToolchain {
    fn kind(&self) -> ToolchainKind {
        ToolchainKind::Msvc
    }

    fn os(&self) -> TargetOs {
        self.os
    }

    fn shell(&self) -> ShellStyle {
        ShellStyle::Windows
    }

    fn object_extension(&self) -> &'static str {
        "obj"
    }

    fn compile_rule(&self, file: FileKind) -> Option<RuleTemplate> {
        match file {
            FileKind::C => Some(self.compile_template(RuleKind::Cc, "cc")),
            FileKind::Cxx => Some(self.compile_template(RuleKind::Cxx, "cxx")),
            FileKind::Masm => Some(RuleTemplate::new(
                RuleKind::Masm,
                format!("{} /nologo $flags /c /Fo$out $in", self.quoted(&self.ml)),
                "masm $out",
            )),
            FileKind::GnuAsm | FileKind::Header | FileKind::Unknown => None,
        }
    }

    fn archive_rule(&self) -> RuleTemplate {
        RuleTemplate::new(
            RuleKind::Archive,
            format!("{} /nologo /OUT:$out $in", self.quoted(&self.lib)),
            "lib $out",
        )
    }

    fn link_rule(&self, kind: TargetKind, _driver: Language) -> RuleTemplate {
        let link = self.quoted(&self.link);
        if kind == TargetKind::SharedLib {
            RuleTemplate::new(
                RuleKind::LinkShared,
                format!(
                    "{} /nologo /DLL /OUT:$out /IMPLIB:$implib $ldflags $in $libs",
                    link
                ),
                "link $out",
            )
        } else {
            RuleTemplate::new(
                RuleKind::Link,
                format!("{} /nologo /OUT:$out $ldflags $in $libs", link),
                "link $out",
            )
        }
    }

    fn link_group_style(&self) -> LinkGroupStyle {
        // link.exe searches every library for unresolved symbols.
        LinkGroupStyle::Unordered
    }

    fn compile_flags(&self, settings: &ResolvedSettings, _pic: bool) -> Vec<String> {
        let mut flags = Vec::new();

        flags.push(
            match settings.optimize {
                Optimize::Off => "/Od",
                Optimize::Size => "/O1",
                Optimize::Speed => "/O2",
                Optimize::Full => "/Ox",
            }
            .to_string(),
        );

        // Debug runtime goes with unoptimized builds
        flags.push(if settings.optimize == Optimize::Off {
            "/MDd".to_string()
        } else {
            "/MD".to_string()
        });

        if settings.symbols {
            flags.push("/Z7".to_string());
        }

        flags.push(
            match settings.warnings {
                Warnings::Default => "/W3",
                Warnings::Extra => "/W4",
                Warnings::Off => "/W0",
            }
            .to_string(),
        );

        flags
    }

    fn cxx_only_flags(&self) -> Vec<String> {
        vec!["/EHsc".to_string()]
    }

    fn define_flag(&self, define: &str) -> String {
        format!("/D{}", define)
    }

    fn include_flag(&self, dir: &str) -> String {
        format!("/I{}", dir)
    }

    fn link_flags(&self, settings: &ResolvedSettings, kind: TargetKind) -> Vec<String> {
        let mut flags = Vec::new();
        match kind {
            TargetKind::WindowedApp => {
                flags.push("/SUBSYSTEM:WINDOWS".to_string());
                // Keep `main` as the entry point for windowed apps.
                flags.push("/ENTRY:mainCRTStartup".to_string());
            }
            TargetKind::ConsoleApp => flags.push("/SUBSYSTEM:CONSOLE".to_string()),
            _ => {}
        }
        if settings.symbols {
            flags.push("/DEBUG".to_string());
        }
        flags
    }

    fn lib_dir_flag(&self, dir: &str) -> String {
        format!("/LIBPATH:{}", dir)
    }

    fn system_lib_flag(&self, lib: &str) -> String {
        if lib.starts_with('/') || lib.to_ascii_lowercase().ends_with(".lib") {
            lib.to_string()
        } else {
            format!("{}.lib", lib)
        }
    }
}
