//! Toolchain abstraction for C/C++ compilers.
//!
//! A toolchain knows how to spell rule command templates and flags for its
//! compiler family. Templates reference `$in`, `$out` and the edge variables
//! `flags`, `ldflags`, `libs`, `implib`, `loader` and `target`; flag values
//! are shell-quoted by the toolchain and `$`-escaped by the emitter.

mod gcc;
mod msvc;

use std::fmt;

pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

use crate::core::configuration::ResolvedSettings;
use crate::core::platform::{LinkGroupStyle, PlatformProfile, TargetOs, ToolchainKind};
use crate::core::target::{FileKind, Language, TargetKind};
use crate::ninja::escape::{shell_quote, ShellStyle};
use crate::ninja::naming::Artifact;

/// What a rule does. Determines the rule's base name in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    Cc,
    Cxx,
    GnuAs,
    Masm,
    Archive,
    Link,
    LinkShared,
    Symlink,
}

impl RuleKind {
    pub fn base_name(&self) -> &'static str {
        match self {
            RuleKind::Cc => "cc",
            RuleKind::Cxx => "cxx",
            RuleKind::GnuAs => "as",
            RuleKind::Masm => "masm",
            RuleKind::Archive => "ar",
            RuleKind::Link => "link",
            RuleKind::LinkShared => "link_shared",
            RuleKind::Symlink => "symlink",
        }
    }
}

/// Header dependency format written by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepsFormat {
    /// Makefile-style depfile (`-MMD -MF`)
    Gcc,
    /// `/showIncludes` output parsed by the executor
    Msvc,
}

impl fmt::Display for DepsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepsFormat::Gcc => f.write_str("gcc"),
            DepsFormat::Msvc => f.write_str("msvc"),
        }
    }
}

/// A rule as the toolchain wants it. Two templates with equal contents are
/// declared once in the script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleTemplate {
    pub kind: RuleKind,
    pub command: String,
    pub description: String,
    /// Depfile path template, e.g. `$out.d`
    pub depfile: Option<String>,
    pub deps: Option<DepsFormat>,
}

impl RuleTemplate {
    pub fn new(kind: RuleKind, command: impl Into<String>, description: impl Into<String>) -> Self {
        RuleTemplate {
            kind,
            command: command.into(),
            description: description.into(),
            depfile: None,
            deps: None,
        }
    }

    pub fn with_deps(mut self, deps: DepsFormat, depfile: Option<&str>) -> Self {
        self.deps = Some(deps);
        self.depfile = depfile.map(str::to_string);
        self
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to spell commands for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain family.
    fn kind(&self) -> ToolchainKind;

    /// Get the OS family artifacts are produced for.
    fn os(&self) -> TargetOs;

    /// How commands are split into arguments when they run.
    fn shell(&self) -> ShellStyle {
        if self.os().is_windows() {
            ShellStyle::Windows
        } else {
            ShellStyle::Posix
        }
    }

    /// Get the object file extension.
    fn object_extension(&self) -> &'static str;

    /// The rule compiling files of `file` kind, `None` if the toolchain
    /// cannot compile them.
    fn compile_rule(&self, file: FileKind) -> Option<RuleTemplate>;

    /// The rule creating a static library.
    fn archive_rule(&self) -> RuleTemplate;

    /// The rule linking an application or shared library.
    fn link_rule(&self, kind: TargetKind, driver: Language) -> RuleTemplate;

    /// The rule creating a symbolic link, if the platform has them.
    fn symlink_rule(&self) -> Option<RuleTemplate> {
        None
    }

    /// How the linker copes with libraries that reference each other.
    fn link_group_style(&self) -> LinkGroupStyle;

    /// Start and end markers for [`LinkGroupStyle::Directive`].
    fn group_markers(&self) -> Option<(&'static str, &'static str)> {
        None
    }

    /// Compile flags implied by settings: optimization, debug info,
    /// warnings, runtime selection. `pic` asks for position independent
    /// code where the platform needs it for shared objects.
    fn compile_flags(&self, settings: &ResolvedSettings, pic: bool) -> Vec<String>;

    /// Extra flags for C++ sources only.
    fn cxx_only_flags(&self) -> Vec<String> {
        Vec::new()
    }

    fn define_flag(&self, define: &str) -> String;

    fn include_flag(&self, dir: &str) -> String;

    /// Link flags implied by settings and target kind (debug info,
    /// subsystem).
    fn link_flags(&self, settings: &ResolvedSettings, kind: TargetKind) -> Vec<String>;

    fn lib_dir_flag(&self, dir: &str) -> String;

    /// Spell a system library, e.g. `-lm` or `m.lib`.
    fn system_lib_flag(&self, lib: &str) -> String;

    /// Flags naming a shared library from inside (soname, install name).
    fn shared_lib_flags(&self, _artifact: &Artifact) -> Vec<String> {
        Vec::new()
    }

    /// Run-time search path from a binary to a directory of shared
    /// libraries, relative to the binary.
    fn rpath_flag(&self, _relative_dir: &str) -> Option<String> {
        None
    }
}

/// Quote a tool path for embedding into a rule command.
pub(crate) fn tool(path: &str, style: ShellStyle) -> String {
    shell_quote(path, style)
}

/// Create the toolchain of a platform profile.
pub fn for_profile(profile: &PlatformProfile) -> Box<dyn Toolchain> {
    match profile.toolchain {
        ToolchainKind::Msvc => Box::new(MsvcToolchain::new(profile.os, &profile.tools)),
        family => Box::new(GccToolchain::new(family, profile.os, &profile.tools)),
    }
}

/// The link group style used on `profile`: its own override, else the
/// toolchain's. A directive style without markers degrades to unordered.
pub fn group_style(profile: &PlatformProfile, tc: &dyn Toolchain) -> LinkGroupStyle {
    match profile.link_groups.unwrap_or(tc.link_group_style()) {
        LinkGroupStyle::Directive if tc.group_markers().is_none() => LinkGroupStyle::Unordered,
        style => style,
    }
}
