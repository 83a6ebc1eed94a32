//! Output naming - artifact file names per target kind and platform.
//!
//! | Target Kind        | Windows                | POSIX            | Web                      |
//! |--------------------|------------------------|------------------|--------------------------|
//! | (windowed) app     | `name.exe`             | `name`           | `name.wasm` + `name.js`  |
//! | static library     | `name.lib`             | `libname.a`      | `libname.a`              |
//! | shared library     | `name.dll` + `name.lib`| `libname.so`     | unsupported              |
//!
//! Apple platforms name shared libraries `libname.dylib`.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::platform::TargetOs;
use crate::core::target::TargetKind;

/// A target kind the platform cannot produce.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("{kind} targets are not supported on {os}")]
#[diagnostic(code(ninjagen::naming::unsupported))]
pub struct NamingError {
    pub kind: TargetKind,
    pub os: TargetOs,
}

/// A file produced next to the main artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxKind {
    /// Import library of a Windows DLL
    ImportLibrary,
    /// JavaScript loader of a wasm module
    Loader,
    /// The versioned shared object the linker actually writes
    VersionedFile,
    /// `libname.so.MAJOR` link pointing at the versioned file
    SonameLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxArtifact {
    pub kind: AuxKind,
    pub file_name: String,
}

/// The resolved file name of a project's output under one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub prefix: &'static str,
    pub base: String,
    /// Extension without the dot, empty for POSIX executables
    pub extension: &'static str,
    pub aux: Vec<AuxArtifact>,
}

impl Artifact {
    /// The name dependents and aggregates refer to.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            format!("{}{}", self.prefix, self.base)
        } else {
            format!("{}{}.{}", self.prefix, self.base, self.extension)
        }
    }

    pub fn aux(&self, kind: AuxKind) -> Option<&str> {
        self.aux
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.file_name.as_str())
    }

    /// The file the archive or link edge writes.
    pub fn linker_output(&self) -> String {
        self.aux(AuxKind::VersionedFile)
            .map(str::to_string)
            .unwrap_or_else(|| self.file_name())
    }

    /// The name recorded as `DT_SONAME` on ELF platforms.
    pub fn soname(&self) -> String {
        self.aux(AuxKind::SonameLink)
            .or(self.aux(AuxKind::VersionedFile))
            .map(str::to_string)
            .unwrap_or_else(|| self.file_name())
    }

    /// The file a dependent passes to its linker: the import library for
    /// Windows DLLs, the artifact itself otherwise.
    pub fn link_input(&self) -> String {
        self.aux(AuxKind::ImportLibrary)
            .map(str::to_string)
            .unwrap_or_else(|| self.file_name())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Resolve the artifact of `base_name` built as `kind` for `os`.
pub fn resolve(kind: TargetKind, os: TargetOs, base_name: &str) -> Result<Artifact, NamingError> {
    resolve_versioned(kind, os, base_name, None)
}

/// Like [`resolve`], with an optional shared library version. Versions only
/// change the produced files on Linux, where they yield
/// `libname.so.X.Y.Z` plus `libname.so.X` and `libname.so` links.
pub fn resolve_versioned(
    kind: TargetKind,
    os: TargetOs,
    base_name: &str,
    version: Option<&str>,
) -> Result<Artifact, NamingError> {
    let base = base_name.to_string();
    let artifact = |prefix, extension, aux| Artifact {
        prefix,
        base: base.clone(),
        extension,
        aux,
    };

    let resolved = match (kind, os) {
        (TargetKind::ConsoleApp | TargetKind::WindowedApp, TargetOs::Windows) => {
            artifact("", "exe", vec![])
        }
        (TargetKind::ConsoleApp | TargetKind::WindowedApp, TargetOs::Linux | TargetOs::Macos) => {
            artifact("", "", vec![])
        }
        (TargetKind::ConsoleApp | TargetKind::WindowedApp, TargetOs::Web) => artifact(
            "",
            "wasm",
            vec![AuxArtifact {
                kind: AuxKind::Loader,
                file_name: format!("{}.js", base_name),
            }],
        ),
        (TargetKind::StaticLib, TargetOs::Windows) => artifact("", "lib", vec![]),
        (TargetKind::StaticLib, _) => artifact("lib", "a", vec![]),
        (TargetKind::SharedLib, _) if !os.supports_shared_libs() => {
            return Err(NamingError { kind, os })
        }
        (TargetKind::SharedLib, TargetOs::Windows) => artifact(
            "",
            "dll",
            vec![AuxArtifact {
                kind: AuxKind::ImportLibrary,
                file_name: format!("{}.lib", base_name),
            }],
        ),
        (TargetKind::SharedLib, TargetOs::Macos) => artifact("lib", "dylib", vec![]),
        (TargetKind::SharedLib, _) => artifact("lib", "so", versioned_aux(base_name, version)),
    };

    Ok(resolved)
}

fn versioned_aux(base_name: &str, version: Option<&str>) -> Vec<AuxArtifact> {
    let Some(version) = version.map(str::trim).filter(|v| !v.is_empty()) else {
        return Vec::new();
    };
    let major = version.split('.').next().unwrap_or(version);

    let versioned = format!("lib{}.so.{}", base_name, version);
    let soname = format!("lib{}.so.{}", base_name, major);

    let mut aux = vec![AuxArtifact {
        kind: AuxKind::VersionedFile,
        file_name: versioned.clone(),
    }];
    if soname != versioned {
        aux.push(AuxArtifact {
            kind: AuxKind::SonameLink,
            file_name: soname,
        });
    }
    aux
}

/// Expand `{config}`, `{platform}` and `{project}` in a directory template.
pub fn expand_dir(template: &str, config: &str, platform: &str, project: &str) -> String {
    template
        .replace("{config}", config)
        .replace("{cfg}", config)
        .replace("{platform}", platform)
        .replace("{project}", project)
        .replace("{prj}", project)
}

/// Default artifact directory template.
pub fn default_target_dir(multi_platform: bool) -> &'static str {
    if multi_platform {
        "bin_{config}_{platform}"
    } else {
        "bin_{config}"
    }
}

/// Default object directory template.
pub fn default_obj_dir(multi_platform: bool) -> &'static str {
    if multi_platform {
        "obj/{config}_{platform}/{project}"
    } else {
        "obj/{config}/{project}"
    }
}
