//! Test fixtures for common test scenarios.
//!
//! In-memory workspaces rooted at `/work` with `debug` and `release`
//! configurations on a single Linux/gcc platform, plus helpers that lay a
//! ninjagen.toml and its sources out on disk.

use std::path::Path;

use crate::core::platform::{PlatformProfile, TargetOs, ToolchainKind};
use crate::core::{Project, Workspace, MANIFEST_NAME};

/// Root of every in-memory fixture workspace.
pub const ROOT: &str = "/work";

/// The single platform of the fixtures.
pub fn linux() -> PlatformProfile {
    PlatformProfile::new("native", TargetOs::Linux, ToolchainKind::Gcc)
}

/// An empty workspace with debug/release on `platform`.
pub fn workspace_on(platform: PlatformProfile) -> Workspace {
    Workspace::new("fixture", ROOT)
        .with_configurations(["debug", "release"])
        .with_platforms(vec![platform])
}

/// An empty Linux workspace with debug/release.
pub fn workspace() -> Workspace {
    workspace_on(linux())
}

/// One console application built from `main.c`.
pub fn simple_app() -> Workspace {
    workspace().with_project(Project::console_app("app").with_files(["main.c"]))
}

/// `app -> a -> b`, both libraries static.
pub fn static_chain() -> Workspace {
    workspace()
        .with_project(
            Project::console_app("app")
                .with_files(["app/main.c"])
                .with_dependencies(["a"]),
        )
        .with_project(
            Project::static_lib("a")
                .with_files(["a/a.c"])
                .with_dependencies(["b"]),
        )
        .with_project(Project::static_lib("b").with_files(["b/b.c"]))
}

/// `app -> a`, with `a` and `b` static and depending on each other.
pub fn cyclic_libs() -> Workspace {
    workspace()
        .with_project(
            Project::console_app("app")
                .with_files(["app/main.c"])
                .with_dependencies(["a"]),
        )
        .with_project(
            Project::static_lib("a")
                .with_files(["a/a.c"])
                .with_dependencies(["b"]),
        )
        .with_project(
            Project::static_lib("b")
                .with_files(["b/b.c"])
                .with_dependencies(["a"]),
        )
}

/// A shared library `ninjatestprj` and an application using it.
pub fn shared_lib(platform: PlatformProfile) -> Workspace {
    workspace_on(platform)
        .with_project(
            Project::console_app("app")
                .with_files(["app/main.c"])
                .with_dependencies(["ninjatestprj"]),
        )
        .with_project(Project::shared_lib("ninjatestprj").with_files(["lib/lib.c"]))
}

/// A windowed application `gui` on `platform`.
pub fn windowed_app(platform: PlatformProfile) -> Workspace {
    workspace_on(platform).with_project(Project::windowed_app("gui").with_files(["gui/main.c"]))
}

/// Write `manifest` as ninjagen.toml into `dir`.
pub fn write_manifest(dir: &Path, manifest: &str) {
    std::fs::write(dir.join(MANIFEST_NAME), manifest).expect("failed to write manifest");
}

/// Create each of `files` under `dir` with a trivial C body.
pub fn write_sources(dir: &Path, files: &[&str]) {
    for file in files {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create source dir");
        }
        std::fs::write(&path, minimal_c_source()).expect("failed to write source");
    }
}

/// Create a minimal C source file.
pub fn minimal_c_source() -> &'static str {
    r#"// Minimal C source
int placeholder_func(void) {
    return 0;
}
"#
}
