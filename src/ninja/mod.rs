//! The build graph compiler: project model in, Ninja script out.
//!
//! [`generate`] runs the stages in a single ordered pass:
//! validation, link ordering, edge emission, aggregates and rendering.
//! Nothing touches the filesystem here; writing is left to the caller.

pub mod aggregate;
pub mod compdb;
pub mod emitter;
pub mod errors;
pub mod escape;
pub mod graph;
pub mod link_order;
pub mod naming;
pub mod writer;

pub use emitter::BuiltTarget;
pub use errors::{GenerateError, GenerateWarning};
pub use graph::BuildGraph;

use crate::core::Workspace;
use compdb::CompileUnit;
use emitter::Emitter;
use link_order::DependencyGraph;

/// File name of the generated script inside the build directory.
pub const SCRIPT_NAME: &str = "build.ninja";

/// The result of a successful generation.
#[derive(Debug)]
pub struct Generation {
    /// Rendered script text
    pub script: String,
    pub graph: BuildGraph,
    pub warnings: Vec<GenerateWarning>,
    pub built: Vec<BuiltTarget>,
    pub compile_units: Vec<CompileUnit>,
}

impl Generation {
    /// `compile_commands.json` contents for the generated compile edges.
    pub fn compile_commands(&self, ws: &Workspace) -> serde_json::Result<String> {
        let build_dir = crate::util::fs::normalize(&ws.build_dir());
        compdb::to_json(&compdb::compile_commands(
            &self.graph,
            &self.compile_units,
            &build_dir,
        ))
    }
}

/// Compile a workspace into a build script.
///
/// Every error is detected before any text is produced, so a failed
/// generation never yields a partial script.
pub fn generate(ws: &Workspace) -> Result<Generation, GenerateError> {
    ws.validate()?;

    let links = DependencyGraph::new(ws)?;
    let emission = Emitter::new(ws, &links).emit()?;

    let mut graph = emission.graph;
    aggregate::add_aggregates(&mut graph, ws, &links, &emission.built)?;

    let script = writer::render(&graph)?;

    tracing::info!(
        "generated {} rules, {} edges for {} projects",
        graph.rules().len(),
        graph.edges().count(),
        ws.projects().len()
    );

    Ok(Generation {
        script,
        graph,
        warnings: emission.warnings,
        built: emission.built,
        compile_units: emission.compile_units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{LinkGroupStyle, PlatformProfile, TargetOs, ToolchainKind};
    use crate::core::Project;
    use crate::test_support::assertions::{assert_err, assert_has_line, edge_for};
    use crate::test_support::fixtures;

    fn windows() -> PlatformProfile {
        PlatformProfile::new("native", TargetOs::Windows, ToolchainKind::Msvc)
    }

    fn var(graph: &BuildGraph, output: &str, name: &str) -> String {
        let edge = edge_for(graph, output);
        let value = edge
            .var(name)
            .unwrap_or_else(|| panic!("edge `{}` has no `{}`", output, name));
        writer::render_value(value).unwrap()
    }

    #[test]
    fn test_simple_app_script() {
        let generation = generate(&fixtures::simple_app()).unwrap();
        let script = &generation.script;

        assert_has_line(script, "ninja_required_version = 1.7");
        assert_has_line(script, "build obj/debug/app/main.o: cc ../main.c");
        assert_has_line(script, "  flags = $app_debug_cflags");
        assert_has_line(script, "build bin_debug/app: link obj/debug/app/main.o");
        assert_has_line(script, "build bin_release/app: link obj/release/app/main.o");
        assert_has_line(script, "build debug: phony bin_debug/app");
        assert_has_line(script, "build release: phony bin_release/app");
        assert_has_line(script, "build app: phony bin_debug/app");
        assert_has_line(script, "default debug");
        assert!(generation.warnings.is_empty());
    }

    #[test]
    fn test_generation_is_idempotent() {
        let ws = fixtures::cyclic_libs();
        assert_eq!(generate(&ws).unwrap().script, generate(&ws).unwrap().script);
    }

    #[test]
    fn test_release_aggregate_leaves_debug_alone() {
        let generation = generate(&fixtures::static_chain()).unwrap();
        let release = generation
            .graph
            .phonies()
            .iter()
            .find(|p| p.name == "release")
            .unwrap();

        assert_eq!(
            release.inputs,
            vec!["bin_release/app", "bin_release/liba.a", "bin_release/libb.a"]
        );
        assert_eq!(generation.graph.defaults(), &["debug".to_string()]);
    }

    #[test]
    fn test_static_chain_link_order() {
        let generation = generate(&fixtures::static_chain()).unwrap();
        let graph = &generation.graph;

        assert_eq!(
            var(graph, "bin_debug/app", "libs"),
            "bin_debug/liba.a bin_debug/libb.a"
        );
        assert_eq!(
            edge_for(graph, "bin_debug/app").implicit,
            vec!["bin_debug/liba.a", "bin_debug/libb.a"]
        );
        assert_has_line(&generation.script, "build bin_debug/liba.a: ar obj/debug/a/a.o");
    }

    #[test]
    fn test_cyclic_libs_use_link_group() {
        let generation = generate(&fixtures::cyclic_libs()).unwrap();
        assert_eq!(
            var(&generation.graph, "bin_debug/app", "libs"),
            "-Wl,--start-group bin_debug/liba.a bin_debug/libb.a -Wl,--end-group"
        );
    }

    #[test]
    fn test_repeated_group_members() {
        let ws = fixtures::cyclic_libs()
            .with_platforms(vec![fixtures::linux().with_link_groups(LinkGroupStyle::Repeat)]);
        let generation = generate(&ws).unwrap();
        assert_eq!(
            var(&generation.graph, "bin_debug/app", "libs"),
            "bin_debug/liba.a bin_debug/libb.a bin_debug/liba.a bin_debug/libb.a"
        );
    }

    #[test]
    fn test_library_alias_builds_its_dependencies() {
        let generation = generate(&fixtures::static_chain()).unwrap();
        let script = &generation.script;

        assert_has_line(script, "build a: phony bin_debug/liba.a bin_debug/libb.a");
        assert_has_line(script, "build b: phony bin_debug/libb.a");
        assert_has_line(
            script,
            "build a_release: phony bin_release/liba.a bin_release/libb.a",
        );
    }

    #[test]
    fn test_cyclic_library_alias_builds_partner() {
        let generation = generate(&fixtures::cyclic_libs()).unwrap();
        assert_has_line(
            &generation.script,
            "build b: phony bin_debug/libb.a bin_debug/liba.a",
        );
    }

    #[test]
    fn test_project_named_like_derived_alias() {
        let ws = fixtures::simple_app()
            .with_project(Project::console_app("app_debug").with_files(["other.c"]));
        let generation = generate(&ws).unwrap();

        assert_has_line(&generation.script, "build app_debug: phony bin_debug/app_debug");
        assert!(!generation
            .script
            .lines()
            .any(|l| l == "build app_debug: phony bin_debug/app"));
        assert_has_line(&generation.script, "build app_release: phony bin_release/app");
    }

    #[test]
    fn test_shared_library_names_on_linux() {
        let generation = generate(&fixtures::shared_lib(fixtures::linux())).unwrap();
        let graph = &generation.graph;

        assert!(graph.produces("bin_debug/libninjatestprj.so"));
        assert!(var(graph, "bin_debug/libninjatestprj.so", "ldflags")
            .contains("-Wl,-soname,libninjatestprj.so"));
        assert!(var(graph, "bin_debug/app", "ldflags").contains("-Wl,-rpath,$$ORIGIN"));

        let cflags = graph.globals()["ninjatestprj_debug_cflags"];
        assert!(writer::render_value(cflags).unwrap().contains("-fPIC"));
    }

    #[test]
    fn test_shared_library_names_on_windows() {
        let generation = generate(&fixtures::shared_lib(windows())).unwrap();
        let graph = &generation.graph;

        assert!(graph.produces("bin_debug/ninjatestprj.dll"));
        assert!(graph.produces("bin_debug/ninjatestprj.lib"));
        assert_eq!(
            edge_for(graph, "bin_debug/app.exe").implicit,
            vec!["bin_debug/ninjatestprj.lib"]
        );
        assert_has_line(
            &generation.script,
            "build bin_debug/ninjatestprj.dll | bin_debug/ninjatestprj.lib: link_shared obj/debug/ninjatestprj/lib.obj",
        );
    }

    #[test]
    fn test_static_lib_inside_shared_lib_is_pic() {
        let ws = fixtures::workspace()
            .with_project(
                Project::shared_lib("so")
                    .with_files(["so.c"])
                    .with_dependencies(["core"]),
            )
            .with_project(Project::static_lib("core").with_files(["core.c"]))
            .with_project(Project::static_lib("plain").with_files(["plain.c"]));

        let graph = generate(&ws).unwrap().graph;
        let globals = graph.globals();
        let flags = |name: &str| writer::render_value(globals[name]).unwrap();
        assert!(flags("core_debug_cflags").contains("-fPIC"));
        assert!(!flags("plain_debug_cflags").contains("-fPIC"));
    }

    #[test]
    fn test_versioned_shared_library_links() {
        let ws = fixtures::workspace().with_project(
            Project::shared_lib("z")
                .with_files(["z.c"])
                .with_version("1.2.3"),
        );
        let generation = generate(&ws).unwrap();

        assert!(generation.graph.produces("bin_debug/libz.so.1.2.3"));
        assert_has_line(
            &generation.script,
            "build bin_debug/libz.so.1: symlink bin_debug/libz.so.1.2.3",
        );
        assert_has_line(
            &generation.script,
            "build bin_debug/libz.so: symlink bin_debug/libz.so.1",
        );
        assert_eq!(var(&generation.graph, "bin_debug/libz.so", "target"), "libz.so.1");
    }

    #[test]
    fn test_windowed_and_console_share_file_name() {
        let generation = generate(&fixtures::windowed_app(windows())).unwrap();
        assert!(generation.graph.produces("bin_debug/gui.exe"));
        assert!(var(&generation.graph, "bin_debug/gui.exe", "ldflags").contains("/SUBSYSTEM:WINDOWS"));

        let ws = fixtures::windowed_app(windows()).with_project(
            Project::console_app("cli")
                .with_files(["cli/main.c"])
                .with_target_name("gui"),
        );
        let err = generate(&ws).unwrap_err();
        assert!(
            matches!(err, GenerateError::Collision { ref path, .. } if path == "bin_debug/gui.exe")
        );
    }

    #[test]
    fn test_collision_names_both_producers() {
        let ws = fixtures::simple_app().with_project(
            Project::console_app("app2")
                .with_files(["main2.c"])
                .with_target_name("app"),
        );
        match generate(&ws).unwrap_err() {
            GenerateError::Collision {
                path,
                configuration,
                first,
                second,
            } => {
                assert_eq!(path, "bin_debug/app");
                assert_eq!(configuration, "debug|native");
                assert_eq!(first, "project `app` (debug|native)");
                assert_eq!(second, "project `app2` (debug|native)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shared_library_on_web_is_rejected() {
        let web = PlatformProfile::new("web", TargetOs::Web, ToolchainKind::Emscripten);
        let err = assert_err(generate(&fixtures::shared_lib(web)));
        assert!(matches!(
            err,
            GenerateError::Naming { ref project, ref platform, .. }
                if project == "ninjatestprj" && platform == "web"
        ));
    }

    #[test]
    fn test_generated_header_without_producer() {
        let ws = fixtures::workspace()
            .with_project(
                Project::console_app("app")
                    .with_files(["main.c"])
                    .with_generated_headers(["gen/version.h"]),
            )
            .with_project(
                Project::console_app("tool")
                    .with_files(["tool.c"])
                    .with_generated_headers(["gen/version.h"]),
            );
        let generation = generate(&ws).unwrap();

        assert_eq!(
            edge_for(&generation.graph, "obj/debug/app/main.o").order_only,
            vec!["../gen/version.h"]
        );
        let placeholders = generation
            .script
            .lines()
            .filter(|l| *l == "build ../gen/version.h: phony")
            .count();
        assert_eq!(placeholders, 1);
    }

    #[test]
    fn test_unrecognized_files_are_skipped() {
        let ws = fixtures::workspace().with_project(
            Project::console_app("app").with_files(["main.c", "api.h", "README.md"]),
        );
        let generation = generate(&ws).unwrap();

        assert_eq!(
            generation.warnings,
            vec![GenerateWarning::UnrecognizedFile {
                project: "app".into(),
                path: "README.md".into(),
                toolchain: "gcc".into(),
            }]
        );
        assert_has_line(&generation.script, "build bin_debug/app: link obj/debug/app/main.o");
    }
}
