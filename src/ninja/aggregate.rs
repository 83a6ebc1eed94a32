//! Aggregate aliases and the default target.
//!
//! - `<config>`: every project under that configuration, all platforms
//! - `<project>`: the project and what it links, under the default
//!   configuration
//! - `<config>_<platform>`: one axis, only with several platforms
//! - `<project>_<config>` and, with several platforms,
//!   `<project>_<config>_<platform>`
//!
//! The first two kinds must not clash with anything else. The derived
//! kinds are added after them and only when their name is still free.
//!
//! `default` names the default configuration's aggregate, so a bare
//! executor invocation builds nothing else.

use crate::core::Workspace;
use crate::ninja::emitter::BuiltTarget;
use crate::ninja::errors::GenerateError;
use crate::ninja::graph::BuildGraph;
use crate::ninja::link_order::DependencyGraph;

pub fn add_aggregates(
    graph: &mut BuildGraph,
    ws: &Workspace,
    links: &DependencyGraph,
    built: &[BuiltTarget],
) -> Result<(), GenerateError> {
    let multi_platform = ws.platforms().len() > 1;
    let closures: Vec<Vec<usize>> = (0..ws.projects().len())
        .map(|idx| std::iter::once(idx).chain(links.build_closure(idx)).collect())
        .collect();

    let config_outputs = |config: &str, platform: Option<&str>| -> Vec<String> {
        built
            .iter()
            .filter(|t| t.configuration == config && platform.map_or(true, |p| t.platform == p))
            .map(|t| t.output.clone())
            .collect()
    };
    let project_outputs = |idx: usize, config: &str, platform: Option<&str>| -> Vec<String> {
        let mut outputs = Vec::new();
        for &member in &closures[idx] {
            for t in built.iter().filter(|t| {
                t.project == member
                    && t.configuration == config
                    && platform.map_or(true, |p| t.platform == p)
            }) {
                if !outputs.contains(&t.output) {
                    outputs.push(t.output.clone());
                }
            }
        }
        outputs
    };

    for config in ws.configuration_names() {
        graph.add_phony(
            config.clone(),
            config_outputs(config.as_str(), None),
            &format!("configuration `{}`", config),
            config,
        )?;
    }

    let default = ws.default_configuration();
    if let Some(default) = default {
        for (idx, project) in ws.projects().iter().enumerate() {
            graph.add_phony(
                project.name.clone(),
                project_outputs(idx, default, None),
                &format!("project alias `{}`", project.name),
                default,
            )?;
        }
    }

    let mut add_derived = |name: String, inputs: Vec<String>, producer: String, config: &str| {
        if !graph.add_phony_if_free(name.as_str(), inputs, &producer, config) {
            tracing::debug!("skipping alias `{}` for {}: name already taken", name, producer);
        }
    };

    if multi_platform {
        for config in ws.configuration_names() {
            for platform in ws.platforms() {
                add_derived(
                    format!("{}_{}", config, platform.name),
                    config_outputs(config.as_str(), Some(platform.name.as_str())),
                    format!("configuration `{}` on `{}`", config, platform.name),
                    config.as_str(),
                );
            }
        }
    }

    for (idx, project) in ws.projects().iter().enumerate() {
        for config in ws.configuration_names() {
            add_derived(
                format!("{}_{}", project.name, config),
                project_outputs(idx, config.as_str(), None),
                format!("project `{}` in `{}`", project.name, config),
                config.as_str(),
            );

            if multi_platform {
                for platform in ws.platforms() {
                    add_derived(
                        format!("{}_{}_{}", project.name, config, platform.name),
                        project_outputs(idx, config.as_str(), Some(platform.name.as_str())),
                        format!(
                            "project `{}` in `{}` on `{}`",
                            project.name, config, platform.name
                        ),
                        config.as_str(),
                    );
                }
            }
        }
    }

    if let Some(default) = default {
        graph.set_default(vec![default.to_string()]);
    }

    tracing::debug!("{} aggregate targets", graph.phonies().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{PlatformProfile, TargetOs, ToolchainKind};
    use crate::core::Project;

    fn built(project: usize, configuration: &str, platform: &str, output: &str) -> BuiltTarget {
        BuiltTarget {
            project,
            configuration: configuration.into(),
            platform: platform.into(),
            output: output.into(),
        }
    }

    #[test]
    fn test_single_platform_aggregates() {
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug", "release"])
            .with_project(Project::console_app("app"));
        let targets = vec![
            built(0, "debug", "native", "bin_debug/app"),
            built(0, "release", "native", "bin_release/app"),
        ];

        let links = DependencyGraph::new(&ws).unwrap();
        let mut graph = BuildGraph::new();
        add_aggregates(&mut graph, &ws, &links, &targets).unwrap();

        let names: Vec<&str> = graph.phonies().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["debug", "release", "app", "app_debug", "app_release"]);
        assert_eq!(graph.phonies()[0].inputs, vec!["bin_debug/app"]);
        assert_eq!(graph.phonies()[2].inputs, vec!["bin_debug/app"]);
        assert_eq!(graph.defaults(), &["debug".to_string()]);
    }

    #[test]
    fn test_multi_platform_aggregates() {
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug"])
            .with_default_configuration("debug")
            .with_platforms(vec![
                PlatformProfile::new("x64", TargetOs::Linux, ToolchainKind::Gcc),
                PlatformProfile::new("web", TargetOs::Web, ToolchainKind::Emscripten),
            ])
            .with_project(Project::console_app("app"));
        let targets = vec![
            built(0, "debug", "x64", "bin_debug_x64/app"),
            built(0, "debug", "web", "bin_debug_web/app.wasm"),
        ];

        let links = DependencyGraph::new(&ws).unwrap();
        let mut graph = BuildGraph::new();
        add_aggregates(&mut graph, &ws, &links, &targets).unwrap();

        let debug = &graph.phonies()[0];
        assert_eq!(debug.name, "debug");
        assert_eq!(debug.inputs, vec!["bin_debug_x64/app", "bin_debug_web/app.wasm"]);
        assert!(graph.produces("debug_web"));
        assert!(graph.produces("app_debug_x64"));
    }

    #[test]
    fn test_project_named_like_configuration_collides() {
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug"])
            .with_project(Project::console_app("debug"));
        let targets = vec![built(0, "debug", "native", "bin_debug/debug")];

        let links = DependencyGraph::new(&ws).unwrap();
        let mut graph = BuildGraph::new();
        let err = add_aggregates(&mut graph, &ws, &links, &targets).unwrap_err();
        match err {
            GenerateError::Collision {
                path,
                first,
                second,
                ..
            } => {
                assert_eq!(path, "debug");
                assert_eq!(first, "configuration `debug` (debug)");
                assert_eq!(second, "project alias `debug` (debug)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_derived_alias_yields_to_project_name() {
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug"])
            .with_project(Project::console_app("app"))
            .with_project(Project::console_app("app_debug"));
        let targets = vec![
            built(0, "debug", "native", "bin_debug/app"),
            built(1, "debug", "native", "bin_debug/app_debug"),
        ];

        let links = DependencyGraph::new(&ws).unwrap();
        let mut graph = BuildGraph::new();
        add_aggregates(&mut graph, &ws, &links, &targets).unwrap();

        let alias: Vec<&Vec<String>> = graph
            .phonies()
            .iter()
            .filter(|p| p.name == "app_debug")
            .map(|p| &p.inputs)
            .collect();
        assert_eq!(alias, vec![&vec!["bin_debug/app_debug".to_string()]]);
        assert!(graph.produces("app_debug_debug"));
    }

    #[test]
    fn test_project_alias_includes_link_dependencies() {
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug"])
            .with_project(Project::static_lib("a").with_dependencies(["b"]))
            .with_project(Project::static_lib("b"));
        let targets = vec![
            built(0, "debug", "native", "bin_debug/liba.a"),
            built(1, "debug", "native", "bin_debug/libb.a"),
        ];

        let links = DependencyGraph::new(&ws).unwrap();
        let mut graph = BuildGraph::new();
        add_aggregates(&mut graph, &ws, &links, &targets).unwrap();

        let a = graph.phonies().iter().find(|p| p.name == "a").unwrap();
        assert_eq!(a.inputs, vec!["bin_debug/liba.a", "bin_debug/libb.a"]);
        let b = graph.phonies().iter().find(|p| p.name == "b").unwrap();
        assert_eq!(b.inputs, vec!["bin_debug/libb.a"]);
    }
}
