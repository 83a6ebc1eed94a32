//! Implementation of `ninjagen linkplan`.
//!
//! Shows what a project's link line will contain under every configuration,
//! computed by the same resolver the generator uses.

use anyhow::{anyhow, Result};

use crate::core::platform::LinkGroupStyle;
use crate::core::Workspace;
use crate::ninja::emitter::Emitter;
use crate::ninja::link_order::{DependencyGraph, LinkUnit};
use crate::toolchain;
use crate::util::diagnostic::suggestions;

/// One library on a link line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub project: String,
    /// Path passed to the linker, relative to the build directory
    pub input: String,
}

/// One entry of a link line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanUnit {
    Library(PlanEntry),
    Group(Vec<PlanEntry>),
}

/// The link line of a project under one configuration.
#[derive(Debug, Clone)]
pub struct ConfigPlan {
    pub configuration: String,
    pub platform: String,
    pub output: String,
    pub group_style: LinkGroupStyle,
    pub units: Vec<PlanUnit>,
    pub system_libs: Vec<String>,
}

/// Link plans of one project, configuration name major.
#[derive(Debug, Clone)]
pub struct LinkPlan {
    pub project: String,
    pub configs: Vec<ConfigPlan>,
}

/// Resolve the link plan of `project_name`.
pub fn link_plan(ws: &Workspace, project_name: &str) -> Result<LinkPlan> {
    let (idx, project) = ws.project(project_name).ok_or_else(|| {
        let names: Vec<&str> = ws.projects().iter().map(|p| p.name.as_str()).collect();
        anyhow!(
            "project `{}` not found in workspace\navailable projects: {}\n{}",
            project_name,
            names.join(", "),
            suggestions::PROJECT_NOT_FOUND
        )
    })?;

    ws.validate()?;
    let links = DependencyGraph::new(ws)?;
    let emitter = Emitter::new(ws, &links);

    let mut configs = Vec::new();
    for config in ws.configurations() {
        let tc = toolchain::for_profile(&config.platform);
        let entry = |member: usize| -> Result<PlanEntry> {
            Ok(PlanEntry {
                project: ws.projects()[member].name.clone(),
                input: emitter.layout(member, &config)?.link_input(),
            })
        };

        let mut units = Vec::new();
        for unit in links.order(idx) {
            units.push(match unit {
                LinkUnit::Library(member) => PlanUnit::Library(entry(member)?),
                LinkUnit::Group(members) => PlanUnit::Group(
                    members
                        .into_iter()
                        .map(entry)
                        .collect::<Result<Vec<_>>>()?,
                ),
            });
        }

        configs.push(ConfigPlan {
            output: emitter.layout(idx, &config)?.output(),
            group_style: toolchain::group_style(&config.platform, tc.as_ref()),
            system_libs: ws.resolve_settings(project, &config).system_libs,
            configuration: config.name.clone(),
            platform: config.platform.name.clone(),
            units,
        });
    }

    Ok(LinkPlan {
        project: project.name.clone(),
        configs,
    })
}

/// Render a plan for the terminal.
pub fn format_plan(plan: &LinkPlan) -> String {
    let mut out = String::new();
    for config in &plan.configs {
        out.push_str(&format!(
            "Link order for '{}' ({}, {}) -> {}:\n",
            plan.project, config.configuration, config.platform, config.output
        ));

        let mut index = 1;
        for unit in &config.units {
            match unit {
                PlanUnit::Library(entry) => {
                    out.push_str(&format!("  {}. {} ({})\n", index, entry.input, entry.project));
                    index += 1;
                }
                PlanUnit::Group(members) => {
                    let style = match config.group_style {
                        LinkGroupStyle::Directive => "group",
                        LinkGroupStyle::Repeat => "repeated",
                        LinkGroupStyle::Unordered => "unordered",
                    };
                    out.push_str(&format!("  [{} of {}]\n", style, members.len()));
                    for entry in members {
                        out.push_str(&format!("  {}. {} ({})\n", index, entry.input, entry.project));
                        index += 1;
                    }
                    out.push_str("  [end]\n");
                }
            }
        }
        for lib in &config.system_libs {
            out.push_str(&format!("  {}. {} (system)\n", index, lib));
            index += 1;
        }
        if index == 1 {
            out.push_str("  (no link dependencies)\n");
        }
        out.push('\n');
    }
    out
}
