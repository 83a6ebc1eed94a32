//! `compile_commands.json` rendered from the build graph.
//!
//! Each compile edge's rule command is expanded the way the executor would:
//! `$in`/`$out` become the shell-quoted paths, other references resolve
//! through edge bindings and then top-level bindings.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::ninja::escape::{shell_join, ShellStyle};
use crate::ninja::graph::{BuildGraph, Edge, Fragment, Value};
use crate::toolchain::RuleKind;

/// A compile edge, recorded by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    /// Index of the edge among the graph's edges
    pub edge: usize,
    pub shell: ShellStyle,
}

/// One entry of the compilation database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileCommand {
    pub directory: String,
    pub command: String,
    pub file: String,
    pub output: String,
}

/// Build the entries for every recorded compile edge.
pub fn compile_commands(
    graph: &BuildGraph,
    units: &[CompileUnit],
    build_dir: &Path,
) -> Vec<CompileCommand> {
    let edges: Vec<&Edge> = graph.edges().collect();
    let globals = graph.globals();
    let directory = build_dir.display().to_string();

    units
        .iter()
        .filter_map(|unit| {
            let edge = edges.get(unit.edge)?;
            let rule = graph.rule(&edge.rule)?;
            if !matches!(
                rule.template.kind,
                RuleKind::Cc | RuleKind::Cxx | RuleKind::GnuAs | RuleKind::Masm
            ) {
                return None;
            }
            Some(CompileCommand {
                directory: directory.clone(),
                command: expand(&rule.template.command, edge, &globals, unit.shell),
                file: edge.inputs.first()?.clone(),
                output: edge.outputs.first()?.clone(),
            })
        })
        .collect()
}

/// Render the database as pretty-printed JSON.
pub fn to_json(commands: &[CompileCommand]) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(commands)?;
    json.push('\n');
    Ok(json)
}

fn expand(
    template: &str,
    edge: &Edge,
    globals: &HashMap<&str, &Value>,
    shell: ShellStyle,
) -> String {
    let mut out = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(escaped @ ('$' | ' ' | ':')) => {
                chars.next();
                out.push(escaped);
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
                out.push_str(&lookup(&name, edge, globals, shell));
            }
            _ => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&lookup(&name, edge, globals, shell));
            }
        }
    }

    out
}

fn lookup(name: &str, edge: &Edge, globals: &HashMap<&str, &Value>, shell: ShellStyle) -> String {
    match name {
        "in" => shell_join(&edge.inputs, shell),
        "out" => shell_join(&edge.outputs, shell),
        _ => match edge.var(name).or_else(|| globals.get(name).copied()) {
            Some(value) => flatten(value, globals, 0),
            None => String::new(),
        },
    }
}

/// Resolve references inside a value. Bindings are evaluated in the
/// top-level scope, so nested references only see globals.
fn flatten(value: &Value, globals: &HashMap<&str, &Value>, depth: usize) -> String {
    let mut out = String::new();
    for fragment in value.fragments() {
        match fragment {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Var(name) => {
                if depth < 8 {
                    if let Some(inner) = globals.get(name.as_str()) {
                        out.push_str(&flatten(inner, globals, depth + 1));
                    }
                }
            }
        }
    }
    out
}
