//! Script serializer.
//!
//! Layout: header, rules in declaration order, then the body (top-level
//! binding blocks and edges in insertion order), the phony aliases and the
//! `default` statement. The output depends only on the graph, so an
//! unchanged model renders byte-identical text.

use crate::ninja::escape::{escape_path, escape_value, EscapeError};
use crate::ninja::graph::{BuildGraph, Edge, Fragment, Item, Value};

/// First executor version with implicit outputs.
pub const REQUIRED_VERSION: &str = "1.7";

const HEADER: &str = "# Generated by ninjagen. Do not edit; regenerate instead.\n";

/// Render the whole script.
pub fn render(graph: &BuildGraph) -> Result<String, EscapeError> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&format!("ninja_required_version = {}\n", REQUIRED_VERSION));

    for rule in graph.rules() {
        let t = &rule.template;
        out.push('\n');
        out.push_str(&format!("rule {}\n", rule.name));
        out.push_str(&format!("  command = {}\n", t.command));
        out.push_str(&format!("  description = {}\n", t.description));
        if let Some(depfile) = &t.depfile {
            out.push_str(&format!("  depfile = {}\n", depfile));
        }
        if let Some(deps) = t.deps {
            out.push_str(&format!("  deps = {}\n", deps));
        }
    }

    for item in graph.items() {
        match item {
            Item::Vars(vars) => {
                out.push('\n');
                for (name, value) in vars {
                    out.push_str(&format!("{} = {}\n", name, render_value(value)?));
                }
            }
            Item::Edge(edge) => {
                out.push_str(&render_edge(edge)?);
            }
        }
    }

    if !graph.phonies().is_empty() {
        out.push('\n');
        for phony in graph.phonies() {
            let mut line = format!("build {}: phony", escape_path(&phony.name)?);
            for input in &phony.inputs {
                line.push(' ');
                line.push_str(&escape_path(input)?);
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    if !graph.defaults().is_empty() {
        out.push('\n');
        let defaults = escape_paths(graph.defaults())?;
        out.push_str(&format!("default {}\n", defaults.join(" ")));
    }

    Ok(out)
}

fn render_edge(edge: &Edge) -> Result<String, EscapeError> {
    let mut line = String::from("build");
    for output in escape_paths(&edge.outputs)? {
        line.push(' ');
        line.push_str(&output);
    }
    if !edge.implicit_outputs.is_empty() {
        line.push_str(" |");
        for output in escape_paths(&edge.implicit_outputs)? {
            line.push(' ');
            line.push_str(&output);
        }
    }
    line.push_str(": ");
    line.push_str(&edge.rule);

    for input in escape_paths(&edge.inputs)? {
        line.push(' ');
        line.push_str(&input);
    }
    if !edge.implicit.is_empty() {
        line.push_str(" |");
        for input in escape_paths(&edge.implicit)? {
            line.push(' ');
            line.push_str(&input);
        }
    }
    if !edge.order_only.is_empty() {
        line.push_str(" ||");
        for input in escape_paths(&edge.order_only)? {
            line.push(' ');
            line.push_str(&input);
        }
    }

    let mut out = format!("{}\n", line);
    for (name, value) in &edge.vars {
        out.push_str(&format!("  {} = {}\n", name, render_value(value)?));
    }
    Ok(out)
}

fn escape_paths(paths: &[String]) -> Result<Vec<String>, EscapeError> {
    paths.iter().map(|p| escape_path(p)).collect()
}

/// Render a binding value: text is `$`-escaped, references become `$name`.
pub fn render_value(value: &Value) -> Result<String, EscapeError> {
    let mut out = String::new();
    for fragment in value.fragments() {
        match fragment {
            Fragment::Text(text) => out.push_str(&escape_value(text)?),
            Fragment::Var(name) => {
                out.push('$');
                out.push_str(name);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::{DepsFormat, RuleKind, RuleTemplate};

    fn graph() -> BuildGraph {
        let mut graph = BuildGraph::new();
        let cc = graph.add_rule(
            &RuleTemplate::new(RuleKind::Cc, "gcc $flags -c $in -o $out", "cc $out")
                .with_deps(DepsFormat::Gcc, Some("$out.d")),
            "gcc",
        );
        graph.add_vars(vec![("app_debug_cflags".into(), Value::text("-g -DVER=$1"))]);

        let mut edge = Edge::new(cc);
        edge.outputs.push("obj/debug/app/main.o".into());
        edge.inputs.push("../src/my main.c".into());
        edge.order_only.push("gen/config.h".into());
        edge.vars.push(("flags".into(), Value::var("app_debug_cflags")));
        graph.add_edge(edge, "project `app`", "debug").unwrap();

        graph
            .add_phony("debug", vec!["obj/debug/app/main.o".into()], "configuration `debug`", "debug")
            .unwrap();
        graph.set_default(vec!["debug".into()]);
        graph
    }

    #[test]
    fn test_render_layout() {
        let script = render(&graph()).unwrap();
        let expected = "\
# Generated by ninjagen. Do not edit; regenerate instead.

ninja_required_version = 1.7

rule cc
  command = gcc $flags -c $in -o $out
  description = cc $out
  depfile = $out.d
  deps = gcc

app_debug_cflags = -g -DVER=$$1
build obj/debug/app/main.o: cc ../src/my$ main.c || gen/config.h
  flags = $app_debug_cflags

build debug: phony obj/debug/app/main.o

default debug
";
        assert_eq!(script, expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(&graph()).unwrap(), render(&graph()).unwrap());
    }

    #[test]
    fn test_implicit_outputs_and_inputs() {
        let mut edge = Edge::new("link_shared");
        edge.outputs.push("bin/x.dll".into());
        edge.implicit_outputs.push("bin/x.lib".into());
        edge.inputs.push("obj/a.obj".into());
        edge.implicit.push("bin/y.lib".into());
        let text = render_edge(&edge).unwrap();
        assert_eq!(
            text,
            "build bin/x.dll | bin/x.lib: link_shared obj/a.obj | bin/y.lib\n"
        );
    }

    #[test]
    fn test_unrepresentable_path_fails() {
        let mut edge = Edge::new("cc");
        edge.outputs.push("a\nb.o".into());
        assert!(render_edge(&edge).is_err());
    }
}
