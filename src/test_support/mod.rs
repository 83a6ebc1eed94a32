//! Test utilities for ninjagen unit tests.
//!
//! Fixture workspaces cover the shapes the generator must handle: a lone
//! application, a static dependency chain, mutually dependent libraries, a
//! shared library and a windowed application.
//!
//! # Example
//!
//! ```rust,ignore
//! use ninjagen::test_support::fixtures;
//!
//! #[test]
//! fn test_example() {
//!     let generation = ninjagen::ninja::generate(&fixtures::static_chain()).unwrap();
//!     assert!(generation.graph.produces("bin_debug/app"));
//! }
//! ```

pub mod fixtures;

pub use fixtures::*;

/// Assertion helpers for testing.
pub mod assertions {
    use crate::ninja::graph::{BuildGraph, Edge};

    /// Assert that a result is Ok and return the value.
    pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("expected Ok, got Err: {:?}", e),
        }
    }

    /// Assert that a result is Err and return the error.
    pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>) -> E {
        match result {
            Ok(v) => panic!("expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    }

    /// The edge producing `output`, panicking with the known outputs when
    /// there is none.
    pub fn edge_for<'g>(graph: &'g BuildGraph, output: &str) -> &'g Edge {
        graph
            .edges()
            .find(|e| e.outputs.iter().any(|o| o == output))
            .unwrap_or_else(|| {
                let known: Vec<&String> = graph.edges().flat_map(|e| e.outputs.iter()).collect();
                panic!("no edge produces `{}`; outputs: {:?}", output, known)
            })
    }

    /// Assert that the script text contains `line` as a whole line.
    pub fn assert_has_line(script: &str, line: &str) {
        assert!(
            script.lines().any(|l| l == line),
            "script has no line `{}`\nscript:\n{}",
            line,
            script
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_validate() {
        for ws in [
            simple_app(),
            static_chain(),
            cyclic_libs(),
            shared_lib(linux()),
            windowed_app(linux()),
        ] {
            assertions::assert_ok(ws.validate());
        }
    }

    #[test]
    fn test_write_sources_creates_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_sources(tmp.path(), &["src/deep/a.c"]);
        assert!(tmp.path().join("src/deep/a.c").is_file());
    }
}
