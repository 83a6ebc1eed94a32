//! Generation errors and warnings.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::errors::ModelError;
use crate::ninja::escape::EscapeError;
use crate::ninja::naming::NamingError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A fatal generation error. No script is written when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum GenerateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error("project `{project}` cannot be built for platform `{platform}`")]
    #[diagnostic(code(ninjagen::naming::unsupported))]
    Naming {
        project: String,
        platform: String,
        #[source]
        source: NamingError,
    },

    #[error("`{path}` is produced by both {first} and {second} in configuration `{configuration}`")]
    #[diagnostic(
        code(ninjagen::graph::collision),
        help("give one of the projects a different targetname or targetdir")
    )]
    Collision {
        path: String,
        configuration: String,
        first: String,
        second: String,
    },

    #[error("dependency cycle through shared library `{library}`")]
    #[diagnostic(
        code(ninjagen::link::shared_cycle),
        help("make the libraries in the cycle static, or break the cycle")
    )]
    Dependency { library: String, cycle: Vec<String> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Escape(#[from] EscapeError),
}

impl GenerateError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::Model(e) => Diagnostic::error(e.to_string())
                .with_suggestion(suggestions::CHECK_MODEL),

            GenerateError::Naming {
                project,
                platform,
                source,
            } => Diagnostic::error(format!(
                "project `{}` cannot be built for platform `{}`",
                project, platform
            ))
            .with_context(source.to_string())
            .with_suggestion(format!(
                "Exclude `{}` from platform `{}` or change its kind",
                project, platform
            )),

            GenerateError::Collision {
                path,
                configuration,
                first,
                second,
            } => Diagnostic::error(format!("output `{}` is produced twice", path))
                .with_context(format!("configuration: {}", configuration))
                .with_context(format!("first producer: {}", first))
                .with_context(format!("second producer: {}", second))
                .with_suggestion(suggestions::RENAME_TARGET),

            GenerateError::Dependency { library, cycle } => {
                let mut chain = cycle.clone();
                if let Some(first) = cycle.first() {
                    chain.push(first.clone());
                }
                Diagnostic::error(format!(
                    "dependency cycle through shared library `{}`",
                    library
                ))
                .with_context(format!("cycle: {}", chain.join(" -> ")))
                .with_suggestion(
                    "Break the cycle by removing or restructuring dependencies".to_string(),
                )
            }

            GenerateError::Escape(e) => Diagnostic::error(e.to_string())
                .with_suggestion("Rename the offending file or directory".to_string()),
        }
    }
}

/// A non-fatal problem found during generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateWarning {
    /// A listed file whose kind the toolchain cannot compile; it is skipped.
    UnrecognizedFile {
        project: String,
        path: PathBuf,
        toolchain: String,
    },
}

impl GenerateWarning {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateWarning::UnrecognizedFile {
                project,
                path,
                toolchain,
            } => Diagnostic::warning(format!(
                "{} is not a source file {} can compile, skipping",
                path.display(),
                toolchain
            ))
            .with_context(format!("project: {}", project)),
        }
    }
}

impl fmt::Display for GenerateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateWarning::UnrecognizedFile {
                project,
                path,
                toolchain,
            } => write!(
                f,
                "project `{}`: {} is not a source file {} can compile, skipping",
                project,
                path.display(),
                toolchain
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_diagnostic_shows_cycle() {
        let err = GenerateError::Dependency {
            library: "so".into(),
            cycle: vec!["so".into(), "a".into()],
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: dependency cycle through shared library `so`"));
        assert!(output.contains("cycle: so -> a -> so"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_warning_diagnostic() {
        let warning = GenerateWarning::UnrecognizedFile {
            project: "app".into(),
            path: "README.md".into(),
            toolchain: "gcc".into(),
        };
        let output = warning
            .to_diagnostic()
            .with_location("ninjagen.toml")
            .format(false);
        assert!(output.starts_with("warning: README.md is not a source file gcc can compile"));
        assert!(output.contains("--> ninjagen.toml"));
        assert!(output.contains("= project: app"));
    }

    #[test]
    fn test_model_error_is_transparent() {
        let err: GenerateError = ModelError::SelfDependency {
            project: "a".into(),
        }
        .into();
        assert_eq!(err.to_string(), "project `a` depends on itself");
    }
}
