//! Project model validation errors.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// The project model cannot be turned into a build graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ModelError {
    #[error("workspace `{workspace}` declares no projects")]
    #[diagnostic(code(ninjagen::model::empty_workspace))]
    EmptyWorkspace { workspace: String },

    #[error("workspace `{workspace}` declares no configurations")]
    #[diagnostic(
        code(ninjagen::model::no_configurations),
        help("add `configurations = [\"debug\", \"release\"]` to [workspace]")
    )]
    NoConfigurations { workspace: String },

    #[error("configuration `{configuration}` for platform `{platform}` is declared twice")]
    #[diagnostic(code(ninjagen::model::duplicate_configuration))]
    DuplicateConfiguration {
        configuration: String,
        platform: String,
    },

    #[error("project `{project}` is declared twice")]
    #[diagnostic(code(ninjagen::model::duplicate_project))]
    DuplicateProject { project: String },

    #[error("a project has an empty name")]
    #[diagnostic(code(ninjagen::model::empty_name))]
    EmptyProjectName,

    #[error("project `{project}` has no target kind")]
    #[diagnostic(
        code(ninjagen::model::missing_kind),
        help("set `kind` to one of: console-app, windowed-app, static-lib, shared-lib")
    )]
    MissingKind { project: String },

    #[error("{scope} overrides configuration `{configuration}`, which the workspace does not declare")]
    #[diagnostic(code(ninjagen::model::undeclared_configuration))]
    UndeclaredConfiguration {
        scope: String,
        configuration: String,
    },

    #[error("default configuration `{configuration}` is not declared")]
    #[diagnostic(code(ninjagen::model::unknown_default))]
    UnknownDefault { configuration: String },

    #[error("project `{project}` depends on unknown project `{dependency}`")]
    #[diagnostic(code(ninjagen::model::unknown_dependency))]
    UnknownDependency { project: String, dependency: String },

    #[error("project `{project}` depends on itself")]
    #[diagnostic(code(ninjagen::model::self_dependency))]
    SelfDependency { project: String },

    #[error("project `{project}` links against application `{dependency}`")]
    #[diagnostic(
        code(ninjagen::model::link_to_application),
        help("only static and shared libraries can be linked")
    )]
    LinkToApplication { project: String, dependency: String },

    #[error("unknown platform `{platform}`")]
    #[diagnostic(
        code(ninjagen::model::unknown_platform),
        help("declare it in a [platform.{platform}] table")
    )]
    UnknownPlatform { platform: String },
}
