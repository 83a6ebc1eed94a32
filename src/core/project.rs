//! Projects - one buildable unit each.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::configuration::Settings;
use crate::core::target::TargetKind;

/// A source file listed by a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the project location (or absolute)
    pub path: PathBuf,
    /// Extra compiler flags for this file only
    pub flags: Vec<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceFile {
            path: path.into(),
            flags: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.flags = flags.into_iter().map(|f| f.into()).collect();
        self
    }
}

/// A named build unit producing one artifact per configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,

    /// `None` when the model did not say; rejected during validation
    pub kind: Option<TargetKind>,

    /// Directory that relative file and include paths are resolved against,
    /// relative to the workspace root unless absolute.
    pub location: PathBuf,

    /// Source files in declaration order
    pub files: Vec<SourceFile>,

    /// Names of workspace projects this project links against
    pub dependencies: Vec<String>,

    pub settings: Settings,

    /// Overrides keyed by configuration name
    pub config_settings: BTreeMap<String, Settings>,

    /// Base name of the artifact (defaults to the project name)
    pub target_name: Option<String>,

    /// Artifact directory template, see [`crate::ninja::naming::expand_dir`]
    pub target_dir: Option<String>,

    /// Object directory template
    pub obj_dir: Option<String>,

    /// Shared library version, e.g. `1.2.0`
    pub version: Option<String>,

    /// Headers produced by other build steps; compile edges wait for them.
    /// A header no edge produces is stood in for by an input-less phony.
    pub generated_headers: Vec<PathBuf>,
}

impl Project {
    /// Create a new project with the given name and kind.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Project {
            name: name.into(),
            kind: Some(kind),
            location: PathBuf::new(),
            files: Vec::new(),
            dependencies: Vec::new(),
            settings: Settings::default(),
            config_settings: BTreeMap::new(),
            target_name: None,
            target_dir: None,
            obj_dir: None,
            version: None,
            generated_headers: Vec::new(),
        }
    }

    pub fn console_app(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::ConsoleApp)
    }

    pub fn windowed_app(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::WindowedApp)
    }

    pub fn static_lib(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::StaticLib)
    }

    pub fn shared_lib(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::SharedLib)
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    /// Add source files without per-file flags.
    pub fn with_files(mut self, files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.files.extend(files.into_iter().map(SourceFile::new));
        self
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies.extend(deps.into_iter().map(|d| d.into()));
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_config_settings(mut self, config: impl Into<String>, settings: Settings) -> Self {
        self.config_settings.insert(config.into(), settings);
        self
    }

    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn with_target_dir(mut self, dir: impl Into<String>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_generated_headers(
        mut self,
        headers: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.generated_headers
            .extend(headers.into_iter().map(|h| h.into()));
        self
    }

    /// The artifact base name.
    pub fn base_name(&self) -> &str {
        self.target_name.as_deref().unwrap_or(&self.name)
    }
}
