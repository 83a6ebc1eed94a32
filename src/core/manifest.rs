//! ninjagen.toml parsing and schema.
//!
//! ```toml
//! [workspace]
//! name = "demo"
//! configurations = ["debug", "release"]
//! platforms = ["x64", "web"]          # optional, native when omitted
//! default-configuration = "debug"     # optional, first configuration
//! location = "build"                  # optional
//! defines = ["DEMO"]                  # workspace-wide settings
//!
//! [configuration.release]
//! defines = ["NDEBUG"]
//!
//! [platform.web]
//! os = "web"
//! toolchain = "emscripten"
//!
//! [[project]]
//! name = "app"
//! kind = "console-app"
//! files = ["src/*.c", { path = "src/fast.c", flags = ["-O3"] }]
//! links = ["core", "m"]               # projects and system libraries
//!
//! [project.configuration.debug]
//! defines = ["APP_TRACE"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::configuration::Settings;
use crate::core::errors::ModelError;
use crate::core::platform::{LinkGroupStyle, PlatformProfile, TargetOs, ToolOverrides, ToolchainKind};
use crate::core::project::{Project, SourceFile};
use crate::core::target::TargetKind;
use crate::core::workspace::Workspace;
use crate::util::fs::{glob_files, is_glob};

/// The canonical manifest file name.
pub const MANIFEST_NAME: &str = "ninjagen.toml";

/// Find the manifest by walking up from `start`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Front-end choices that shape the model, typically from the command line.
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    /// Toolchain for the native platform and for declared platforms that
    /// do not name one
    pub toolchain: Option<ToolchainKind>,
    /// OS of the native platform, the host when unset
    pub target_os: Option<TargetOs>,
    /// Build directory, overriding `workspace.location`
    pub build_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawWorkspace {
    name: Option<String>,
    #[serde(default)]
    configurations: Vec<String>,
    #[serde(default)]
    platforms: Vec<String>,
    default_configuration: Option<String>,
    location: Option<PathBuf>,
    #[serde(flatten)]
    settings: Settings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawPlatform {
    os: Option<TargetOs>,
    toolchain: Option<ToolchainKind>,
    link_groups: Option<LinkGroupStyle>,
    #[serde(flatten)]
    tools: ToolOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawFile {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        flags: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawProject {
    name: String,
    kind: Option<TargetKind>,
    #[serde(default)]
    location: PathBuf,
    #[serde(default)]
    files: Vec<RawFile>,
    /// Workspace projects and system libraries
    #[serde(default)]
    links: Vec<String>,
    #[serde(alias = "targetname")]
    target_name: Option<String>,
    #[serde(alias = "targetdir")]
    target_dir: Option<String>,
    #[serde(alias = "objdir")]
    obj_dir: Option<String>,
    version: Option<String>,
    #[serde(default)]
    generated_headers: Vec<PathBuf>,
    #[serde(default)]
    configuration: BTreeMap<String, Settings>,
    #[serde(flatten)]
    settings: Settings,
}

#[derive(Debug, Clone, Deserialize)]
struct RawManifest {
    workspace: RawWorkspace,
    #[serde(default)]
    configuration: BTreeMap<String, Settings>,
    #[serde(default)]
    platform: BTreeMap<String, RawPlatform>,
    #[serde(default)]
    project: Vec<RawProject>,
}

/// A parsed ninjagen.toml.
#[derive(Debug, Clone)]
pub struct Manifest {
    raw: RawManifest,
    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Manifest { raw, manifest_dir })
    }

    /// Workspace name, defaulting to the manifest directory name.
    pub fn name(&self) -> String {
        self.raw.workspace.name.clone().unwrap_or_else(|| {
            self.manifest_dir
                .canonicalize()
                .ok()
                .and_then(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "workspace".to_string())
        })
    }

    /// Build the immutable project model. Glob file patterns are expanded
    /// against each project's directory; the result is validated.
    pub fn to_workspace(&self, options: &ModelOptions) -> Result<Workspace> {
        let raw = &self.raw;
        let root = &self.manifest_dir;

        let mut ws = Workspace::new(self.name(), root.clone())
            .with_configurations(raw.workspace.configurations.iter().cloned())
            .with_platforms(self.platforms(options)?)
            .with_settings(raw.workspace.settings.clone());

        if let Some(dir) = options.build_dir.as_ref().or(raw.workspace.location.as_ref()) {
            ws = ws.with_location(dir.clone());
        }
        if let Some(default) = &raw.workspace.default_configuration {
            ws = ws.with_default_configuration(default.clone());
        }
        for (name, settings) in &raw.configuration {
            ws = ws.with_config_settings(name.clone(), settings.clone());
        }

        let project_names: Vec<&str> = raw.project.iter().map(|p| p.name.as_str()).collect();
        for raw_project in &raw.project {
            ws = ws.with_project(self.convert_project(raw_project, &project_names)?);
        }

        ws.validate()?;
        Ok(ws)
    }

    fn platforms(&self, options: &ModelOptions) -> Result<Vec<PlatformProfile>, ModelError> {
        let declared = &self.raw.workspace.platforms;
        if declared.is_empty() {
            let os = options.target_os.unwrap_or_else(TargetOs::host);
            let toolchain = options.toolchain.unwrap_or(os.default_toolchain());
            return Ok(vec![PlatformProfile::new("native", os, toolchain)]);
        }

        declared
            .iter()
            .map(|name| {
                let raw = self
                    .raw
                    .platform
                    .get(name)
                    .ok_or_else(|| ModelError::UnknownPlatform {
                        platform: name.clone(),
                    })?;
                let os = raw.os.unwrap_or_else(TargetOs::host);
                let toolchain = raw
                    .toolchain
                    .or(options.toolchain)
                    .unwrap_or(os.default_toolchain());
                let mut profile = PlatformProfile::new(name.clone(), os, toolchain);
                profile.link_groups = raw.link_groups;
                profile.tools = raw.tools.clone();
                Ok(profile)
            })
            .collect()
    }

    fn convert_project(&self, raw: &RawProject, project_names: &[&str]) -> Result<Project> {
        let project_dir = self.manifest_dir.join(&raw.location);

        let mut files = Vec::new();
        for entry in &raw.files {
            let (pattern, flags) = match entry {
                RawFile::Path(path) => (path.as_str(), &[][..]),
                RawFile::Detailed { path, flags } => (path.as_str(), flags.as_slice()),
            };

            let paths = if is_glob(pattern) {
                let matches = glob_files(&project_dir, pattern)?;
                if matches.is_empty() {
                    tracing::warn!("project `{}`: `{}` matches no files", raw.name, pattern);
                }
                matches
                    .into_iter()
                    .map(|path| {
                        path.strip_prefix(&project_dir)
                            .map(Path::to_path_buf)
                            .unwrap_or(path)
                    })
                    .collect()
            } else {
                vec![PathBuf::from(pattern)]
            };

            // A file listed twice is compiled once, with its first flags.
            for path in paths {
                if files.iter().any(|f: &SourceFile| f.path == path) {
                    continue;
                }
                files.push(SourceFile::new(path).with_flags(flags.iter().cloned()));
            }
        }

        let mut settings = raw.settings.clone();
        let mut dependencies = Vec::new();
        for link in &raw.links {
            if project_names.contains(&link.as_str()) {
                dependencies.push(link.clone());
            } else if !settings.system_libs.contains(link) {
                settings.system_libs.push(link.clone());
            }
        }

        let mut project = Project::new(raw.name.clone(), TargetKind::StaticLib)
            .with_location(raw.location.clone())
            .with_dependencies(dependencies)
            .with_settings(settings)
            .with_generated_headers(
                raw.generated_headers
                    .iter()
                    .map(|h| raw.location.join(h)),
            );
        project.kind = raw.kind;
        project.files = files;
        project.target_name = raw.target_name.clone();
        project.target_dir = raw.target_dir.clone();
        project.obj_dir = raw.obj_dir.clone();
        project.version = raw.version.clone();
        project.config_settings = raw.configuration.clone();

        Ok(project)
    }
}
