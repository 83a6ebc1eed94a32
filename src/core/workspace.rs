//! Workspace - the root of the project model.
//!
//! A Workspace owns the projects in declaration order and the configuration
//! axes (configuration names crossed with platform profiles) that apply to
//! every one of them.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::configuration::{Configuration, ResolvedSettings, Settings};
use crate::core::errors::ModelError;
use crate::core::platform::PlatformProfile;
use crate::core::project::Project;

/// Default build output directory, relative to the workspace root.
pub const DEFAULT_LOCATION: &str = "build";

/// A workspace containing projects and shared configuration axes.
#[derive(Debug, Clone)]
pub struct Workspace {
    name: String,

    /// Directory relative paths in the model are resolved against
    root: PathBuf,

    /// Build output directory (where the script is written)
    location: PathBuf,

    configurations: Vec<String>,

    platforms: Vec<PlatformProfile>,

    default_configuration: Option<String>,

    settings: Settings,

    config_settings: BTreeMap<String, Settings>,

    projects: Vec<Project>,
}

impl Workspace {
    /// Create an empty workspace rooted at `root`, building for the native
    /// platform.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Workspace {
            name: name.into(),
            root: root.into(),
            location: PathBuf::from(DEFAULT_LOCATION),
            configurations: Vec::new(),
            platforms: vec![PlatformProfile::native(None)],
            default_configuration: None,
            settings: Settings::default(),
            config_settings: BTreeMap::new(),
            projects: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_configurations(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.configurations = names.into_iter().map(|n| n.into()).collect();
        self
    }

    /// Replace the platform axis. An empty list keeps the native platform.
    pub fn with_platforms(mut self, platforms: Vec<PlatformProfile>) -> Self {
        if !platforms.is_empty() {
            self.platforms = platforms;
        }
        self
    }

    pub fn with_default_configuration(mut self, name: impl Into<String>) -> Self {
        self.default_configuration = Some(name.into());
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

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The build output directory.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.location)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn platforms(&self) -> &[PlatformProfile] {
        &self.platforms
    }

    pub fn configuration_names(&self) -> &[String] {
        &self.configurations
    }

    /// Look up a project by name, with its declaration index.
    pub fn project(&self, name: &str) -> Option<(usize, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    /// Every configuration axis, configuration name major, platform minor.
    pub fn configurations(&self) -> Vec<Configuration> {
        self.configurations
            .iter()
            .flat_map(|name| {
                self.platforms
                    .iter()
                    .map(move |p| Configuration::new(name.clone(), p.clone()))
            })
            .collect()
    }

    /// The configuration an unqualified build produces: the designated
    /// default, or the first declared configuration.
    pub fn default_configuration(&self) -> Option<&str> {
        self.default_configuration
            .as_deref()
            .or_else(|| self.configurations.first().map(|s| s.as_str()))
    }

    /// Flatten the settings layers for one (project, configuration) pair.
    pub fn resolve_settings(&self, project: &Project, config: &Configuration) -> ResolvedSettings {
        let preset = Settings::preset(&config.name);
        let layers = [
            Some(&preset),
            Some(&self.settings),
            self.config_settings.get(&config.name),
            Some(&project.settings),
            project.config_settings.get(&config.name),
        ];
        ResolvedSettings::resolve(layers.into_iter().flatten())
    }

    /// Check the model invariants that do not depend on naming or linking.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.projects.is_empty() {
            return Err(ModelError::EmptyWorkspace {
                workspace: self.name.clone(),
            });
        }
        if self.configurations.is_empty() {
            return Err(ModelError::NoConfigurations {
                workspace: self.name.clone(),
            });
        }

        let mut keys = HashSet::new();
        for config in self.configurations() {
            if !keys.insert((config.name.clone(), config.platform.name.clone())) {
                return Err(ModelError::DuplicateConfiguration {
                    configuration: config.name,
                    platform: config.platform.name,
                });
            }
        }

        if let Some(default) = &self.default_configuration {
            if !self.configurations.contains(default) {
                return Err(ModelError::UnknownDefault {
                    configuration: default.clone(),
                });
            }
        }

        for name in self.config_settings.keys() {
            if !self.configurations.contains(name) {
                return Err(ModelError::UndeclaredConfiguration {
                    scope: format!("workspace `{}`", self.name),
                    configuration: name.clone(),
                });
            }
        }

        let mut names = HashSet::new();
        for project in &self.projects {
            if project.name.is_empty() {
                return Err(ModelError::EmptyProjectName);
            }
            if !names.insert(project.name.as_str()) {
                return Err(ModelError::DuplicateProject {
                    project: project.name.clone(),
                });
            }
            if project.kind.is_none() {
                return Err(ModelError::MissingKind {
                    project: project.name.clone(),
                });
            }
            for name in project.config_settings.keys() {
                if !self.configurations.contains(name) {
                    return Err(ModelError::UndeclaredConfiguration {
                        scope: format!("project `{}`", project.name),
                        configuration: name.clone(),
                    });
                }
            }
        }

        for project in &self.projects {
            for dep in &project.dependencies {
                if dep == &project.name {
                    return Err(ModelError::SelfDependency {
                        project: project.name.clone(),
                    });
                }
                let Some((_, target)) = self.project(dep) else {
                    return Err(ModelError::UnknownDependency {
                        project: project.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                if target.kind.is_some_and(|k| k.is_application()) {
                    return Err(ModelError::LinkToApplication {
                        project: project.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::Optimize;
    use crate::core::platform::{TargetOs, ToolchainKind};

    fn workspace() -> Workspace {
        Workspace::new("ws", "/work")
            .with_configurations(["debug", "release"])
            .with_project(Project::console_app("app").with_files(["main.c"]))
    }

    #[test]
    fn test_configuration_axes() {
        let ws = workspace().with_platforms(vec![
            PlatformProfile::new("x64", TargetOs::Linux, ToolchainKind::Gcc),
            PlatformProfile::new("web", TargetOs::Web, ToolchainKind::Emscripten),
        ]);

        let configs: Vec<String> = ws.configurations().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            configs,
            vec!["debug|x64", "debug|web", "release|x64", "release|web"]
        );
        assert_eq!(ws.build_dir(), PathBuf::from("/work/build"));
    }

    #[test]
    fn test_default_configuration() {
        assert_eq!(workspace().default_configuration(), Some("debug"));
        let ws = workspace().with_default_configuration("release");
        assert_eq!(ws.default_configuration(), Some("release"));
    }

    #[test]
    fn test_resolve_settings_layers() {
        let ws = workspace()
            .with_config_settings(
                "release",
                Settings {
                    defines: vec!["NDEBUG".into()],
                    ..Settings::default()
                },
            )
            .with_project(Project::static_lib("lib").with_config_settings(
                "release",
                Settings {
                    optimize: Some(Optimize::Size),
                    ..Settings::default()
                },
            ));

        let (_, lib) = ws.project("lib").unwrap();
        let release = ws
            .configurations()
            .into_iter()
            .find(|c| c.name == "release")
            .unwrap();
        let resolved = ws.resolve_settings(lib, &release);
        assert_eq!(resolved.defines, vec!["NDEBUG"]);
        assert_eq!(resolved.optimize, Optimize::Size);
    }

    #[test]
    fn test_validate_rejects_bad_models() {
        let empty = Workspace::new("ws", "/work").with_configurations(["debug"]);
        assert!(matches!(
            empty.validate(),
            Err(ModelError::EmptyWorkspace { .. })
        ));

        let no_configs =
            Workspace::new("ws", "/work").with_project(Project::console_app("app"));
        assert!(matches!(
            no_configs.validate(),
            Err(ModelError::NoConfigurations { .. })
        ));

        let dup = Workspace::new("ws", "/work").with_configurations(["debug", "debug"]);
        let dup = dup.with_project(Project::console_app("app"));
        assert!(matches!(
            dup.validate(),
            Err(ModelError::DuplicateConfiguration { .. })
        ));

        let mut kindless = Project::console_app("app");
        kindless.kind = None;
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug"])
            .with_project(kindless);
        assert_eq!(
            ws.validate(),
            Err(ModelError::MissingKind {
                project: "app".into()
            })
        );

        let ws = workspace().with_project(Project::static_lib("lib").with_dependencies(["app"]));
        assert!(matches!(
            ws.validate(),
            Err(ModelError::LinkToApplication { .. })
        ));

        let ws = workspace().with_project(Project::static_lib("lib").with_dependencies(["nope"]));
        assert!(matches!(
            ws.validate(),
            Err(ModelError::UnknownDependency { .. })
        ));

        let ws = workspace().with_project(
            Project::static_lib("lib").with_config_settings("profile", Settings::default()),
        );
        assert!(matches!(
            ws.validate(),
            Err(ModelError::UndeclaredConfiguration { .. })
        ));
    }

    #[test]
    fn test_projects_without_files_are_valid() {
        let ws = Workspace::new("ws", "/work")
            .with_configurations(["debug"])
            .with_project(Project::static_lib("headers_only"));
        assert!(ws.validate().is_ok());
    }
}
