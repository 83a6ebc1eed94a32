//! Rule and edge emission.
//!
//! For every (project, configuration) pair, in project declaration order:
//! one block of top-level flag bindings, one compile edge per source file
//! and exactly one terminal edge (archive or link), plus symlink edges for
//! versioned shared libraries.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::configuration::{Configuration, ResolvedSettings};
use crate::core::platform::{LinkGroupStyle, TargetOs};
use crate::core::project::{Project, SourceFile};
use crate::core::target::{FileKind, Language, TargetKind};
use crate::core::Workspace;
use crate::ninja::compdb::CompileUnit;
use crate::ninja::errors::{GenerateError, GenerateWarning};
use crate::ninja::escape::{sanitize_identifier, shell_join};
use crate::ninja::graph::{BuildGraph, Edge, Value};
use crate::ninja::link_order::{DependencyGraph, LinkUnit};
use crate::ninja::naming::{self, Artifact, AuxKind};
use crate::toolchain::{self, Toolchain};
use crate::util::fs::{normalize, relative_path, to_slash};

/// Where a project's files land under one configuration.
#[derive(Debug, Clone)]
pub struct Layout {
    pub artifact: Artifact,
    /// Artifact directory, relative to the build directory
    pub target_dir: String,
    /// Object directory, relative to the build directory
    pub obj_dir: String,
}

impl Layout {
    fn path(&self, file_name: &str) -> String {
        join(&self.target_dir, file_name)
    }

    /// The path aggregates and dependents refer to.
    pub fn output(&self) -> String {
        self.path(&self.artifact.file_name())
    }

    /// The path a dependent passes to its linker.
    pub fn link_input(&self) -> String {
        self.path(&self.artifact.link_input())
    }
}

/// A project output produced under one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTarget {
    pub project: usize,
    pub configuration: String,
    pub platform: String,
    pub output: String,
}

/// Everything the emitter produced.
#[derive(Debug, Default)]
pub struct Emission {
    pub graph: BuildGraph,
    pub built: Vec<BuiltTarget>,
    pub warnings: Vec<GenerateWarning>,
    pub compile_units: Vec<CompileUnit>,
    edge_count: usize,
}

impl Emission {
    fn push_edge(&mut self, edge: Edge, producer: &str, config: &str) -> Result<(), GenerateError> {
        self.graph.add_edge(edge, producer, config)?;
        self.edge_count += 1;
        Ok(())
    }
}

pub struct Emitter<'a> {
    ws: &'a Workspace,
    build_dir: PathBuf,
    links: &'a DependencyGraph,
    toolchains: HashMap<String, Box<dyn Toolchain>>,
    multi_platform: bool,
    /// Static libraries that end up inside a shared object
    needs_pic: Vec<bool>,
    scopes: HashSet<String>,
    warned: HashSet<(usize, PathBuf, String)>,
    /// Generated headers seen so far: path, producer label, configuration
    generated: Vec<(String, String, String)>,
    out: Emission,
}

impl<'a> Emitter<'a> {
    pub fn new(ws: &'a Workspace, links: &'a DependencyGraph) -> Self {
        let toolchains = ws
            .platforms()
            .iter()
            .map(|p| (p.name.clone(), toolchain::for_profile(p)))
            .collect();

        let projects = ws.projects();
        let mut needs_pic = vec![false; projects.len()];
        for (idx, project) in projects.iter().enumerate() {
            if project.kind == Some(TargetKind::SharedLib) {
                needs_pic[idx] = true;
                for unit in links.order(idx) {
                    for &member in unit.members() {
                        needs_pic[member] = true;
                    }
                }
            }
        }

        Emitter {
            ws,
            build_dir: normalize(&ws.build_dir()),
            links,
            toolchains,
            multi_platform: ws.platforms().len() > 1,
            needs_pic,
            scopes: HashSet::new(),
            warned: HashSet::new(),
            generated: Vec::new(),
            out: Emission::default(),
        }
    }

    /// Emit every (project, configuration) pair.
    pub fn emit(mut self) -> Result<Emission, GenerateError> {
        let configs = self.ws.configurations();
        for idx in 0..self.ws.projects().len() {
            for config in &configs {
                self.emit_pair(idx, config)?;
            }
        }

        // A generated header no edge produces gets an input-less phony, so
        // the executor waits for it when it exists and does not fail when
        // an outside step has not created it yet.
        for (path, producer, config) in std::mem::take(&mut self.generated) {
            if !self
                .out
                .graph
                .add_phony_if_free(path.as_str(), Vec::new(), &producer, &config)
            {
                tracing::debug!("generated header {} has a producing edge", path);
            }
        }
        Ok(self.out)
    }

    /// Resolve the artifact and directories of a project.
    pub fn layout(&self, project_idx: usize, config: &Configuration) -> Result<Layout, GenerateError> {
        let project = &self.ws.projects()[project_idx];
        let kind = project.kind.unwrap_or(TargetKind::StaticLib);
        let os = config.platform.os;
        let version = if os == TargetOs::Linux {
            project.version.as_deref()
        } else {
            None
        };

        let artifact = naming::resolve_versioned(kind, os, project.base_name(), version)
            .map_err(|source| GenerateError::Naming {
                project: project.name.clone(),
                platform: config.platform.name.clone(),
                source,
            })?;

        let expand = |template: &str| {
            naming::expand_dir(template, &config.name, &config.platform.name, &project.name)
        };
        let target_dir = expand(
            project
                .target_dir
                .as_deref()
                .unwrap_or(naming::default_target_dir(self.multi_platform)),
        );
        let obj_dir = expand(
            project
                .obj_dir
                .as_deref()
                .unwrap_or(naming::default_obj_dir(self.multi_platform)),
        );

        Ok(Layout {
            artifact,
            target_dir: self.build_relative(Path::new(&target_dir)),
            obj_dir: self.build_relative(Path::new(&obj_dir)),
        })
    }

    /// Output directories are relative to the build directory.
    fn build_relative(&self, dir: &Path) -> String {
        if dir.is_absolute() {
            to_slash(&relative_path(&self.build_dir, dir))
        } else {
            to_slash(&normalize(dir))
        }
    }

    /// Model paths are relative to the workspace root.
    fn root_relative(&self, path: &Path) -> String {
        let absolute = self.ws.root().join(path);
        to_slash(&relative_path(&self.build_dir, &absolute))
    }

    fn source_path(&self, project: &Project, file: &SourceFile) -> String {
        self.root_relative(&project.location.join(&file.path))
    }

    fn scope_name(&mut self, project: &Project, config: &Configuration) -> String {
        let raw = if self.multi_platform {
            format!("{}_{}_{}", project.name, config.name, config.platform.name)
        } else {
            format!("{}_{}", project.name, config.name)
        };
        let base = sanitize_identifier(&raw);
        let mut name = base.clone();
        let mut counter = 2;
        while !self.scopes.insert(name.clone()) {
            name = format!("{}_{}", base, counter);
            counter += 1;
        }
        name
    }

    fn emit_pair(&mut self, idx: usize, config: &Configuration) -> Result<(), GenerateError> {
        let ws = self.ws;
        let project = &ws.projects()[idx];
        let kind = project.kind.ok_or_else(|| crate::core::errors::ModelError::MissingKind {
            project: project.name.clone(),
        })?;
        let layout = self.layout(idx, config)?;
        let settings = ws.resolve_settings(project, config);
        let producer = format!("project `{}`", project.name);
        let config_label = config.to_string();

        tracing::debug!(
            "emitting {} ({}) -> {}",
            project.name,
            config_label,
            layout.output()
        );

        // Classify files first so only the flag sets in use are bound.
        let mut sources = Vec::new();
        for file in &project.files {
            let file_kind = FileKind::of(&file.path);
            if file_kind == FileKind::Header {
                continue;
            }
            match self.toolchains[&config.platform.name].compile_rule(file_kind) {
                Some(rule) => sources.push((file, file_kind, rule)),
                None => self.warn_unrecognized(idx, project, &file.path, config),
            }
        }

        let scope = self.scope_name(project, config);
        // Every configuration's platform comes from the workspace axis.
        let tc = self.toolchains[&config.platform.name].as_ref();
        let flag_vars = self.flag_vars(tc, &scope, &settings, &sources, self.needs_pic[idx]);
        self.out.graph.add_vars(flag_vars);

        let order_only: Vec<String> = project
            .generated_headers
            .iter()
            .map(|h| self.root_relative(h))
            .collect();
        for header in &order_only {
            if !self.generated.iter().any(|(path, _, _)| path == header) {
                self.generated.push((
                    header.clone(),
                    format!("generated header of project `{}`", project.name),
                    config_label.clone(),
                ));
            }
        }

        let mut objects = Vec::new();
        let mut used_names = HashSet::new();
        for (file, file_kind, rule) in &sources {
            let rule_name = self.out.graph.add_rule(rule, tc.kind().as_str());
            let object = join(
                &layout.obj_dir,
                &object_name(&file.path, tc.object_extension(), &mut used_names),
            );

            let mut flags = Value::var(format!("{}_{}", scope, flag_set(*file_kind)));
            if !file.flags.is_empty() {
                flags.push_text(&shell_join(&file.flags, tc.shell()));
            }

            let mut edge = Edge::new(rule_name);
            edge.outputs.push(object.clone());
            edge.inputs.push(self.source_path(project, file));
            edge.order_only = order_only.clone();
            edge.vars.push(("flags".to_string(), flags));

            self.out.compile_units.push(CompileUnit {
                edge: self.out.edge_count,
                shell: tc.shell(),
            });
            self.out.push_edge(edge, &producer, &config_label)?;
            objects.push(object);
        }

        let symlink = tc.symlink_rule();
        if !kind.needs_link() {
            let rule = self.out.graph.add_rule(&tc.archive_rule(), tc.kind().as_str());
            let mut edge = Edge::new(rule);
            edge.outputs.push(layout.path(&layout.artifact.linker_output()));
            edge.inputs = objects;
            self.out.push_edge(edge, &producer, &config_label)?;
        } else {
            let edge = self.link_edge(idx, config, &layout, &settings, objects)?;
            self.out.push_edge(edge, &producer, &config_label)?;
        }

        if let Some(rule) = symlink {
            self.emit_symlinks(&layout, &rule, &producer, &config_label)?;
        }

        self.out.built.push(BuiltTarget {
            project: idx,
            configuration: config.name.clone(),
            platform: config.platform.name.clone(),
            output: layout.output(),
        });
        Ok(())
    }

    fn warn_unrecognized(&mut self, idx: usize, project: &Project, path: &Path, config: &Configuration) {
        let toolchain = config.platform.toolchain.as_str().to_string();
        if !self.warned.insert((idx, path.to_path_buf(), toolchain.clone())) {
            return;
        }
        let warning = GenerateWarning::UnrecognizedFile {
            project: project.name.clone(),
            path: path.to_path_buf(),
            toolchain,
        };
        tracing::debug!("{}", warning);
        self.out.warnings.push(warning);
    }

    /// Top-level bindings shared by the pair's compile edges.
    fn flag_vars(
        &self,
        tc: &dyn Toolchain,
        scope: &str,
        settings: &ResolvedSettings,
        sources: &[(&SourceFile, FileKind, toolchain::RuleTemplate)],
        pic: bool,
    ) -> Vec<(String, Value)> {
        let mut preprocessor: Vec<String> = settings
            .defines
            .iter()
            .map(|d| tc.define_flag(d))
            .collect();
        preprocessor.extend(
            settings
                .include_dirs
                .iter()
                .map(|dir| tc.include_flag(&self.root_relative(dir))),
        );

        let mut c_flags = preprocessor.clone();
        c_flags.extend(tc.compile_flags(settings, pic));
        c_flags.extend(settings.cflags.iter().cloned());

        let mut vars = Vec::new();
        for set in ["cflags", "cxxflags", "asflags"] {
            if !sources.iter().any(|(_, kind, _)| flag_set(*kind) == set) {
                continue;
            }
            let flags = match set {
                "cflags" => c_flags.clone(),
                "cxxflags" => {
                    let mut flags = c_flags.clone();
                    flags.extend(tc.cxx_only_flags());
                    flags.extend(settings.cxxflags.iter().cloned());
                    flags
                }
                _ => preprocessor.clone(),
            };
            vars.push((
                format!("{}_{}", scope, set),
                Value::text(shell_join(&flags, tc.shell())),
            ));
        }
        vars
    }

    fn link_edge(
        &mut self,
        idx: usize,
        config: &Configuration,
        layout: &Layout,
        settings: &ResolvedSettings,
        objects: Vec<String>,
    ) -> Result<Edge, GenerateError> {
        let ws = self.ws;
        let project = &ws.projects()[idx];
        let kind = project.kind.unwrap_or(TargetKind::ConsoleApp);
        let tc = self.toolchains[&config.platform.name].as_ref();
        let units = self.links.order(idx);

        let driver = if has_cxx(project)
            || units.iter().flat_map(|u| u.members()).any(|&m| {
                let dep = &ws.projects()[m];
                dep.kind == Some(TargetKind::StaticLib) && has_cxx(dep)
            }) {
            Language::Cxx
        } else {
            Language::C
        };
        let rule_name = self
            .out
            .graph
            .add_rule(&tc.link_rule(kind, driver), tc.kind().as_str());

        let style = toolchain::group_style(&config.platform, tc);

        let mut libs = Vec::new();
        let mut implicit = Vec::new();
        let mut rpaths = Vec::new();
        for unit in &units {
            let mut paths = Vec::new();
            for &member in unit.members() {
                let dep_layout = self.layout(member, config)?;
                let input = dep_layout.link_input();
                if !implicit.contains(&input) {
                    implicit.push(input.clone());
                }
                if ws.projects()[member].kind == Some(TargetKind::SharedLib) {
                    let rel = to_slash(&relative_path(
                        Path::new(&layout.target_dir),
                        Path::new(&dep_layout.target_dir),
                    ));
                    if let Some(flag) = tc.rpath_flag(&rel) {
                        if !rpaths.contains(&flag) {
                            rpaths.push(flag);
                        }
                    }
                }
                paths.push(input);
            }

            match unit {
                LinkUnit::Library(_) => libs.extend(paths),
                LinkUnit::Group(members) => match (style, tc.group_markers()) {
                    (LinkGroupStyle::Directive, Some((start, end))) => {
                        libs.push(start.to_string());
                        libs.extend(paths);
                        libs.push(end.to_string());
                    }
                    (LinkGroupStyle::Repeat, _) => {
                        for _ in 0..members.len() {
                            libs.extend(paths.iter().cloned());
                        }
                    }
                    _ => libs.extend(paths),
                },
            }
        }
        libs.extend(settings.system_libs.iter().map(|l| tc.system_lib_flag(l)));

        let mut ldflags = tc.link_flags(settings, kind);
        ldflags.extend(
            settings
                .lib_dirs
                .iter()
                .map(|dir| tc.lib_dir_flag(&self.root_relative(dir))),
        );
        if kind == TargetKind::SharedLib {
            ldflags.extend(tc.shared_lib_flags(&layout.artifact));
        }
        ldflags.extend(rpaths);
        ldflags.extend(settings.ldflags.iter().cloned());

        let mut edge = Edge::new(rule_name);
        edge.outputs.push(layout.path(&layout.artifact.linker_output()));
        edge.inputs = objects;
        edge.implicit = implicit;
        edge.vars.push((
            "ldflags".to_string(),
            Value::text(shell_join(&ldflags, tc.shell())),
        ));
        edge.vars.push((
            "libs".to_string(),
            Value::text(shell_join(&libs, tc.shell())),
        ));

        for (aux, var) in [(AuxKind::ImportLibrary, "implib"), (AuxKind::Loader, "loader")] {
            if let Some(file_name) = layout.artifact.aux(aux) {
                let path = layout.path(file_name);
                edge.implicit_outputs.push(path.clone());
                edge.vars.push((
                    var.to_string(),
                    Value::text(shell_join([&path], tc.shell())),
                ));
            }
        }

        Ok(edge)
    }

    /// `libname.so.X` and `libname.so` links for a versioned shared library.
    fn emit_symlinks(
        &mut self,
        layout: &Layout,
        rule: &toolchain::RuleTemplate,
        producer: &str,
        config: &str,
    ) -> Result<(), GenerateError> {
        let Some(real) = layout.artifact.aux(AuxKind::VersionedFile) else {
            return Ok(());
        };
        let rule_name = self.out.graph.add_rule(rule, "ln");

        let mut chain = vec![real.to_string()];
        if let Some(soname) = layout.artifact.aux(AuxKind::SonameLink) {
            chain.push(soname.to_string());
        }
        chain.push(layout.artifact.file_name());

        for pair in chain.windows(2) {
            let (target, link) = (&pair[0], &pair[1]);
            let mut edge = Edge::new(rule_name.clone());
            edge.outputs.push(layout.path(link));
            edge.inputs.push(layout.path(target));
            edge.vars.push(("target".to_string(), Value::text(target.clone())));
            self.out.push_edge(edge, producer, config)?;
        }
        Ok(())
    }
}

/// The flag binding a file kind compiles with.
fn flag_set(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Cxx => "cxxflags",
        FileKind::GnuAsm | FileKind::Masm => "asflags",
        _ => "cflags",
    }
}

fn has_cxx(project: &Project) -> bool {
    project
        .files
        .iter()
        .any(|f| FileKind::of(&f.path).language() == Language::Cxx)
}

/// `stem.ext`, with `_N` appended when another source already used it.
fn object_name(source: &Path, extension: &str, used: &mut HashSet<String>) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "object".to_string());
    let mut candidate = stem.clone();
    let mut counter = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", stem, counter);
        counter += 1;
    }
    format!("{}.{}", candidate, extension)
}

fn join(dir: &str, file_name: &str) -> String {
    if dir.is_empty() || dir == "." {
        file_name.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file_name)
    }
}
