//! Link order - which libraries go on a link line, and in what order.
//!
//! Single-pass linkers need every library listed before the libraries it
//! depends on. The dependency graph may contain cycles between static
//! libraries; each strongly-connected component is collapsed into one
//! [`LinkUnit::Group`] that the toolchain spells as a link group or by
//! repeating the members. The order is the reverse post-order of a
//! depth-first walk over the condensed graph, visiting dependencies in
//! declaration order, so it is stable for an unchanged model.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::target::TargetKind;
use crate::core::Workspace;
use crate::ninja::errors::GenerateError;

/// One entry of a link line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkUnit {
    /// A single library, by project index
    Library(usize),
    /// Libraries that reference each other, in declaration order
    Group(Vec<usize>),
}

impl LinkUnit {
    pub fn members(&self) -> &[usize] {
        match self {
            LinkUnit::Library(idx) => std::slice::from_ref(idx),
            LinkUnit::Group(members) => members,
        }
    }
}

/// The project dependency graph with its strongly-connected components.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Edge `a -> b` means "a links against b"
    graph: DiGraph<usize, ()>,

    /// Project index -> component id
    component_of: Vec<usize>,

    /// Component id -> project indices in declaration order
    components: Vec<Vec<usize>>,

    kinds: Vec<TargetKind>,
}

impl DependencyGraph {
    /// Build the graph of a validated workspace.
    ///
    /// Fails when a cycle passes through a shared library: dynamic linkers
    /// cannot rescan a group the way static linkers do.
    pub fn new(ws: &Workspace) -> Result<Self, GenerateError> {
        let projects = ws.projects();
        let mut graph = DiGraph::with_capacity(projects.len(), 0);
        let nodes: Vec<NodeIndex> = (0..projects.len()).map(|i| graph.add_node(i)).collect();

        for (idx, project) in projects.iter().enumerate() {
            for dep in &project.dependencies {
                if let Some((dep_idx, _)) = ws.project(dep) {
                    if !graph.contains_edge(nodes[idx], nodes[dep_idx]) {
                        graph.add_edge(nodes[idx], nodes[dep_idx], ());
                    }
                }
            }
        }

        let mut component_of = vec![0; projects.len()];
        let mut components = Vec::new();
        for scc in tarjan_scc(&graph) {
            let mut members: Vec<usize> = scc.iter().map(|n| graph[*n]).collect();
            members.sort_unstable();
            for &m in &members {
                component_of[m] = components.len();
            }
            components.push(members);
        }

        let kinds: Vec<TargetKind> = projects
            .iter()
            .map(|p| p.kind.unwrap_or(TargetKind::StaticLib))
            .collect();

        for members in &components {
            if members.len() < 2 {
                continue;
            }
            if let Some(&shared) = members
                .iter()
                .find(|&&m| kinds[m] == TargetKind::SharedLib)
            {
                return Err(GenerateError::Dependency {
                    library: projects[shared].name.clone(),
                    cycle: members.iter().map(|&m| projects[m].name.clone()).collect(),
                });
            }
        }

        Ok(DependencyGraph {
            graph,
            component_of,
            components,
            kinds,
        })
    }

    /// Direct dependencies of a project, in declaration order.
    fn deps(&self, project: usize) -> Vec<usize> {
        let node = NodeIndex::new(project);
        // petgraph yields neighbours newest edge first
        let mut deps: Vec<usize> = self.graph.neighbors(node).map(|n| self.graph[n]).collect();
        deps.reverse();
        deps
    }

    /// Projects that have to be built along with `project`: its cycle
    /// partners, then every library on its link line.
    pub fn build_closure(&self, project: usize) -> Vec<usize> {
        let partners = self.components[self.component_of[project]]
            .iter()
            .copied()
            .filter(|&m| m != project);
        let linked: Vec<usize> = self
            .order(project)
            .iter()
            .flat_map(|unit| unit.members().to_vec())
            .collect();
        partners.chain(linked).collect()
    }

    /// The link line of `project`: dependents before dependencies, cycles
    /// collapsed into groups. The project itself is never part of the result.
    pub fn order(&self, project: usize) -> Vec<LinkUnit> {
        let mut visited = vec![false; self.components.len()];
        let mut post = Vec::new();

        let own = self.component_of[project];
        visited[own] = true;

        for dep in self.deps(project) {
            self.visit(self.component_of[dep], &mut visited, &mut post);
        }
        // Cycle partners of a static library are linked next to it.
        for &member in &self.components[own] {
            if member == project {
                continue;
            }
            for dep in self.deps(member) {
                self.visit(self.component_of[dep], &mut visited, &mut post);
            }
        }

        post.reverse();
        post.into_iter()
            .map(|c| {
                let members = &self.components[c];
                if members.len() == 1 {
                    LinkUnit::Library(members[0])
                } else {
                    LinkUnit::Group(members.clone())
                }
            })
            .collect()
    }

    fn visit(&self, component: usize, visited: &mut [bool], post: &mut Vec<usize>) {
        if visited[component] {
            return;
        }
        visited[component] = true;

        let members = &self.components[component];
        // A shared library already carries its own dependencies.
        let is_shared = members.len() == 1 && self.kinds[members[0]] == TargetKind::SharedLib;
        if !is_shared {
            for &member in members {
                for dep in self.deps(member) {
                    let next = self.component_of[dep];
                    if next != component {
                        self.visit(next, visited, post);
                    }
                }
            }
        }

        post.push(component);
    }
}
