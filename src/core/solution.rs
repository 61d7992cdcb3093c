//! The solution: the set of projects and the edges between them.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::core::error::ModelError;
use crate::core::project::{strip_spaces, Project};

/// A solution owns every project.
///
/// Projects are keyed by name and always iterated in name order, so anything
/// rendered from a solution comes out the same way every run.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub name: String,

    /// Absolute root folder
    pub root: PathBuf,

    projects: BTreeMap<String, Project>,
}

impl Solution {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Solution {
            name: name.into(),
            root: root.into(),
            projects: BTreeMap::new(),
        }
    }

    pub fn add_project(&mut self, project: Project) -> Result<(), ModelError> {
        if self.projects.contains_key(&project.name) {
            return Err(ModelError::DuplicateProject { name: project.name });
        }
        self.projects.insert(project.name.clone(), project);
        Ok(())
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn project_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.get_mut(name)
    }

    /// Iterate over projects in name order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn projects_mut(&mut self) -> impl Iterator<Item = &mut Project> {
        self.projects.values_mut()
    }

    /// Project names in name order.
    pub fn project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Record that `from` requires `to`. Both projects must exist.
    pub fn add_required_project(&mut self, from: &str, to: &str) -> Result<(), ModelError> {
        let to = strip_spaces(to);
        if !self.projects.contains_key(&to) {
            return Err(ModelError::UnknownProject { name: to });
        }
        let project = self
            .projects
            .get_mut(&strip_spaces(from))
            .ok_or_else(|| ModelError::UnknownProject {
                name: from.to_string(),
            })?;
        project.require(&to);
        Ok(())
    }

    /// Remove a project and every edge pointing at it.
    pub fn remove_project(&mut self, name: &str) -> Option<Project> {
        let removed = self.projects.remove(name)?;
        for project in self.projects.values_mut() {
            project.unrequire(name);
        }
        Some(removed)
    }

    /// Remove every project for which `should_remove` returns true.
    ///
    /// Returns the names of the removed projects.
    pub fn remove_projects_matching<F>(&mut self, mut should_remove: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let doomed: Vec<String> = self
            .projects
            .keys()
            .filter(|name| should_remove(name))
            .cloned()
            .collect();
        for name in &doomed {
            self.remove_project(name);
        }
        doomed
    }

    /// Build the required-project graph.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for name in self.projects.keys() {
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }
        for project in self.projects.values() {
            let from = nodes[&project.name];
            for required in project.required() {
                if let Some(&to) = nodes.get(required) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        DependencyGraph { graph, nodes }
    }
}

/// Read-only view of the project dependency graph.
///
/// An edge `a -> b` means `a` requires `b`.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Projects nothing else requires, in name order.
    pub fn roots(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .nodes
            .iter()
            .filter(|&(_, &node)| {
                self.graph
                    .neighbors_directed(node, petgraph::Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|(name, _)| name.clone())
            .collect();
        roots.sort();
        roots
    }

    /// Every dependency cycle, each listed in name order.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.into_iter().map(|n| self.graph[n].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }
}
