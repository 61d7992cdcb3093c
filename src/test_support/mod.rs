//! Test utilities for slnmake unit tests.
//!
//! Model builders create solutions in memory without a description file;
//! [`fixtures`] holds description texts for tests that go through the
//! loader.
//!
//! # Example
//!
//! ```rust,ignore
//! use slnmake::test_support::SolutionBuilder;
//!
//! let solution = SolutionBuilder::new("/sln")
//!     .native("App", ProjectKind::NativeExecutable, &["Debug", "Release"])
//!     .native("Mathx", ProjectKind::NativeStaticLibrary, &["Debug", "Release"])
//!     .requires("App", "Mathx")
//!     .build();
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};

pub use fixtures::*;

use crate::core::configuration::{ConfigSettings, Configuration, ManagedSettings, NativeSettings};
use crate::core::project::{Project, ProjectKind};
use crate::core::reference::Reference;
use crate::core::solution::Solution;

/// Native project rooted at `/sln/<name>` whose configurations use their own
/// name as intermediate and output folder.
pub fn native_project(name: &str, kind: ProjectKind, configurations: &[&str]) -> Project {
    project_under(Path::new("/sln"), name, kind, configurations)
}

/// Managed project with explicit intermediate and output folders.
pub fn managed_project_with_folders(
    name: &str,
    kind: ProjectKind,
    configuration: &str,
    intermediate: &str,
    output: &str,
) -> Project {
    let mut project = Project::new(name, kind, name, PathBuf::from("/sln").join(name));
    project
        .add_configuration(Configuration::new(
            name,
            configuration,
            intermediate,
            output,
            ConfigSettings::Managed(ManagedSettings::default()),
        ))
        .unwrap();
    project
}

fn project_under(root: &Path, name: &str, kind: ProjectKind, configurations: &[&str]) -> Project {
    let mut project = Project::new(name, kind, name, root.join(name));
    for cfg in configurations {
        let settings = if kind.is_native() {
            ConfigSettings::Native(NativeSettings::default())
        } else {
            ConfigSettings::Managed(ManagedSettings::default())
        };
        project
            .add_configuration(Configuration::new(name, cfg, cfg, cfg, settings))
            .unwrap();
    }
    project
}

/// Builder for in-memory solutions.
pub struct SolutionBuilder {
    solution: Solution,
    edges: Vec<(String, String)>,
}

impl SolutionBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SolutionBuilder {
            solution: Solution::new("Test", root),
            edges: Vec::new(),
        }
    }

    pub fn native(self, name: &str, kind: ProjectKind, configurations: &[&str]) -> Self {
        assert!(kind.is_native(), "`{}` is not a native kind", kind);
        let project = project_under(&self.solution.root, name, kind, configurations);
        self.project(project)
    }

    pub fn managed(self, name: &str, kind: ProjectKind, configurations: &[&str]) -> Self {
        assert!(kind.is_managed(), "`{}` is not a managed kind", kind);
        let project = project_under(&self.solution.root, name, kind, configurations);
        self.project(project)
    }

    pub fn project(mut self, project: Project) -> Self {
        self.solution.add_project(project).unwrap();
        self
    }

    pub fn sources(mut self, name: &str, sources: &[&str]) -> Self {
        let project = self.solution.project_mut(name).unwrap();
        project.sources.extend(sources.iter().map(|s| s.to_string()));
        self
    }

    /// Set the project's `link-dependencies` flag.
    pub fn auto_link(mut self, name: &str) -> Self {
        self.solution.project_mut(name).unwrap().link_dependencies = true;
        self
    }

    pub fn reference(mut self, name: &str, reference: Reference) -> Self {
        self.solution.project_mut(name).unwrap().references.push(reference);
        self
    }

    pub fn copy_to_output(mut self, name: &str, file: &str) -> Self {
        self.solution
            .project_mut(name)
            .unwrap()
            .copy_to_output
            .push(file.to_string());
        self
    }

    /// Edges are added at build time so projects may be declared in any order.
    pub fn requires(mut self, from: &str, to: &str) -> Self {
        self.edges.push((from.to_string(), to.to_string()));
        self
    }

    pub fn build(mut self) -> Solution {
        for (from, to) in &self.edges {
            self.solution.add_required_project(from, to).unwrap();
        }
        self.solution
    }
}

/// Write a description into a fresh temporary solution folder.
pub fn create_test_solution(description: &str) -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join(crate::core::DESCRIPTION_FILE_NAME), description).unwrap();
    dir
}

/// Assertion helpers for generated makefile text.
pub mod assertions {
    /// Assert that some line of `text` equals `line` exactly.
    pub fn assert_has_line(text: &str, line: &str) {
        assert!(
            text.lines().any(|l| l == line),
            "expected line {:?} in:\n{}",
            line,
            text
        );
    }

    /// Assert that no line of `text` contains `needle`.
    pub fn assert_no_line_contains(text: &str, needle: &str) {
        if let Some(line) = text.lines().find(|l| l.contains(needle)) {
            panic!("unexpected {:?} in line {:?}", needle, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_adds_edges_after_projects() {
        let solution = SolutionBuilder::new("/sln")
            .requires("App", "Mathx")
            .native("App", ProjectKind::NativeExecutable, &["Debug"])
            .native("Mathx", ProjectKind::NativeStaticLibrary, &["Debug"])
            .build();
        assert!(solution.project("App").unwrap().required().contains("Mathx"));
        assert_eq!(
            solution.project("Mathx").unwrap().root_absolute,
            PathBuf::from("/sln/Mathx")
        );
    }

    #[test]
    fn test_create_test_solution_writes_description() {
        let dir = create_test_solution(APP_AND_MATHX);
        assert!(dir.path().join("solution.toml").is_file());
    }
}
