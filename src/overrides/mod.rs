//! Override rules layered over the loaded solution.
//!
//! An override document holds a solution-wide layer (`AllProjects`) and any
//! number of per-project layers. Each layer lists entries to remove from
//! every configuration, and entries to add to configurations by exact name.
//!
//! Before any resolution runs the document may also drop whole projects
//! from the solution, turn static libraries into shared ones, and replace
//! the tools used by the generated makefiles.

mod apply;
mod parse;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use crate::util::config::{Platform, Toolchain, ToolchainSettings};

pub use parse::{load_overrides, parse_overrides, OVERRIDES_FILE_NAME};

/// All override rules of one document.
#[derive(Debug, Clone, Default)]
pub struct OverrideRules {
    /// Absolute solution root that relative rule paths are joined onto
    pub solution_root: PathBuf,

    /// Rules applying to every project
    pub all_projects: ProjectRules,

    /// Rules for specific projects, keyed by project name
    pub projects: HashMap<String, ProjectRules>,

    /// Lower-cased names of projects to drop from the solution
    pub ignored_projects: BTreeSet<String>,
}

/// One layer of rules.
#[derive(Debug, Clone, Default)]
pub struct ProjectRules {
    /// Library keys (see [`crate::util::fs::library_key`])
    pub removed_libraries: HashSet<String>,

    /// Path keys (see [`crate::util::fs::path_key`])
    pub removed_library_paths: HashSet<String>,

    pub removed_include_paths: HashSet<String>,

    pub removed_definitions: HashSet<String>,

    pub removed_flags: HashSet<String>,

    /// Additions keyed by exact configuration name
    pub configurations: HashMap<String, ConfigurationRules>,

    pub convert_static_to_shared: Option<bool>,

    pub compiler: ToolchainSettings,
}

/// Additions for one named configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationRules {
    /// Raw library names
    pub libraries: Vec<String>,

    /// Absolute paths
    pub library_paths: Vec<PathBuf>,

    /// Absolute paths
    pub include_paths: Vec<PathBuf>,

    pub definitions: Vec<String>,

    pub flags: Vec<String>,
}

/// The layers that apply to one project.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layers<'a> {
    pub specific: Option<&'a ProjectRules>,
    pub default: &'a ProjectRules,
}

impl<'a> Layers<'a> {
    /// Specific layer first, then the default layer.
    pub fn iter(&self) -> impl Iterator<Item = &'a ProjectRules> {
        self.specific.into_iter().chain(std::iter::once(self.default))
    }
}

impl OverrideRules {
    pub fn new(solution_root: impl Into<PathBuf>) -> Self {
        OverrideRules {
            solution_root: solution_root.into(),
            ..Default::default()
        }
    }

    pub(crate) fn layers(&self, project: &str) -> Layers<'_> {
        Layers {
            specific: self.projects.get(project),
            default: &self.all_projects,
        }
    }

    /// Whether a project is listed as ignored. Names compare case-insensitively.
    pub fn is_ignored(&self, project: &str) -> bool {
        self.ignored_projects.contains(&project.to_lowercase())
    }

    /// Whether a static library project should become a shared library.
    ///
    /// A project-specific setting wins over the solution-wide one.
    pub fn converts_static_to_shared(&self, project: &str) -> bool {
        self.layers(project)
            .iter()
            .find_map(|rules| rules.convert_static_to_shared)
            .unwrap_or(false)
    }

    /// Tools for one project: base settings, then the solution-wide
    /// `Compiler` element, then the project's own.
    pub fn toolchain_for(
        &self,
        project: &str,
        base: &ToolchainSettings,
        platform: Platform,
    ) -> Toolchain {
        let mut settings = base.clone();
        settings.merge(&self.all_projects.compiler);
        if let Some(specific) = self.projects.get(project) {
            settings.merge(&specific.compiler);
        }
        settings.resolve(platform)
    }
}

impl ProjectRules {
    /// Additions for a configuration, creating the entry if needed.
    pub fn configuration_mut(&mut self, name: &str) -> &mut ConfigurationRules {
        self.configurations.entry(name.to_string()).or_default()
    }
}
