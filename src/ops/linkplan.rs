//! What each configuration of one project links against.

use anyhow::Result;

use crate::core::configuration::{ConfigSettings, Configuration};
use crate::core::reference::{BoundReference, FileToCopy};
use crate::ops::convert::ResolvedSolution;
use crate::resolver::{find_project, ResolveError};

/// Link inputs of one configuration after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationPlan {
    pub configuration: String,

    /// Raw library names (native)
    pub libraries: Vec<String>,

    /// Library search paths in search order (native)
    pub library_paths: Vec<String>,

    /// Objects absorbed from dependent static libraries (native)
    pub implicit_objects: Vec<String>,

    /// Bound references (managed)
    pub references: Vec<BoundReference>,

    /// Files copied beside the output (managed)
    pub files_to_copy: Vec<FileToCopy>,
}

/// Link inputs of every selected configuration of a project.
#[derive(Debug, Clone)]
pub struct LinkPlan {
    pub project: String,
    pub configurations: Vec<ConfigurationPlan>,
}

fn configuration_plan(cfg: &Configuration) -> ConfigurationPlan {
    let mut plan = ConfigurationPlan {
        configuration: cfg.name.clone(),
        ..Default::default()
    };
    match &cfg.settings {
        ConfigSettings::Native(native) => {
            plan.libraries = native.libraries.iter().cloned().collect();
            plan.library_paths = native.library_paths.iter().map(|p| p.path.clone()).collect();
            plan.implicit_objects = native.implicit_objects.iter().cloned().collect();
        }
        ConfigSettings::Managed(managed) => {
            plan.references = managed.references.clone();
            plan.files_to_copy = managed.files_to_copy.clone();
        }
    }
    plan
}

/// Build the link plan of `project`, optionally for a single configuration.
pub fn link_plan(
    resolved: &ResolvedSolution,
    project: &str,
    configuration: Option<&str>,
) -> Result<LinkPlan> {
    let project = find_project(&resolved.solution, project)
        .map_err(|e| e.to_diagnostic().into_error())?;

    let configurations = match configuration {
        Some(name) => {
            let cfg = project.configuration(name).ok_or_else(|| {
                let err = ResolveError::ConfigurationNotFound {
                    project: project.name.clone(),
                    configuration: name.to_string(),
                    available: project
                        .configurations()
                        .iter()
                        .map(|c| c.name.clone())
                        .collect(),
                };
                err.to_diagnostic().into_error()
            })?;
            vec![configuration_plan(cfg)]
        }
        None => project.configurations().iter().map(configuration_plan).collect(),
    };

    Ok(LinkPlan {
        project: project.name.clone(),
        configurations,
    })
}
