//! Implicit linking of native projects.
//!
//! A project flagged with `link-dependencies` absorbs what its required
//! projects produce without listing it:
//!
//! - executables link every library they transitively depend on, stopping
//!   at libraries that link their own dependencies
//! - static libraries archive the object files of every static library they
//!   transitively depend on
//!
//! Resolution is planned against the unmodified solution and applied
//! afterwards. A plan never depends on another project's implicit additions.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::configuration::LibraryPath;
use crate::core::project::{Project, ProjectKind};
use crate::core::solution::Solution;
use crate::resolver::matching::ConfigurationMatcher;
use crate::util::fs::{add_folder_prefix, change_extension, normalize_lexical, relative_make_path};

/// A library one configuration of a dependency produces.
#[derive(Debug, Clone)]
struct LibraryInfo {
    name: String,
    configuration: String,
    output_folder: PathBuf,
}

/// An object file one configuration of a dependency produces.
#[derive(Debug, Clone)]
struct ObjectInfo {
    configuration: String,
    path: PathBuf,
}

/// What one configuration gains from implicit linking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationLinks {
    /// Raw library names, every dependent before its dependencies
    pub libraries: IndexSet<String>,
    /// Library search paths relative to the project root
    pub library_paths: Vec<String>,
    /// Object files relative to the project root
    pub objects: BTreeSet<String>,
}

/// Implicit linking plan for one project, keyed by configuration name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImplicitLinks {
    pub project: String,
    pub configurations: BTreeMap<String, ConfigurationLinks>,
}

impl ImplicitLinks {
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Merge the plan into the project's native configurations.
    pub fn apply(&self, project: &mut Project) {
        for (name, links) in &self.configurations {
            let Some(native) = project
                .configuration_mut(name)
                .and_then(|cfg| cfg.native_mut())
            else {
                continue;
            };
            native.libraries.extend(links.libraries.iter().cloned());
            for path in &links.library_paths {
                native.push_library_path(LibraryPath::generated(path.clone()));
            }
            native.implicit_objects.extend(links.objects.iter().cloned());
        }
    }
}

/// Plan implicit linking for one project.
///
/// Returns an empty plan unless the project links its dependencies
/// automatically and is an executable or a static library.
pub fn plan_implicit_links(
    solution: &Solution,
    project: &Project,
    folder_prefix: &str,
    matcher: &mut ConfigurationMatcher,
) -> ImplicitLinks {
    let mut plan = ImplicitLinks {
        project: project.name.clone(),
        configurations: BTreeMap::new(),
    };
    if !project.link_dependencies {
        return plan;
    }

    let mut visiting = HashSet::from([project.name.clone()]);

    match project.kind {
        ProjectKind::NativeExecutable => {
            let mut infos = Vec::new();
            collect_libraries(solution, project, folder_prefix, &mut visiting, &mut infos);

            for info in infos {
                let Some(target) = matcher.best_configuration(project, &info.configuration) else {
                    warn!(
                        "project `{}` could not implicitly link `{}`: no configuration matches `{}`",
                        project.name, info.name, info.configuration
                    );
                    continue;
                };
                let links = plan.configurations.entry(target).or_default();
                // The last occurrence wins so a library follows everything
                // that needs it.
                links.libraries.shift_remove(&info.name);
                links.libraries.insert(info.name);
                let path = relative_make_path(&project.root_absolute, &info.output_folder);
                if !links.library_paths.contains(&path) {
                    links.library_paths.push(path);
                }
            }
        }
        ProjectKind::NativeStaticLibrary => {
            let mut infos = Vec::new();
            collect_objects(solution, project, folder_prefix, &mut visiting, &mut infos);

            for info in infos {
                let Some(target) = matcher.best_configuration(project, &info.configuration) else {
                    warn!(
                        "project `{}` could not implicitly link objects of configuration `{}`: \
                         it has no configurations",
                        project.name, info.configuration
                    );
                    continue;
                };
                plan.configurations
                    .entry(target)
                    .or_default()
                    .objects
                    .insert(relative_make_path(&project.root_absolute, &info.path));
            }
        }
        _ => {}
    }

    plan
}

/// Libraries of every library `project` requires, transitively through
/// libraries that do not link their own dependencies.
fn collect_libraries(
    solution: &Solution,
    project: &Project,
    folder_prefix: &str,
    visiting: &mut HashSet<String>,
    infos: &mut Vec<LibraryInfo>,
) {
    for name in project.required() {
        let Some(dependency) = solution.project(name) else {
            continue;
        };
        if !dependency.kind.is_native_library() {
            continue;
        }
        if visiting.contains(&dependency.name) {
            warn!(
                "dependency cycle through `{}` while linking `{}`",
                dependency.name, project.name
            );
            continue;
        }

        for cfg in dependency.configurations() {
            let folder = add_folder_prefix(&cfg.output_folder, folder_prefix);
            infos.push(LibraryInfo {
                name: dependency.name.clone(),
                configuration: cfg.name.clone(),
                output_folder: normalize_lexical(&dependency.root_absolute.join(folder)),
            });
        }

        if dependency.link_dependencies {
            continue;
        }
        visiting.insert(dependency.name.clone());
        collect_libraries(solution, dependency, folder_prefix, visiting, infos);
        visiting.remove(&dependency.name);
    }
}

/// Object files of every static library `project` transitively requires.
fn collect_objects(
    solution: &Solution,
    project: &Project,
    folder_prefix: &str,
    visiting: &mut HashSet<String>,
    infos: &mut Vec<ObjectInfo>,
) {
    for name in project.required() {
        let Some(dependency) = solution.project(name) else {
            continue;
        };
        if dependency.kind != ProjectKind::NativeStaticLibrary {
            continue;
        }
        if !visiting.insert(dependency.name.clone()) {
            warn!(
                "dependency cycle through `{}` while collecting objects for `{}`",
                dependency.name, project.name
            );
            continue;
        }

        for cfg in dependency.configurations() {
            let folder = dependency
                .root_absolute
                .join(add_folder_prefix(&cfg.intermediate_folder, folder_prefix));
            for source in &dependency.sources {
                infos.push(ObjectInfo {
                    configuration: cfg.name.clone(),
                    path: normalize_lexical(&folder.join(change_extension(source, "o"))),
                });
            }
        }

        collect_objects(solution, dependency, folder_prefix, visiting, infos);
        visiting.remove(&dependency.name);
    }
}

/// Plan and apply implicit linking for every native project.
///
/// Returns the non-empty plans in project name order.
pub fn resolve_implicit_links(solution: &mut Solution, folder_prefix: &str) -> Vec<ImplicitLinks> {
    let mut matcher = ConfigurationMatcher::new();
    let plans: Vec<ImplicitLinks> = solution
        .projects()
        .map(|project| plan_implicit_links(solution, project, folder_prefix, &mut matcher))
        .filter(|plan| !plan.is_empty())
        .collect();

    for plan in &plans {
        if let Some(project) = solution.project_mut(&plan.project) {
            plan.apply(project);
            debug!(
                "implicitly linked `{}` in {} configuration(s)",
                plan.project,
                plan.configurations.len()
            );
        }
    }

    plans
}
