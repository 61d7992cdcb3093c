//! Binding managed references to configurations.
//!
//! A reference whose path is the output of another managed project in the
//! solution becomes a project reference, bound per consuming configuration
//! to the producer configuration with the closest name. Anything else is an
//! external reference and binds to the same path in every configuration.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::core::project::Project;
use crate::core::reference::{BoundReference, FileToCopy, ReferenceKind};
use crate::core::solution::Solution;
use crate::resolver::matching::ConfigurationMatcher;
use crate::util::fs::{add_folder_prefix, normalize_lexical, relative_make_path, to_make_path};

/// Assemblies every managed build links implicitly.
pub const CORE_RUNTIME_ASSEMBLIES: &[&str] = &["mscorlib"];

fn artifact_key(path: &Path) -> String {
    to_make_path(&normalize_lexical(path)).to_lowercase()
}

fn is_core_runtime(stem: &str) -> bool {
    CORE_RUNTIME_ASSEMBLIES
        .iter()
        .any(|core| core.eq_ignore_ascii_case(stem))
}

/// Maps the artifact paths of the original build to the projects producing
/// them.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    producers: HashMap<String, String>,
}

impl ArtifactIndex {
    pub fn build(solution: &Solution) -> Self {
        let mut producers = HashMap::new();
        for project in solution.projects().filter(|p| p.kind.is_managed()) {
            let file = project.output_file_name();
            for cfg in project.configurations() {
                for folder in [&cfg.output_folder, &cfg.intermediate_folder] {
                    let path = project.root_absolute.join(folder).join(&file);
                    producers
                        .entry(artifact_key(&path))
                        .or_insert_with(|| project.name.clone());
                }
            }
        }
        ArtifactIndex { producers }
    }

    /// Name of the project whose output is at `path`.
    pub fn producer(&self, path: &Path) -> Option<&str> {
        self.producers.get(&artifact_key(path)).map(String::as_str)
    }
}

/// Absolute path of the generated artifact of one producer configuration.
fn generated_artifact(producer: &Project, configuration: &str, folder_prefix: &str) -> Option<PathBuf> {
    let cfg = producer.configuration(configuration)?;
    let folder = add_folder_prefix(&cfg.output_folder, folder_prefix);
    Some(normalize_lexical(
        &producer
            .root_absolute
            .join(folder)
            .join(producer.output_file_name()),
    ))
}

/// Bind every declared reference of `project` to its configurations.
fn bind_references(
    solution: &Solution,
    index: &ArtifactIndex,
    project: &Project,
    folder_prefix: &str,
    matcher: &mut ConfigurationMatcher,
) -> BTreeMap<String, Vec<BoundReference>> {
    let mut bound: BTreeMap<String, Vec<BoundReference>> = project
        .configurations()
        .iter()
        .map(|cfg| (cfg.name.clone(), Vec::new()))
        .collect();

    for reference in &project.references {
        if is_core_runtime(&reference.stem()) {
            trace!("skipping core runtime reference `{}`", reference.path.display());
            continue;
        }

        let producer = index.producer(&reference.path).and_then(|name| solution.project(name));

        for cfg in project.configurations() {
            let project_binding = producer.and_then(|producer| {
                let matched = matcher.best_configuration(producer, &cfg.name)?;
                let artifact = generated_artifact(producer, &matched, folder_prefix)?;
                Some((producer.name.clone(), matched, artifact))
            });

            let binding = match project_binding {
                Some((producer, configuration, artifact)) => BoundReference {
                    relative_path: relative_make_path(&project.root_absolute, &artifact),
                    path: artifact,
                    copy_local: reference.copy_local,
                    kind: ReferenceKind::Project {
                        project: producer,
                        configuration,
                    },
                },
                None => BoundReference {
                    relative_path: relative_make_path(&project.root_absolute, &reference.path),
                    path: reference.path.clone(),
                    copy_local: reference.copy_local,
                    kind: ReferenceKind::External,
                },
            };

            if let Some(list) = bound.get_mut(&cfg.name) {
                list.push(binding);
            }
        }
    }

    bound
}

/// Absolute paths of every file one configuration copies to its output
/// folder, in discovery order.
fn collect_files_to_copy(
    solution: &Solution,
    project: &Project,
    configuration: &str,
    visiting: &mut HashSet<(String, String)>,
    files: &mut Vec<PathBuf>,
) {
    for file in &project.copy_to_output {
        files.push(normalize_lexical(&project.root_absolute.join(file)));
    }

    let Some(managed) = project
        .configuration(configuration)
        .and_then(|cfg| cfg.managed())
    else {
        return;
    };

    for reference in &managed.references {
        if reference.copy_local {
            files.push(reference.path.clone());
        }
    }

    for reference in &managed.references {
        let ReferenceKind::Project {
            project: producer,
            configuration: producer_cfg,
        } = &reference.kind
        else {
            continue;
        };
        let Some(producer) = solution.project(producer) else {
            continue;
        };
        let key = (producer.name.clone(), producer_cfg.clone());
        if !visiting.insert(key.clone()) {
            warn!(
                "reference cycle through `{}` ({}) while collecting files for `{}`",
                producer.name, producer_cfg, project.name
            );
            continue;
        }
        collect_files_to_copy(solution, producer, producer_cfg, visiting, files);
        visiting.remove(&key);
    }
}

/// Resolve the references of every managed project, then compute the files
/// each managed configuration copies to its output folder.
pub fn resolve_references(solution: &mut Solution, folder_prefix: &str) {
    let index = ArtifactIndex::build(solution);
    let mut matcher = ConfigurationMatcher::new();

    let bindings: Vec<(String, BTreeMap<String, Vec<BoundReference>>)> = solution
        .projects()
        .filter(|p| p.kind.is_managed())
        .map(|p| {
            (
                p.name.clone(),
                bind_references(solution, &index, p, folder_prefix, &mut matcher),
            )
        })
        .collect();

    for (name, mut per_configuration) in bindings {
        let Some(project) = solution.project_mut(&name) else {
            continue;
        };
        let mut project_references = 0;
        for cfg in project.configurations_mut() {
            let removed = per_configuration.remove(&cfg.name);
            if let (Some(managed), Some(references)) = (cfg.managed_mut(), removed) {
                project_references += references.iter().filter(|r| r.is_project_reference()).count();
                managed.references = references;
            }
        }
        debug!(
            "bound references of `{}` ({} project reference bindings)",
            name, project_references
        );
    }

    let mut copies: Vec<(String, String, Vec<FileToCopy>)> = Vec::new();
    for project in solution.projects().filter(|p| p.kind.is_managed()) {
        for cfg in project.configurations() {
            let mut visiting = HashSet::from([(project.name.clone(), cfg.name.clone())]);
            let mut files = Vec::new();
            collect_files_to_copy(solution, project, &cfg.name, &mut visiting, &mut files);

            let mut seen = HashSet::new();
            let files = files
                .into_iter()
                .filter(|path| seen.insert(path.clone()))
                .map(|path| FileToCopy {
                    relative_path: relative_make_path(&project.root_absolute, &path),
                    absolute_path: path,
                })
                .collect();
            copies.push((project.name.clone(), cfg.name.clone(), files));
        }
    }

    for (project, configuration, files) in copies {
        if let Some(managed) = solution
            .project_mut(&project)
            .and_then(|p| p.configuration_mut(&configuration))
            .and_then(|cfg| cfg.managed_mut())
        {
            managed.files_to_copy = files;
        }
    }
}
