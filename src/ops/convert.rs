//! Implementation of `slnmake convert`.
//!
//! The pipeline runs strictly in order: load the description and override
//! document, drop ignored projects, convert static libraries, apply the
//! override rules, resolve implicit links, bind references, then render and
//! write every makefile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::description::{load_solution, DESCRIPTION_FILE_NAME};
use crate::core::solution::Solution;
use crate::generator::{render_solution, write_files, GeneratedFile, GeneratorOptions};
use crate::overrides::{load_overrides, OverrideRules, OVERRIDES_FILE_NAME};
use crate::resolver::{resolve_implicit_links, resolve_references, ImplicitLinks};
use crate::util::config::{ConvertConfig, Platform};
use crate::util::diagnostic::suggestions;

/// Options for the conversion pipeline.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Solution description file or the folder holding it
    pub solution: Option<PathBuf>,

    /// Override document; `slnmake.config` beside the description if unset
    pub overrides: Option<PathBuf>,

    /// Target Cygwin instead of Linux
    pub cygwin: bool,

    /// Prefix for generated folders, replacing the configured one
    pub folder_prefix: Option<String>,
}

/// A solution after every resolution stage has run.
#[derive(Debug, Clone)]
pub struct ResolvedSolution {
    pub solution: Solution,
    pub config: ConvertConfig,
    pub overrides: OverrideRules,

    /// Plans applied by the implicit link resolver
    pub implicit_links: Vec<ImplicitLinks>,

    /// Projects dropped by the override document
    pub ignored: Vec<String>,

    /// Projects turned from static into shared libraries
    pub converted: Vec<String>,
}

impl ResolvedSolution {
    /// Generator settings, including per-project tools from the override
    /// document.
    pub fn generator_options(&self) -> GeneratorOptions {
        let mut options = GeneratorOptions::new(
            self.config.platform,
            self.config.folder_prefix.clone(),
            self.config.toolchain(),
        );
        options.project_toolchains = self
            .solution
            .projects()
            .map(|project| {
                if self
                    .overrides
                    .projects
                    .get(&project.name)
                    .is_some_and(|rules| rules.compiler.has_overrides())
                {
                    debug!("`{}` uses its own compiler settings", project.name);
                }
                let tools = self.overrides.toolchain_for(
                    &project.name,
                    &self.config.toolchain,
                    self.config.platform,
                );
                (project.name.clone(), tools)
            })
            .collect::<HashMap<_, _>>();
        options
    }
}

/// Result of a conversion.
#[derive(Debug)]
pub struct ConvertResult {
    /// Every file written, master makefile first
    pub files: Vec<PathBuf>,
}

/// Find the solution description.
///
/// An explicit file is used as is, an explicit folder must hold
/// `solution.toml`. Without either, the current folder and its parents are
/// searched.
pub fn find_description(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = if path.is_dir() {
            path.join(DESCRIPTION_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        if !path.is_file() {
            return Err(anyhow!(
                "solution description not found: {}\n{}",
                path.display(),
                suggestions::NO_SOLUTION
            ));
        }
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let mut current = cwd.clone();
    loop {
        let candidate = current.join(DESCRIPTION_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(anyhow!(
                "could not find {} in {} or any parent directory\n{}",
                DESCRIPTION_FILE_NAME,
                cwd.display(),
                suggestions::NO_SOLUTION
            ));
        }
    }
}

/// Load the override document for a solution.
fn load_rules(explicit: Option<&Path>, solution_root: &Path) -> Result<OverrideRules> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(solution_root.join(OVERRIDES_FILE_NAME)).filter(|p| p.is_file()),
    };

    match path {
        Some(path) => {
            debug!("loading overrides from {}", path.display());
            load_overrides(&path, solution_root)
        }
        None => Ok(OverrideRules::new(solution_root)),
    }
}

/// Apply overrides and run every resolution stage on a loaded solution.
pub fn resolve_loaded(
    mut solution: Solution,
    config: ConvertConfig,
    overrides: OverrideRules,
) -> ResolvedSolution {
    let ignored = solution.remove_projects_matching(|name| overrides.is_ignored(name));
    for name in &ignored {
        info!("ignoring project `{}`", name);
    }

    let mut converted = Vec::new();
    for project in solution.projects_mut() {
        if overrides.converts_static_to_shared(&project.name) && project.convert_to_shared_library()
        {
            debug!("building `{}` as a shared library", project.name);
            converted.push(project.name.clone());
        }
    }

    for project in solution.projects_mut() {
        overrides.apply(project, &config.folder_prefix);
    }

    for cycle in solution.dependency_graph().cycles() {
        warn!("projects require each other: {}", cycle.join(" -> "));
    }

    let implicit_links = resolve_implicit_links(&mut solution, &config.folder_prefix);
    resolve_references(&mut solution, &config.folder_prefix);

    ResolvedSolution {
        solution,
        config,
        overrides,
        implicit_links,
        ignored,
        converted,
    }
}

/// Load and resolve a solution without generating anything.
pub fn resolve_solution(opts: &ConvertOptions) -> Result<ResolvedSolution> {
    let description = find_description(opts.solution.as_deref())?;
    let solution = load_solution(&description)?;
    info!(
        "loaded solution `{}` ({} projects)",
        solution.name,
        solution.len()
    );

    let mut config = ConvertConfig::load_from_dir(&solution.root)?;
    if opts.cygwin {
        config.platform = Platform::Cygwin;
    }
    if let Some(prefix) = &opts.folder_prefix {
        config.folder_prefix = prefix.clone();
    }

    let overrides = load_rules(opts.overrides.as_deref(), &solution.root)?;

    Ok(resolve_loaded(solution, config, overrides))
}

/// Render every makefile of a resolved solution.
pub fn render(resolved: &ResolvedSolution) -> Vec<GeneratedFile> {
    render_solution(&resolved.solution, &resolved.generator_options())
}

/// Run the whole pipeline and write the makefiles.
pub fn convert(opts: &ConvertOptions) -> Result<ConvertResult> {
    let resolved = resolve_solution(opts)?;
    let files = render(&resolved);
    write_files(&files)?;

    Ok(ConvertResult {
        files: files.into_iter().map(|f| f.path).collect(),
    })
}

#[derive(Serialize)]
struct Plan<'a> {
    platform: Platform,
    folder_prefix: &'a str,
    ignored: &'a [String],
    converted: &'a [String],
    implicit_links: &'a [ImplicitLinks],
    solution: &'a Solution,
}

/// The fully resolved model as pretty-printed JSON.
pub fn plan_json(resolved: &ResolvedSolution) -> Result<String> {
    let plan = Plan {
        platform: resolved.config.platform,
        folder_prefix: &resolved.config.folder_prefix,
        ignored: &resolved.ignored,
        converted: &resolved.converted,
        implicit_links: &resolved.implicit_links,
        solution: &resolved.solution,
    };
    serde_json::to_string_pretty(&plan).context("failed to serialize resolved plan")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProjectKind;
    use crate::test_support::fixtures::{APP_AND_MATHX, MANAGED_LIB_AND_APP, REMOVE_PTHREAD};
    use crate::test_support::{create_test_solution, SolutionBuilder};

    fn options_for(dir: &Path) -> ConvertOptions {
        ConvertOptions {
            solution: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_convert_app_and_mathx() {
        let tmp = create_test_solution(APP_AND_MATHX);
        let result = convert(&options_for(tmp.path())).unwrap();
        assert_eq!(result.files.len(), 3);

        let master = std::fs::read_to_string(tmp.path().join("Makefile")).unwrap();
        assert!(master.lines().any(|l| l == "App: Mathx"));

        let app = std::fs::read_to_string(tmp.path().join("App/App.makefile")).unwrap();
        assert!(app.contains("-lMathx"));
        assert!(app.contains("-L\"../Mathx/gccDebug\""));
        assert!(app.contains("-lpthread"));
    }

    #[test]
    fn test_override_document_beside_description() {
        let tmp = create_test_solution(APP_AND_MATHX);
        std::fs::write(tmp.path().join(OVERRIDES_FILE_NAME), REMOVE_PTHREAD).unwrap();

        let resolved = resolve_solution(&options_for(tmp.path())).unwrap();
        let app = resolved.solution.project("App").unwrap();
        for cfg in app.configurations() {
            assert!(!cfg.native().unwrap().libraries.contains("pthread"));
            assert!(cfg.native().unwrap().libraries.contains("Mathx"));
        }
    }

    #[test]
    fn test_cli_flags_override_settings_file() {
        let tmp = create_test_solution(APP_AND_MATHX);
        std::fs::write(tmp.path().join("slnmake.toml"), "folder-prefix = \"clang\"\n").unwrap();

        let resolved = resolve_solution(&options_for(tmp.path())).unwrap();
        assert_eq!(resolved.config.folder_prefix, "clang");

        let opts = ConvertOptions {
            cygwin: true,
            folder_prefix: Some("mingw".to_string()),
            ..options_for(tmp.path())
        };
        let resolved = resolve_solution(&opts).unwrap();
        assert_eq!(resolved.config.platform, Platform::Cygwin);
        assert_eq!(resolved.config.folder_prefix, "mingw");
    }

    #[test]
    fn test_managed_release_binding() {
        let tmp = create_test_solution(MANAGED_LIB_AND_APP);
        let resolved = resolve_solution(&options_for(tmp.path())).unwrap();

        let app = resolved.solution.project("App").unwrap();
        let release = app.configuration("Release").unwrap().managed().unwrap();
        let paths: Vec<&str> = release
            .references
            .iter()
            .map(|r| r.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["../Lib/bin/gccRelease/Lib.dll", "../ThirdParty/Json.dll"]);
        assert!(release.references[0].is_project_reference());
    }

    #[test]
    fn test_ignored_and_converted_projects() {
        let solution = SolutionBuilder::new("/sln")
            .native("App", ProjectKind::NativeExecutable, &["Debug"])
            .native("Mathx", ProjectKind::NativeStaticLibrary, &["Debug"])
            .native("Tests", ProjectKind::NativeExecutable, &["Debug"])
            .requires("App", "Mathx")
            .requires("Tests", "Mathx")
            .build();

        let mut rules = OverrideRules::new("/sln");
        rules.ignored_projects.insert("tests".to_string());
        rules.all_projects.convert_static_to_shared = Some(true);

        let resolved = resolve_loaded(solution, ConvertConfig::default(), rules);
        assert_eq!(resolved.ignored, vec!["Tests".to_string()]);
        assert_eq!(resolved.converted, vec!["Mathx".to_string()]);
        assert!(resolved.solution.project("Tests").is_none());
        assert_eq!(
            resolved.solution.project("Mathx").unwrap().kind,
            ProjectKind::NativeSharedLibrary
        );
    }

    #[test]
    fn test_ignore_list_matches_names_with_spaces() {
        let solution = SolutionBuilder::new("/sln")
            .native("Core", ProjectKind::NativeStaticLibrary, &["Debug"])
            .native("Unit Tests", ProjectKind::NativeExecutable, &["Debug"])
            .build();
        let rules = crate::overrides::parse_overrides(
            r#"<Overrides><IgnoreProject project="Unit Tests"/></Overrides>"#,
            OVERRIDES_FILE_NAME,
            Path::new("/sln"),
        )
        .unwrap();

        let resolved = resolve_loaded(solution, ConvertConfig::default(), rules);
        assert_eq!(resolved.ignored, vec!["UnitTests".to_string()]);
        assert_eq!(resolved.solution.project_names(), vec!["Core".to_string()]);
    }

    #[test]
    fn test_rendered_libraries_keep_link_order() {
        let solution = SolutionBuilder::new("/sln")
            .native("App", ProjectKind::NativeExecutable, &["Debug"])
            .native("Zeta", ProjectKind::NativeStaticLibrary, &["Debug"])
            .native("Alpha", ProjectKind::NativeStaticLibrary, &["Debug"])
            .auto_link("App")
            .requires("App", "Zeta")
            .requires("Zeta", "Alpha")
            .build();
        let resolved = resolve_loaded(solution, ConvertConfig::default(), OverrideRules::new("/sln"));

        let files = render(&resolved);
        let app = files
            .iter()
            .find(|f| f.path.ends_with("App/App.makefile"))
            .unwrap();
        assert!(app.contents.lines().any(|l| l == "Debug_Libraries=-lZeta -lAlpha"));
    }

    #[test]
    fn test_missing_description() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = resolve_solution(&options_for(tmp.path())).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("solution description not found"));
        assert!(message.contains("help:"));
    }

    #[test]
    fn test_plan_json() {
        let tmp = create_test_solution(APP_AND_MATHX);
        let resolved = resolve_solution(&options_for(tmp.path())).unwrap();
        let json = plan_json(&resolved).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["platform"], "linux");
        assert_eq!(value["folder_prefix"], "gcc");
        assert_eq!(value["implicit_links"][0]["project"], "App");
    }
}
