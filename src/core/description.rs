//! Solution description parsing.
//!
//! The description is a TOML file listing every project of the solution:
//!
//! ```toml
//! [solution]
//! name = "Demo"
//!
//! [projects.App]
//! kind = "native-executable"
//! sources = ["main.cpp"]
//! requires = ["Mathx"]
//! link-dependencies = true
//!
//! [[projects.App.configurations]]
//! name = "Debug"
//! definitions = ["_DEBUG"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::configuration::{
    ConfigSettings, Configuration, CustomBuildRule, LibraryPath, ManagedSettings, NativeSettings,
    DEFAULT_FILE_ALIGNMENT, DEFAULT_IGNORED_WARNINGS, DEFAULT_WARNING_LEVEL,
};
use crate::core::project::{Project, ProjectKind};
use crate::core::reference::Reference;
use crate::core::solution::Solution;
use crate::util::fs::{normalize_lexical, raw_library_name, read_to_string, to_make_path};

/// Default file name of the solution description.
pub const DESCRIPTION_FILE_NAME: &str = "solution.toml";

#[derive(Debug, Default, Deserialize)]
struct RawDescription {
    #[serde(default)]
    solution: RawSolution,

    #[serde(default)]
    projects: BTreeMap<String, RawProject>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSolution {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawProject {
    kind: ProjectKind,

    /// Relative to the solution root; defaults to the project name
    root: Option<String>,

    #[serde(default)]
    sources: Vec<String>,

    #[serde(default)]
    requires: Vec<String>,

    #[serde(default)]
    link_dependencies: bool,

    output_file: Option<String>,

    #[serde(default)]
    references: Vec<RawReference>,

    #[serde(default)]
    copy_to_output: Vec<String>,

    #[serde(default)]
    configurations: Vec<RawConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawReference {
    path: String,

    #[serde(default)]
    copy_local: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfiguration {
    name: String,
    intermediate_folder: Option<String>,
    output_folder: Option<String>,

    // Native settings
    #[serde(default)]
    include_paths: Vec<String>,
    #[serde(default)]
    library_paths: Vec<String>,
    #[serde(default)]
    libraries: Vec<String>,
    #[serde(default)]
    definitions: Vec<String>,
    #[serde(default)]
    compiler_flags: Vec<String>,
    #[serde(default)]
    custom_build_rules: Vec<RawCustomBuildRule>,

    // Managed settings
    #[serde(default)]
    optimize: bool,
    #[serde(default)]
    debug: bool,
    debug_info: Option<String>,
    #[serde(default)]
    warnings_as_errors: bool,
    warning_level: Option<u32>,
    file_alignment: Option<u32>,
    #[serde(default)]
    constants: Vec<String>,
    ignored_warnings: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawCustomBuildRule {
    name: String,
    file: String,
    executable: String,
    #[serde(default)]
    parameters: Vec<String>,
}

/// Load a solution description from a file.
///
/// The solution root is the folder containing the file.
pub fn load_solution(path: &Path) -> Result<Solution> {
    let text = read_to_string(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let root = dir
        .canonicalize()
        .with_context(|| format!("failed to resolve solution folder: {}", dir.display()))?;

    let default_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "solution".to_string());

    parse_solution(&text, &root, &default_name)
        .with_context(|| format!("failed to parse solution description: {}", path.display()))
}

/// Parse a solution description rooted at `root`.
pub fn parse_solution(text: &str, root: &Path, default_name: &str) -> Result<Solution> {
    let raw: RawDescription = toml::from_str(text)?;

    let name = raw
        .solution
        .name
        .unwrap_or_else(|| default_name.to_string());
    let mut solution = Solution::new(name, root);

    for (name, raw_project) in &raw.projects {
        let project = build_project(name, raw_project, root)?;
        debug!(
            "loaded project `{}` ({}, {} configurations)",
            project.name,
            project.kind,
            project.configurations().len()
        );
        solution
            .add_project(project)
            .map_err(|e| e.to_diagnostic().into_error())?;
    }

    // Edges are added once every project exists.
    for (name, raw_project) in &raw.projects {
        for required in &raw_project.requires {
            if solution.add_required_project(name, required).is_err() {
                warn!(
                    "project `{}` requires unknown project `{}`; ignoring",
                    name, required
                );
            }
        }
    }

    Ok(solution)
}

fn build_project(name: &str, raw: &RawProject, solution_root: &Path) -> Result<Project> {
    let root_relative = raw.root.clone().unwrap_or_else(|| name.replace(' ', ""));
    let root_absolute = normalize_lexical(&solution_root.join(&root_relative));

    let mut project = Project::new(
        name,
        raw.kind,
        to_make_path(Path::new(&root_relative)),
        root_absolute.clone(),
    );
    project.sources = raw.sources.iter().map(|s| s.replace('\\', "/")).collect();
    project.link_dependencies = raw.link_dependencies;

    if raw.kind.is_managed() {
        if let Some(ref output_file) = raw.output_file {
            project.output_file = Some(output_file.clone());
        }
        project.references = raw
            .references
            .iter()
            .map(|r| {
                Reference::new(
                    normalize_lexical(&root_absolute.join(&r.path)),
                    r.copy_local,
                )
            })
            .collect();
        project.copy_to_output = raw
            .copy_to_output
            .iter()
            .map(|f| f.replace('\\', "/"))
            .collect();
    }

    for raw_config in &raw.configurations {
        let settings = if raw.kind.is_native() {
            ConfigSettings::Native(native_settings(raw_config))
        } else {
            ConfigSettings::Managed(managed_settings(raw_config))
        };
        let intermediate = raw_config
            .intermediate_folder
            .as_deref()
            .unwrap_or(&raw_config.name);
        let output = raw_config
            .output_folder
            .as_deref()
            .unwrap_or(&raw_config.name);

        let configuration =
            Configuration::new(name, &raw_config.name, intermediate, output, settings);
        project
            .add_configuration(configuration)
            .map_err(|e| e.to_diagnostic().into_error())?;
    }

    Ok(project)
}

fn native_settings(raw: &RawConfiguration) -> NativeSettings {
    let mut settings = NativeSettings::default();
    for path in &raw.include_paths {
        settings.push_include_path(path.replace('\\', "/"));
    }
    for path in &raw.library_paths {
        settings.push_library_path(LibraryPath::source(path.replace('\\', "/")));
    }
    settings.libraries = raw.libraries.iter().map(|l| raw_library_name(l)).collect();
    settings.definitions = raw.definitions.iter().cloned().collect();
    settings.compiler_flags = raw.compiler_flags.iter().cloned().collect();
    settings.custom_build_rules = raw
        .custom_build_rules
        .iter()
        .map(|r| CustomBuildRule {
            name: r.name.clone(),
            file: r.file.replace('\\', "/"),
            executable: r.executable.replace('\\', "/"),
            parameters: r.parameters.clone(),
        })
        .collect();
    settings
}

fn managed_settings(raw: &RawConfiguration) -> ManagedSettings {
    ManagedSettings {
        optimize: raw.optimize,
        debug: raw.debug,
        debug_info: raw.debug_info.clone().filter(|d| !d.is_empty()),
        warnings_as_errors: raw.warnings_as_errors,
        warning_level: raw.warning_level.unwrap_or(DEFAULT_WARNING_LEVEL),
        file_alignment: raw.file_alignment.unwrap_or(DEFAULT_FILE_ALIGNMENT),
        constants: raw.constants.iter().cloned().collect(),
        ignored_warnings: match &raw.ignored_warnings {
            Some(warnings) => warnings.iter().cloned().collect(),
            None => DEFAULT_IGNORED_WARNINGS
                .iter()
                .map(|w| w.to_string())
                .collect(),
        },
        references: Vec::new(),
        files_to_copy: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DESCRIPTION: &str = r#"
[solution]
name = "Demo"

[projects.App]
kind = "native-executable"
sources = ["main.cpp", "src\\util.cpp"]
requires = ["Mathx", "Missing"]
link-dependencies = true

[[projects.App.configurations]]
name = "Debug"
include-paths = ["../Mathx", "../Mathx"]
libraries = ["libpthread.so", "m"]
definitions = ["WIN32", "_DEBUG"]

[[projects.App.configurations]]
name = "Release"
output-folder = "bin/Release"

[projects.Mathx]
kind = "native-static-library"
root = "libs/Mathx"
sources = ["math.cpp"]

[[projects.Mathx.configurations]]
name = "Debug"
"#;

    #[test]
    fn test_parse_native_projects() {
        let solution = parse_solution(DESCRIPTION, Path::new("/sln"), "fallback").unwrap();
        assert_eq!(solution.name, "Demo");
        assert_eq!(solution.len(), 2);

        let app = solution.project("App").unwrap();
        assert_eq!(app.kind, ProjectKind::NativeExecutable);
        assert_eq!(app.root_absolute, PathBuf::from("/sln/App"));
        assert!(app.sources.contains("src/util.cpp"));
        assert!(app.link_dependencies);
        assert_eq!(app.required().iter().collect::<Vec<_>>(), vec!["Mathx"]);

        let debug = app.configuration("Debug").unwrap().native().unwrap();
        assert_eq!(debug.include_paths, vec!["../Mathx".to_string()]);
        assert!(debug.libraries.contains("pthread"));
        assert!(debug.libraries.contains("m"));
        assert!(debug.definitions.contains("WIN32"));

        let release = app.configuration("Release").unwrap();
        assert_eq!(release.intermediate_folder, "Release");
        assert_eq!(release.output_folder, "bin/Release");

        let mathx = solution.project("Mathx").unwrap();
        assert_eq!(mathx.root_relative, "libs/Mathx");
        assert_eq!(mathx.root_absolute, PathBuf::from("/sln/libs/Mathx"));
    }

    #[test]
    fn test_parse_managed_project() {
        let text = r#"
[projects.Tool]
kind = "managed-executable"
copy-to-output = ["app.config"]

[[projects.Tool.references]]
path = "../Lib/bin/Release/Lib.dll"
copy-local = true

[[projects.Tool.configurations]]
name = "Release"
output-folder = "bin/Release"
optimize = true
constants = ["TRACE"]
"#;
        let solution = parse_solution(text, Path::new("/sln"), "Tools").unwrap();
        assert_eq!(solution.name, "Tools");

        let tool = solution.project("Tool").unwrap();
        assert_eq!(tool.output_file_name(), "Tool.exe");
        assert_eq!(
            tool.references[0].path,
            PathBuf::from("/sln/Lib/bin/Release/Lib.dll")
        );
        assert!(tool.references[0].copy_local);

        let release = tool.configuration("Release").unwrap().managed().unwrap();
        assert!(release.optimize);
        assert_eq!(release.warning_level, 4);
        assert_eq!(release.file_alignment, 512);
        assert_eq!(release.ignored_warnings.len(), 2);
        assert!(release.constants.contains("TRACE"));
    }

    #[test]
    fn test_duplicate_configuration_is_fatal() {
        let text = r#"
[projects.App]
kind = "native-executable"

[[projects.App.configurations]]
name = "Debug X86"

[[projects.App.configurations]]
name = "DebugX86"
"#;
        let err = parse_solution(text, Path::new("/sln"), "x").unwrap_err();
        assert!(format!("{:#}", err).contains("more than once"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let text = "[projects.App]\nkind = \"python\"\n";
        assert!(parse_solution(text, Path::new("/sln"), "x").is_err());
    }

    #[test]
    fn test_load_solution_uses_file_folder_as_root() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Demo.toml");
        std::fs::write(&path, "[projects.App]\nkind = \"native-executable\"\n").unwrap();

        let solution = load_solution(&path).unwrap();
        assert_eq!(solution.name, "Demo");
        assert_eq!(solution.root, tmp.path().canonicalize().unwrap());
    }
}
