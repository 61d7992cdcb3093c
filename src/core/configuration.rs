//! Build configurations ("Debug", "Release", ...) and their settings.
//!
//! A configuration always belongs to exactly one project. The owner is
//! recorded by name when the configuration is created and never changes.

use std::collections::BTreeSet;

use indexmap::IndexSet;

use serde::Serialize;

use crate::core::project::strip_spaces;
use crate::core::reference::{BoundReference, FileToCopy};

/// Warnings the managed compiler is told to ignore unless a
/// configuration says otherwise.
pub const DEFAULT_IGNORED_WARNINGS: [&str; 2] = ["1701", "1702"];

/// Default managed warning level.
pub const DEFAULT_WARNING_LEVEL: u32 = 4;

/// Default managed file alignment.
pub const DEFAULT_FILE_ALIGNMENT: u32 = 512;

/// A named build configuration of one project.
#[derive(Debug, Clone, Serialize)]
pub struct Configuration {
    /// Configuration name with spaces removed
    pub name: String,

    /// Name of the owning project
    project: String,

    /// Folder for intermediate files, relative to the project root
    pub intermediate_folder: String,

    /// Folder for final artifacts, relative to the project root
    pub output_folder: String,

    /// Kind-specific settings
    pub settings: ConfigSettings,
}

impl Configuration {
    /// Create a configuration owned by `project`.
    ///
    /// Names and folders have their spaces removed so they can be used
    /// directly as make targets and paths.
    pub fn new(
        project: impl Into<String>,
        name: &str,
        intermediate_folder: &str,
        output_folder: &str,
        settings: ConfigSettings,
    ) -> Self {
        Configuration {
            name: strip_spaces(name),
            project: strip_spaces(&project.into()),
            intermediate_folder: strip_spaces(intermediate_folder),
            output_folder: strip_spaces(output_folder),
            settings,
        }
    }

    /// Name of the project that owns this configuration.
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn native(&self) -> Option<&NativeSettings> {
        match &self.settings {
            ConfigSettings::Native(native) => Some(native),
            ConfigSettings::Managed(_) => None,
        }
    }

    pub fn native_mut(&mut self) -> Option<&mut NativeSettings> {
        match &mut self.settings {
            ConfigSettings::Native(native) => Some(native),
            ConfigSettings::Managed(_) => None,
        }
    }

    pub fn managed(&self) -> Option<&ManagedSettings> {
        match &self.settings {
            ConfigSettings::Managed(managed) => Some(managed),
            ConfigSettings::Native(_) => None,
        }
    }

    pub fn managed_mut(&mut self) -> Option<&mut ManagedSettings> {
        match &mut self.settings {
            ConfigSettings::Managed(managed) => Some(managed),
            ConfigSettings::Native(_) => None,
        }
    }
}

/// Settings that depend on the project family.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum ConfigSettings {
    Native(NativeSettings),
    Managed(ManagedSettings),
}

/// Where a library search path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathOrigin {
    /// Declared by the source project; names a folder of the original build.
    Source,
    /// Already expressed in the generated build's folder space.
    Generated,
}

/// One entry of a library search path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryPath {
    pub path: String,
    pub origin: PathOrigin,
}

impl LibraryPath {
    pub fn source(path: impl Into<String>) -> Self {
        LibraryPath {
            path: path.into(),
            origin: PathOrigin::Source,
        }
    }

    pub fn generated(path: impl Into<String>) -> Self {
        LibraryPath {
            path: path.into(),
            origin: PathOrigin::Generated,
        }
    }
}

/// Settings of a native (C/C++) configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NativeSettings {
    /// Include search path; order is significant
    pub include_paths: Vec<String>,

    /// Library search path; order is significant
    pub library_paths: Vec<LibraryPath>,

    /// Raw library names (no `lib` prefix, no extension) in link order
    pub libraries: IndexSet<String>,

    pub definitions: BTreeSet<String>,

    pub compiler_flags: BTreeSet<String>,

    /// Object files absorbed from dependent static libraries
    pub implicit_objects: BTreeSet<String>,

    pub custom_build_rules: Vec<CustomBuildRule>,
}

impl NativeSettings {
    /// Append an include path unless the exact string is already present.
    pub fn push_include_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.include_paths.contains(&path) {
            self.include_paths.push(path);
        }
    }

    /// Append a library path unless the exact path string is already present.
    pub fn push_library_path(&mut self, path: LibraryPath) {
        if !self.library_paths.iter().any(|p| p.path == path.path) {
            self.library_paths.push(path);
        }
    }
}

/// Settings of a managed (C#) configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ManagedSettings {
    pub optimize: bool,
    pub debug: bool,
    /// Debug information kind, e.g. `full` or `pdbonly`
    pub debug_info: Option<String>,
    pub warnings_as_errors: bool,
    pub warning_level: u32,
    pub file_alignment: u32,
    pub constants: BTreeSet<String>,
    pub ignored_warnings: BTreeSet<String>,

    /// References bound to this configuration by the reference resolver
    pub references: Vec<BoundReference>,

    /// Files copied next to the output artifact
    pub files_to_copy: Vec<FileToCopy>,
}

impl Default for ManagedSettings {
    fn default() -> Self {
        ManagedSettings {
            optimize: false,
            debug: false,
            debug_info: None,
            warnings_as_errors: false,
            warning_level: DEFAULT_WARNING_LEVEL,
            file_alignment: DEFAULT_FILE_ALIGNMENT,
            constants: BTreeSet::new(),
            ignored_warnings: DEFAULT_IGNORED_WARNINGS
                .iter()
                .map(|w| w.to_string())
                .collect(),
            references: Vec::new(),
            files_to_copy: Vec::new(),
        }
    }
}

/// A custom build step attached to one file of a native project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomBuildRule {
    /// Display name of the rule
    pub name: String,
    /// File the rule runs on, relative to the project root
    pub file: String,
    /// Rule executable, relative to the project root
    pub executable: String,
    pub parameters: Vec<String>,
}

impl CustomBuildRule {
    /// The shell command line for this rule.
    ///
    /// The executable lives in an output folder of the original build, so
    /// its last folder is mapped into the generated build's folder space.
    pub fn command_line(&self, folder_prefix: &str) -> String {
        let mut line = crate::util::fs::add_file_prefix(&self.executable, folder_prefix);
        for param in &self.parameters {
            line.push(' ');
            line.push_str(param);
        }
        line
    }

    /// Make-safe identifier derived from the rule's file.
    pub fn target_suffix(&self) -> String {
        self.file
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_strips_spaces() {
        let cfg = Configuration::new(
            "My App",
            "Debug Win32",
            "Debug Out",
            "bin/Debug Out",
            ConfigSettings::Native(NativeSettings::default()),
        );
        assert_eq!(cfg.name, "DebugWin32");
        assert_eq!(cfg.project(), "MyApp");
        assert_eq!(cfg.intermediate_folder, "DebugOut");
        assert_eq!(cfg.output_folder, "bin/DebugOut");
    }

    #[test]
    fn test_managed_defaults() {
        let settings = ManagedSettings::default();
        assert_eq!(settings.warning_level, 4);
        assert_eq!(settings.file_alignment, 512);
        assert!(settings.ignored_warnings.contains("1701"));
        assert!(settings.ignored_warnings.contains("1702"));
    }

    #[test]
    fn test_library_paths_dedup_by_exact_string() {
        let mut native = NativeSettings::default();
        native.push_library_path(LibraryPath::generated("../Lib/gccDebug"));
        native.push_library_path(LibraryPath::source("../Lib/gccDebug"));
        native.push_library_path(LibraryPath::generated("../lib/gccDebug"));
        assert_eq!(native.library_paths.len(), 2);
        assert_eq!(native.library_paths[0].origin, PathOrigin::Generated);
    }

    #[test]
    fn test_custom_build_rule_command_line() {
        let rule = CustomBuildRule {
            name: "Generate".to_string(),
            file: "schema/types.idl".to_string(),
            executable: "../Tools/bin/Release/idlc".to_string(),
            parameters: vec!["-o".to_string(), "gen".to_string()],
        };
        assert_eq!(
            rule.command_line("gcc"),
            "../Tools/bin/gccRelease/idlc -o gen"
        );
        assert_eq!(rule.target_suffix(), "schema_types_idl");
    }
}
