//! Projects: one buildable unit of a solution.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::configuration::Configuration;
use crate::core::error::ModelError;
use crate::core::reference::Reference;

/// What a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    NativeExecutable,
    NativeStaticLibrary,
    NativeSharedLibrary,
    ManagedExecutable,
    ManagedLibrary,
    ManagedGuiExecutable,
}

impl ProjectKind {
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            ProjectKind::NativeExecutable
                | ProjectKind::NativeStaticLibrary
                | ProjectKind::NativeSharedLibrary
        )
    }

    pub fn is_managed(&self) -> bool {
        !self.is_native()
    }

    /// True for native static and shared libraries.
    pub fn is_native_library(&self) -> bool {
        matches!(
            self,
            ProjectKind::NativeStaticLibrary | ProjectKind::NativeSharedLibrary
        )
    }

    /// Value of the managed compiler's `-target:` switch.
    pub fn managed_target(&self) -> Option<&'static str> {
        match self {
            ProjectKind::ManagedExecutable => Some("exe"),
            ProjectKind::ManagedLibrary => Some("library"),
            ProjectKind::ManagedGuiExecutable => Some("winexe"),
            _ => None,
        }
    }

    /// Default artifact extension for managed projects.
    pub fn managed_extension(&self) -> Option<&'static str> {
        match self {
            ProjectKind::ManagedExecutable | ProjectKind::ManagedGuiExecutable => Some("exe"),
            ProjectKind::ManagedLibrary => Some("dll"),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectKind::NativeExecutable => "native executable",
            ProjectKind::NativeStaticLibrary => "native static library",
            ProjectKind::NativeSharedLibrary => "native shared library",
            ProjectKind::ManagedExecutable => "managed executable",
            ProjectKind::ManagedLibrary => "managed library",
            ProjectKind::ManagedGuiExecutable => "managed GUI executable",
        };
        write!(f, "{}", s)
    }
}

/// Remove every space from a name.
pub fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| *c != ' ').collect()
}

/// A project in the solution.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// Project name with spaces removed
    pub name: String,

    pub kind: ProjectKind,

    /// Root folder relative to the solution root, `/`-separated
    pub root_relative: String,

    /// Absolute root folder
    pub root_absolute: PathBuf,

    /// Source files relative to the project root
    pub sources: BTreeSet<String>,

    configurations: Vec<Configuration>,

    /// Names of the projects this one requires
    required: BTreeSet<String>,

    /// Link against dependencies without listing them explicitly
    pub link_dependencies: bool,

    /// Managed artifact file name, e.g. `Lib.dll`
    pub output_file: Option<String>,

    /// References as declared (managed only)
    pub references: Vec<Reference>,

    /// Project files flagged to be copied to the output folder (managed only)
    pub copy_to_output: Vec<String>,
}

impl Project {
    pub fn new(
        name: &str,
        kind: ProjectKind,
        root_relative: impl Into<String>,
        root_absolute: impl Into<PathBuf>,
    ) -> Self {
        let name = strip_spaces(name);
        let output_file = kind
            .managed_extension()
            .map(|ext| format!("{}.{}", name, ext));
        Project {
            name,
            kind,
            root_relative: root_relative.into(),
            root_absolute: root_absolute.into(),
            sources: BTreeSet::new(),
            configurations: Vec::new(),
            required: BTreeSet::new(),
            link_dependencies: false,
            output_file,
            references: Vec::new(),
            copy_to_output: Vec::new(),
        }
    }

    /// Add a configuration. Names must be unique within the project.
    pub fn add_configuration(&mut self, configuration: Configuration) -> Result<(), ModelError> {
        if configuration.project() != self.name {
            return Err(ModelError::ForeignConfiguration {
                configuration: configuration.name.clone(),
                owner: configuration.project().to_string(),
                project: self.name.clone(),
            });
        }
        if self.configuration(&configuration.name).is_some() {
            return Err(ModelError::DuplicateConfiguration {
                project: self.name.clone(),
                configuration: configuration.name,
            });
        }
        self.configurations.push(configuration);
        Ok(())
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn configurations_mut(&mut self) -> &mut [Configuration] {
        &mut self.configurations
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    pub fn configuration_mut(&mut self, name: &str) -> Option<&mut Configuration> {
        self.configurations.iter_mut().find(|c| c.name == name)
    }

    /// Names of the directly required projects, in name order.
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub(crate) fn require(&mut self, name: &str) {
        self.required.insert(name.to_string());
    }

    pub(crate) fn unrequire(&mut self, name: &str) {
        self.required.remove(name);
    }

    /// Turn a native static library into a shared library.
    ///
    /// Returns true if the kind changed. Any other kind is left alone.
    pub fn convert_to_shared_library(&mut self) -> bool {
        if self.kind == ProjectKind::NativeStaticLibrary {
            self.kind = ProjectKind::NativeSharedLibrary;
            true
        } else {
            false
        }
    }

    /// Managed artifact file name, falling back to the kind's default.
    pub fn output_file_name(&self) -> String {
        self.output_file.clone().unwrap_or_else(|| {
            format!("{}.{}", self.name, self.kind.managed_extension().unwrap_or("dll"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::{ConfigSettings, NativeSettings};

    fn native_config(project: &str, name: &str) -> Configuration {
        Configuration::new(
            project,
            name,
            name,
            name,
            ConfigSettings::Native(NativeSettings::default()),
        )
    }

    #[test]
    fn test_project_name_strips_spaces() {
        let project = Project::new("My Lib", ProjectKind::ManagedLibrary, "MyLib", "/sln/MyLib");
        assert_eq!(project.name, "MyLib");
        assert_eq!(project.output_file_name(), "MyLib.dll");
    }

    #[test]
    fn test_duplicate_configuration_after_space_stripping() {
        let mut project = Project::new("App", ProjectKind::NativeExecutable, "App", "/sln/App");
        project.add_configuration(native_config("App", "Debug X86")).unwrap();
        let err = project
            .add_configuration(native_config("App", "DebugX86"))
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateConfiguration { .. }));
    }

    #[test]
    fn test_configuration_owner_must_match() {
        let mut project = Project::new("App", ProjectKind::NativeExecutable, "App", "/sln/App");
        let err = project
            .add_configuration(native_config("Other", "Debug"))
            .unwrap_err();
        assert!(matches!(err, ModelError::ForeignConfiguration { .. }));
    }

    #[test]
    fn test_convert_to_shared_library_only_once() {
        let mut project =
            Project::new("Lib", ProjectKind::NativeStaticLibrary, "Lib", "/sln/Lib");
        assert!(project.convert_to_shared_library());
        assert_eq!(project.kind, ProjectKind::NativeSharedLibrary);
        assert!(!project.convert_to_shared_library());

        let mut exe = Project::new("App", ProjectKind::NativeExecutable, "App", "/sln/App");
        assert!(!exe.convert_to_shared_library());
    }

    #[test]
    fn test_project_kind_serde_names() {
        let kind: ProjectKind = toml::from_str::<std::collections::HashMap<String, ProjectKind>>(
            "kind = \"native-static-library\"",
        )
        .unwrap()["kind"];
        assert_eq!(kind, ProjectKind::NativeStaticLibrary);
    }
}
