//! Managed-project references and the files copied alongside outputs.

use std::path::PathBuf;

use serde::Serialize;

/// A reference as declared by a managed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Absolute path of the referenced assembly
    pub path: PathBuf,
    /// Whether the assembly is copied into the consumer's output folder
    pub copy_local: bool,
}

impl Reference {
    pub fn new(path: impl Into<PathBuf>, copy_local: bool) -> Self {
        Reference {
            path: path.into(),
            copy_local,
        }
    }

    /// File name without extension, e.g. `System.Core`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// What a reference turned out to point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Output of another project in the solution
    Project {
        project: String,
        configuration: String,
    },
    /// A prebuilt artifact outside the solution
    External,
}

/// A reference bound to one consuming configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundReference {
    /// Absolute path of the artifact this configuration links against
    pub path: PathBuf,
    /// Path relative to the consuming project's root
    pub relative_path: String,
    pub copy_local: bool,
    pub kind: ReferenceKind,
}

impl BoundReference {
    pub fn is_project_reference(&self) -> bool {
        matches!(self.kind, ReferenceKind::Project { .. })
    }
}

/// A file copied into a configuration's output folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileToCopy {
    /// Path relative to the consuming project's root
    pub relative_path: String,
    pub absolute_path: PathBuf,
}
