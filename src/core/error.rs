//! Errors raised while building or mutating the solution model.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error that violates a model invariant.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("project `{name}` is defined more than once")]
    DuplicateProject { name: String },

    #[error("project `{project}` defines configuration `{configuration}` more than once")]
    DuplicateConfiguration {
        project: String,
        configuration: String,
    },

    #[error("project `{name}` is not part of the solution")]
    UnknownProject { name: String },

    #[error("configuration `{configuration}` belongs to `{owner}`, not `{project}`")]
    ForeignConfiguration {
        configuration: String,
        owner: String,
        project: String,
    },
}

impl ModelError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ModelError::DuplicateProject { name } => Diagnostic::error(self.to_string())
                .with_suggestion(format!("Rename one of the `{}` projects", name)),

            ModelError::DuplicateConfiguration {
                project,
                configuration,
            } => Diagnostic::error(self.to_string())
                .with_context("configuration names are compared with spaces removed")
                .with_suggestion(format!(
                    "Rename one of the `{}` configurations of `{}`",
                    configuration, project
                )),

            ModelError::UnknownProject { .. } => Diagnostic::error(self.to_string())
                .with_suggestion("Run `slnmake tree` to see the projects in the solution"),

            ModelError::ForeignConfiguration { .. } => Diagnostic::error(self.to_string()),
        }
    }
}
