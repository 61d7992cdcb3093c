//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while looking up resolution results.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("project not found: `{project}`")]
    ProjectNotFound {
        project: String,
        suggestions: Vec<String>,
    },

    #[error("project `{project}` has no configuration named `{configuration}`")]
    ConfigurationNotFound {
        project: String,
        configuration: String,
        available: Vec<String>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::ProjectNotFound {
                project,
                suggestions: similar,
            } => {
                let mut diag = Diagnostic::error(format!("project `{}` not found", project));

                if !similar.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}", similar.join(", ")));
                }

                diag.with_suggestion(
                    suggestions::PROJECT_NOT_FOUND.trim_start_matches("help: "),
                )
            }

            ResolveError::ConfigurationNotFound {
                project,
                configuration,
                available,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "`{}` has no configuration named `{}`",
                    project, configuration
                ));

                if !available.is_empty() {
                    diag = diag.with_context(format!(
                        "available configurations: {}",
                        available.join(", ")
                    ));
                }

                diag.with_suggestion("Configuration names are compared with spaces removed")
            }
        }
    }
}
