//! Graph resolution over the loaded solution.
//!
//! Resolution runs after override rules have been applied and before any
//! makefile is rendered:
//!
//! 1. implicit linking of native projects ([`implicit_link`])
//! 2. binding of managed references ([`references`])
//!
//! Both stages pick counterpart configurations in other projects by
//! approximate name ([`matching`]).

pub mod errors;
pub mod implicit_link;
pub mod matching;
pub mod references;

pub use errors::ResolveError;
pub use implicit_link::{plan_implicit_links, resolve_implicit_links, ConfigurationLinks, ImplicitLinks};
pub use matching::ConfigurationMatcher;
pub use references::{resolve_references, ArtifactIndex};

use crate::core::project::Project;
use crate::core::solution::Solution;

/// Look up a project by name, suggesting close names when it is missing.
pub fn find_project<'a>(solution: &'a Solution, name: &str) -> Result<&'a Project, ResolveError> {
    solution
        .project(name)
        .or_else(|| {
            solution
                .projects()
                .find(|p| p.name.eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| {
            let names = solution.project_names();
            ResolveError::ProjectNotFound {
                project: name.to_string(),
                suggestions: matching::suggestions(name, names.iter().map(String::as_str)),
            }
        })
}
