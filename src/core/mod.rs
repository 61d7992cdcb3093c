//! The solution model.
//!
//! - Solutions own projects and the required-project edges between them
//! - Projects own configurations
//! - Configurations carry native or managed settings
//! - The description loader builds all of it from TOML

pub mod configuration;
pub mod description;
pub mod error;
pub mod project;
pub mod reference;
pub mod solution;

pub use configuration::{
    ConfigSettings, Configuration, CustomBuildRule, LibraryPath, ManagedSettings, NativeSettings,
    PathOrigin,
};
pub use description::{load_solution, parse_solution, DESCRIPTION_FILE_NAME};
pub use error::ModelError;
pub use project::{Project, ProjectKind};
pub use reference::{BoundReference, FileToCopy, Reference, ReferenceKind};
pub use solution::{DependencyGraph, Solution};
