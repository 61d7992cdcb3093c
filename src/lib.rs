//! slnmake - converts a multi-project solution into POSIX makefiles
//!
//! This crate provides the solution model, the override engine, implicit
//! link and reference resolution, and makefile generation.

pub mod core;
pub mod generator;
pub mod ops;
pub mod overrides;
pub mod resolver;
pub mod util;

/// Model builders and fixtures for unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use core::{Configuration, Project, ProjectKind, Solution};
pub use ops::{ConvertOptions, ResolvedSolution};
