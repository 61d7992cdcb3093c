//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;

pub use config::{ConvertConfig, Platform, Toolchain, ToolchainSettings};
pub use diagnostic::Diagnostic;
