//! High-level operations.
//!
//! This module contains the implementation of slnmake commands.

pub mod convert;
pub mod linkplan;

pub use convert::{
    convert, find_description, plan_json, render, resolve_loaded, resolve_solution,
    ConvertOptions, ConvertResult, ResolvedSolution,
};
pub use linkplan::{link_plan, ConfigurationPlan, LinkPlan};
