//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use slnmake::ops::ConvertOptions;

/// slnmake - Converts a multi-project solution into POSIX makefiles
#[derive(Parser)]
#[command(name = "slnmake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate makefiles for every project in the solution
    Convert(ConvertArgs),

    /// Show what each configuration of a project links against
    Linkplan(LinkplanArgs),

    /// Display the required-project tree
    Tree(TreeArgs),

    /// Print the shell completion script for slnmake
    Completions(CompletionsArgs),
}

/// Where the solution comes from and how it is converted.
#[derive(Args, Clone)]
pub struct SolutionArgs {
    /// Solution description, or the folder holding solution.toml
    #[arg(short, long, env = "SLNMAKE_SOLUTION")]
    pub solution: Option<PathBuf>,

    /// Override document (defaults to slnmake.config beside the description)
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Generate makefiles for Cygwin
    #[arg(long)]
    pub cygwin: bool,

    /// Prefix for generated intermediate and output folders
    #[arg(long, value_name = "PREFIX")]
    pub folder_prefix: Option<String>,
}

impl SolutionArgs {
    pub fn to_options(&self) -> ConvertOptions {
        ConvertOptions {
            solution: self.solution.clone(),
            overrides: self.overrides.clone(),
            cygwin: self.cygwin,
            folder_prefix: self.folder_prefix.clone(),
        }
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub solution: SolutionArgs,

    /// Print the resolved solution as JSON instead of writing makefiles
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct LinkplanArgs {
    /// Project to show the link plan for
    pub project: String,

    /// Only show this configuration
    #[arg(short, long)]
    pub configuration: Option<String>,

    #[command(flatten)]
    pub solution: SolutionArgs,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Project to show the tree for (defaults to every top-level project)
    pub project: Option<String>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    #[command(flatten)]
    pub solution: SolutionArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
