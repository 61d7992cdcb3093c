//! `slnmake completions` command

use std::io;

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::generate;
use tracing::info;

use crate::cli::{Cli, CompletionsArgs};
use slnmake::util::fs::write_string;

/// Print the completion script, or write it to `--output`.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();

    let Some(path) = args.output else {
        generate(args.shell, &mut cmd, "slnmake", &mut io::stdout());
        return Ok(());
    };

    let mut script = Vec::new();
    generate(args.shell, &mut cmd, "slnmake", &mut script);
    let script = String::from_utf8(script).context("completion script is not valid UTF-8")?;
    write_string(&path, &script)?;
    info!("wrote {} completions to {}", args.shell, path.display());

    Ok(())
}
