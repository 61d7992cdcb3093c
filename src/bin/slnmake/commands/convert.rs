//! `slnmake convert` command

use anyhow::Result;

use crate::cli::ConvertArgs;
use slnmake::ops::{convert, plan_json, resolve_solution};

pub fn execute(args: ConvertArgs) -> Result<()> {
    let opts = args.solution.to_options();

    if args.plan {
        let resolved = resolve_solution(&opts)?;
        println!("{}", plan_json(&resolved)?);
        return Ok(());
    }

    let result = convert(&opts)?;
    for path in &result.files {
        println!("Generated {}", path.display());
    }

    Ok(())
}
