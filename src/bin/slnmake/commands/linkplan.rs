//! `slnmake linkplan` command

use anyhow::Result;

use crate::cli::LinkplanArgs;
use slnmake::core::ReferenceKind;
use slnmake::ops::{link_plan, resolve_solution, ConfigurationPlan};

pub fn execute(args: LinkplanArgs) -> Result<()> {
    let resolved = resolve_solution(&args.solution.to_options())?;
    let plan = link_plan(&resolved, &args.project, args.configuration.as_deref())?;

    for cfg in &plan.configurations {
        println!("Link inputs for '{}' ({}):", plan.project, cfg.configuration);
        println!();
        print_configuration(cfg);
    }

    Ok(())
}

fn print_configuration(cfg: &ConfigurationPlan) {
    let mut index = 1;

    for path in &cfg.library_paths {
        println!("  {}. -L{}", index, path);
        index += 1;
    }

    for library in &cfg.libraries {
        println!("  {}. -l{}", index, library);
        index += 1;
    }

    for object in &cfg.implicit_objects {
        println!("  {}. {}", index, object);
        println!("     Absorbed from a required static library");
        index += 1;
    }

    for reference in &cfg.references {
        println!("  {}. {}", index, reference.relative_path);
        match &reference.kind {
            ReferenceKind::Project {
                project,
                configuration,
            } => println!("     Built by: {} ({})", project, configuration),
            ReferenceKind::External => println!("     External assembly"),
        }
        index += 1;
    }

    if !cfg.files_to_copy.is_empty() {
        println!();
        println!("  Copied to output:");
        for file in &cfg.files_to_copy {
            println!("    {}", file.relative_path);
        }
    }

    if index == 1 && cfg.files_to_copy.is_empty() {
        println!("  (nothing to link)");
    }
    println!();
}
