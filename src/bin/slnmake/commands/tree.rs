//! `slnmake tree` command

use std::collections::HashSet;

use anyhow::Result;

use crate::cli::TreeArgs;
use slnmake::ops::resolve_solution;
use slnmake::resolver::find_project;
use slnmake::Solution;

pub fn execute(args: TreeArgs) -> Result<()> {
    let resolved = resolve_solution(&args.solution.to_options())?;
    let solution = &resolved.solution;

    let roots = match &args.project {
        Some(name) => {
            let project = find_project(solution, name).map_err(|e| e.to_diagnostic().into_error())?;
            vec![project.name.clone()]
        }
        None => {
            let roots = solution.dependency_graph().roots();
            // Every project sits on a cycle
            if roots.is_empty() {
                solution.project_names()
            } else {
                roots
            }
        }
    };

    let max_depth = args.depth.unwrap_or(usize::MAX);
    let mut seen = HashSet::new();
    for root in &roots {
        print_tree(solution, root, 0, max_depth, &mut seen);
    }

    Ok(())
}

fn print_tree(
    solution: &Solution,
    name: &str,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<String>,
) {
    if depth > max_depth {
        return;
    }
    let Some(project) = solution.project(name) else {
        return;
    };

    let is_duplicate = !seen.insert(project.name.clone());

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };
    let dup_marker = if is_duplicate { " (*)" } else { "" };

    println!("{}{} ({}){}", prefix, project.name, project.kind, dup_marker);

    if is_duplicate {
        return;
    }

    for required in project.required() {
        print_tree(solution, required, depth + 1, max_depth, seen);
    }
}
