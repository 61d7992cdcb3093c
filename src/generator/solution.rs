//! The solution's master `Makefile`.
//!
//! Each project target lists only its direct requirements; `make` works out
//! the build order itself.

use std::path::Path;

use crate::core::project::Project;
use crate::core::solution::Solution;
use crate::generator::{project_makefile_name, MakefileWriter};
use crate::util::fs::to_make_path;

fn project_directory(project: &Project) -> String {
    format!("\"{}\"", to_make_path(Path::new(&project.root_relative)))
}

/// Sub-make invocation for one project's makefile.
fn sub_make(project: &Project) -> String {
    format!(
        "$(MAKE) --directory={} --file={}",
        project_directory(project),
        project_makefile_name(project)
    )
}

/// Render the master makefile.
pub fn render(solution: &Solution) -> String {
    let mut w = MakefileWriter::new();

    w.comment("Builds all the projects in the solution")
        .phony("all_projects")
        .rule("all_projects", &solution.project_names())
        .blank();

    for project in solution.projects() {
        let required: Vec<&String> = project.required().iter().collect();
        w.comment(format!("Builds project '{}'", project.name))
            .phony(&project.name)
            .rule(&project.name, &required)
            .recipe(sub_make(project))
            .blank();
    }

    w.comment("Cleans all projects").phony("clean").rule::<&str>("clean", &[]);
    for project in solution.projects() {
        w.recipe(format!("{} clean", sub_make(project)));
    }
    w.blank();

    w.finish()
}
