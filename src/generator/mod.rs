//! Makefile generation.
//!
//! Rendering is a pure function of the resolved solution. Every project file
//! is rendered independently (in parallel), then all files are written one
//! after another.

pub mod managed;
pub mod native;
pub mod solution;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::project::Project;
use crate::core::solution::Solution;
use crate::util::config::{Platform, Toolchain};
use crate::util::fs::write_string;

/// Name of the solution-level makefile.
pub const MASTER_MAKEFILE: &str = "Makefile";

/// File extension of per-project makefiles.
pub const PROJECT_MAKEFILE_EXTENSION: &str = "makefile";

/// Settings shared by every rendered file.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub platform: Platform,

    /// Prefix applied to the last component of every generated folder
    pub folder_prefix: String,

    /// Tools for projects without a per-project override
    pub toolchain: Toolchain,

    /// Per-project tools, keyed by project name
    pub project_toolchains: HashMap<String, Toolchain>,
}

impl GeneratorOptions {
    pub fn new(platform: Platform, folder_prefix: impl Into<String>, toolchain: Toolchain) -> Self {
        GeneratorOptions {
            platform,
            folder_prefix: folder_prefix.into(),
            toolchain,
            project_toolchains: HashMap::new(),
        }
    }

    pub fn toolchain_for(&self, project: &str) -> &Toolchain {
        self.project_toolchains.get(project).unwrap_or(&self.toolchain)
    }
}

/// A rendered file and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// File name of a project's makefile, e.g. `App.makefile`.
pub fn project_makefile_name(project: &Project) -> String {
    format!("{}.{}", project.name, PROJECT_MAKEFILE_EXTENSION)
}

/// Render one project's makefile.
pub fn render_project(project: &Project, options: &GeneratorOptions) -> String {
    if project.kind.is_native() {
        native::render(project, options)
    } else {
        managed::render(project, options)
    }
}

/// Render the master makefile and every project makefile.
///
/// The master makefile comes first, projects follow in name order.
pub fn render_solution(solution: &Solution, options: &GeneratorOptions) -> Vec<GeneratedFile> {
    let projects: Vec<&Project> = solution.projects().collect();

    let rendered: Vec<GeneratedFile> = projects
        .par_iter()
        .map(|project| GeneratedFile {
            path: project.root_absolute.join(project_makefile_name(project)),
            contents: render_project(project, options),
        })
        .collect();

    let mut files = Vec::with_capacity(rendered.len() + 1);
    files.push(GeneratedFile {
        path: solution.root.join(MASTER_MAKEFILE),
        contents: solution::render(solution),
    });
    files.extend(rendered);
    files
}

/// Write rendered files to disk, one at a time.
pub fn write_files(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        write_string(&file.path, &file.contents)?;
        debug!("wrote {}", file.path.display());
    }
    info!("wrote {} makefile(s)", files.len());
    Ok(())
}

/// Line-oriented builder for makefile text.
///
/// Every line ends with `\n` regardless of the host platform.
#[derive(Debug, Default)]
pub struct MakefileWriter {
    text: String,
}

impl MakefileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// `# <text>...`
    pub fn comment(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(format!("# {}...", text.as_ref()))
    }

    pub fn phony(&mut self, target: &str) -> &mut Self {
        self.line(format!(".PHONY: {}", target))
    }

    /// `target: prerequisites`
    pub fn rule<S: AsRef<str>>(&mut self, target: &str, prerequisites: &[S]) -> &mut Self {
        let mut line = format!("{}:", target);
        for prerequisite in prerequisites {
            line.push(' ');
            line.push_str(prerequisite.as_ref());
        }
        self.line(line)
    }

    /// A tab-indented recipe line.
    pub fn recipe(&mut self, command: impl AsRef<str>) -> &mut Self {
        self.line(format!("\t{}", command.as_ref()))
    }

    pub fn finish(self) -> String {
        self.text
    }
}

/// Join non-empty words with single spaces.
pub(crate) fn join_words<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .filter(|w| !w.as_ref().is_empty())
        .map(|w| w.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProjectKind;
    use crate::test_support::SolutionBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_writer_uses_line_feeds() {
        let mut w = MakefileWriter::new();
        w.comment("Builds everything")
            .phony("all")
            .rule("all", &["a", "b"])
            .recipe("echo done")
            .blank();
        assert_eq!(
            w.finish(),
            "# Builds everything...\n.PHONY: all\nall: a b\n\techo done\n\n"
        );
    }

    #[test]
    fn test_rule_without_prerequisites() {
        let mut w = MakefileWriter::new();
        w.rule::<&str>("clean", &[]);
        assert_eq!(w.finish(), "clean:\n");
    }

    #[test]
    fn test_join_words_skips_empty() {
        assert_eq!(join_words(["a", "", "b"]), "a b");
        assert_eq!(join_words(Vec::<String>::new()), "");
    }

    #[test]
    fn test_render_solution_file_locations() {
        let solution = SolutionBuilder::new("/sln")
            .native("App", ProjectKind::NativeExecutable, &["Debug"])
            .managed("Tool", ProjectKind::ManagedExecutable, &["Debug"])
            .build();
        let options = GeneratorOptions::new(Platform::Linux, "gcc", Toolchain::default());

        let files = render_solution(&solution, &options);
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/sln/Makefile"),
                PathBuf::from("/sln/App/App.makefile"),
                PathBuf::from("/sln/Tool/Tool.makefile"),
            ]
        );
        assert!(files.iter().all(|f| !f.contents.contains('\r')));
    }

    #[test]
    fn test_project_toolchain_lookup() {
        let mut options = GeneratorOptions::new(Platform::Linux, "gcc", Toolchain::default());
        options.project_toolchains.insert(
            "Legacy".to_string(),
            Toolchain {
                cpp: "g++-4.8".to_string(),
                ..Toolchain::default()
            },
        );
        assert_eq!(options.toolchain_for("Legacy").cpp, "g++-4.8");
        assert_eq!(options.toolchain_for("App").cpp, "g++");
    }

    #[test]
    fn test_write_files() {
        let tmp = TempDir::new().unwrap();
        let files = vec![GeneratedFile {
            path: tmp.path().join("App/App.makefile"),
            contents: "all:\n".to_string(),
        }];
        write_files(&files).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("App/App.makefile")).unwrap(),
            "all:\n"
        );
    }
}
