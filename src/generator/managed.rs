//! Makefiles for managed (C#) projects.
//!
//! Every configuration compiles the same file list in a single compiler
//! invocation; only references and flags differ between configurations.

use std::path::Path;

use crate::core::configuration::{Configuration, ManagedSettings};
use crate::core::project::Project;
use crate::generator::{join_words, GeneratorOptions, MakefileWriter};
use crate::util::fs::{add_folder_prefix, normalize_lexical, to_make_path};

fn references_variable(configuration: &str) -> String {
    format!("{}_REFERENCES", configuration)
}

fn flags_variable(configuration: &str) -> String {
    format!("{}_FLAGS", configuration)
}

/// Compiler switches for one configuration.
pub fn compiler_flags(settings: &ManagedSettings) -> String {
    let mut flags = Vec::new();

    flags.push(if settings.optimize { "-optimize+" } else { "-optimize-" }.to_string());
    if settings.warnings_as_errors {
        flags.push("-warnaserror+".to_string());
    }
    flags.extend(settings.constants.iter().map(|c| format!("-define:{}", c)));
    if settings.debug {
        flags.push("-debug+".to_string());
    }
    if let Some(kind) = settings.debug_info.as_deref().filter(|k| !k.is_empty()) {
        flags.push(format!("-debug:{}", kind));
    }
    if !settings.ignored_warnings.is_empty() {
        let codes: Vec<&str> = settings.ignored_warnings.iter().map(String::as_str).collect();
        flags.push(format!("-nowarn:{}", codes.join(",")));
    }
    flags.push(format!("-filealign:{}", settings.file_alignment));
    flags.push(format!("-warn:{}", settings.warning_level));
    flags.push("-pkg:dotnet".to_string());

    join_words(flags)
}

/// `-r:a,b` for one configuration's bound references.
pub fn references_switch(settings: &ManagedSettings) -> String {
    if settings.references.is_empty() {
        return String::new();
    }
    let paths: Vec<&str> = settings
        .references
        .iter()
        .map(|r| r.relative_path.as_str())
        .collect();
    format!("-r:{}", paths.join(","))
}

/// `NAME = value`, without a trailing space when the value is empty.
fn assignment(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{} =", name)
    } else {
        format!("{} = {}", name, value)
    }
}

fn same_folder(a: &str, b: &str) -> bool {
    normalize_lexical(Path::new(a)) == normalize_lexical(Path::new(b))
}

/// Folder of a project-relative file path, `.` for the project root.
fn parent_folder(path: &str) -> String {
    to_make_path(Path::new(path).parent().unwrap_or(Path::new("")))
}

/// Render the makefile of a managed project.
pub fn render(project: &Project, options: &GeneratorOptions) -> String {
    let tools = options.toolchain_for(&project.name);
    let configurations: Vec<(&Configuration, &ManagedSettings)> = project
        .configurations()
        .iter()
        .filter_map(|cfg| cfg.managed().map(|m| (cfg, m)))
        .collect();
    let output_folder =
        |cfg: &Configuration| add_folder_prefix(&cfg.output_folder, &options.folder_prefix);

    let mut w = MakefileWriter::new();

    w.comment("Compiler")
        .line(assignment("CSHARP_COMPILER", &tools.csharp))
        .blank();

    let files: Vec<String> = project
        .sources
        .iter()
        .map(|f| {
            if options.platform.is_cygwin() {
                f.replace('/', "\\\\")
            } else {
                f.clone()
            }
        })
        .collect();
    w.comment("Source files")
        .line(assignment("FILES", &files.join(" ")))
        .blank();

    w.comment("References");
    for (cfg, managed) in &configurations {
        w.line(assignment(
            &references_variable(&cfg.name),
            &references_switch(managed),
        ));
    }
    w.blank();

    w.comment("Compiler flags");
    for (cfg, managed) in &configurations {
        w.line(assignment(&flags_variable(&cfg.name), &compiler_flags(managed)));
    }
    w.blank();

    let names: Vec<&str> = configurations.iter().map(|(cfg, _)| cfg.name.as_str()).collect();
    w.comment("Builds all configurations for this project")
        .phony("build_all_configurations")
        .rule("build_all_configurations", &names)
        .blank();

    let target = project.kind.managed_target().unwrap_or("library");
    for (cfg, _) in &configurations {
        w.comment(format!("Builds the {} configuration", cfg.name))
            .phony(&cfg.name)
            .rule(&cfg.name, &["create_folders"])
            .recipe(format!(
                "$(CSHARP_COMPILER) $(FILES) $({}) $({}) -out:{}/{} -target:{}",
                references_variable(&cfg.name),
                flags_variable(&cfg.name),
                output_folder(cfg),
                project.output_file_name(),
                target
            ))
            .blank();
    }

    w.comment("Creates the output folders for each configuration, and copies files")
        .phony("create_folders")
        .rule::<&str>("create_folders", &[]);
    for (cfg, managed) in &configurations {
        let output = output_folder(cfg);
        w.recipe(format!("mkdir -p {}", output));
        for file in &managed.files_to_copy {
            if same_folder(&parent_folder(&file.relative_path), &output) {
                continue;
            }
            w.recipe(format!("cp {} {}", file.relative_path, output));
        }
    }
    w.blank();

    w.comment("Cleans output files")
        .phony("clean")
        .rule::<&str>("clean", &[]);
    for (cfg, _) in &configurations {
        let output = output_folder(cfg);
        for ext in ["exe", "dll", "pdb", "mdb"] {
            w.recipe(format!("rm -f {}/*.{}", output, ext));
        }
    }
    w.blank();

    w.finish()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::reference::{BoundReference, FileToCopy, ReferenceKind};
    use crate::core::ProjectKind;
    use crate::test_support::assertions::assert_has_line;
    use crate::test_support::SolutionBuilder;
    use crate::util::config::{Platform, Toolchain};

    fn options(platform: Platform) -> GeneratorOptions {
        let toolchain = crate::util::config::ToolchainSettings::default().resolve(platform);
        GeneratorOptions::new(platform, "gcc", toolchain)
    }

    fn app() -> Project {
        let mut solution = SolutionBuilder::new("/sln")
            .managed("App", ProjectKind::ManagedExecutable, &["Debug", "Release"])
            .sources("App", &["Program.cs", "Properties/AssemblyInfo.cs"])
            .build();
        let mut project = solution.remove_project("App").unwrap();

        let debug = project.configuration_mut("Debug").unwrap().managed_mut().unwrap();
        debug.debug = true;
        debug.debug_info = Some("full".to_string());
        debug.constants.insert("DEBUG".to_string());
        debug.constants.insert("TRACE".to_string());
        debug.references.push(BoundReference {
            path: PathBuf::from("/sln/Lib/gccDebug/Lib.dll"),
            relative_path: "../Lib/gccDebug/Lib.dll".to_string(),
            copy_local: true,
            kind: ReferenceKind::Project {
                project: "Lib".to_string(),
                configuration: "Debug".to_string(),
            },
        });
        debug.references.push(BoundReference {
            path: PathBuf::from("/sln/ThirdParty/Json.dll"),
            relative_path: "../ThirdParty/Json.dll".to_string(),
            copy_local: false,
            kind: ReferenceKind::External,
        });
        debug.files_to_copy = vec![
            FileToCopy {
                relative_path: "app.config".to_string(),
                absolute_path: PathBuf::from("/sln/App/app.config"),
            },
            FileToCopy {
                relative_path: "../Lib/gccDebug/Lib.dll".to_string(),
                absolute_path: PathBuf::from("/sln/Lib/gccDebug/Lib.dll"),
            },
            FileToCopy {
                relative_path: "gccDebug/App.exe".to_string(),
                absolute_path: PathBuf::from("/sln/App/gccDebug/App.exe"),
            },
        ];

        let release = project.configuration_mut("Release").unwrap().managed_mut().unwrap();
        release.optimize = true;
        release.warnings_as_errors = true;
        project
    }

    #[test]
    fn test_compiler_flags() {
        let project = app();
        let debug = project.configuration("Debug").unwrap().managed().unwrap();
        assert_eq!(
            compiler_flags(debug),
            "-optimize- -define:DEBUG -define:TRACE -debug+ -debug:full -nowarn:1701,1702 \
             -filealign:512 -warn:4 -pkg:dotnet"
        );

        let release = project.configuration("Release").unwrap().managed().unwrap();
        assert_eq!(
            compiler_flags(release),
            "-optimize+ -warnaserror+ -nowarn:1701,1702 -filealign:512 -warn:4 -pkg:dotnet"
        );
    }

    #[test]
    fn test_variables_and_targets() {
        let text = render(&app(), &options(Platform::Linux));

        assert_has_line(&text, "CSHARP_COMPILER = gmcs");
        assert_has_line(&text, "FILES = Program.cs Properties/AssemblyInfo.cs");
        assert_has_line(&text, "Debug_REFERENCES = -r:../Lib/gccDebug/Lib.dll,../ThirdParty/Json.dll");
        assert_has_line(&text, "Release_REFERENCES =");
        assert_has_line(&text, "build_all_configurations: Debug Release");
        assert_has_line(&text, "Debug: create_folders");
        assert_has_line(
            &text,
            "\t$(CSHARP_COMPILER) $(FILES) $(Release_REFERENCES) $(Release_FLAGS) \
             -out:gccRelease/App.exe -target:exe",
        );
    }

    #[test]
    fn test_create_folders_copies_files() {
        let text = render(&app(), &options(Platform::Linux));

        assert_has_line(&text, "\tmkdir -p gccDebug");
        assert_has_line(&text, "\tcp app.config gccDebug");
        assert_has_line(&text, "\tcp ../Lib/gccDebug/Lib.dll gccDebug");
        assert!(!text.contains("cp gccDebug/App.exe"));
        assert_has_line(&text, "\trm -f gccRelease/*.dll");
    }

    #[test]
    fn test_cygwin_paths_and_compiler() {
        let text = render(&app(), &options(Platform::Cygwin));
        assert!(text.contains("FILES = Program.cs Properties\\\\AssemblyInfo.cs\n"));
        assert!(text.contains("Csc.exe\n"));
    }

    #[test]
    fn test_gui_executable_target() {
        let solution = SolutionBuilder::new("/sln")
            .managed("Viewer", ProjectKind::ManagedGuiExecutable, &["Debug"])
            .build();
        let options = GeneratorOptions::new(Platform::Linux, "gcc", Toolchain::default());
        let text = render(solution.project("Viewer").unwrap(), &options);
        assert!(text.contains("-out:gccDebug/Viewer.exe -target:winexe"));
    }
}
