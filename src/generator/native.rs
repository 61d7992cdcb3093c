//! Makefiles for native (C/C++) projects.

use std::collections::BTreeSet;

use crate::core::configuration::{Configuration, CustomBuildRule, NativeSettings};
use crate::core::project::{Project, ProjectKind};
use crate::generator::{join_words, GeneratorOptions, MakefileWriter};
use crate::util::config::Toolchain;
use crate::util::fs::{add_folder_prefix, change_extension};

/// Per-configuration variable names.
struct Variables {
    include_path: String,
    library_path: String,
    libraries: String,
    definitions: String,
    implicit_objects: String,
    compiler_flags: String,
}

impl Variables {
    fn new(configuration: &str) -> Self {
        Variables {
            include_path: format!("{}_Include_Path", configuration),
            library_path: format!("{}_Library_Path", configuration),
            libraries: format!("{}_Libraries", configuration),
            definitions: format!("{}_Preprocessor_Definitions", configuration),
            implicit_objects: format!("{}_Implicitly_Linked_Objects", configuration),
            compiler_flags: format!("{}_Compiler_Flags", configuration),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

fn is_c_source(file: &str) -> bool {
    file.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("c"))
}

/// One configuration as seen by the renderer.
struct ConfigurationView<'a> {
    name: &'a str,
    native: &'a NativeSettings,
    intermediate: String,
    output: String,
    vars: Variables,
}

impl<'a> ConfigurationView<'a> {
    fn new(configuration: &'a Configuration, folder_prefix: &str) -> Option<Self> {
        Some(ConfigurationView {
            name: &configuration.name,
            native: configuration.native()?,
            intermediate: add_folder_prefix(&configuration.intermediate_folder, folder_prefix),
            output: add_folder_prefix(&configuration.output_folder, folder_prefix),
            vars: Variables::new(&configuration.name),
        })
    }

    fn object(&self, source: &str) -> String {
        format!("{}/{}", self.intermediate, change_extension(source, "o"))
    }

    fn dependency_file(&self, source: &str) -> String {
        format!("{}/{}", self.intermediate, change_extension(source, "d"))
    }

    fn custom_rule_target(&self, rule: &CustomBuildRule) -> String {
        format!("{}_CustomBuild_{}", self.name, rule.target_suffix())
    }
}

/// Render the makefile of a native project.
pub fn render(project: &Project, options: &GeneratorOptions) -> String {
    let tools = options.toolchain_for(&project.name);
    let configurations: Vec<ConfigurationView<'_>> = project
        .configurations()
        .iter()
        .filter_map(|cfg| ConfigurationView::new(cfg, &options.folder_prefix))
        .collect();
    let position_independent =
        project.kind == ProjectKind::NativeSharedLibrary && !options.platform.is_cygwin();

    let mut w = MakefileWriter::new();

    write_variables(&mut w, "Include paths", &configurations, |c| {
        (
            c.vars.include_path.clone(),
            join_words(c.native.include_paths.iter().map(|p| format!("-I{}", quote(p)))),
        )
    });
    write_variables(&mut w, "Library paths", &configurations, |c| {
        (
            c.vars.library_path.clone(),
            join_words(c.native.library_paths.iter().map(|p| format!("-L{}", quote(&p.path)))),
        )
    });
    write_variables(&mut w, "Additional libraries", &configurations, |c| {
        (
            c.vars.libraries.clone(),
            join_words(c.native.libraries.iter().map(|l| format!("-l{}", l))),
        )
    });
    write_variables(&mut w, "Preprocessor definitions", &configurations, |c| {
        (
            c.vars.definitions.clone(),
            join_words(c.native.definitions.iter().map(|d| format!("-D {}", d))),
        )
    });
    write_variables(&mut w, "Implicitly linked object files", &configurations, |c| {
        (
            c.vars.implicit_objects.clone(),
            join_words(c.native.implicit_objects.iter().map(|o| quote(o))),
        )
    });
    write_variables(&mut w, "Compiler flags", &configurations, |c| {
        let pic = position_independent.then_some("-fPIC".to_string());
        (
            c.vars.compiler_flags.clone(),
            join_words(pic.into_iter().chain(c.native.compiler_flags.iter().cloned())),
        )
    });

    let names: Vec<&str> = configurations.iter().map(|c| c.name).collect();
    w.comment("Builds all configurations for this project")
        .phony("build_all_configurations")
        .rule("build_all_configurations", &names)
        .blank();

    for cfg in &configurations {
        write_configuration_target(&mut w, project, cfg, tools, options);
        write_custom_rule_targets(&mut w, cfg, &options.folder_prefix);
        write_file_targets(&mut w, project, cfg, tools);
    }

    write_create_folders(&mut w, project, &configurations);
    write_clean(&mut w, &configurations);

    w.finish()
}

fn write_variables<F>(
    w: &mut MakefileWriter,
    title: &str,
    configurations: &[ConfigurationView<'_>],
    value: F,
) where
    F: Fn(&ConfigurationView<'_>) -> (String, String),
{
    w.comment(title);
    for cfg in configurations {
        let (name, value) = value(cfg);
        w.line(format!("{}={}", name, value));
    }
    w.blank();
}

fn write_configuration_target(
    w: &mut MakefileWriter,
    project: &Project,
    cfg: &ConfigurationView<'_>,
    tools: &Toolchain,
    options: &GeneratorOptions,
) {
    let objects: Vec<String> = project.sources.iter().map(|s| cfg.object(s)).collect();
    let objects_list = objects.join(" ");

    let mut prerequisites = vec!["create_folders".to_string()];
    prerequisites.extend(
        cfg.native
            .custom_build_rules
            .iter()
            .map(|r| cfg.custom_rule_target(r)),
    );
    prerequisites.extend(objects.iter().cloned());

    let library_path = format!("$({})", cfg.vars.library_path);
    let libraries = format!("$({})", cfg.vars.libraries);
    let implicit = format!("$({})", cfg.vars.implicit_objects);

    let command = match project.kind {
        ProjectKind::NativeStaticLibrary => join_words([
            tools.archiver.clone(),
            "rcs".to_string(),
            format!("{}/lib{}.a", cfg.output, project.name),
            objects_list,
            implicit,
        ]),
        ProjectKind::NativeSharedLibrary => {
            let file = options.platform.shared_library_name(&project.name);
            let pic = if options.platform.is_cygwin() { "" } else { "-fPIC" };
            join_words([
                tools.cpp.clone(),
                pic.to_string(),
                "-shared".to_string(),
                format!("-Wl,-soname,{}", file),
                "-o".to_string(),
                format!("{}/{}", cfg.output, file),
                objects_list,
                implicit,
                library_path,
                libraries,
            ])
        }
        _ => join_words([
            tools.cpp.clone(),
            objects_list,
            library_path,
            libraries,
            "-Wl,-rpath,./".to_string(),
            "-o".to_string(),
            format!("{}/{}.exe", cfg.output, project.name),
        ]),
    };

    w.comment(format!("Builds the {} configuration", cfg.name))
        .phony(cfg.name)
        .rule(cfg.name, &prerequisites)
        .recipe(command)
        .blank();
}

fn write_custom_rule_targets(w: &mut MakefileWriter, cfg: &ConfigurationView<'_>, folder_prefix: &str) {
    for rule in &cfg.native.custom_build_rules {
        let target = cfg.custom_rule_target(rule);
        w.comment(format!(
            "Custom build rule '{}' on {} for the {} configuration",
            rule.name, rule.file, cfg.name
        ))
        .phony(&target)
        .rule::<&str>(&target, &[])
        .recipe(rule.command_line(folder_prefix))
        .blank();
    }
}

fn write_file_targets(
    w: &mut MakefileWriter,
    project: &Project,
    cfg: &ConfigurationView<'_>,
    tools: &Toolchain,
) {
    let definitions = format!("$({})", cfg.vars.definitions);
    let flags = format!("$({})", cfg.vars.compiler_flags);
    let includes = format!("$({})", cfg.vars.include_path);

    for source in &project.sources {
        let compiler = if is_c_source(source) { &tools.c } else { &tools.cpp };
        let object = cfg.object(source);
        let dependencies = cfg.dependency_file(source);

        w.comment(format!(
            "Compiles file {} for the {} configuration",
            source, cfg.name
        ))
        .line(format!("-include {}", dependencies))
        .rule(&object, &[source])
        .recipe(format!(
            "{} {} {} -c {} {} -o {}",
            compiler, definitions, flags, source, includes, object
        ))
        .recipe(format!(
            "{} {} {} -MM {} {} > {}",
            compiler, definitions, flags, source, includes, dependencies
        ))
        .blank();
    }
}

fn write_create_folders(w: &mut MakefileWriter, project: &Project, configurations: &[ConfigurationView<'_>]) {
    w.comment("Creates the intermediate and output folders for each configuration")
        .phony("create_folders")
        .rule::<&str>("create_folders", &[]);

    for cfg in configurations {
        w.recipe(format!("mkdir -p {}", cfg.intermediate));
        if cfg.output != cfg.intermediate {
            w.recipe(format!("mkdir -p {}", cfg.output));
        }
        let nested: BTreeSet<String> = project
            .sources
            .iter()
            .filter_map(|s| s.rsplit_once('/').map(|(folder, _)| folder))
            .map(|folder| format!("{}/{}", cfg.intermediate, folder))
            .collect();
        for folder in nested {
            w.recipe(format!("mkdir -p {}", folder));
        }
    }
    w.blank();
}

fn write_clean(w: &mut MakefileWriter, configurations: &[ConfigurationView<'_>]) {
    w.comment("Cleans intermediate and output files (objects, libraries, executables)")
        .phony("clean")
        .rule::<&str>("clean", &[]);

    for cfg in configurations {
        for ext in ["o", "d"] {
            w.recipe(format!("rm -f {}/*.{}", cfg.intermediate, ext));
        }
        for ext in ["a", "so", "dll", "exe"] {
            w.recipe(format!("rm -f {}/*.{}", cfg.output, ext));
        }
    }
    w.blank();
}
