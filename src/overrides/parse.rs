//! Override document parsing.
//!
//! ```xml
//! <Overrides>
//!   <AllProjects>
//!     <RemoveLibrary library="pthread"/>
//!     <AddPreprocessorDefinition configuration="Debug" definition="TRACE"/>
//!   </AllProjects>
//!   <Project name="Core">
//!     <ConvertStaticLibraryToSharedObjects convert="true"/>
//!     <Compiler cpp="clang++"/>
//!   </Project>
//!   <IgnoreProject project="UnitTests"/>
//! </Overrides>
//! ```
//!
//! The root element's name is not checked. Rule elements missing a required
//! attribute are skipped. Unknown elements are ignored.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

use crate::core::project::strip_spaces;
use crate::overrides::OverrideRules;
use crate::util::diagnostic::OverrideSyntaxError;
use crate::util::fs::{library_key, normalize_lexical, path_key, raw_library_name, read_to_string};

/// Default file name of the override document.
pub const OVERRIDES_FILE_NAME: &str = "slnmake.config";

/// Which layer the elements being read belong to.
enum Scope {
    AllProjects,
    Project(String),
    /// Inside an element whose children are not rules
    Other,
}

/// Load an override document.
pub fn load_overrides(path: &Path, solution_root: &Path) -> Result<OverrideRules> {
    let text = read_to_string(path)?;
    let name = path.display().to_string();
    parse_overrides(&text, &name, solution_root).map_err(|e| {
        anyhow!(
            "failed to parse override document: {}\n{:?}",
            path.display(),
            miette::Report::new(e)
        )
    })
}

/// Parse an override document. Relative paths are taken from `solution_root`.
pub fn parse_overrides(
    text: &str,
    source_name: &str,
    solution_root: &Path,
) -> Result<OverrideRules, OverrideSyntaxError> {
    let mut rules = OverrideRules::new(solution_root);

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut scope = Scope::Other;

    loop {
        let event = reader.read_event().map_err(|e| {
            OverrideSyntaxError::at(
                source_name,
                text,
                reader.error_position() as usize,
                e.to_string(),
            )
        })?;
        let offset = reader.buffer_position() as usize;
        let syntax = |message: String| OverrideSyntaxError::at(source_name, text, offset, message);

        match event {
            Event::Start(element) => {
                let attributes = read_attributes(&element).map_err(syntax)?;
                depth += 1;
                match depth {
                    2 => scope = open_scope(&element, &attributes, &mut rules),
                    3 => apply_rule(&element, &attributes, &scope, &mut rules),
                    _ => {}
                }
            }
            Event::Empty(element) => {
                let attributes = read_attributes(&element).map_err(syntax)?;
                match depth + 1 {
                    2 => {
                        open_scope(&element, &attributes, &mut rules);
                    }
                    3 => apply_rule(&element, &attributes, &scope, &mut rules),
                    _ => {}
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    scope = Scope::Other;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(OverrideSyntaxError::at(
            source_name,
            text,
            text.len(),
            "unexpected end of document".to_string(),
        ));
    }

    debug!(
        "parsed override document {} ({} project layers, {} ignored projects)",
        source_name,
        rules.projects.len(),
        rules.ignored_projects.len()
    );
    Ok(rules)
}

type Attributes = HashMap<String, String>;

fn read_attributes(element: &BytesStart<'_>) -> Result<Attributes, String> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(|e| e.to_string())?;
        attributes.insert(key, value.into_owned());
    }
    Ok(attributes)
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Handle an element directly below the root.
fn open_scope(
    element: &BytesStart<'_>,
    attributes: &Attributes,
    rules: &mut OverrideRules,
) -> Scope {
    match element_name(element).as_str() {
        "AllProjects" => Scope::AllProjects,
        "Project" => match attributes.get("name") {
            Some(name) => {
                let name = strip_spaces(name);
                rules.projects.entry(name.clone()).or_default();
                Scope::Project(name)
            }
            None => Scope::Other,
        },
        "IgnoreProject" => {
            if let Some(project) = attributes.get("project") {
                trace!("ignoring project `{}`", project);
                rules.ignored_projects.insert(strip_spaces(project).to_lowercase());
            }
            Scope::Other
        }
        _ => Scope::Other,
    }
}

/// Handle one rule element inside a layer.
fn apply_rule(
    element: &BytesStart<'_>,
    attributes: &Attributes,
    scope: &Scope,
    rules: &mut OverrideRules,
) {
    let solution_root = rules.solution_root.clone();
    let layer = match scope {
        Scope::AllProjects => &mut rules.all_projects,
        Scope::Project(name) => rules.projects.entry(name.clone()).or_default(),
        Scope::Other => return,
    };

    let attr = |key: &str| attributes.get(key).map(String::as_str);
    let name = element_name(element);

    match name.as_str() {
        "RemoveLibrary" => {
            if let Some(library) = attr("library") {
                layer.removed_libraries.insert(library_key(library));
            }
        }
        "RemoveLibraryPath" => {
            if let Some(path) = attr("path") {
                layer.removed_library_paths.insert(path_key(&solution_root, path));
            }
        }
        "RemoveIncludePath" => {
            if let Some(path) = attr("path") {
                layer.removed_include_paths.insert(path_key(&solution_root, path));
            }
        }
        "RemovePreprocessorDefinition" => {
            if let Some(definition) = attr("definition") {
                layer.removed_definitions.insert(definition.to_string());
            }
        }
        "RemoveCompilerFlag" => {
            if let Some(flag) = attr("flag") {
                layer.removed_flags.insert(flag.to_string());
            }
        }
        "AddLibrary" => {
            if let (Some(cfg), Some(library)) = (attr("configuration"), attr("library")) {
                layer
                    .configuration_mut(cfg)
                    .libraries
                    .push(raw_library_name(library));
            }
        }
        "AddLibraryPath" => {
            if let (Some(cfg), Some(path)) = (attr("configuration"), attr("path")) {
                let absolute = normalize_lexical(&solution_root.join(path.replace('\\', "/")));
                layer.configuration_mut(cfg).library_paths.push(absolute);
            }
        }
        "AddIncludePath" => {
            if let (Some(cfg), Some(path)) = (attr("configuration"), attr("path")) {
                let absolute = normalize_lexical(&solution_root.join(path.replace('\\', "/")));
                layer.configuration_mut(cfg).include_paths.push(absolute);
            }
        }
        "AddPreprocessorDefinition" => {
            if let (Some(cfg), Some(definition)) = (attr("configuration"), attr("definition")) {
                layer
                    .configuration_mut(cfg)
                    .definitions
                    .push(definition.to_string());
            }
        }
        "AddCompilerFlag" => {
            if let (Some(cfg), Some(flag)) = (attr("configuration"), attr("flag")) {
                layer.configuration_mut(cfg).flags.push(flag.to_string());
            }
        }
        "ConvertStaticLibraryToSharedObjects" => {
            if let Some(convert) = attr("convert") {
                if let Ok(convert) = convert.trim().to_lowercase().parse::<bool>() {
                    layer.convert_static_to_shared = Some(convert);
                }
            }
        }
        "Compiler" => {
            let tool = |key: &str| attr(key).map(str::to_string);
            if let Some(cpp) = tool("cpp") {
                layer.compiler.cpp = Some(cpp);
            }
            if let Some(c) = tool("c") {
                layer.compiler.c = Some(c);
            }
            if let Some(archiver) = tool("archiver") {
                layer.compiler.archiver = Some(archiver);
            }
            if let Some(csharp) = tool("csharp") {
                layer.compiler.csharp = Some(csharp);
            }
        }
        other => trace!("ignoring unknown override element `{}`", other),
    }
}
