//! Applying override rules to native configurations.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::core::configuration::{LibraryPath, NativeSettings, PathOrigin};
use crate::core::project::Project;
use crate::overrides::{Layers, OverrideRules, ProjectRules};
use crate::util::fs::{add_folder_prefix, library_key, path_key, raw_library_name, relative_make_path};

/// Definition every source build defines and the generated build must not.
const SOURCE_PLATFORM_DEFINITION: &str = "WIN32";

/// Definition every generated build defines.
const GENERATED_PLATFORM_DEFINITION: &str = "GCC_BUILD";

#[derive(Debug, Clone, Copy)]
enum Category {
    Library,
    LibraryPath,
    IncludePath,
    Definition,
    Flag,
}

impl ProjectRules {
    fn removal_set(&self, category: Category) -> &HashSet<String> {
        match category {
            Category::Library => &self.removed_libraries,
            Category::LibraryPath => &self.removed_library_paths,
            Category::IncludePath => &self.removed_include_paths,
            Category::Definition => &self.removed_definitions,
            Category::Flag => &self.removed_flags,
        }
    }
}

impl Layers<'_> {
    /// Removal sets of both layers are unioned.
    fn removes(&self, category: Category, key: &str) -> bool {
        self.iter().any(|rules| rules.removal_set(category).contains(key))
    }
}

impl OverrideRules {
    /// Apply the rules to every configuration of a native project.
    ///
    /// Managed projects are left untouched. Applying twice gives the same
    /// result as applying once.
    pub fn apply(&self, project: &mut Project, folder_prefix: &str) {
        if !project.kind.is_native() {
            return;
        }

        let layers = self.layers(&project.name);
        let root = project.root_absolute.clone();
        for configuration in project.configurations_mut() {
            let name = configuration.name.clone();
            if let Some(native) = configuration.native_mut() {
                apply_native(layers, &name, &root, folder_prefix, native);
                debug!(
                    "applied overrides to `{}` ({} libraries, {} library paths)",
                    name,
                    native.libraries.len(),
                    native.library_paths.len()
                );
            }
        }
    }
}

fn apply_native(
    layers: Layers<'_>,
    configuration: &str,
    project_root: &Path,
    folder_prefix: &str,
    native: &mut NativeSettings,
) {
    native.definitions.remove(SOURCE_PLATFORM_DEFINITION);
    native
        .definitions
        .insert(GENERATED_PLATFORM_DEFINITION.to_string());

    native
        .definitions
        .retain(|d| !layers.removes(Category::Definition, d));
    native
        .compiler_flags
        .retain(|f| !layers.removes(Category::Flag, f));
    native
        .libraries
        .retain(|l| !layers.removes(Category::Library, &library_key(l)));
    native
        .include_paths
        .retain(|p| !layers.removes(Category::IncludePath, &path_key(project_root, p)));

    // Surviving source paths name folders of the original build.
    let existing = std::mem::take(&mut native.library_paths);
    for entry in existing {
        if layers.removes(Category::LibraryPath, &path_key(project_root, &entry.path)) {
            continue;
        }
        let entry = match entry.origin {
            PathOrigin::Source => LibraryPath::generated(add_folder_prefix(&entry.path, folder_prefix)),
            PathOrigin::Generated => entry,
        };
        native.push_library_path(entry);
    }

    for rules in layers.iter() {
        let Some(additions) = rules.configurations.get(configuration) else {
            continue;
        };
        for library in &additions.libraries {
            native.libraries.insert(raw_library_name(library));
        }
        for path in &additions.library_paths {
            native.push_library_path(LibraryPath::generated(relative_make_path(project_root, path)));
        }
        for path in &additions.include_paths {
            native.push_include_path(relative_make_path(project_root, path));
        }
        for definition in &additions.definitions {
            native.definitions.insert(definition.clone());
        }
        for flag in &additions.flags {
            native.compiler_flags.insert(flag.clone());
        }
    }
}
