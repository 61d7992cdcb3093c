//! Filesystem and path utilities.
//!
//! Paths written into makefiles are always `/`-separated strings. Paths are
//! normalized lexically because most of them name build outputs that do not
//! exist yet.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(normalize_lexical(path), normalize_lexical(base))
        .unwrap_or_else(|| path.to_path_buf())
}

/// Render a path the way makefiles expect it: `/` separators, `.` for empty.
pub fn to_make_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.is_empty() {
        ".".to_string()
    } else {
        s
    }
}

/// Relative path from `base` to `path`, rendered for a makefile.
pub fn relative_make_path(base: &Path, path: &Path) -> String {
    to_make_path(&relative_path(base, path))
}

/// Case-insensitive comparison key for a path: absolute from `root`,
/// normalized and lower-cased.
pub fn path_key(root: &Path, path: &str) -> String {
    let joined = root.join(path.replace('\\', "/"));
    to_make_path(&normalize_lexical(&joined)).to_lowercase()
}

/// Prefix the last component of a folder path: `bin/Debug` becomes
/// `bin/gccDebug`.
pub fn add_folder_prefix(path: &str, prefix: &str) -> String {
    let path = path.replace('\\', "/");
    match path.rfind('/') {
        Some(i) => format!("{}{}{}", &path[..=i], prefix, &path[i + 1..]),
        None => format!("{}{}", prefix, path),
    }
}

/// Prefix the folder a file lives in: `bin/Release/tool` becomes
/// `bin/gccRelease/tool`. A bare file name is returned unchanged.
pub fn add_file_prefix(path: &str, prefix: &str) -> String {
    let path = path.replace('\\', "/");
    match path.rfind('/') {
        Some(i) => format!("{}/{}", add_folder_prefix(&path[..i], prefix), &path[i + 1..]),
        None => path,
    }
}

/// Replace (or add) the extension of a `/`-separated path.
pub fn change_extension(path: &str, extension: &str) -> String {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let stem_end = match path[file_start..].rfind('.') {
        Some(i) if i > 0 => file_start + i,
        _ => path.len(),
    };
    format!("{}.{}", &path[..stem_end], extension)
}

/// Library name without platform decoration: `libMath.a`, `Math.lib` and
/// `Math` are all `Math`.
pub fn raw_library_name(name: &str) -> String {
    let file = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let file = file.strip_prefix("lib").unwrap_or(file);
    match file.rfind('.') {
        Some(i) if i > 0 => file[..i].to_string(),
        _ => file.to_string(),
    }
}

/// Case-folded comparison key for a library.
pub fn library_key(name: &str) -> String {
    raw_library_name(name).to_lowercase()
}
