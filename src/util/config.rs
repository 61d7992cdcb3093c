//! Conversion settings.
//!
//! Settings come from an optional `slnmake.toml` next to the solution
//! description, then from command-line flags. The resulting value is built
//! once and passed to every stage of the conversion.
//!
//! ```toml
//! platform = "cygwin"
//! folder-prefix = "gcc"
//!
//! [toolchain]
//! cpp = "clang++"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the settings file looked up next to the solution description.
pub const CONFIG_FILE_NAME: &str = "slnmake.toml";

/// Default prefix applied to generated intermediate and output folders.
pub const DEFAULT_FOLDER_PREFIX: &str = "gcc";

const CYGWIN_CSHARP_COMPILER: &str = "/cygdrive/c/Windows/Microsoft.NET/Framework/v3.5/Csc.exe";

/// Platform the generated makefiles target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Linux,
    Cygwin,
}

impl Platform {
    pub fn is_cygwin(&self) -> bool {
        matches!(self, Platform::Cygwin)
    }

    /// Shared library file name for a project.
    pub fn shared_library_name(&self, project: &str) -> String {
        match self {
            Platform::Linux => format!("lib{}.so", project),
            Platform::Cygwin => format!("lib{}.dll", project),
        }
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConvertConfig {
    pub platform: Platform,

    /// Prefix for the last component of generated folders
    pub folder_prefix: String,

    /// Tool overrides
    pub toolchain: ToolchainSettings,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            platform: Platform::default(),
            folder_prefix: DEFAULT_FOLDER_PREFIX.to_string(),
            toolchain: ToolchainSettings::default(),
        }
    }
}

impl ConvertConfig {
    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load `slnmake.toml` from `dir` if it exists, defaults otherwise.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            tracing::debug!("loading settings from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// The toolchain with every tool filled in for this platform.
    pub fn toolchain(&self) -> Toolchain {
        self.toolchain.resolve(self.platform)
    }
}

/// Optional tool overrides. Unset tools fall back to platform defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C++ compiler (e.g., clang++)
    pub cpp: Option<String>,

    /// C compiler
    pub c: Option<String>,

    /// Static library archiver
    pub archiver: Option<String>,

    /// Managed (C#) compiler
    pub csharp: Option<String>,
}

impl ToolchainSettings {
    /// Check if any tool is overridden.
    pub fn has_overrides(&self) -> bool {
        self.cpp.is_some() || self.c.is_some() || self.archiver.is_some() || self.csharp.is_some()
    }

    /// Merge another set of overrides into this one (other takes precedence).
    pub fn merge(&mut self, other: &ToolchainSettings) {
        if other.cpp.is_some() {
            self.cpp = other.cpp.clone();
        }
        if other.c.is_some() {
            self.c = other.c.clone();
        }
        if other.archiver.is_some() {
            self.archiver = other.archiver.clone();
        }
        if other.csharp.is_some() {
            self.csharp = other.csharp.clone();
        }
    }

    /// Fill unset tools with the platform defaults.
    pub fn resolve(&self, platform: Platform) -> Toolchain {
        let csharp_default = match platform {
            Platform::Linux => "gmcs",
            Platform::Cygwin => CYGWIN_CSHARP_COMPILER,
        };
        Toolchain {
            cpp: self.cpp.clone().unwrap_or_else(|| "g++".to_string()),
            c: self.c.clone().unwrap_or_else(|| "gcc".to_string()),
            archiver: self.archiver.clone().unwrap_or_else(|| "ar".to_string()),
            csharp: self
                .csharp
                .clone()
                .unwrap_or_else(|| csharp_default.to_string()),
        }
    }
}

/// Fully resolved tool names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    pub cpp: String,
    pub c: String,
    pub archiver: String,
    pub csharp: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        ToolchainSettings::default().resolve(Platform::Linux)
    }
}
