use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform;

/// Compiles per session before the compiler's file manager is recreated
pub const DEFAULT_SESSION_USES: usize = 15;

/// Default configuration file content with comments
const DEFAULT_CONFIG: &str = r#"# find-compile-errors configuration file
# This file is auto-generated on first run. All fields are optional.

# Compiler command or path
# Supports ~ for home directory
# Default: "javac"
javac = "javac"

# Directory compiled classes are written to (-d)
# Default: "bin"
output_dir = "bin"

# Source file encoding passed to the compiler
# Default: "UTF-8"
encoding = "UTF-8"

# Number of files compiled with one compiler session before its state is
# discarded and recreated. Keeps memory bounded on very large source trees.
# Default: 15
session_uses = 15

# Separator between classpath entries
# Default: ":" (";" on Windows)
classpath_separator = "{separator}"

# Extra options passed to the compiler for every file
# Example: ["-Xmaxerrs", "10000", "-nowarn"]
# Default: []
extra_options = []

# File name pattern(s) to compile - every regular file is compiled when empty
# Supports wildcards: "*.java", "Block*.java", etc.
# Default: []
include = []

# Write the errors gathered so far when the run aborts on an I/O error
# (the process then exits with status 3 instead of 1)
# Default: false
partial_report = false
"#;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_javac")]
    pub javac: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_session_uses")]
    pub session_uses: usize,

    #[serde(default = "default_classpath_separator")]
    pub classpath_separator: String,

    #[serde(default)]
    pub extra_options: Vec<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub partial_report: bool,
}

/// Default config file content for this platform
fn default_config_text() -> String {
    DEFAULT_CONFIG.replace("{separator}", platform::CLASSPATH_SEPARATOR)
}

fn default_javac() -> String {
    "javac".to_string()
}

fn default_output_dir() -> String {
    "bin".to_string()
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_session_uses() -> usize {
    DEFAULT_SESSION_USES
}

fn default_classpath_separator() -> String {
    platform::CLASSPATH_SEPARATOR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            javac: default_javac(),
            output_dir: default_output_dir(),
            encoding: default_encoding(),
            session_uses: default_session_uses(),
            classpath_separator: default_classpath_separator(),
            extra_options: Vec::new(),
            include: Vec::new(),
            partial_report: false,
        }
    }
}

impl Config {
    /// Get the default config file path
    /// Always uses ~/.config for consistency across platforms
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".config")
            .join("find-compile-errors")
            .join("config.toml")
    }

    /// Load config from file, or create default if it doesn't exist
    pub fn load_or_create(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path.clone().unwrap_or_else(Self::default_path);

        if path.exists() {
            Self::load(&path)
        } else {
            Self::create_default(&path)?;
            Ok(Self::default())
        }
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Create default config file
    fn create_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(path, default_config_text())
            .with_context(|| format!("Failed to write default config: {}", path.display()))?;

        Ok(())
    }

    /// Reject values the compile loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.session_uses == 0 {
            bail!("session_uses must be at least 1");
        }
        if self.classpath_separator.is_empty() {
            bail!("classpath_separator must not be empty");
        }
        if self.output_dir.trim().is_empty() {
            bail!("output_dir must not be empty");
        }
        Ok(())
    }

    /// Expand ~ in the compiler command
    pub fn expanded_javac(&self) -> PathBuf {
        expand_tilde(&self.javac)
    }

    /// Expand ~ in output_dir
    pub fn expanded_output_dir(&self) -> PathBuf {
        expand_tilde(&self.output_dir)
    }
}

/// Known top-level config keys (for detecting missing options)
const KNOWN_KEYS: &[&str] = &[
    "javac",
    "output_dir",
    "encoding",
    "session_uses",
    "classpath_separator",
    "extra_options",
    "include",
    "partial_report",
];

/// Check for missing config options and return a list of missing keys
pub fn check_missing_options(path: &Path) -> Vec<String> {
    let mut missing = Vec::new();

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return missing, // Can't read file, skip check
    };

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return missing, // Can't parse, skip check
    };

    for key in KNOWN_KEYS {
        if !table.contains_key(*key) {
            missing.push(key.to_string());
        }
    }

    missing
}

/// Expand ~ to home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
