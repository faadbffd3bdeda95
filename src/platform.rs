use std::path::{Path, PathBuf};

/// Conventional classpath separator on Unix
#[cfg(not(windows))]
pub const CLASSPATH_SEPARATOR: &str = ":";

/// Conventional classpath separator on Windows
#[cfg(windows)]
pub const CLASSPATH_SEPARATOR: &str = ";";

/// Split a classpath into its entries, skipping empty segments
/// (e.g. "a.jar::b.jar" or a trailing separator)
pub fn split_classpath(classpath: &str, separator: &str) -> Vec<PathBuf> {
    classpath
        .split(separator)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Classpath entries that name neither an existing file nor directory
pub fn missing_entries(entries: &[PathBuf]) -> Vec<&Path> {
    entries
        .iter()
        .map(PathBuf::as_path)
        .filter(|entry| !entry.exists())
        .collect()
}
