use anyhow::Result;
use std::path::{Path, PathBuf};
use url::Url;

use crate::diagnostic::DiagnosticCollector;

/// A source file resolved by a [`FileManager`], ready to be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub uri: Url,
}

/// Fixed configuration shared by every compile of a run
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub classpath: String,
    pub output_dir: PathBuf,
    pub source_root: PathBuf,
    pub encoding: String,
    pub extra_options: Vec<String>,
}

impl CompileOptions {
    /// Command line options in the order they are handed to the compiler
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-cp".to_string(),
            self.classpath.clone(),
            "-d".to_string(),
            self.output_dir.to_string_lossy().into_owned(),
            "-sourcepath".to_string(),
            self.source_root.to_string_lossy().into_owned(),
            "-encoding".to_string(),
            self.encoding.clone(),
        ];
        args.extend(self.extra_options.iter().cloned());
        args
    }
}

/// Stateful per-session compiler resources (file lookup caches, scratch files).
///
/// Dropping a file manager must release its resources; `close` does the same
/// but reports failures.
pub trait FileManager {
    /// Resolve a path on disk into a compilation unit
    fn compilation_unit(&mut self, path: &Path) -> Result<CompilationUnit>;

    /// Release everything held by this file manager
    fn close(self) -> Result<()>;
}

/// An external compiler invoked once per source file
pub trait CompilationService {
    type FileManager: FileManager;

    /// Create fresh session state for a run of compiles
    fn file_manager(&self, options: &CompileOptions) -> Result<Self::FileManager>;

    /// Compile one unit, recording its diagnostics into `diagnostics`.
    ///
    /// Returns `Ok(false)` when the compiler reported errors and `Err` only
    /// when the compiler could not be run at all.
    fn compile(
        &self,
        file_manager: &mut Self::FileManager,
        options: &CompileOptions,
        unit: &CompilationUnit,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<bool>;
}
