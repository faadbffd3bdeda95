use anyhow::{bail, Result};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use url::Url;

use crate::compiler::{CompilationService, CompilationUnit, CompileOptions, FileManager};
use crate::diagnostic::{Diagnostic, DiagnosticCollector, Kind};

pub fn options() -> CompileOptions {
    CompileOptions {
        classpath: "lib.jar".to_string(),
        output_dir: PathBuf::from("bin"),
        source_root: PathBuf::from("src"),
        encoding: "UTF-8".to_string(),
        extra_options: Vec::new(),
    }
}

/// Fake `file://` URI for a bare file name
pub fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///src/{name}")).unwrap()
}

/// Compiler whose diagnostics are scripted per target file name
#[derive(Default)]
pub struct ScriptedCompiler {
    script: HashMap<String, Vec<Diagnostic>>,
    failing_io: Option<String>,
    closed: Rc<Cell<usize>>,
    max_uses: Rc<Cell<usize>>,
}

impl ScriptedCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiling `target` emits an error attributed to `source`
    pub fn error(mut self, target: &str, source: &str, message: &str) -> Self {
        self.script.entry(target.to_string()).or_default().push(Diagnostic::new(
            Kind::Error,
            Some(uri(source)),
            message,
        ));
        self
    }

    pub fn diagnostic(mut self, target: &str, diagnostic: Diagnostic) -> Self {
        self.script
            .entry(target.to_string())
            .or_default()
            .push(diagnostic);
        self
    }

    /// Compiling `target` fails with an I/O error
    pub fn io_failure(mut self, target: &str) -> Self {
        self.failing_io = Some(target.to_string());
        self
    }

    /// File managers closed so far
    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    /// Most compiles any single file manager has served
    pub fn max_uses(&self) -> usize {
        self.max_uses.get()
    }
}

pub struct ScriptedFileManager {
    uses: usize,
    max_uses: Rc<Cell<usize>>,
    closed: Rc<Cell<usize>>,
}

impl FileManager for ScriptedFileManager {
    fn compilation_unit(&mut self, path: &Path) -> Result<CompilationUnit> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(CompilationUnit {
            path: path.to_path_buf(),
            uri: uri(&name),
        })
    }

    fn close(self) -> Result<()> {
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

impl CompilationService for ScriptedCompiler {
    type FileManager = ScriptedFileManager;

    fn file_manager(&self, _options: &CompileOptions) -> Result<ScriptedFileManager> {
        Ok(ScriptedFileManager {
            uses: 0,
            max_uses: Rc::clone(&self.max_uses),
            closed: Rc::clone(&self.closed),
        })
    }

    fn compile(
        &self,
        file_manager: &mut ScriptedFileManager,
        _options: &CompileOptions,
        unit: &CompilationUnit,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<bool> {
        file_manager.uses += 1;
        if file_manager.uses > file_manager.max_uses.get() {
            file_manager.max_uses.set(file_manager.uses);
        }

        let name = unit
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_io.as_deref() == Some(name.as_str()) {
            bail!("Failed to read {}", unit.path.display());
        }

        let mut success = true;
        for diagnostic in self.script.get(&name).into_iter().flatten() {
            if diagnostic.is_error() {
                success = false;
            }
            diagnostics.report(diagnostic.clone());
        }
        Ok(success)
    }
}
