use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::compiler::{CompilationService, CompileOptions, FileManager};
use crate::errors::ErrorAggregator;
use crate::progress::ProgressReporter;
use crate::session::SessionRotation;

/// Counters for the end-of-run summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub compiled: usize,
    pub failed: usize,
    pub sessions: usize,
}

/// Compile every file once, in order, rotating compiler sessions and merging
/// the error diagnostics of failed compiles into `errors`.
///
/// Returns early with the error when a file cannot be compiled at all; `errors`
/// then holds everything gathered up to that file.
pub fn compile_all<S: CompilationService>(
    service: &S,
    files: &[PathBuf],
    options: &CompileOptions,
    session_uses: usize,
    errors: &mut ErrorAggregator,
    progress: &mut ProgressReporter,
) -> Result<BatchSummary> {
    let mut rotation = SessionRotation::new(service, options, session_uses);
    let mut summary = BatchSummary::default();
    let mut current: HashMap<String, Vec<String>> = HashMap::new();
    let total = files.len();

    for (i, file) in files.iter().enumerate() {
        let session = rotation.acquire()?;
        session.diagnostics.reset();

        let unit = session.file_manager.compilation_unit(file)?;
        let success = service
            .compile(
                &mut session.file_manager,
                options,
                &unit,
                &mut session.diagnostics,
            )
            .with_context(|| format!("Failed to compile {}", file.display()))?;
        summary.compiled += 1;

        if !success {
            summary.failed += 1;
            let mut reported = false;
            for diagnostic in session.diagnostics.diagnostics() {
                if !diagnostic.is_error() {
                    continue;
                }
                reported = true;
                match diagnostic.file_name() {
                    Some(name) => current
                        .entry(name)
                        .or_default()
                        .push(diagnostic.message.clone()),
                    None => progress.warn(&format!(
                        "Warning: error without a source file while compiling {}: {}",
                        file.display(),
                        diagnostic.message
                    )),
                }
            }
            if !reported {
                progress.warn(&format!(
                    "Warning: compiler failed on {} without reporting an error",
                    unit.uri
                ));
            }
            for (name, messages) in current.drain() {
                errors.merge(&name, messages);
            }
        }

        progress.report(i + 1, total, errors.total());
    }

    summary.sessions = rotation.opened();
    rotation.finish()?;
    Ok(summary)
}
