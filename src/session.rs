use anyhow::{Context, Result};

use crate::compiler::{CompilationService, CompileOptions, FileManager};
use crate::diagnostic::DiagnosticCollector;

/// A file manager and its diagnostic sink, used for a bounded number of compiles
pub struct CompileSession<F: FileManager> {
    pub file_manager: F,
    pub diagnostics: DiagnosticCollector,
    uses: usize,
}

impl<F: FileManager> CompileSession<F> {
    fn open<S>(service: &S, options: &CompileOptions) -> Result<Self>
    where
        S: CompilationService<FileManager = F>,
    {
        let file_manager = service
            .file_manager(options)
            .context("Failed to create compiler file manager")?;
        Ok(Self {
            file_manager,
            diagnostics: DiagnosticCollector::new(),
            uses: 0,
        })
    }

    /// Number of compiles this session has been handed out for
    pub fn uses(&self) -> usize {
        self.uses
    }

    fn close(self) -> Result<()> {
        self.file_manager
            .close()
            .context("Failed to close compiler file manager")
    }
}

/// Owns the single live [`CompileSession`] and replaces it once it has been
/// used `bound` times.
///
/// A session dropped on an error path releases its file manager through `Drop`.
pub struct SessionRotation<'a, S: CompilationService> {
    service: &'a S,
    options: &'a CompileOptions,
    bound: usize,
    current: Option<CompileSession<S::FileManager>>,
    opened: usize,
}

impl<'a, S: CompilationService> SessionRotation<'a, S> {
    pub fn new(service: &'a S, options: &'a CompileOptions, bound: usize) -> Self {
        Self {
            service,
            options,
            bound: bound.max(1),
            current: None,
            opened: 0,
        }
    }

    /// Session for the next compile, counted as one use.
    ///
    /// Must only be called between compiles.
    pub fn acquire(&mut self) -> Result<&mut CompileSession<S::FileManager>> {
        let expired = self
            .current
            .as_ref()
            .map_or(true, |session| session.uses() >= self.bound);

        if expired {
            if let Some(old) = self.current.take() {
                old.close()?;
            }
            let fresh = CompileSession::open(self.service, self.options)?;
            self.opened += 1;
            let session = self.current.insert(fresh);
            session.uses += 1;
            return Ok(session);
        }

        let session = self
            .current
            .as_mut()
            .context("No live compile session")?;
        session.uses += 1;
        Ok(session)
    }

    /// Total sessions created so far
    pub fn opened(&self) -> usize {
        self.opened
    }

    /// Close the live session, if any
    pub fn finish(mut self) -> Result<()> {
        match self.current.take() {
            Some(session) => session.close(),
            None => Ok(()),
        }
    }
}
