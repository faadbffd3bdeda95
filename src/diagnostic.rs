use std::path::Path;
use url::Url;

/// Severity of a compiler diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Error,
    Warning,
    Note,
}

impl Kind {
    /// Map the kind word printed by the compiler ("error", "warning", ...)
    pub fn from_label(label: &str) -> Self {
        match label {
            "error" => Kind::Error,
            "warning" => Kind::Warning,
            _ => Kind::Note,
        }
    }
}

/// One message emitted by a single compile invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: Kind,
    /// URI of the file the diagnostic points at, if it has one
    pub source: Option<Url>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: Kind, source: Option<Url>, message: impl Into<String>) -> Self {
        Self {
            kind,
            source,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == Kind::Error
    }

    /// Base name of the emitting source file ("Foo.java", not the full path)
    pub fn file_name(&self) -> Option<String> {
        let source = self.source.as_ref()?;
        if let Ok(path) = source.to_file_path() {
            if let Some(name) = path.file_name() {
                return Some(name.to_string_lossy().into_owned());
            }
        }
        source
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_string())
    }
}

/// Build a `file://` URI for a path, resolving relative paths against `base`
pub fn file_uri(path: &Path, base: &Path) -> Option<Url> {
    if path.is_absolute() {
        Url::from_file_path(path).ok()
    } else {
        Url::from_file_path(base.join(path)).ok()
    }
}

/// Sink for the diagnostics of one compile invocation
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }
}
