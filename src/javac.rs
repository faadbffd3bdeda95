use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tempfile::TempDir;
use url::Url;

use crate::compiler::{CompilationService, CompilationUnit, CompileOptions, FileManager};
use crate::diagnostic::{file_uri, Diagnostic, DiagnosticCollector, Kind};

/// `path/to/File.java:12: error: message`
static POSITIONED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?):(\d+): (error|warning|note): (.*)$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// `error: message` without a source position
static SOURCELESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(error|warning|note): (.*)$").unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// `3 errors`, `1 warning`, `100 errors only showing the first 100 errors...`
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+ (errors?|warnings?)\b").unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Caret line pointing at the column of the echoed source line
static CARET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\^\s*$").unwrap_or_else(|_| panic!("Invalid Regex")));

/// JVM options for the compiler launcher: English diagnostic kinds and UTF-8 stderr
/// (`stderr.encoding` is the JDK 19+ name of `sun.stderr.encoding`)
const LAUNCHER_ARGS: &[&str] = &[
    "-J-Duser.language=en",
    "-J-Dsun.stderr.encoding=UTF-8",
    "-J-Dstderr.encoding=UTF-8",
];

/// Keep package-qualified class names in messages ("class a.Block", not "class Block")
const FORMATTER_ARGS: &[&str] = &["-XDdiags.formatterOptions=-simpleNames"];

/// Interface to the JDK compiler (javac)
pub struct Javac {
    program: PathBuf,
}

impl Javac {
    /// Locate the compiler command on PATH (or check an explicit path)
    pub fn locate(command: &Path) -> Result<Self> {
        let program = which::which(command)
            .map_err(|_| anyhow!("Unable to find java compiler: {}", command.display()))?;
        Ok(Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Session state for javac: a scratch directory holding the argument file with
/// the run's fixed options, plus the source files resolved so far.
pub struct JavacFileManager {
    scratch: TempDir,
    argfile: PathBuf,
    base: PathBuf,
    units: HashMap<PathBuf, CompilationUnit>,
}

impl JavacFileManager {
    fn new(options: &CompileOptions) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("find-compile-errors")
            .tempdir()
            .context("Failed to create compiler scratch directory")?;
        let argfile = scratch.path().join("options");
        let mut args = options.to_args();
        args.extend(FORMATTER_ARGS.iter().map(|arg| arg.to_string()));
        fs::write(&argfile, argfile_content(&args))
            .with_context(|| format!("Failed to write {}", argfile.display()))?;
        let base = std::env::current_dir().context("Failed to get current directory")?;

        Ok(Self {
            scratch,
            argfile,
            base,
            units: HashMap::new(),
        })
    }
}

impl FileManager for JavacFileManager {
    fn compilation_unit(&mut self, path: &Path) -> Result<CompilationUnit> {
        if let Some(unit) = self.units.get(path) {
            return Ok(unit.clone());
        }

        let canonical = fs::canonicalize(path)
            .with_context(|| format!("Failed to open source file: {}", path.display()))?;
        let uri = Url::from_file_path(&canonical)
            .map_err(|_| anyhow!("Invalid source file path: {}", canonical.display()))?;
        let unit = CompilationUnit {
            path: canonical,
            uri,
        };
        self.units.insert(path.to_path_buf(), unit.clone());
        Ok(unit)
    }

    fn close(self) -> Result<()> {
        self.scratch
            .close()
            .context("Failed to remove compiler scratch directory")
    }
}

impl CompilationService for Javac {
    type FileManager = JavacFileManager;

    fn file_manager(&self, options: &CompileOptions) -> Result<JavacFileManager> {
        JavacFileManager::new(options)
    }

    fn compile(
        &self,
        file_manager: &mut JavacFileManager,
        _options: &CompileOptions,
        unit: &CompilationUnit,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<bool> {
        // -J options are not allowed in argument files
        let output = Command::new(&self.program)
            .args(LAUNCHER_ARGS)
            .arg(format!("@{}", file_manager.argfile.display()))
            .arg(&unit.path)
            .output()
            .with_context(|| {
                format!(
                    "Failed to execute {} for {}",
                    self.program.display(),
                    unit.path.display()
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for diagnostic in parse_diagnostics(&stderr, &file_manager.base) {
            diagnostics.report(diagnostic);
        }

        Ok(output.status.success())
    }
}

/// One option per line, quoted for javac's argument file syntax
fn argfile_content(args: &[String]) -> String {
    let mut content = String::new();
    for arg in args {
        content.push('"');
        for c in arg.chars() {
            match c {
                '"' => content.push_str("\\\""),
                '\\' => content.push_str("\\\\"),
                _ => content.push(c),
            }
        }
        content.push_str("\"\n");
    }
    content
}

struct Pending {
    kind: Kind,
    source: Option<Url>,
    lines: Vec<String>,
}

impl Pending {
    fn finish(self) -> Diagnostic {
        Diagnostic::new(self.kind, self.source, self.lines.join("\n"))
    }
}

/// Parse javac's human-readable diagnostic output.
///
/// Relative paths in diagnostic headers are resolved against `base`.
pub fn parse_diagnostics(output: &str, base: &Path) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut pending: Option<Pending> = None;

    for line in output.lines() {
        if let Some(caps) = POSITIONED_RE.captures(line) {
            diagnostics.extend(pending.take().map(Pending::finish));
            pending = Some(Pending {
                kind: Kind::from_label(&caps[3]),
                source: file_uri(Path::new(&caps[1]), base),
                lines: vec![caps[4].to_string()],
            });
        } else if let Some(caps) = SOURCELESS_RE.captures(line) {
            diagnostics.extend(pending.take().map(Pending::finish));
            pending = Some(Pending {
                kind: Kind::from_label(&caps[1]),
                source: None,
                lines: vec![caps[2].to_string()],
            });
        } else if SUMMARY_RE.is_match(line) || line.starts_with("Note: ") {
            diagnostics.extend(pending.take().map(Pending::finish));
        } else if let Some(current) = pending.as_mut() {
            if CARET_RE.is_match(line) {
                // drop the echoed source line the caret points into
                if current.lines.len() > 1 {
                    current.lines.pop();
                }
            } else {
                current.lines.push(line.to_string());
            }
        }
    }
    diagnostics.extend(pending.take().map(Pending::finish));

    diagnostics
}
