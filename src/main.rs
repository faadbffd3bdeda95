mod batch;
mod cli;
mod compiler;
mod config;
mod diagnostic;
mod errors;
mod javac;
mod platform;
mod progress;
mod report;
mod session;
#[cfg(test)]
mod testing;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use cli::Args;
use compiler::CompileOptions;
use config::Config;
use errors::ErrorAggregator;
use javac::Javac;
use progress::ProgressReporter;

/// How a run that got past validation ended
enum Outcome {
    /// Every file compiled and the report was written
    Complete,
    /// The run aborted on an I/O error; the errors gathered so far were written
    Partial,
}

fn main() {
    match run() {
        Ok(Outcome::Complete) => {}
        Ok(Outcome::Partial) => std::process::exit(3),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<Outcome> {
    let args = Args::parse();

    // Load or create config
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&args.config)?;

    // Apply CLI overrides to config
    if let Some(ref javac) = args.javac {
        config.javac = javac.clone();
    }
    if let Some(session_uses) = args.session_uses {
        config.session_uses = session_uses;
    }
    if !args.include.is_empty() {
        config.include = args.include.clone();
    }
    if args.partial_report {
        config.partial_report = true;
    }
    config.validate()?;

    // Helper for logging
    let log = |msg: &str| {
        if !args.quiet {
            println!("{}", msg);
        }
    };

    // Check for missing config options and warn user
    if config_path.exists() {
        let missing = config::check_missing_options(&config_path);
        if !missing.is_empty() && !args.quiet {
            eprintln!(
                "Warning: Your config is missing new options: {}",
                missing.join(", ")
            );
            eprintln!(
                "  Consider regenerating with: rm {:?} && find-compile-errors",
                config_path
            );
            eprintln!();
        }
    }

    let javac = Javac::locate(&config.expanded_javac())?;
    check_inputs(&args, &config)?;

    if args.output_file.exists() {
        eprintln!("Deleting existing output: {}", args.output_file.display());
        std::fs::remove_file(&args.output_file).with_context(|| {
            format!(
                "Failed to delete existing output: {}",
                args.output_file.display()
            )
        })?;
    }

    let spinner = if !args.quiet {
        Some(progress::spinner("Discovering source files..."))
    } else {
        None
    };
    let files = discover_targets(&args.target_sources, &config.include)?;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    log(&format!(
        "Compiling {} file(s) with {}",
        files.len(),
        javac.program().display()
    ));

    let options = CompileOptions {
        classpath: args.classpath.clone(),
        output_dir: config.expanded_output_dir(),
        source_root: args.source_root.clone(),
        encoding: config.encoding.clone(),
        extra_options: config.extra_options.clone(),
    };
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            options.output_dir.display()
        )
    })?;

    let mut errors = ErrorAggregator::new();
    let mut progress = ProgressReporter::new(files.len(), args.quiet);
    let result = batch::compile_all(
        &javac,
        &files,
        &options,
        config.session_uses,
        &mut errors,
        &mut progress,
    );
    progress.finish();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) if config.partial_report => {
            eprintln!("Error: {:#}", e);
            report::write_report(&args.output_file, &errors)?;
            eprintln!(
                "Wrote partial report with {} error(s) to {}",
                errors.total(),
                args.output_file.display()
            );
            return Ok(Outcome::Partial);
        }
        Err(e) => return Err(e),
    };

    report::write_report(&args.output_file, &errors)?;

    log("");
    if errors.is_empty() {
        log("No compile errors found.");
    }
    log(&format!(
        "Done! Compiled {} file(s) in {} session(s), {} failed.",
        summary.compiled, summary.sessions, summary.failed
    ));
    log(&format!(
        "Found {} unique error(s) in {} file(s).",
        errors.total(),
        errors.files()
    ));
    log(&format!("Report written to: {}", args.output_file.display()));

    Ok(Outcome::Complete)
}

/// Every classpath entry, the source root and the target sources must exist
fn check_inputs(args: &Args, config: &Config) -> Result<()> {
    let entries = platform::split_classpath(&args.classpath, &config.classpath_separator);
    let missing = platform::missing_entries(&entries);
    if !missing.is_empty() {
        let lines: Vec<String> = missing
            .iter()
            .map(|entry| format!("Missing file in classpath: {}", entry.display()))
            .collect();
        bail!("{}", lines.join("\n"));
    }

    for path in [&args.source_root, &args.target_sources] {
        if !path.exists() {
            bail!("Missing file: {}", path.display());
        }
    }

    Ok(())
}

/// Every regular file under `root`, in a stable order, optionally filtered by
/// file name patterns
fn discover_targets(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let wanted = matches_any_pattern(&entry.file_name().to_string_lossy(), patterns);
        if wanted {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn matches_any_pattern(item: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    for pattern in patterns {
        if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
            if glob_pattern.matches(item) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discovers_every_regular_file_in_stable_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("b/inner")).unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("b/inner/Z.java"), "").unwrap();
        std::fs::write(dir.path().join("a/Y.java"), "").unwrap();
        std::fs::write(dir.path().join("a/notes.txt"), "").unwrap();

        let files = discover_targets(dir.path(), &[]).unwrap();
        let names: Vec<PathBuf> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a/Y.java"),
                PathBuf::from("a/notes.txt"),
                PathBuf::from("b/inner/Z.java"),
            ]
        );
    }

    #[test]
    fn include_patterns_filter_by_file_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.java"), "").unwrap();
        std::fs::write(dir.path().join("A.class"), "").unwrap();

        let files = discover_targets(dir.path(), &["*.java".to_string()]).unwrap();
        assert_eq!(files, vec![dir.path().join("A.java")]);
    }

    #[test]
    fn empty_directory_has_no_targets() {
        let dir = TempDir::new().unwrap();
        assert!(discover_targets(dir.path(), &[]).unwrap().is_empty());
    }

    #[test]
    fn single_file_target_is_itself() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Only.java");
        std::fs::write(&file, "").unwrap();
        assert_eq!(discover_targets(&file, &[]).unwrap(), vec![file]);
    }
}
