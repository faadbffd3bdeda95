use clap::Parser;
use std::path::PathBuf;

/// Compile every file under a source tree one at a time and collect all compile errors as JSON
#[derive(Parser, Debug)]
#[command(name = "find-compile-errors")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Classpath entries joined by the platform separator (every entry must exist)
    pub classpath: String,

    /// Source root used by the compiler to resolve referenced sources
    pub source_root: PathBuf,

    /// File or directory walked recursively for the files to compile
    pub target_sources: PathBuf,

    /// Destination of the JSON report (replaced if it exists)
    pub output_file: PathBuf,

    /// Compiler command or path (overrides config)
    #[arg(long)]
    pub javac: Option<String>,

    /// Compiles per session before the compiler state is recreated (overrides config)
    #[arg(long)]
    pub session_uses: Option<usize>,

    /// File name pattern(s) to compile (repeatable, supports wildcards)
    #[arg(short, long, action = clap::ArgAction::Append)]
    pub include: Vec<String>,

    /// Write the errors gathered so far if the run aborts on an I/O error
    #[arg(long)]
    pub partial_report: bool,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
