use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show invalid-file counts and fatal errors
    Quiet,
    /// Show the run summary
    #[default]
    Normal,
    /// List every article with its final stage
    Verbose,
    /// Add report paths and timings
    Debug,
}

impl VerbosityLevel {
    /// Quiet wins over debug, debug over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, debug: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if debug {
            VerbosityLevel::Debug
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default `tracing` filter directive for this level.
    pub fn log_filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// Output format for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Human,
    /// Machine-readable JSON
    Json,
    /// Single summary line
    Summary,
}

/// Quality checks for XML article packages
#[derive(Parser, Debug, Clone)]
#[command(name = "xml-pkg-qa")]
#[command(
    about = "Receive an XML article package (archive, directory or file list) and write per-article and package reports"
)]
#[command(version)]
pub struct Cli {
    /// Package to receive: one archive, one directory, or several files
    #[arg(required = true, help = "Archive, directory, or list of package files")]
    pub sources: Vec<PathBuf>,

    /// Destination directory for the received package and its reports
    #[arg(short = 'd', long = "destination")]
    pub destination: PathBuf,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Debug output and logging
    #[arg(long = "debug", conflicts_with = "quiet")]
    pub debug: bool,

    /// Keep reports from previous runs instead of removing them first
    #[arg(long = "no-clean")]
    pub no_clean: bool,

    /// Directory for control files (defaults to the reports directory)
    #[arg(long = "work-dir")]
    pub work_dir: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.quiet, self.verbose, self.debug)
    }

    pub fn validate(&self) -> Result<(), String> {
        for source in &self.sources {
            if !source.exists() {
                return Err(format!("Path does not exist: {}", source.display()));
            }
        }
        if self.destination.is_file() {
            return Err(format!(
                "Destination is a file, not a directory: {}",
                self.destination.display()
            ));
        }
        Ok(())
    }
}
