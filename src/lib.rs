//! # xml-pkg-qa Library
//!
//! Quality checks for XML article packages: receive a delivery (archive,
//! directory or file list), group its files into articles by file-name
//! prefix, and write per-article and package-level reports.

pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod outputs;
pub mod package;
pub mod reception;
pub mod report_files;
pub mod validators;

pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use error::{PackageError, Result};
pub use orchestrator::{
    ArticleItem, ArticleStage, ArticleSummary, PackageQa, QaSettings, QaSummary, Validators,
    XmlPackageQa,
};
pub use output::Output;
pub use outputs::Outputs;
pub use package::{ArticleEntry, Package, PackageBuilder};
pub use reception::{InputSource, PackageReception};
pub use report_files::ReportFiles;
