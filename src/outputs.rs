//! Destination directory layout.
//!
//! Every run writes into one root directory holding the received package
//! files plus four fixed subdirectories. [`Outputs`] is passed explicitly to
//! every component that needs one of these paths.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

pub const SCIELO_PACKAGE_DIR: &str = "scielo_package";
pub const SCIELO_PACKAGE_ZIPS_DIR: &str = "scielo_package_zips";
pub const PMC_PACKAGE_DIR: &str = "pmc_package";
pub const REPORTS_DIR: &str = "errors";

/// Subdirectory of the reports directory reserved for package-level
/// output. Per-article reports are always plain files directly inside the
/// reports directory, so nothing derived from an article prefix lands here.
pub const PACKAGE_REPORTS_DIR: &str = "package";

const PACKAGE_REPORT_NAME: &str = "xml_package.rep.html";

/// Root path plus the derived output subdirectories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outputs {
    root: PathBuf,
    scielo_package: PathBuf,
    scielo_package_zips: PathBuf,
    pmc_package: PathBuf,
    reports: PathBuf,
}

impl Outputs {
    /// Compute the layout under `root` without touching the filesystem.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            scielo_package: root.join(SCIELO_PACKAGE_DIR),
            scielo_package_zips: root.join(SCIELO_PACKAGE_ZIPS_DIR),
            pmc_package: root.join(PMC_PACKAGE_DIR),
            reports: root.join(REPORTS_DIR),
            root,
        }
    }

    /// Compute the layout under `root` and create any missing directory.
    ///
    /// Calling this repeatedly on the same root is harmless.
    pub fn ensure(root: impl Into<PathBuf>) -> Result<Self> {
        let outputs = Self::at(root);
        for dir in outputs.directories() {
            if !dir.is_dir() {
                debug!(path = %dir.display(), "creating output directory");
            }
            fs::create_dir_all(&dir)?;
        }
        Ok(outputs)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scielo_package_path(&self) -> &Path {
        &self.scielo_package
    }

    pub fn scielo_package_zips_path(&self) -> &Path {
        &self.scielo_package_zips
    }

    pub fn pmc_package_path(&self) -> &Path {
        &self.pmc_package
    }

    /// Directory that receives every per-article report.
    pub fn reports_path(&self) -> &Path {
        &self.reports
    }

    /// Directory holding the package-level report.
    pub fn package_reports_path(&self) -> PathBuf {
        self.reports.join(PACKAGE_REPORTS_DIR)
    }

    /// Report written by the package-level pass.
    pub fn package_report_path(&self) -> PathBuf {
        self.package_reports_path().join(PACKAGE_REPORT_NAME)
    }

    fn directories(&self) -> [PathBuf; 5] {
        [
            self.scielo_package.clone(),
            self.scielo_package_zips.clone(),
            self.pmc_package.clone(),
            self.reports.clone(),
            self.package_reports_path(),
        ]
    }
}
