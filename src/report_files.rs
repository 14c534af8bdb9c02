//! Deterministic report paths for one article.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{PackageError, Result};

/// Every report and artifact path produced while validating one article.
///
/// Paths are a pure function of the prefix and the reports directory (plus
/// the work directory for the control file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFiles {
    pub prefix: String,
    pub reports_dir: PathBuf,
    pub work_dir: PathBuf,
    pub ctrl_file: PathBuf,
    pub style_report: PathBuf,
    pub dtd_report: PathBuf,
    pub pmc_dtd_report: PathBuf,
    pub pmc_style_report: PathBuf,
    pub err_report: PathBuf,
    pub err_report_html: PathBuf,
    pub html_report: PathBuf,
    pub mkp2xml_report: PathBuf,
    pub mkp2xml_report_html: PathBuf,
    pub data_report: PathBuf,
    pub images_report: PathBuf,
    pub xml_structure_validations: PathBuf,
    pub xml_content_validations: PathBuf,
    pub journal_validations: PathBuf,
    pub issue_validations: PathBuf,
}

impl ReportFiles {
    /// Build the bundle for `prefix`, creating `reports_dir` if missing.
    pub fn new(prefix: &str, reports_dir: &Path) -> Result<Self> {
        Self::with_work_dir(prefix, reports_dir, reports_dir)
    }

    /// Like [`ReportFiles::new`] but places the control file in `work_dir`.
    pub fn with_work_dir(prefix: &str, reports_dir: &Path, work_dir: &Path) -> Result<Self> {
        for dir in [reports_dir, work_dir] {
            fs::create_dir_all(dir).map_err(|e| PackageError::report(dir, e))?;
        }
        Ok(Self::compute(prefix, reports_dir, work_dir))
    }

    /// Path computation only.
    pub fn compute(prefix: &str, reports_dir: &Path, work_dir: &Path) -> Self {
        let suffixed = |suffix: &str| reports_dir.join(format!("{prefix}{suffix}"));
        let prefixed = |label: &str| reports_dir.join(format!("{label}-{prefix}"));

        Self {
            prefix: prefix.to_string(),
            reports_dir: reports_dir.to_path_buf(),
            work_dir: work_dir.to_path_buf(),
            ctrl_file: work_dir.join(format!("{prefix}.ctrl.txt")),
            style_report: suffixed(".rep.html"),
            dtd_report: suffixed(".dtd.txt"),
            pmc_dtd_report: suffixed(".pmc.dtd.txt"),
            pmc_style_report: suffixed(".pmc.rep.html"),
            err_report: suffixed(".err.txt"),
            err_report_html: suffixed(".err.html"),
            html_report: suffixed(".html"),
            mkp2xml_report: suffixed(".mkp2xml.txt"),
            mkp2xml_report_html: suffixed(".mkp2xml.html"),
            data_report: suffixed(".contents.html"),
            images_report: suffixed(".images.html"),
            xml_structure_validations: prefixed("xmlstr"),
            xml_content_validations: prefixed("xmlcon"),
            journal_validations: prefixed("journal"),
            issue_validations: prefixed("issue"),
        }
    }

    /// Paths removed by [`ReportFiles::clean`].
    pub fn cleanable_paths(&self) -> [&Path; 6] {
        [
            self.err_report.as_path(),
            self.dtd_report.as_path(),
            self.style_report.as_path(),
            self.pmc_dtd_report.as_path(),
            self.pmc_style_report.as_path(),
            self.ctrl_file.as_path(),
        ]
    }

    pub fn all_paths(&self) -> Vec<&Path> {
        vec![
            self.ctrl_file.as_path(),
            self.style_report.as_path(),
            self.dtd_report.as_path(),
            self.pmc_dtd_report.as_path(),
            self.pmc_style_report.as_path(),
            self.err_report.as_path(),
            self.err_report_html.as_path(),
            self.html_report.as_path(),
            self.mkp2xml_report.as_path(),
            self.mkp2xml_report_html.as_path(),
            self.data_report.as_path(),
            self.images_report.as_path(),
            self.xml_structure_validations.as_path(),
            self.xml_content_validations.as_path(),
            self.journal_validations.as_path(),
            self.issue_validations.as_path(),
        ]
    }

    /// Remove the error, structure, style, pmc and control reports.
    ///
    /// Absent paths are skipped; any other failure is returned.
    pub fn clean(&self) -> Result<()> {
        for path in self.cleanable_paths() {
            remove_file_or_dir(path)?;
        }
        Ok(())
    }
}

fn remove_file_or_dir(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(PackageError::report(path, e)),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match removed {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale report");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PackageError::report(path, e)),
    }
}
