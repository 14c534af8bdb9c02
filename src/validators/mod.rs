//! Collaborators invoked by reception and the orchestrator.
//!
//! Each check is a trait so the orchestrator only depends on the call
//! contract: write findings to the given report path(s), return `Err` only
//! when the report itself cannot be produced. The submodules hold the
//! implementations used by default; other checkers plug in through the
//! same traits.

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use crate::error::Result;
use crate::orchestrator::ArticleItem;
use crate::outputs::Outputs;
use crate::package::Package;
use crate::report_files::ReportFiles;

pub mod article_data;
pub mod assets;
pub mod contents;
pub mod normalizer;
pub mod package_data;
pub mod report;
pub mod structure;
pub mod style;
pub mod visual;

pub use article_data::{ArticleData, QuickXmlArticleLoader};
pub use assets::AssetReferenceValidator;
pub use contents::ArticleContentsValidator;
pub use normalizer::LineEndingNormalizer;
pub use package_data::PackageConsistencyValidator;
pub use report::{Finding, Severity};
pub use structure::WellFormednessValidator;
pub use style::JatsStyleValidator;
pub use visual::HtmlPreviewValidator;

/// Rewrites a received XML document in place before it is grouped and checked.
#[cfg_attr(test, automock)]
pub trait XmlNormalizer {
    fn normalize(&self, xml_path: &Path) -> Result<()>;
}

/// Produces the metadata snapshot shared by the asset and data checks.
#[cfg_attr(test, automock)]
pub trait ArticleDataLoader {
    fn load(&self, xml_path: &Path) -> Result<ArticleData>;
}

/// Structural (DTD-level) check of one document.
#[cfg_attr(test, automock)]
pub trait StructureValidator {
    fn validate(&self, xml_path: &Path, report_path: &Path) -> Result<()>;
}

/// Cross-check of the document's asset references against the package.
#[cfg_attr(test, automock)]
pub trait AssetsValidator {
    fn validate(
        &self,
        data: &ArticleData,
        xml_path: &Path,
        asset_paths: &[PathBuf],
        report_path: &Path,
    ) -> Result<()>;
}

/// Markup style rules.
#[cfg_attr(test, automock)]
pub trait StyleValidator {
    fn validate(&self, xml_path: &Path, report_path: &Path) -> Result<()>;
}

/// Rendered preview of the article.
#[cfg_attr(test, automock)]
pub trait VisualValidator {
    fn validate(&self, xml_path: &Path, asset_paths: &[PathBuf], report_path: &Path)
    -> Result<()>;
}

/// Article-level data checks, given the full article item and its report bundle.
#[cfg_attr(test, automock)]
pub trait ArticleDataValidator {
    fn validate(&self, item: &ArticleItem, reports: &ReportFiles) -> Result<()>;
}

/// Checks that need every article at once.
#[cfg_attr(test, automock)]
pub trait PackageDataValidator {
    fn validate(&self, package: &Package, articles: &[ArticleItem], outputs: &Outputs)
    -> Result<()>;
}

/// File name of `path` as a `String`, or an empty string.
pub(crate) fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
