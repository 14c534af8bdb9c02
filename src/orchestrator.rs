//! Validation orchestration.
//!
//! [`PackageQa`] drives every article of an assembled [`Package`] through
//! the fixed sequence of checks, then runs the package-level pass once.
//! [`XmlPackageQa`] wires reception and validation together for one
//! destination directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::outputs::Outputs;
use crate::package::{ArticleEntry, Package};
use crate::reception::{InputSource, PackageReception};
use crate::report_files::ReportFiles;
use crate::validators::{
    ArticleContentsValidator, ArticleData, ArticleDataLoader, ArticleDataValidator,
    AssetReferenceValidator, AssetsValidator, HtmlPreviewValidator, JatsStyleValidator,
    PackageConsistencyValidator, PackageDataValidator, QuickXmlArticleLoader,
    StructureValidator, StyleValidator, VisualValidator, WellFormednessValidator,
};

/// How far an article has progressed through the per-article checks.
///
/// Stages are reached in declaration order; findings never stop an article
/// short of [`ArticleStage::DataChecked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArticleStage {
    Received,
    StructureChecked,
    AssetsChecked,
    StyleChecked,
    VisuallyChecked,
    DataChecked,
}

impl ArticleStage {
    pub fn next(self) -> Option<Self> {
        match self {
            ArticleStage::Received => Some(ArticleStage::StructureChecked),
            ArticleStage::StructureChecked => Some(ArticleStage::AssetsChecked),
            ArticleStage::AssetsChecked => Some(ArticleStage::StyleChecked),
            ArticleStage::StyleChecked => Some(ArticleStage::VisuallyChecked),
            ArticleStage::VisuallyChecked => Some(ArticleStage::DataChecked),
            ArticleStage::DataChecked => None,
        }
    }

    pub fn is_complete(self) -> bool {
        self == ArticleStage::DataChecked
    }
}

impl fmt::Display for ArticleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArticleStage::Received => "received",
            ArticleStage::StructureChecked => "structure checked",
            ArticleStage::AssetsChecked => "assets checked",
            ArticleStage::StyleChecked => "style checked",
            ArticleStage::VisuallyChecked => "visually checked",
            ArticleStage::DataChecked => "data checked",
        };
        f.write_str(label)
    }
}

/// One article under validation. Never shared between articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleItem {
    pub entry: ArticleEntry,
    pub data: ArticleData,
    pub reports: ReportFiles,
    pub stage: ArticleStage,
}

/// The collaborators invoked for every article and for the package.
pub struct Validators {
    pub loader: Box<dyn ArticleDataLoader>,
    pub structure: Box<dyn StructureValidator>,
    pub assets: Box<dyn AssetsValidator>,
    pub style: Box<dyn StyleValidator>,
    pub visual: Box<dyn VisualValidator>,
    pub article_data: Box<dyn ArticleDataValidator>,
    pub package_data: Box<dyn PackageDataValidator>,
}

impl Default for Validators {
    fn default() -> Self {
        Self {
            loader: Box::new(QuickXmlArticleLoader),
            structure: Box::new(WellFormednessValidator),
            assets: Box::new(AssetReferenceValidator),
            style: Box::new(JatsStyleValidator),
            visual: Box::new(HtmlPreviewValidator),
            article_data: Box::new(ArticleContentsValidator),
            package_data: Box::new(PackageConsistencyValidator),
        }
    }
}

impl Validators {
    pub fn with_loader(mut self, loader: impl ArticleDataLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_structure(mut self, validator: impl StructureValidator + 'static) -> Self {
        self.structure = Box::new(validator);
        self
    }

    pub fn with_assets(mut self, validator: impl AssetsValidator + 'static) -> Self {
        self.assets = Box::new(validator);
        self
    }

    pub fn with_style(mut self, validator: impl StyleValidator + 'static) -> Self {
        self.style = Box::new(validator);
        self
    }

    pub fn with_visual(mut self, validator: impl VisualValidator + 'static) -> Self {
        self.visual = Box::new(validator);
        self
    }

    pub fn with_article_data(mut self, validator: impl ArticleDataValidator + 'static) -> Self {
        self.article_data = Box::new(validator);
        self
    }

    pub fn with_package_data(mut self, validator: impl PackageDataValidator + 'static) -> Self {
        self.package_data = Box::new(validator);
        self
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validators").finish_non_exhaustive()
    }
}

/// Run-level switches taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaSettings {
    /// Remove an article's previous reports before validating it.
    pub clean_reports: bool,
    /// Directory for control files; the reports directory when unset.
    pub work_dir: Option<PathBuf>,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            clean_reports: true,
            work_dir: None,
        }
    }
}

impl QaSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            clean_reports: config.reports.clean_before_validation,
            work_dir: config.reports.work_dir.clone(),
        }
    }
}

/// Outcome for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub prefix: String,
    pub xml_path: PathBuf,
    pub asset_count: usize,
    pub stage: ArticleStage,
    pub reports: ReportFiles,
}

impl From<&ArticleItem> for ArticleSummary {
    fn from(item: &ArticleItem) -> Self {
        Self {
            prefix: item.entry.prefix.clone(),
            xml_path: item.entry.xml_path.clone(),
            asset_count: item.entry.asset_paths.len(),
            stage: item.stage,
            reports: item.reports.clone(),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaSummary {
    pub destination: PathBuf,
    pub reports_path: PathBuf,
    pub package_report: PathBuf,
    pub articles: Vec<ArticleSummary>,
    pub invalid_files: Vec<PathBuf>,
    pub duration: Duration,
}

impl QaSummary {
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_files.len()
    }

    /// Whether every article reached the last stage.
    pub fn is_complete(&self) -> bool {
        self.articles.iter().all(|a| a.stage.is_complete())
    }
}

/// Per-article and package-level validation of an assembled package.
#[derive(Debug, Default)]
pub struct PackageQa {
    validators: Validators,
    settings: QaSettings,
}

impl PackageQa {
    pub fn new(validators: Validators, settings: QaSettings) -> Self {
        Self {
            validators,
            settings,
        }
    }

    /// Validate every article in ascending prefix order, then the package.
    ///
    /// Findings end up in report files. An `Err` from any collaborator
    /// aborts the run.
    pub fn validate_package(&self, package: &Package, outputs: &Outputs) -> Result<QaSummary> {
        let started = Instant::now();
        info!(
            articles = package.len(),
            invalid_files = package.invalid_files().len(),
            "validating package"
        );

        let mut articles = Vec::with_capacity(package.len());
        for entry in package.entries() {
            articles.push(self.validate_article(entry, outputs)?);
        }

        info!("running package-level checks");
        self.validators
            .package_data
            .validate(package, &articles, outputs)?;

        Ok(QaSummary {
            destination: outputs.root().to_path_buf(),
            reports_path: outputs.reports_path().to_path_buf(),
            package_report: outputs.package_report_path(),
            articles: articles.iter().map(ArticleSummary::from).collect(),
            invalid_files: package.invalid_files().to_vec(),
            duration: started.elapsed(),
        })
    }

    /// Run the five checks for one article.
    pub fn validate_article(&self, entry: &ArticleEntry, outputs: &Outputs) -> Result<ArticleItem> {
        info!(prefix = %entry.prefix, assets = entry.asset_paths.len(), "validating article");

        let reports = match &self.settings.work_dir {
            Some(work_dir) => {
                ReportFiles::with_work_dir(&entry.prefix, outputs.reports_path(), work_dir)?
            }
            None => ReportFiles::new(&entry.prefix, outputs.reports_path())?,
        };
        if self.settings.clean_reports {
            reports.clean()?;
        }

        let data = self.validators.loader.load(&entry.xml_path)?;
        let mut item = ArticleItem {
            entry: entry.clone(),
            data,
            reports,
            stage: ArticleStage::Received,
        };

        while let Some(next) = item.stage.next() {
            self.run_step(next, &item)?;
            item.stage = next;
            debug!(prefix = %item.entry.prefix, stage = %item.stage, "step complete");
        }
        Ok(item)
    }

    /// The check that moves an article into `stage`.
    fn run_step(&self, stage: ArticleStage, item: &ArticleItem) -> Result<()> {
        let entry = &item.entry;
        let reports = &item.reports;
        match stage {
            ArticleStage::Received => Ok(()),
            ArticleStage::StructureChecked => self
                .validators
                .structure
                .validate(&entry.xml_path, &reports.dtd_report),
            ArticleStage::AssetsChecked => self.validators.assets.validate(
                &item.data,
                &entry.xml_path,
                &entry.asset_paths,
                &reports.err_report,
            ),
            ArticleStage::StyleChecked => self
                .validators
                .style
                .validate(&entry.xml_path, &reports.style_report),
            ArticleStage::VisuallyChecked => self.validators.visual.validate(
                &entry.xml_path,
                &entry.asset_paths,
                &reports.html_report,
            ),
            ArticleStage::DataChecked => self.validators.article_data.validate(item, reports),
        }
    }
}

/// Reception followed by validation into one destination.
#[derive(Debug, Default)]
pub struct XmlPackageQa {
    reception: PackageReception,
    qa: PackageQa,
}

impl XmlPackageQa {
    pub fn new(reception: PackageReception, qa: PackageQa) -> Self {
        Self { reception, qa }
    }

    /// Default collaborators with the run settings from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PackageReception::default(),
            PackageQa::new(Validators::default(), QaSettings::from_config(config)),
        )
    }

    pub fn validate_source(&self, source: InputSource, destination: &Path) -> Result<QaSummary> {
        let outputs = Outputs::ensure(destination)?;
        let package = self.reception.receive(source, outputs.root())?;
        self.qa.validate_package(&package, &outputs)
    }

    pub fn validate_files(&self, files: Vec<PathBuf>, destination: &Path) -> Result<QaSummary> {
        self.validate_source(InputSource::FileList(files), destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackageError;
    use crate::validators::{
        MockArticleDataLoader, MockArticleDataValidator, MockAssetsValidator,
        MockPackageDataValidator, MockStructureValidator, MockStyleValidator,
        MockVisualValidator,
    };
    use mockall::Sequence;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    #[test]
    fn test_stage_progression() {
        let mut stages = vec![ArticleStage::Received];
        while let Some(next) = stages.last().and_then(|s| s.next()) {
            stages.push(next);
        }
        assert_eq!(stages.len(), 6);
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
        assert!(stages[5].is_complete());
        assert_eq!(ArticleStage::AssetsChecked.to_string(), "assets checked");
    }

    #[test]
    fn test_articles_and_steps_run_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = Outputs::ensure(temp_dir.path()).unwrap();
        let package = Package::assemble(["b.xml", "a.xml", "a-1.tif"]);

        let mut seq = Sequence::new();
        let mut loader = MockArticleDataLoader::new();
        let mut structure = MockStructureValidator::new();
        let mut assets = MockAssetsValidator::new();
        let mut style = MockStyleValidator::new();
        let mut visual = MockVisualValidator::new();
        let mut article_data = MockArticleDataValidator::new();
        let mut package_data = MockPackageDataValidator::new();

        for prefix in ["a", "b"] {
            let xml = format!("{prefix}.xml");
            loader
                .expect_load()
                .withf(move |path| path == Path::new(&xml))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|path| {
                    Ok(ArticleData {
                        xml_path: path.to_path_buf(),
                        ..Default::default()
                    })
                });
            let dtd = format!("{prefix}.dtd.txt");
            structure
                .expect_validate()
                .withf(move |_, report| report.ends_with(&dtd))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
            let asset_count = if prefix == "a" { 1 } else { 0 };
            assets
                .expect_validate()
                .withf(move |_, _, asset_paths, report| {
                    asset_paths.len() == asset_count && report.ends_with(format!("{prefix}.err.txt"))
                })
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _, _, _| Ok(()));
            style
                .expect_validate()
                .withf(move |_, report| report.ends_with(format!("{prefix}.rep.html")))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
            visual
                .expect_validate()
                .withf(move |_, _, report| report.ends_with(format!("{prefix}.html")))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _, _| Ok(()));
            article_data
                .expect_validate()
                .withf(move |item, _| {
                    item.entry.prefix == prefix && item.stage == ArticleStage::VisuallyChecked
                })
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        package_data
            .expect_validate()
            .withf(|_, articles, _| {
                articles.len() == 2 && articles.iter().all(|a| a.stage.is_complete())
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let validators = Validators::default()
            .with_loader(loader)
            .with_structure(structure)
            .with_assets(assets)
            .with_style(style)
            .with_visual(visual)
            .with_article_data(article_data)
            .with_package_data(package_data);
        let qa = PackageQa::new(validators, QaSettings::default());

        let summary = qa.validate_package(&package, &outputs).unwrap();

        let prefixes: Vec<&str> = summary.articles.iter().map(|a| a.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["a", "b"]);
        assert!(summary.is_complete());
    }

    #[test]
    fn test_collaborator_error_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = Outputs::ensure(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join("a.xml"), "<article/>").unwrap();
        let package = Package::assemble([temp_dir.path().join("a.xml")]);

        let mut structure = MockStructureValidator::new();
        structure
            .expect_validate()
            .returning(|_, _| Err(PackageError::Io(io::Error::other("disk full"))));
        let mut package_data = MockPackageDataValidator::new();
        package_data.expect_validate().times(0);

        let validators = Validators::default()
            .with_structure(structure)
            .with_package_data(package_data);
        let qa = PackageQa::new(validators, QaSettings::default());

        assert!(matches!(
            qa.validate_package(&package, &outputs),
            Err(PackageError::Io(_))
        ));
    }

    #[test]
    fn test_findings_do_not_stop_later_steps() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = Outputs::ensure(temp_dir.path()).unwrap();
        let xml = temp_dir.path().join("broken.xml");
        fs::write(&xml, "<article><front></article>").unwrap();
        let package = Package::assemble([xml, temp_dir.path().join("stray")]);

        let summary = PackageQa::default()
            .validate_package(&package, &outputs)
            .unwrap();

        let article = &summary.articles[0];
        assert_eq!(article.stage, ArticleStage::DataChecked);
        for report in [
            &article.reports.dtd_report,
            &article.reports.err_report,
            &article.reports.style_report,
            &article.reports.html_report,
            &article.reports.data_report,
            &article.reports.images_report,
        ] {
            assert!(report.is_file(), "missing {}", report.display());
        }
        assert!(summary.package_report.is_file());
        assert_eq!(summary.invalid_count(), 1);
    }

    #[test]
    fn test_package_report_does_not_replace_article_report() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = Outputs::ensure(temp_dir.path()).unwrap();
        let xml = temp_dir.path().join("xml_package.xml");
        fs::write(&xml, "<article/>").unwrap();
        let package = Package::assemble([xml]);

        let summary = PackageQa::default()
            .validate_package(&package, &outputs)
            .unwrap();

        let style_report = &summary.articles[0].reports.style_report;
        assert_ne!(style_report, &summary.package_report);
        assert!(summary.package_report.is_file());
        let style = fs::read_to_string(style_report).unwrap();
        assert!(!style.contains("Package report"));
    }

    #[test]
    fn test_clean_removes_stale_reports_unless_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = Outputs::ensure(temp_dir.path()).unwrap();
        let xml = temp_dir.path().join("a.xml");
        fs::write(&xml, "<article/>").unwrap();
        let package = Package::assemble([xml]);
        let ctrl = outputs.reports_path().join("a.ctrl.txt");

        fs::write(&ctrl, "stale").unwrap();
        let keep = QaSettings {
            clean_reports: false,
            work_dir: None,
        };
        PackageQa::new(Validators::default(), keep)
            .validate_package(&package, &outputs)
            .unwrap();
        assert!(ctrl.exists());

        PackageQa::default()
            .validate_package(&package, &outputs)
            .unwrap();
        assert!(!ctrl.exists());
    }

    #[test]
    fn test_work_dir_holds_control_file() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = Outputs::ensure(temp_dir.path().join("out")).unwrap();
        let xml = outputs.root().join("a.xml");
        fs::write(&xml, "<article/>").unwrap();
        let package = Package::assemble([xml]);
        let settings = QaSettings {
            clean_reports: true,
            work_dir: Some(temp_dir.path().join("wrk")),
        };

        let summary = PackageQa::new(Validators::default(), settings)
            .validate_package(&package, &outputs)
            .unwrap();

        assert_eq!(
            summary.articles[0].reports.ctrl_file,
            temp_dir.path().join("wrk").join("a.ctrl.txt")
        );
        assert!(temp_dir.path().join("wrk").is_dir());
    }

    #[test]
    fn test_validate_files_end_to_end() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let xml = source.path().join("a.xml");
        let asset = source.path().join("a-gf01.png");
        fs::write(&xml, "<article><body><graphic href=\"a-gf01\"/></body></article>").unwrap();
        fs::write(&asset, [0x89, 0x50]).unwrap();

        let summary = XmlPackageQa::default()
            .validate_files(vec![xml, asset], destination.path())
            .unwrap();

        assert_eq!(summary.article_count(), 1);
        assert_eq!(summary.articles[0].xml_path, destination.path().join("a.xml"));
        assert_eq!(summary.articles[0].asset_count, 1);
        assert!(destination.path().join("errors").join("a.err.txt").is_file());
        assert!(destination.path().join("pmc_package").is_dir());
    }
}
