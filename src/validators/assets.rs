use std::path::{Path, PathBuf};

use super::report::{Finding, write_text_report};
use super::{ArticleData, AssetsValidator, file_name_string};
use crate::error::Result;
use crate::package::file_stem_and_extension;

/// Compares the document's asset references with the files delivered for it.
///
/// A reference matches an asset when it equals the asset's file name or
/// its stem, since JATS graphics are often referenced without extension.
#[derive(Debug, Default, Clone)]
pub struct AssetReferenceValidator;

impl AssetReferenceValidator {
    pub fn check(data: &ArticleData, asset_paths: &[PathBuf]) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(error) = &data.parse_error {
            findings.push(Finding::warning(format!(
                "asset references may be incomplete, the document could not be fully read: {error}"
            )));
        }

        for reference in &data.asset_references {
            if !asset_paths.iter().any(|asset| matches_reference(asset, reference)) {
                findings.push(Finding::error(format!(
                    "referenced file is missing from the package: {reference}"
                )));
            }
        }

        for asset in asset_paths {
            if !data
                .asset_references
                .iter()
                .any(|reference| matches_reference(asset, reference))
            {
                findings.push(Finding::warning(format!(
                    "package file is not referenced by the document: {}",
                    file_name_string(asset)
                )));
            }
        }
        findings
    }
}

/// Whether `reference` names `asset`, by file name or by stem.
pub fn matches_reference(asset: &Path, reference: &str) -> bool {
    let reference = reference.rsplit('/').next().unwrap_or(reference);
    if file_name_string(asset) == reference {
        return true;
    }
    let (stem, _) = file_stem_and_extension(asset);
    stem == reference
}

impl AssetsValidator for AssetReferenceValidator {
    fn validate(
        &self,
        data: &ArticleData,
        xml_path: &Path,
        asset_paths: &[PathBuf],
        report_path: &Path,
    ) -> Result<()> {
        let findings = Self::check(data, asset_paths);
        write_text_report(
            report_path,
            &format!("Asset report: {}", xml_path.display()),
            &findings,
        )
    }
}
