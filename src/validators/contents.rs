use std::fs;

use super::report::{Finding, findings_html, table_html, write_html_report};
use super::{ArticleDataValidator, file_name_string};
use crate::error::Result;
use crate::orchestrator::ArticleItem;
use crate::report_files::ReportFiles;

/// Writes the article's contents report (metadata table plus data findings)
/// and its images report (one row per delivered asset).
#[derive(Debug, Default, Clone)]
pub struct ArticleContentsValidator;

impl ArticleContentsValidator {
    pub fn metadata_rows(item: &ArticleItem) -> Vec<Vec<String>> {
        let data = &item.data;
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        vec![
            vec!["Prefix".to_string(), item.entry.prefix.clone()],
            vec!["XML".to_string(), file_name_string(&item.entry.xml_path)],
            vec!["Article title".to_string(), field(&data.article_title)],
            vec!["DOI".to_string(), field(&data.doi)],
            vec!["Journal".to_string(), field(&data.journal_title)],
            vec!["Volume".to_string(), field(&data.volume)],
            vec!["Issue".to_string(), field(&data.issue)],
            vec!["Year".to_string(), field(&data.pub_year)],
            vec![
                "Assets".to_string(),
                item.entry.asset_paths.len().to_string(),
            ],
        ]
    }

    pub fn check(item: &ArticleItem) -> Vec<Finding> {
        let mut findings = Vec::new();
        if let Some(error) = &item.data.parse_error {
            findings.push(Finding::error(format!(
                "article data is incomplete, the document could not be fully read: {error}"
            )));
        }
        if let Some(doi) = &item.data.doi
            && !doi.contains(&item.entry.prefix)
            && item.entry.prefix.contains('.')
        {
            findings.push(Finding::info(format!(
                "file name {} does not appear in DOI {doi}",
                item.entry.prefix
            )));
        }
        for asset in &item.entry.asset_paths {
            if fs::metadata(asset).map(|m| m.len() == 0).unwrap_or(true) {
                findings.push(Finding::error(format!(
                    "asset is empty or unreadable: {}",
                    file_name_string(asset)
                )));
            }
        }
        findings
    }

    fn image_rows(item: &ArticleItem) -> Vec<Vec<String>> {
        item.entry
            .asset_paths
            .iter()
            .map(|asset| {
                let size = fs::metadata(asset)
                    .map(|m| format!("{} bytes", m.len()))
                    .unwrap_or_else(|_| "unreadable".to_string());
                let referenced = item
                    .data
                    .asset_references
                    .iter()
                    .any(|r| super::assets::matches_reference(asset, r));
                vec![
                    file_name_string(asset),
                    size,
                    if referenced { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect()
    }
}

impl ArticleDataValidator for ArticleContentsValidator {
    fn validate(&self, item: &ArticleItem, reports: &ReportFiles) -> Result<()> {
        let contents = format!(
            "{}\n<h2>Findings</h2>\n{}",
            table_html(&["Field", "Value"], &Self::metadata_rows(item)),
            findings_html(&Self::check(item))
        );
        write_html_report(
            &reports.data_report,
            &format!("Contents: {}", item.entry.prefix),
            &contents,
        )?;

        write_html_report(
            &reports.images_report,
            &format!("Images: {}", item.entry.prefix),
            &table_html(&["File", "Size", "Referenced"], &Self::image_rows(item)),
        )
    }
}
