use std::collections::BTreeMap;

use super::report::{Finding, findings_html, table_html, write_html_report};
use super::{PackageDataValidator, file_name_string};
use crate::error::Result;
use crate::orchestrator::ArticleItem;
use crate::outputs::Outputs;
use crate::package::Package;

/// Consistency of the articles delivered together: one journal, one issue,
/// distinct DOIs, no stray files.
#[derive(Debug, Default, Clone)]
pub struct PackageConsistencyValidator;

impl PackageConsistencyValidator {
    pub fn check(package: &Package, articles: &[ArticleItem]) -> Vec<Finding> {
        let mut findings = Vec::new();

        let mut by_doi: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for item in articles {
            match item.data.doi.as_deref() {
                Some(doi) => by_doi.entry(doi).or_default().push(&item.entry.prefix),
                None => findings.push(Finding::warning(format!(
                    "{}: article has no DOI",
                    item.entry.prefix
                ))),
            }
        }
        for (doi, prefixes) in by_doi.iter().filter(|(_, p)| p.len() > 1) {
            findings.push(Finding::error(format!(
                "DOI {doi} is shared by {}",
                prefixes.join(", ")
            )));
        }

        if let Some(finding) = divergent(articles, "journal title", |item| {
            item.data.journal_title.clone()
        }) {
            findings.push(finding);
        }
        if let Some(finding) = divergent(articles, "issue", |item| item.data.issue_label()) {
            findings.push(finding);
        }

        for file in package.invalid_files() {
            findings.push(Finding::error(format!(
                "file does not belong to any article: {}",
                file_name_string(file)
            )));
        }
        findings
    }
}

/// Error when articles disagree on the value `field` extracts.
fn divergent<F>(articles: &[ArticleItem], label: &str, field: F) -> Option<Finding>
where
    F: Fn(&ArticleItem) -> Option<String>,
{
    let mut values: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for item in articles {
        if let Some(value) = field(item) {
            values.entry(value).or_default().push(&item.entry.prefix);
        }
    }
    if values.len() < 2 {
        return None;
    }
    let detail = values
        .iter()
        .map(|(value, prefixes)| format!("\"{value}\" ({})", prefixes.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    Some(Finding::error(format!(
        "articles disagree on the {label}: {detail}"
    )))
}

impl PackageDataValidator for PackageConsistencyValidator {
    fn validate(
        &self,
        package: &Package,
        articles: &[ArticleItem],
        outputs: &Outputs,
    ) -> Result<()> {
        let rows: Vec<Vec<String>> = articles
            .iter()
            .map(|item| {
                vec![
                    item.entry.prefix.clone(),
                    item.data.doi.clone().unwrap_or_else(|| "-".to_string()),
                    item.data.issue_label().unwrap_or_else(|| "-".to_string()),
                    item.entry.asset_paths.len().to_string(),
                ]
            })
            .collect();

        let body = format!(
            "<p>{} article(s), {} file(s) received.</p>\n{}\n<h2>Findings</h2>\n{}",
            package.len(),
            package.file_count(),
            table_html(&["Prefix", "DOI", "Issue", "Assets"], &rows),
            findings_html(&Self::check(package, articles))
        );
        write_html_report(
            &outputs.package_report_path(),
            &format!("Package report: {}", outputs.root().display()),
            &body,
        )
    }
}
