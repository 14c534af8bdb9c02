use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::StyleValidator;
use super::article_data::ArticleData;
use super::report::{Finding, findings_html, write_html_report};
use crate::error::Result;

static DOI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("valid DOI pattern"));

/// Markup rules every JATS article in a package is expected to follow.
#[derive(Debug, Default, Clone)]
pub struct JatsStyleValidator;

impl JatsStyleValidator {
    pub fn check(data: &ArticleData) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(error) = &data.parse_error {
            findings.push(Finding::error(format!("document is not well formed: {error}")));
        }

        match data.root_element.as_deref() {
            Some("article") => {}
            Some(other) => findings.push(Finding::error(format!(
                "root element must be <article>, found <{other}>"
            ))),
            None => {}
        }

        if data.article_title.is_none() {
            findings.push(Finding::error("article-meta has no article-title"));
        }

        match data.doi.as_deref() {
            None => findings.push(Finding::warning("article has no DOI (article-id pub-id-type=\"doi\")")),
            Some(doi) if !DOI_PATTERN.is_match(doi) => {
                findings.push(Finding::error(format!("invalid DOI: {doi}")))
            }
            Some(_) => {}
        }

        if data.journal_title.is_none() {
            findings.push(Finding::warning("journal-meta has no journal-title"));
        }
        if data.pub_year.is_none() {
            findings.push(Finding::warning("article-meta has no pub-date year"));
        }
        findings
    }
}

impl StyleValidator for JatsStyleValidator {
    fn validate(&self, xml_path: &Path, report_path: &Path) -> Result<()> {
        let bytes = fs::read(xml_path)?;
        let data = ArticleData::from_xml(xml_path, &String::from_utf8_lossy(&bytes));
        let findings = Self::check(&data);
        write_html_report(
            report_path,
            &format!("Style report: {}", xml_path.display()),
            &findings_html(&findings),
        )
    }
}
