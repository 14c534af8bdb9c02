//! Findings and the text/HTML report files they are written to.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{PackageError, Result};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// One observation recorded by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.label(), self.message)
    }
}

/// Number of findings at or above `severity`.
pub fn count_at_least(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity >= severity).count()
}

fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Write a plain-text report: title, timestamp, one finding per line.
pub fn write_text_report(path: &Path, title: &str, findings: &[Finding]) -> Result<()> {
    let mut content = format!("{title}\nGenerated: {}\n\n", generated_at());
    if findings.is_empty() {
        content.push_str("No problems found.\n");
    }
    for finding in findings {
        content.push_str(&finding.to_string());
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| PackageError::report(path, e))
}

/// Write a standalone HTML page around an already-rendered body.
pub fn write_html_report(path: &Path, title: &str, body: &str) -> Result<()> {
    let title = escape_html(title);
    let content = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<p class=\"generated\">Generated: {}</p>\n{body}\n</body>\n</html>\n",
        generated_at()
    );
    fs::write(path, content).map_err(|e| PackageError::report(path, e))
}

/// Render findings as an HTML list.
pub fn findings_html(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "<p class=\"ok\">No problems found.</p>".to_string();
    }
    let mut html = String::from("<ul class=\"findings\">\n");
    for finding in findings {
        html.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            finding.severity.label().to_lowercase(),
            escape_html(&finding.to_string())
        ));
    }
    html.push_str("</ul>");
    html
}

/// Render label/value rows as an HTML table.
pub fn table_html(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table>\n<tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
