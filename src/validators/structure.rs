use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use super::StructureValidator;
use super::report::{Finding, write_text_report};
use crate::error::Result;

/// Well-formedness check written as the article's structure report.
///
/// Grammar validation against the DTD needs a validating parser; this
/// implementation reports what a non-validating parser can see.
#[derive(Debug, Default, Clone)]
pub struct WellFormednessValidator;

impl WellFormednessValidator {
    pub fn check(xml: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut open: Vec<String> = Vec::new();
        let mut roots = 0usize;
        let mut has_doctype = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::DocType(_)) => has_doctype = true,
                Ok(Event::Start(e)) => {
                    if open.is_empty() {
                        roots += 1;
                    }
                    open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
                Ok(Event::Empty(_)) => {
                    if open.is_empty() {
                        roots += 1;
                    }
                }
                Ok(Event::End(_)) => {
                    open.pop();
                }
                Ok(Event::Text(e)) if open.is_empty() => {
                    let text = String::from_utf8_lossy(&e).trim().to_string();
                    if !text.is_empty() {
                        findings.push(Finding::error(format!(
                            "text outside the root element: {}",
                            truncate(&text, 40)
                        )));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    findings.push(Finding::error(format!(
                        "{} (at byte {})",
                        e,
                        reader.buffer_position()
                    )));
                    return findings;
                }
                _ => {}
            }
            buf.clear();
        }

        for name in open.iter().rev() {
            findings.push(Finding::error(format!("unclosed element <{name}>")));
        }
        match roots {
            0 => findings.push(Finding::error("document has no root element")),
            1 => {}
            n => findings.push(Finding::error(format!(
                "document has {n} root elements; exactly one is allowed"
            ))),
        }
        if !has_doctype {
            findings.push(Finding::warning(
                "no DOCTYPE declaration; the document type cannot be identified",
            ));
        }
        findings
    }
}

impl StructureValidator for WellFormednessValidator {
    fn validate(&self, xml_path: &Path, report_path: &Path) -> Result<()> {
        let bytes = fs::read(xml_path)?;
        let findings = Self::check(&String::from_utf8_lossy(&bytes));
        debug!(
            file = %xml_path.display(),
            findings = findings.len(),
            "structure check complete"
        );
        write_text_report(
            report_path,
            &format!("Structure report: {}", xml_path.display()),
            &findings,
        )
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
