//! In-memory snapshot of the article metadata the checks need.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use super::ArticleDataLoader;
use crate::error::Result;

/// Elements whose `xlink:href` points at a package asset.
const ASSET_ELEMENTS: &[&str] = &[
    "graphic",
    "inline-graphic",
    "media",
    "supplementary-material",
    "inline-supplementary-material",
];

/// Metadata extracted from one article's XML document.
///
/// A document that cannot be parsed still yields a snapshot: whatever was
/// read before the failure plus the parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleData {
    pub xml_path: PathBuf,
    pub root_element: Option<String>,
    pub doctype: Option<String>,
    pub article_title: Option<String>,
    pub doi: Option<String>,
    pub journal_title: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pub_year: Option<String>,
    /// Asset references in document order.
    pub asset_references: Vec<String>,
    pub parse_error: Option<String>,
}

impl ArticleData {
    /// `vol/issue/year` label used to compare articles of one issue.
    pub fn issue_label(&self) -> Option<String> {
        if self.volume.is_none() && self.issue.is_none() && self.pub_year.is_none() {
            return None;
        }
        Some(format!(
            "v{} n{} {}",
            self.volume.as_deref().unwrap_or("-"),
            self.issue.as_deref().unwrap_or("-"),
            self.pub_year.as_deref().unwrap_or("-")
        ))
    }

    /// Parse article metadata out of XML text.
    pub fn from_xml(xml_path: &Path, xml: &str) -> Self {
        let mut data = ArticleData {
            xml_path: xml_path.to_path_buf(),
            ..Default::default()
        };

        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<String> = Vec::new();
        let mut title = String::new();
        let mut title_done = false;
        let mut in_doi = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::DocType(e)) => {
                    data.doctype = Some(String::from_utf8_lossy(&e).trim().to_string());
                }
                Ok(Event::Start(ref e)) => {
                    let name = local_name(e);
                    data.visit_element(&name, e);
                    if name == "article-id" {
                        in_doi = attribute(e, "pub-id-type").as_deref() == Some("doi");
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(ref e)) => {
                    let name = local_name(e);
                    data.visit_element(&name, e);
                }
                Ok(Event::End(_)) => {
                    if let Some(name) = stack.pop() {
                        if name == "article-title" && in_article_meta(&stack) && !title.is_empty()
                        {
                            title_done = true;
                        }
                        if name == "article-id" {
                            in_doi = false;
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().unwrap_or_default().to_string();
                    let current = stack.last().map(String::as_str).unwrap_or_default();
                    let meta = in_article_meta(&stack);

                    if meta && !title_done && stack.iter().any(|n| n == "article-title") {
                        if !title.is_empty() {
                            title.push(' ');
                        }
                        title.push_str(&text);
                    } else {
                        match current {
                            "journal-title" => set_once(&mut data.journal_title, text),
                            "article-id" if in_doi => set_once(&mut data.doi, text),
                            "volume" if meta && !in_reference(&stack) => {
                                set_once(&mut data.volume, text)
                            }
                            "issue" if meta && !in_reference(&stack) => {
                                set_once(&mut data.issue, text)
                            }
                            "year" if meta && stack.iter().any(|n| n == "pub-date") => {
                                set_once(&mut data.pub_year, text)
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    data.parse_error = Some(format!(
                        "{} (at byte {})",
                        e,
                        reader.buffer_position()
                    ));
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        if data.parse_error.is_none() {
            if let Some(open) = stack.last() {
                data.parse_error = Some(format!("unclosed element <{open}>"));
            } else if data.root_element.is_none() {
                data.parse_error = Some("document has no root element".to_string());
            }
        }
        if !title.is_empty() {
            data.article_title = Some(title);
        }
        data
    }

    fn visit_element(&mut self, name: &str, element: &BytesStart<'_>) {
        if self.root_element.is_none() {
            self.root_element = Some(name.to_string());
        }
        if ASSET_ELEMENTS.contains(&name)
            && let Some(href) = attribute(element, "href")
        {
            self.asset_references.push(href);
        }
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// Value of the attribute whose local name is `name` (`xlink:href` → `href`).
fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn in_article_meta(stack: &[String]) -> bool {
    stack.iter().any(|n| n == "article-meta")
}

fn in_reference(stack: &[String]) -> bool {
    stack.iter().any(|n| n == "ref" || n == "related-article")
}

fn set_once(slot: &mut Option<String>, value: String) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value);
    }
}

/// Loads [`ArticleData`] with `quick-xml`.
#[derive(Debug, Default, Clone)]
pub struct QuickXmlArticleLoader;

impl ArticleDataLoader for QuickXmlArticleLoader {
    fn load(&self, xml_path: &Path) -> Result<ArticleData> {
        let bytes = fs::read(xml_path)?;
        let xml = String::from_utf8_lossy(&bytes);
        Ok(ArticleData::from_xml(xml_path, &xml))
    }
}
