use std::fs;
use std::path::{Path, PathBuf};

use super::article_data::ArticleData;
use super::assets::matches_reference;
use super::report::{Finding, escape_html, findings_html, write_html_report};
use super::{VisualValidator, file_name_string};
use crate::error::Result;
use crate::package::file_stem_and_extension;

const BROWSER_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp"];

/// HTML preview of the article with its assets, for visual inspection.
#[derive(Debug, Default, Clone)]
pub struct HtmlPreviewValidator;

impl HtmlPreviewValidator {
    pub fn render(data: &ArticleData, asset_paths: &[PathBuf], report_path: &Path) -> String {
        let mut html = String::new();

        let title = data.article_title.as_deref().unwrap_or("(untitled)");
        html.push_str(&format!("<h2 class=\"article-title\">{}</h2>\n", escape_html(title)));
        if let Some(journal) = &data.journal_title {
            html.push_str(&format!("<p class=\"journal\">{}</p>\n", escape_html(journal)));
        }
        if let Some(doi) = &data.doi {
            html.push_str(&format!(
                "<p class=\"doi\"><a href=\"https://doi.org/{0}\">{0}</a></p>\n",
                escape_html(doi)
            ));
        }

        html.push_str("<div class=\"assets\">\n");
        for asset in asset_paths {
            let name = escape_html(&file_name_string(asset));
            let link = escape_html(&relative_link(asset, report_path));
            let (_, extension) = file_stem_and_extension(asset);
            let is_image = extension
                .map(|e| e.to_lowercase())
                .is_some_and(|e| BROWSER_IMAGE_EXTENSIONS.contains(&e.as_str()));
            if is_image {
                html.push_str(&format!(
                    "<figure><img src=\"{link}\" alt=\"{name}\"/><figcaption>{name}</figcaption></figure>\n"
                ));
            } else {
                html.push_str(&format!("<p><a href=\"{link}\">{name}</a></p>\n"));
            }
        }
        html.push_str("</div>\n");

        let missing: Vec<Finding> = data
            .asset_references
            .iter()
            .filter(|reference| !asset_paths.iter().any(|a| matches_reference(a, reference)))
            .map(|reference| Finding::error(format!("cannot display {reference}: file not in package")))
            .collect();
        html.push_str(&findings_html(&missing));
        html
    }
}

/// Link from the report's directory to `asset`.
fn relative_link(asset: &Path, report_path: &Path) -> String {
    let name = file_name_string(asset);
    let report_dir = report_path.parent();
    if asset.parent() == report_dir {
        name
    } else if asset.parent().is_some() && asset.parent() == report_dir.and_then(Path::parent) {
        format!("../{name}")
    } else {
        asset.display().to_string()
    }
}

impl VisualValidator for HtmlPreviewValidator {
    fn validate(
        &self,
        xml_path: &Path,
        asset_paths: &[PathBuf],
        report_path: &Path,
    ) -> Result<()> {
        let bytes = fs::read(xml_path)?;
        let data = ArticleData::from_xml(xml_path, &String::from_utf8_lossy(&bytes));
        let body = Self::render(&data, asset_paths, report_path);
        write_html_report(
            report_path,
            &format!("Preview: {}", file_name_string(xml_path)),
            &body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relative_link() {
        let report = Path::new("/out/errors/a.html");
        assert_eq!(relative_link(Path::new("/out/a-1.jpg"), report), "../a-1.jpg");
        assert_eq!(relative_link(Path::new("/out/errors/x.png"), report), "x.png");
        assert_eq!(
            relative_link(Path::new("/elsewhere/a-1.jpg"), report),
            "/elsewhere/a-1.jpg"
        );
    }

    #[test]
    fn test_render_images_links_and_missing() {
        let data = ArticleData {
            article_title: Some("A & B".to_string()),
            asset_references: vec!["a-gf01".to_string(), "a-gf02".to_string()],
            ..Default::default()
        };
        let assets = vec![PathBuf::from("/out/a-gf01.JPG"), PathBuf::from("/out/a-s1.pdf")];

        let html = HtmlPreviewValidator::render(&data, &assets, Path::new("/out/errors/a.html"));

        assert!(html.contains("A &amp; B"));
        assert!(html.contains("<img src=\"../a-gf01.JPG\""));
        assert!(html.contains("<a href=\"../a-s1.pdf\">a-s1.pdf</a>"));
        assert!(html.contains("cannot display a-gf02"));
    }

    #[test]
    fn test_validate_writes_preview() {
        let temp_dir = TempDir::new().unwrap();
        let xml_path = temp_dir.path().join("a.xml");
        let report_path = temp_dir.path().join("a.html");
        fs::write(
            &xml_path,
            "<article><front><article-meta><title-group><article-title>Hi</article-title></title-group></article-meta></front></article>",
        )
        .unwrap();

        HtmlPreviewValidator
            .validate(&xml_path, &[], &report_path)
            .unwrap();

        let html = fs::read_to_string(&report_path).unwrap();
        assert!(html.contains("Preview: a.xml"));
        assert!(html.contains(">Hi</h2>"));
    }
}
