//! Run summary output.
//!
//! Formats a [`QaSummary`] for stdout, either as text scaled by verbosity
//! or as JSON.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::orchestrator::{ArticleSummary, QaSummary};

/// Output formatter for run summaries
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Disable ANSI colours regardless of the terminal.
    pub fn without_colors(mut self) -> Self {
        self.show_colors = false;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_summary(&self, summary: &QaSummary) -> String {
        match self.format {
            OutputFormat::Json => format_json(summary),
            OutputFormat::Summary => self.format_one_line(summary),
            OutputFormat::Human => self.format_human(summary),
        }
    }

    fn format_one_line(&self, summary: &QaSummary) -> String {
        format!(
            "{} article(s), {} invalid file(s), reports in {} ({})\n",
            summary.article_count(),
            summary.invalid_count(),
            summary.reports_path.display(),
            format_duration(summary.duration)
        )
    }

    fn format_human(&self, summary: &QaSummary) -> String {
        let mut output = String::new();

        if self.verbosity == VerbosityLevel::Quiet {
            if summary.invalid_count() > 0 {
                output.push_str(&format!("Invalid files: {}\n", summary.invalid_count()));
            }
            return output;
        }

        output.push_str("Package QA Summary:\n");
        output.push_str(&format!("  Destination: {}\n", summary.destination.display()));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Articles:", "32"),
            summary.article_count()
        ));
        if summary.invalid_count() > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid files:", "31"),
                summary.invalid_count()
            ));
        }
        output.push_str(&format!("  Reports: {}\n", summary.reports_path.display()));
        output.push_str(&format!(
            "  Package report: {}\n",
            summary.package_report.display()
        ));
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(summary.duration)
        ));

        if self.verbosity >= VerbosityLevel::Verbose {
            if !summary.articles.is_empty() {
                output.push_str("\nArticles:\n");
            }
            for article in &summary.articles {
                output.push_str(&self.format_article(article));
                output.push('\n');
            }
            if !summary.invalid_files.is_empty() {
                output.push_str("\nInvalid files:\n");
                for file in &summary.invalid_files {
                    output.push_str(&format!(
                        "  {}  {}\n",
                        self.colorize("✗", "31"),
                        file.display()
                    ));
                }
            }
        }
        output
    }

    pub fn format_article(&self, article: &ArticleSummary) -> String {
        let marker = if article.stage.is_complete() {
            self.colorize("✓", "32")
        } else {
            self.colorize("⚠", "33")
        };
        let mut output = format!(
            "  {}  {} ({} asset{}) - {}",
            marker,
            article.prefix,
            article.asset_count,
            if article.asset_count == 1 { "" } else { "s" },
            article.stage
        );

        if self.verbosity == VerbosityLevel::Debug {
            output.push_str(&format!("\n    xml: {}", article.xml_path.display()));
            for path in [
                &article.reports.dtd_report,
                &article.reports.err_report,
                &article.reports.style_report,
                &article.reports.html_report,
                &article.reports.data_report,
                &article.reports.images_report,
            ] {
                output.push_str(&format!("\n    report: {}", path.display()));
            }
        }
        output
    }
}

fn format_json(summary: &QaSummary) -> String {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => json + "\n",
        Err(e) => format!("{{\"error\": \"failed to serialize summary: {e}\"}}\n"),
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
