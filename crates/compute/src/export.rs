//! Document export for a finished review.
//!
//! Rendering is a single call that either yields the whole document or an
//! [`ExportError`]. It only reads the summary and the top-anomaly rows, so a
//! failed export leaves the computed report untouched.

use std::path::Path;

use thiserror::Error;

use crate::pipeline::report::{ComplianceSummary, TopAnomaly};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("character {ch:?} on line {line} is not Latin-1 encodable")]
    Encoding { ch: char, line: usize },

    #[error("invalid layout: {0}")]
    Layout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a compliance summary and its top anomalies into document bytes.
pub trait DocumentRenderer {
    fn render(&self, summary: &ComplianceSummary, top: &[TopAnomaly]) -> Result<Vec<u8>, ExportError>;

    /// Render and write to `path`. Nothing is written when rendering fails.
    fn write_to(&self, path: &Path, summary: &ComplianceSummary, top: &[TopAnomaly]) -> Result<(), ExportError> {
        let bytes = self.render(summary, top)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

pub const DEFAULT_TITLE: &str = "Audit Log Review Report";
const SUMMARY_HEADING: &str = "Compliance Summary";
const ANOMALIES_HEADING: &str = "Top Anomalies";
const PAGE_BREAK: char = '\u{0c}';

/// Paginated plain-text document in Latin-1.
///
/// Every page starts with the title and ends with a `Page i of n` footer.
/// Body lines are word-wrapped to `width` characters; pages hold
/// `lines_per_page` body lines and are separated by a form feed. The
/// Latin-1 restriction matches what a core PDF font can show.
#[derive(Debug, Clone)]
pub struct TextDocumentRenderer {
    title: String,
    width: usize,
    lines_per_page: usize,
}

impl Default for TextDocumentRenderer {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: 90,
            lines_per_page: 50,
        }
    }
}

impl TextDocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_lines_per_page(mut self, lines: usize) -> Self {
        self.lines_per_page = lines;
        self
    }

    fn body(&self, summary: &ComplianceSummary, top: &[TopAnomaly]) -> Vec<String> {
        let mut lines = vec![SUMMARY_HEADING.to_string(), String::new()];
        for paragraph in summary.text.lines() {
            lines.extend(wrap(paragraph, self.width));
        }
        lines.push(String::new());
        lines.push(ANOMALIES_HEADING.to_string());
        lines.push(String::new());
        if top.is_empty() {
            lines.push("None.".to_string());
        }
        for row in top {
            let line = format!(
                "- {} | {} | {} | {}",
                row.timestamp.as_deref().unwrap_or("unknown"),
                row.user.as_deref().unwrap_or_default(),
                row.event_type.as_deref().unwrap_or_default(),
                row.reason
            );
            lines.extend(wrap(&line, self.width));
        }
        lines
    }
}

impl DocumentRenderer for TextDocumentRenderer {
    fn render(&self, summary: &ComplianceSummary, top: &[TopAnomaly]) -> Result<Vec<u8>, ExportError> {
        if self.width == 0 || self.lines_per_page == 0 {
            return Err(ExportError::Layout(
                "width and lines per page must be positive".into(),
            ));
        }

        let body = self.body(summary, top);
        let pages: Vec<&[String]> = body.chunks(self.lines_per_page).collect();
        let page_count = pages.len();

        let mut text = String::new();
        for (idx, page) in pages.iter().enumerate() {
            if idx > 0 {
                text.push(PAGE_BREAK);
            }
            text.push_str(&self.title);
            text.push_str("\n\n");
            for line in page.iter() {
                text.push_str(line);
                text.push('\n');
            }
            text.push_str(&format!("\nPage {} of {}\n", idx + 1, page_count));
        }

        encode_latin1(&text)
    }
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn encode_latin1(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut line = 1;
    text.chars()
        .map(|ch| {
            if ch == '\n' {
                line += 1;
            }
            u8::try_from(u32::from(ch)).map_err(|_| ExportError::Encoding { ch, line })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditlens_core::{CanonicalField, FieldMapping};

    fn summary(text: &str) -> ComplianceSummary {
        ComplianceSummary {
            total_records: 20,
            anomaly_count: 1,
            mapping: FieldMapping::new([(CanonicalField::Timestamp, Some("ts".to_string()))]),
            entries: Vec::new(),
            text: text.to_string(),
        }
    }

    fn top(ts: Option<&str>) -> TopAnomaly {
        TopAnomaly {
            timestamp: ts.map(String::from),
            user: None,
            event_type: Some("alert".into()),
            reason: "emergency condition".into(),
        }
    }

    fn render(renderer: &TextDocumentRenderer, text: &str, rows: &[TopAnomaly]) -> String {
        let bytes = renderer.render(&summary(text), rows).unwrap();
        bytes.iter().map(|b| char::from(*b)).collect()
    }

    #[test]
    fn sections_and_rows() {
        let doc = render(
            &TextDocumentRenderer::new(),
            "AI detected 1 anomalies out of 20 records.",
            &[top(Some("2025-06-14 02:00:00")), top(None)],
        );
        assert!(doc.starts_with("Audit Log Review Report\n\nCompliance Summary\n"));
        assert!(doc.contains("AI detected 1 anomalies out of 20 records."));
        assert!(doc.contains("Top Anomalies"));
        assert!(doc.contains("- 2025-06-14 02:00:00 |  | alert | emergency condition"));
        assert!(doc.contains("- unknown |  | alert | emergency condition"));
        assert!(doc.ends_with("Page 1 of 1\n"));
    }

    #[test]
    fn empty_top_list_says_none() {
        let doc = render(&TextDocumentRenderer::new(), "No anomalies detected.", &[]);
        assert!(doc.contains("Top Anomalies\n\nNone.\n"));
    }

    #[test]
    fn long_bodies_paginate_with_title_on_every_page() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let renderer = TextDocumentRenderer::new().with_lines_per_page(10).with_title("Report");
        let doc = render(&renderer, &text, &[]);
        let pages: Vec<&str> = doc.split(PAGE_BREAK).collect();
        // 2 heading lines + 30 summary lines + 4 anomaly-section lines = 36.
        assert_eq!(pages.len(), 4);
        for (i, page) in pages.iter().enumerate() {
            assert!(page.starts_with("Report\n\n"));
            assert!(page.ends_with(&format!("Page {} of 4\n", i + 1)));
        }
    }

    #[test]
    fn wraps_words_and_splits_long_tokens() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("x abcdef", 3), vec!["x", "abc", "def"]);
    }

    #[test]
    fn latin1_accepted_other_characters_rejected() {
        let doc = render(&TextDocumentRenderer::new(), "Prüfung bestanden", &[]);
        assert!(doc.contains("Prüfung"));

        let err = TextDocumentRenderer::new()
            .render(&summary("shutdown \u{2192} restart"), &[])
            .unwrap_err();
        assert!(matches!(err, ExportError::Encoding { ch: '\u{2192}', line: 5 }));
    }

    #[test]
    fn zero_sized_layout_is_an_error() {
        let err = TextDocumentRenderer::new()
            .with_lines_per_page(0)
            .render(&summary("x"), &[])
            .unwrap_err();
        assert!(matches!(err, ExportError::Layout(_)));
    }

    #[test]
    fn write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        TextDocumentRenderer::new()
            .write_to(&path, &summary("ok"), &[top(None)])
            .unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"Audit Log Review Report"));

        let bad = dir.path().join("bad.txt");
        assert!(TextDocumentRenderer::new()
            .write_to(&bad, &summary("\u{1F600}"), &[])
            .is_err());
        assert!(!bad.exists());
    }
}
