//! Résumé document structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub summary: ResumeSummary,
    pub highlights: Vec<Highlight>,
    pub experience_bullets: Vec<Bullet>,
    /// Lines the section state machine refused, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_lines: Vec<RejectedLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub tagline: String,
    pub tagline_char_count: usize,
    pub body: String,
    pub body_char_count: usize,
}

/// A career highlight in `Label: text` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: String,
    pub label: String,
    pub text: String,
    pub full_text: String,
    pub char_count: usize,
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: String,
    pub employer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub text: String,
    pub char_count: usize,
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// One-based line number in the résumé text.
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// The three résumé sections the parser recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSection {
    Summary,
    Highlights,
    Experience,
}

/// Leaf-level text spans, the smallest units a keyword can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    SummaryTagline,
    SummaryBody,
    Highlight,
    Bullet,
}

/// A borrowed view of one résumé span.
#[derive(Debug, Clone, Copy)]
pub struct ResumeSpan<'a> {
    pub kind: SpanKind,
    pub id: &'a str,
    pub text: &'a str,
}

impl SpanKind {
    pub fn section(self) -> ResumeSection {
        match self {
            SpanKind::SummaryTagline | SpanKind::SummaryBody => ResumeSection::Summary,
            SpanKind::Highlight => ResumeSection::Highlights,
            SpanKind::Bullet => ResumeSection::Experience,
        }
    }
}

impl ResumeSummary {
    pub fn new(tagline: String, body: String) -> Self {
        Self {
            tagline_char_count: char_count(&tagline),
            body_char_count: char_count(&body),
            tagline,
            body,
        }
    }
}

impl ParsedResume {
    /// Every non-empty span in document order: tagline, body, highlights,
    /// then experience bullets.
    pub fn spans(&self) -> Vec<ResumeSpan<'_>> {
        let mut spans = Vec::with_capacity(2 + self.highlights.len() + self.experience_bullets.len());

        if !self.summary.tagline.is_empty() {
            spans.push(ResumeSpan {
                kind: SpanKind::SummaryTagline,
                id: "summary_tagline",
                text: &self.summary.tagline,
            });
        }
        if !self.summary.body.is_empty() {
            spans.push(ResumeSpan {
                kind: SpanKind::SummaryBody,
                id: "summary_body",
                text: &self.summary.body,
            });
        }
        spans.extend(self.highlights.iter().map(|h| ResumeSpan {
            kind: SpanKind::Highlight,
            id: &h.id,
            text: &h.full_text,
        }));
        spans.extend(self.experience_bullets.iter().map(|b| ResumeSpan {
            kind: SpanKind::Bullet,
            id: &b.id,
            text: &b.text,
        }));

        spans
    }

    /// Concatenated text of one section's spans, joined by newlines.
    pub fn section_text(&self, section: ResumeSection) -> String {
        self.spans()
            .into_iter()
            .filter(|span| span.kind.section() == section)
            .map(|span| span.text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Length as rendered: Unicode scalar values, punctuation and spaces included.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

impl std::fmt::Display for ResumeSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResumeSection::Summary => write!(f, "Summary"),
            ResumeSection::Highlights => write!(f, "Career Highlights"),
            ResumeSection::Experience => write!(f, "Experience"),
        }
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanKind::SummaryTagline => write!(f, "summary tagline"),
            SpanKind::SummaryBody => write!(f, "summary body"),
            SpanKind::Highlight => write!(f, "highlight"),
            SpanKind::Bullet => write!(f, "bullet"),
        }
    }
}
