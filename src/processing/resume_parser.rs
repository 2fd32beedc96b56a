//! Résumé parsing into summary, career highlights and experience bullets

use crate::error::{Result, ResumeTailorError};
use crate::processing::document::{
    char_count, Bullet, Highlight, ParsedResume, RejectedLine, ResumeSection, ResumeSummary,
};
use crate::processing::text_processor::TextProcessor;
use log::{debug, warn};
use regex::Regex;

const BULLET_MARKERS: [char; 3] = ['-', '•', '*'];

/// Headers of sections this parser does not model. Inside the experience
/// section they close the open employer instead of opening a new one.
const FOREIGN_HEADERS: [&str; 14] = [
    "EDUCATION", "SKILLS", "TECHNICAL SKILLS", "CERTIFICATIONS", "PROJECTS", "AWARDS",
    "PUBLICATIONS", "LANGUAGES", "INTERESTS", "VOLUNTEER", "VOLUNTEERING", "PATENTS",
    "REFERENCES", "ADDITIONAL INFORMATION",
];

/// Words that may stay lowercase inside a capitalized employer header.
const CONNECTORS: [&str; 9] = ["of", "and", "the", "at", "for", "in", "on", "&", "to"];

#[derive(Debug, Clone, PartialEq)]
struct EmployerContext {
    name: String,
    role: Option<String>,
    slug: String,
    bullets: usize,
}

/// Where the parser is in the document. Only recognized header lines move it
/// between sections.
#[derive(Debug, Clone, PartialEq)]
enum ParseState {
    BeforeSections,
    InSummary,
    InHighlights,
    InExperience(Option<EmployerContext>),
}

impl ParseState {
    fn on_header(section: ResumeSection) -> Self {
        match section {
            ResumeSection::Summary => ParseState::InSummary,
            ResumeSection::Highlights => ParseState::InHighlights,
            ResumeSection::Experience => ParseState::InExperience(None),
        }
    }
}

pub struct ResumeParser<'a> {
    processor: &'a TextProcessor,
    tagline_separator: char,
    date_regex: Regex,
    header_split_regex: Regex,
}

/// Accumulated output of one parse call.
#[derive(Default)]
struct ParseRun {
    headers_seen: usize,
    summary_header_seen: bool,
    preamble: Vec<String>,
    summary_lines: Vec<String>,
    highlights: Vec<Highlight>,
    bullets: Vec<Bullet>,
    rejected: Vec<RejectedLine>,
}

impl ParseRun {
    fn reject(&mut self, line: usize, text: &str, reason: &str) {
        warn!("Résumé line {} rejected ({}): {}", line, reason, text);
        self.rejected.push(RejectedLine {
            line,
            text: text.to_string(),
            reason: reason.to_string(),
        });
    }
}

impl<'a> ResumeParser<'a> {
    pub fn new(processor: &'a TextProcessor, tagline_separator: char) -> Result<Self> {
        let date_regex = Regex::new(r"(?i)\b(?:19|20)\d{2}\b|\bpresent\b|\bcurrent\b")
            .map_err(|e| ResumeTailorError::Processing(format!("Invalid date pattern: {}", e)))?;
        let header_split_regex = Regex::new(r"\s*\|\s*|\t+|\s{2,}|\s+[–—-]\s+")
            .map_err(|e| ResumeTailorError::Processing(format!("Invalid header pattern: {}", e)))?;

        Ok(Self {
            processor,
            tagline_separator,
            date_regex,
            header_split_regex,
        })
    }

    /// Parse résumé text. Fails when no recognized section header exists, so a
    /// structural problem never shows up later as "every keyword missing".
    pub fn parse(&self, resume_text: &str) -> Result<ParsedResume> {
        let mut run = ParseRun::default();
        let mut state = ParseState::BeforeSections;

        for (idx, raw) in resume_text.lines().enumerate() {
            let line_no = idx + 1;

            if let Some(section) = section_header(raw) {
                debug!("Line {}: entering {} section", line_no, section);
                run.headers_seen += 1;
                run.summary_header_seen |= section == ResumeSection::Summary;
                state = ParseState::on_header(section);
                continue;
            }

            match &mut state {
                ParseState::BeforeSections => run.preamble.push(raw.to_string()),
                ParseState::InSummary => run.summary_lines.push(raw.to_string()),
                ParseState::InHighlights => self.highlight_line(&mut run, raw),
                ParseState::InExperience(employer) => self.experience_line(&mut run, employer, line_no, raw),
            }
        }

        if run.headers_seen == 0 {
            return Err(ResumeTailorError::StructuralParse(
                "no resume structure detected: expected at least one of SUMMARY, CAREER HIGHLIGHTS, EXPERIENCE or PROFESSIONAL IMPACT".to_string(),
            ));
        }

        let summary_source = if run.summary_header_seen {
            &run.summary_lines
        } else {
            &run.preamble
        };
        let summary = self.parse_summary(summary_source);

        debug!(
            "Parsed résumé: {} highlights, {} bullets, {} rejected lines",
            run.highlights.len(),
            run.bullets.len(),
            run.rejected.len()
        );

        Ok(ParsedResume {
            summary,
            highlights: run.highlights,
            experience_bullets: run.bullets,
            rejected_lines: run.rejected,
        })
    }

    /// First non-contact line with the separator is the tagline; the lines
    /// after it form the body.
    fn parse_summary(&self, lines: &[String]) -> ResumeSummary {
        let lines: Vec<&str> = lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !is_contact_line(l))
            .collect();

        let tagline_idx = lines
            .iter()
            .position(|l| !l.is_empty() && l.contains(self.tagline_separator));

        let (tagline, body_lines) = match tagline_idx {
            Some(i) => (lines[i].to_string(), &lines[i + 1..]),
            None => (String::new(), &lines[..]),
        };

        let first = body_lines.iter().position(|l| !l.is_empty());
        let last = body_lines.iter().rposition(|l| !l.is_empty());
        let body = match (first, last) {
            (Some(first), Some(last)) => body_lines[first..=last].join("\n"),
            _ => String::new(),
        };

        ResumeSummary::new(tagline, body)
    }

    fn highlight_line(&self, run: &mut ParseRun, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let content = strip_bullet_marker(trimmed).unwrap_or(trimmed);

        match content.split_once(':') {
            Some((label, text)) if !label.trim().is_empty() => {
                run.highlights.push(Highlight {
                    id: format!("highlight_{}", run.highlights.len()),
                    label: label.trim().to_string(),
                    text: text.trim().to_string(),
                    full_text: content.to_string(),
                    char_count: char_count(content),
                    metrics: self.processor.extract_metrics(content),
                });
            }
            _ => debug!("Skipping highlight line without a label: {}", content),
        }
    }

    fn experience_line(
        &self,
        run: &mut ParseRun,
        employer: &mut Option<EmployerContext>,
        line_no: usize,
        raw: &str,
    ) {
        // Markdown sub-headings ("### Acme Corp") are plain employer lines here.
        let trimmed = raw.trim().trim_start_matches('#').trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(text) = strip_bullet_marker(trimmed) {
            if text.is_empty() {
                return;
            }
            match employer {
                Some(ctx) => {
                    run.bullets.push(Bullet {
                        id: format!("{}_{}", ctx.slug, run.bullets.len()),
                        employer: ctx.name.clone(),
                        role: ctx.role.clone(),
                        text: text.to_string(),
                        char_count: char_count(text),
                        metrics: self.processor.extract_metrics(text),
                    });
                    ctx.bullets += 1;
                }
                None => run.reject(line_no, trimmed, "bullet before any employer header"),
            }
            return;
        }

        if trimmed.chars().next().map_or(false, char::is_lowercase) {
            let bullet_open = employer.as_ref().map_or(false, |ctx| ctx.bullets > 0);
            if bullet_open {
                if let Some(last) = run.bullets.last_mut() {
                    last.text.push(' ');
                    last.text.push_str(trimmed);
                    last.char_count = char_count(&last.text);
                    last.metrics = self.processor.extract_metrics(&last.text);
                    return;
                }
            }
            run.reject(line_no, trimmed, "continuation line without an open bullet");
            return;
        }

        if is_foreign_header(trimmed) {
            debug!("Line {}: '{}' closes the current employer", line_no, trimmed);
            *employer = None;
            return;
        }

        if !self.is_employer_header(trimmed) {
            run.reject(line_no, trimmed, "unrecognized line in experience section");
            return;
        }

        let parts = self.header_parts(trimmed);
        if parts.is_empty() {
            // A date-only line belongs to the employer above it.
            if employer.is_none() {
                run.reject(line_no, trimmed, "date line before any employer header");
            }
            return;
        }

        match employer {
            Some(ctx) if ctx.bullets == 0 && ctx.role.is_none() => {
                ctx.role = Some(parts[0].clone());
            }
            _ => {
                let name = parts[0].clone();
                debug!("Line {}: opening employer '{}'", line_no, name);
                *employer = Some(EmployerContext {
                    slug: slugify(&name),
                    role: parts.get(1).cloned(),
                    name,
                    bullets: 0,
                });
            }
        }
    }

    /// A capitalized token sequence, or any line carrying a date range.
    fn is_employer_header(&self, line: &str) -> bool {
        let starts_upper = line
            .chars()
            .next()
            .map_or(false, |c| c.is_uppercase() || c.is_ascii_digit());
        if !starts_upper {
            return false;
        }
        if self.date_regex.is_match(line) {
            return true;
        }

        let words: Vec<&str> = line
            .split_whitespace()
            .filter(|w| w.chars().next().map_or(false, char::is_alphabetic))
            .filter(|w| !CONNECTORS.contains(&w.to_lowercase().as_str()))
            .collect();
        let capitalized = words
            .iter()
            .filter(|w| w.chars().next().map_or(false, char::is_uppercase))
            .count();

        !line.ends_with('.') && capitalized * 2 >= words.len()
    }

    /// Header fields with date fields removed: `[employer, role?, ...]`.
    fn header_parts(&self, line: &str) -> Vec<String> {
        self.header_split_regex
            .split(line)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty() && !self.date_regex.is_match(p))
            .map(|p| p.to_string())
            .collect()
    }
}

fn section_header(line: &str) -> Option<ResumeSection> {
    let core = line
        .trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches(|c: char| c == '*' || c == '_')
        .trim()
        .trim_end_matches(':')
        .trim();
    let normalized = core.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();

    match normalized.as_str() {
        "SUMMARY" | "PROFESSIONAL SUMMARY" => Some(ResumeSection::Summary),
        "CAREER HIGHLIGHTS" | "HIGHLIGHTS" => Some(ResumeSection::Highlights),
        "EXPERIENCE" | "PROFESSIONAL EXPERIENCE" | "WORK EXPERIENCE" | "PROFESSIONAL IMPACT" => {
            Some(ResumeSection::Experience)
        }
        _ => None,
    }
}

fn is_foreign_header(line: &str) -> bool {
    let core = line.trim_start_matches('#').trim().trim_end_matches(':').trim().to_uppercase();
    FOREIGN_HEADERS.contains(&core.as_str())
}

/// Text after a leading bullet marker, or `None` for an unmarked line.
fn strip_bullet_marker(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }
    let rest = chars.as_str();
    // "-5% churn" or "**Bold**" are not bullets.
    if marker != '•' && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn is_contact_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    if line.contains('@') || lower.contains("linkedin") || lower.contains("http") || lower.contains("www.") {
        return true;
    }
    line.chars().any(|c| c.is_ascii_digit())
        && line
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | '(' | ')' | ' '))
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(20)
        .collect()
}
