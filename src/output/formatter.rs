//! Output formatters for the preprocess and validate reports

use crate::config::OutputFormat;
use crate::error::{Result, ResumeTailorError};
use crate::output::report::{PreprocessReport, ValidationReport};
use crate::processing::keyword_extractor::Importance;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_preprocess(&self, report: &PreprocessReport) -> Result<String>;
    fn format_validation(&self, report: &ValidationReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Human-readable summary with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter, the wire format for collaborating tools
pub struct JsonFormatter {
    pretty: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_coverage_badge(&self, percent: usize) -> String {
        let (badge, color) = match percent {
            80..=100 => ("STRONG", Color::Green),
            60..=79 => ("GOOD", Color::Yellow),
            40..=59 => ("PARTIAL", Color::BrightYellow),
            _ => ("WEAK", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_importance(&self, importance: Importance) -> String {
        match importance {
            Importance::Primary => self.colorize("PRIMARY  ", Color::Red),
            Importance::Secondary => self.colorize("SECONDARY", Color::BrightBlack),
        }
    }

    fn format_status(&self, passed: bool) -> String {
        match (passed, self.use_colors) {
            (true, true) => "✓".green().bold().to_string(),
            (false, true) => "✗".red().bold().to_string(),
            (true, false) => "[PASS]".to_string(),
            (false, false) => "[FAIL]".to_string(),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_preprocess(&self, report: &PreprocessReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;
        let gap = &report.gap_report;

        output.push_str(&self.format_header("RESUME TAILORING: PREPROCESS", 1));

        output.push_str(&self.format_header("Keywords", 2));
        output.push_str(&format!(
            "{} keywords extracted ({} primary, {} secondary)\n",
            summary.keywords_total, summary.keywords_primary, summary.keywords_secondary
        ));
        for keyword in &report.keywords {
            output.push_str(&format!(
                "  {} {} ({})\n",
                self.format_importance(keyword.importance),
                keyword.text,
                keyword.category
            ));
            if self.detailed && !keyword.context.is_empty() {
                output.push_str(&format!("      \"{}\"\n", keyword.context));
            }
        }

        output.push_str(&self.format_header("Coverage", 2));
        output.push_str(&format!(
            "Coverage: {}% {} ({} of {} keywords found)\n",
            gap.coverage_percent,
            self.format_coverage_badge(gap.coverage_percent),
            gap.explicit_matches,
            gap.total_keywords
        ));
        for section in &gap.section_coverage {
            output.push_str(&format!(
                "  {:<18} {} found, {} missing\n",
                section.section.to_string(),
                section.found.len(),
                section.missing.len()
            ));
        }
        if self.detailed {
            for detail in &gap.match_details {
                let ids: Vec<&str> = detail.locations.iter().map(|l| l.id.as_str()).collect();
                output.push_str(&format!("  {} -> {}\n", detail.keyword, ids.join(", ")));
            }
        }

        if !gap.missing.is_empty() {
            output.push_str(&self.format_header("Missing Keywords", 3));
            output.push_str(&format!(
                "{} missing ({} primary, {} secondary)\n",
                summary.missing, summary.missing_primary, summary.missing_secondary
            ));
            for missing in &gap.missing {
                let mut line = format!(
                    "  {} {} ({})",
                    self.format_importance(missing.importance),
                    missing.keyword,
                    missing.category
                );
                if let Some(closest) = &missing.closest_match {
                    line.push_str(&format!(" ~ \"{}\" {:.2}", closest, missing.match_score));
                }
                if report.corpus_supported.contains(&missing.keyword) {
                    line.push_str(&format!(" {}", self.colorize("[in corpus]", Color::Cyan)));
                }
                output.push_str(&line);
                output.push('\n');
            }
        }

        output.push_str(&self.format_header("Resume Structure", 2));
        let resume = &report.parsed_resume;
        output.push_str(&format!(
            "Tagline: {} chars | Summary: {} chars\n",
            resume.summary.tagline_char_count, resume.summary.body_char_count
        ));
        output.push_str(&format!(
            "Highlights: {} | Experience bullets: {} | Corpus words: {}\n",
            summary.highlights, summary.experience_bullets, summary.corpus_words
        ));
        for rejected in &resume.rejected_lines {
            output.push_str(&format!(
                "  {} line {}: {} ({})\n",
                self.colorize("rejected", Color::Yellow),
                rejected.line,
                rejected.text,
                rejected.reason
            ));
        }

        Ok(output)
    }

    fn format_validation(&self, report: &ValidationReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;

        output.push_str(&self.format_header("RESUME TAILORING: VALIDATE", 1));
        output.push_str(&format!(
            "{} edits: {} passed, {} failed, {} warnings\n",
            summary.total,
            self.colorize(&summary.passed.to_string(), Color::Green),
            self.colorize(&summary.failed.to_string(), Color::Red),
            summary.warnings
        ));

        output.push_str(&self.format_header("Edits", 2));
        for outcome in &report.results {
            output.push_str(&format!(
                "{} {} ({}, {} chars)\n",
                self.format_status(outcome.result.passed),
                outcome.id,
                outcome.section_type.name(),
                outcome.result.char_count
            ));
            if let Some(keyword) = &outcome.keyword_added {
                output.push_str(&format!("    keyword: {}\n", keyword));
            }
            for warning in &outcome.result.warnings {
                output.push_str(&format!(
                    "    {}: {}\n",
                    self.colorize(&warning.code.to_string(), Color::Yellow),
                    warning.message
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_preprocess(&self, report: &PreprocessReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_validation(&self, report: &ValidationReport) -> Result<String> {
        self.to_json(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
        }
    }

    fn formatter(&self, format: &OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
        }
    }

    pub fn generate_preprocess(&self, report: &PreprocessReport, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_preprocess(report)
    }

    pub fn generate_validation(&self, report: &ValidationReport, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_validation(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content).map_err(|e| {
        ResumeTailorError::OutputFormatting(format!("Failed to write report to {}: {}", file_path.display(), e))
    })
}
