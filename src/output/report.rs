//! Report structures for the preprocess and validate operations

use crate::processing::document::ParsedResume;
use crate::processing::edit_validator::{EditRequest, SectionType, ValidationResult};
use crate::processing::gap_analyzer::GapReport;
use crate::processing::keyword_extractor::{Importance, Keyword};
use serde::{Deserialize, Serialize};

/// Everything an edit-proposing collaborator needs from one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessReport {
    pub summary: PreprocessSummary,
    pub keywords: Vec<Keyword>,
    pub parsed_resume: ParsedResume,
    pub gap_report: GapReport,
    /// Missing keywords that already appear in the corpus, in gap order.
    pub corpus_supported: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessSummary {
    pub keywords_total: usize,
    pub keywords_primary: usize,
    pub keywords_secondary: usize,
    pub explicit_matches: usize,
    pub coverage_percent: usize,
    pub missing: usize,
    pub missing_primary: usize,
    pub missing_secondary: usize,
    pub highlights: usize,
    pub experience_bullets: usize,
    pub rejected_lines: usize,
    pub corpus_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    /// One outcome per edit, in input order.
    pub results: Vec<EditOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub id: String,
    pub section_type: SectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_added: Option<String>,
    pub result: ValidationResult,
}

impl PreprocessReport {
    pub fn new(
        keywords: Vec<Keyword>,
        parsed_resume: ParsedResume,
        gap_report: GapReport,
        corpus_supported: Vec<String>,
        corpus_words: usize,
    ) -> Self {
        let keywords_primary = keywords
            .iter()
            .filter(|k| k.importance == Importance::Primary)
            .count();
        let missing_primary = gap_report
            .missing
            .iter()
            .filter(|m| m.importance == Importance::Primary)
            .count();

        let summary = PreprocessSummary {
            keywords_total: keywords.len(),
            keywords_primary,
            keywords_secondary: keywords.len() - keywords_primary,
            explicit_matches: gap_report.explicit_matches,
            coverage_percent: gap_report.coverage_percent,
            missing: gap_report.missing.len(),
            missing_primary,
            missing_secondary: gap_report.missing.len() - missing_primary,
            highlights: parsed_resume.highlights.len(),
            experience_bullets: parsed_resume.experience_bullets.len(),
            rejected_lines: parsed_resume.rejected_lines.len(),
            corpus_words,
        };

        Self {
            summary,
            keywords,
            parsed_resume,
            gap_report,
            corpus_supported,
        }
    }
}

impl ValidationReport {
    pub fn from_results(edits: &[EditRequest], results: Vec<ValidationResult>) -> Self {
        let results: Vec<EditOutcome> = edits
            .iter()
            .zip(results)
            .map(|(edit, result)| EditOutcome {
                id: edit.id.clone(),
                section_type: edit.section_type,
                keyword_added: edit.keyword_added.clone(),
                result,
            })
            .collect();

        let passed = results.iter().filter(|o| o.result.passed).count();
        let summary = ValidationSummary {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            warnings: results.iter().map(|o| o.result.warnings.len()).sum(),
        };

        Self { summary, results }
    }

    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::edit_validator::{Warning, WarningCode};

    fn edit(id: &str) -> EditRequest {
        EditRequest {
            section_type: SectionType::Highlight,
            id: id.to_string(),
            original: String::new(),
            proposed: String::new(),
            keyword_added: None,
        }
    }

    #[test]
    fn test_preprocess_summary_splits_missing_by_importance() {
        use crate::config::Config;
        use crate::processing::analyzer::TailorEngine;

        let engine = TailorEngine::new(&Config::default()).unwrap();
        let jd = "Fintech leadership role.\nNice extras: kanban.";
        let resume = "EXPERIENCE\nAcme Corp\n- Grew revenue 3x\n";
        let report = engine.preprocess(jd, resume, "").unwrap();
        let summary = &report.summary;

        assert_eq!(summary.missing, report.gap_report.missing.len());
        assert_eq!(summary.missing, 3);
        assert_eq!(summary.missing_primary, 2);
        assert_eq!(summary.missing_secondary, 1);
        assert_eq!(summary.missing_primary + summary.missing_secondary, summary.missing);
    }

    #[test]
    fn test_validation_summary_counts() {
        let failing = ValidationResult {
            passed: false,
            char_count: 300,
            warnings: vec![
                Warning {
                    code: WarningCode::CharExceeded,
                    message: String::new(),
                    items: Vec::new(),
                },
                Warning {
                    code: WarningCode::NewProperNoun,
                    message: String::new(),
                    items: vec!["Initech".to_string()],
                },
            ],
        };
        let passing = ValidationResult {
            passed: true,
            char_count: 160,
            warnings: Vec::new(),
        };

        let report = ValidationReport::from_results(&[edit("a"), edit("b")], vec![failing, passing]);

        assert_eq!(
            report.summary,
            ValidationSummary {
                total: 2,
                passed: 1,
                failed: 1,
                warnings: 2,
            }
        );
        assert_eq!(report.results[0].id, "a");
        assert_eq!(report.results[1].id, "b");
        assert!(!report.all_passed());
    }
}
