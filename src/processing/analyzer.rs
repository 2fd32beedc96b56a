//! Engine composing keyword extraction, résumé parsing, gap analysis and
//! edit validation

use crate::config::Config;
use crate::error::Result;
use crate::output::report::{PreprocessReport, ValidationReport};
use crate::processing::document::ParsedResume;
use crate::processing::edit_validator::{parse_edit_requests, EditRequest, EditValidator, ValidationResult};
use crate::processing::gap_analyzer::{GapAnalyzer, GapReport};
use crate::processing::keyword_extractor::{Keyword, KeywordExtractor, PatternTable};
use crate::processing::resume_parser::ResumeParser;
use crate::processing::text_processor::{CorpusVocabulary, TextProcessor};
use log::info;

/// Owns the immutable pattern table and text primitives built once from
/// configuration. Every operation is a pure function of its inputs.
pub struct TailorEngine {
    processor: TextProcessor,
    patterns: PatternTable,
    config: Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub categories: usize,
    pub pattern_terms: usize,
}

impl TailorEngine {
    pub fn new(config: &Config) -> Result<Self> {
        let processor = TextProcessor::new(&config.metrics)?;
        let patterns = PatternTable::from_config(&config.keywords, &processor)?;

        Ok(Self {
            processor,
            patterns,
            config: config.clone(),
        })
    }

    pub fn extract_keywords(&self, jd_text: &str) -> Vec<Keyword> {
        KeywordExtractor::new(&self.patterns, &self.processor, self.config.keywords.importance).extract(jd_text)
    }

    pub fn parse_resume(&self, resume_text: &str) -> Result<ParsedResume> {
        ResumeParser::new(&self.processor, self.config.resume.tagline_separator)?.parse(resume_text)
    }

    pub fn analyze_gaps(&self, keywords: &[Keyword], resume: &ParsedResume) -> GapReport {
        GapAnalyzer::new(&self.processor, self.config.gap.closest_match_floor).analyze(keywords, resume)
    }

    pub fn corpus_vocabulary(&self, corpus_text: &str) -> CorpusVocabulary {
        CorpusVocabulary::build(&self.processor, corpus_text)
    }

    /// Pipeline A: keywords, parsed résumé and their gap report.
    pub fn preprocess(&self, jd_text: &str, resume_text: &str, corpus_text: &str) -> Result<PreprocessReport> {
        let parsed_resume = self.parse_resume(resume_text)?;
        let keywords = self.extract_keywords(jd_text);
        let gap_report = self.analyze_gaps(&keywords, &parsed_resume);

        let corpus_supported = self.corpus_supported(&gap_report, corpus_text);
        let corpus_words = self.corpus_vocabulary(corpus_text).len();

        info!(
            "Preprocessed: {} keywords, {}% coverage, {} missing ({} already in corpus)",
            gap_report.total_keywords,
            gap_report.coverage_percent,
            gap_report.missing.len(),
            corpus_supported.len()
        );

        Ok(PreprocessReport::new(
            keywords,
            parsed_resume,
            gap_report,
            corpus_supported,
            corpus_words,
        ))
    }

    pub fn validate_edit(&self, edit: &EditRequest, corpus: &CorpusVocabulary) -> ValidationResult {
        self.validator().validate(&edit.original, &edit.proposed, corpus, edit.section_type)
    }

    /// Pipeline B over a batch. Results keep the order of `edits`.
    pub fn validate(&self, edits: &[EditRequest], corpus_text: &str) -> ValidationReport {
        let corpus = self.corpus_vocabulary(corpus_text);
        let validator = self.validator();

        let results = edits
            .iter()
            .map(|edit| validator.validate(&edit.original, &edit.proposed, &corpus, edit.section_type))
            .collect();

        let report = ValidationReport::from_results(edits, results);
        info!(
            "Validated {} edits: {} passed, {} failed",
            report.summary.total, report.summary.passed, report.summary.failed
        );
        report
    }

    /// Parse an edits document and validate it. A malformed entry fails the
    /// whole batch.
    pub fn validate_json(&self, edits_json: &str, corpus_text: &str) -> Result<ValidationReport> {
        let edits = parse_edit_requests(edits_json)?;
        Ok(self.validate(&edits, corpus_text))
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            categories: self.patterns.categories().len(),
            pattern_terms: self.patterns.term_count(),
        }
    }

    fn validator(&self) -> EditValidator<'_> {
        EditValidator::new(
            &self.processor,
            self.config.validation.bands.clone(),
            self.config.validation.exempt_stopwords,
        )
    }

    /// Missing keywords whose normalized form occurs in the normalized corpus.
    fn corpus_supported(&self, gap_report: &GapReport, corpus_text: &str) -> Vec<String> {
        let corpus = self.processor.normalize(corpus_text).text;

        gap_report
            .missing
            .iter()
            .filter(|m| {
                let needle = self.processor.normalize(&m.keyword).text;
                !needle.is_empty() && corpus.contains(&needle)
            })
            .map(|m| m.keyword.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResumeTailorError;
    use crate::processing::keyword_extractor::Importance;

    const JD: &str = "Senior PM, Machine Learning Platforms\n\
        We need a product leader to own our machine learning roadmap.\n\
        Requirements:\n\
        - Experience with recommendation systems\n\
        - Fintech background preferred\n";

    const RESUME: &str = "Jane Doe\n\
        Product Leader | Machine Learning | Roadmap Strategy\n\
        Ships ML products end to end.\n\
        \n\
        EXPERIENCE\n\
        Acme Corp | Senior PM | 2019 – Present\n\
        - Owned the machine learning roadmap, growing revenue 35%.\n";

    #[test]
    fn test_engine_creation() {
        let engine = TailorEngine::new(&Config::default()).unwrap();
        let stats = engine.stats();

        assert_eq!(stats.categories, 9);
        assert!(stats.pattern_terms > 50);
    }

    #[test]
    fn test_preprocess_end_to_end() {
        let engine = TailorEngine::new(&Config::default()).unwrap();
        let report = engine
            .preprocess(JD, RESUME, "Built a fintech lending product.")
            .unwrap();

        let texts: Vec<&str> = report.keywords.iter().map(|k| k.text.as_str()).collect();
        assert!(texts.contains(&"machine learning"));
        assert!(texts.contains(&"roadmap"));
        assert!(texts.contains(&"fintech"));

        let ml = report.keywords.iter().find(|k| k.text == "machine learning").unwrap();
        assert_eq!(ml.importance, Importance::Primary);

        assert_eq!(report.summary.keywords_total, report.gap_report.total_keywords);
        assert_eq!(report.summary.experience_bullets, 1);
        assert!(report.gap_report.missing.iter().any(|m| m.keyword == "fintech"));
        assert_eq!(report.corpus_supported, vec!["fintech"]);
    }

    #[test]
    fn test_preprocess_is_byte_identical_across_runs() {
        let engine = TailorEngine::new(&Config::default()).unwrap();
        let first = serde_json::to_string(&engine.preprocess(JD, RESUME, "").unwrap()).unwrap();
        let second = serde_json::to_string(&engine.preprocess(JD, RESUME, "").unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_preprocess_fails_without_resume_structure() {
        let engine = TailorEngine::new(&Config::default()).unwrap();
        let result = engine.preprocess(JD, "Just a paragraph about me.", "");

        assert!(matches!(result, Err(ResumeTailorError::StructuralParse(_))));
    }

    #[test]
    fn test_validate_json_preserves_order() {
        let engine = TailorEngine::new(&Config::default()).unwrap();
        let edits = r#"[
            {"section_type": "bullet_one_line", "id": "acme_0",
             "original": "Drove $59M in revenue by productizing 8 ML models.",
             "proposed": "Drove $50M in revenue by productizing 8 ML models."},
            {"section_type": "bullet_one_line", "id": "acme_1",
             "original": "Drove $59M in revenue by productizing 8 ML models.",
             "proposed": "Drove $59M in revenue by productizing 8 ML models, scaling enterprise adoption."}
        ]"#;

        let report = engine
            .validate_json(edits, "Known for scaling enterprise adoption.")
            .unwrap();

        assert_eq!(report.results[0].id, "acme_0");
        assert!(!report.results[0].result.passed);
        assert_eq!(report.results[1].id, "acme_1");
        assert!(report.results[1].result.passed);
        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 1);
    }
}
