//! Integrity checks for a proposed edit of one résumé span

use crate::config::{CharBand, CharBands};
use crate::error::{Result, ResumeTailorError};
use crate::processing::document::char_count;
use crate::processing::text_processor::{CorpusVocabulary, TextProcessor};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The layout slot an edited span occupies. Decides its character band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    #[serde(alias = "summaryTagline")]
    SummaryTagline,
    #[serde(alias = "summaryBody")]
    SummaryBody,
    Highlight,
    #[serde(alias = "bulletOneLine")]
    BulletOneLine,
    #[serde(alias = "bulletTwoLine")]
    BulletTwoLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    CharExceeded,
    CharAwkward,
    MetricsLost,
    HallucinationRisk,
    NewProperNoun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
    /// Offending literals or words, in the order they were found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub char_count: usize,
    pub warnings: Vec<Warning>,
}

/// One entry of an edits file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub section_type: SectionType,
    pub id: String,
    pub original: String,
    pub proposed: String,
    /// Keyword the edit is meant to introduce. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_added: Option<String>,
}

pub struct EditValidator<'a> {
    processor: &'a TextProcessor,
    bands: CharBands,
    exempt_stopwords: bool,
}

impl SectionType {
    pub fn name(self) -> &'static str {
        match self {
            SectionType::SummaryTagline => "summary_tagline",
            SectionType::SummaryBody => "summary_body",
            SectionType::Highlight => "highlight",
            SectionType::BulletOneLine => "bullet_one_line",
            SectionType::BulletTwoLine => "bullet_two_line",
        }
    }

    pub fn band(self, bands: &CharBands) -> CharBand {
        match self {
            SectionType::SummaryTagline => bands.summary_tagline,
            SectionType::SummaryBody => bands.summary_body,
            SectionType::Highlight => bands.highlight,
            SectionType::BulletOneLine => bands.bullet_one_line,
            SectionType::BulletTwoLine => bands.bullet_two_line,
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            WarningCode::CharExceeded => "CHAR_EXCEEDED",
            WarningCode::CharAwkward => "CHAR_AWKWARD",
            WarningCode::MetricsLost => "METRICS_LOST",
            WarningCode::HallucinationRisk => "HALLUCINATION_RISK",
            WarningCode::NewProperNoun => "NEW_PROPER_NOUN",
        };
        write!(f, "{}", code)
    }
}

impl ValidationResult {
    pub fn warning_codes(&self) -> Vec<WarningCode> {
        self.warnings.iter().map(|w| w.code).collect()
    }

    pub fn has(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

impl<'a> EditValidator<'a> {
    pub fn new(processor: &'a TextProcessor, bands: CharBands, exempt_stopwords: bool) -> Self {
        Self {
            processor,
            bands,
            exempt_stopwords,
        }
    }

    /// Run every check against `proposed`. Warnings are data; nothing here
    /// fails or rewrites the edit.
    pub fn validate(
        &self,
        original: &str,
        proposed: &str,
        corpus: &CorpusVocabulary,
        section_type: SectionType,
    ) -> ValidationResult {
        let length = char_count(proposed);
        let original_words: HashSet<String> = self.processor.tokenize(original).into_iter().collect();

        let mut warnings = Vec::new();
        warnings.extend(self.check_length(length, section_type));
        warnings.extend(self.check_metrics(original, proposed));
        warnings.extend(self.check_vocabulary(proposed, &original_words, corpus));
        warnings.extend(self.check_proper_nouns(original, proposed, corpus));

        debug!(
            "Validated {:?} edit ({} chars): {} warnings",
            section_type,
            length,
            warnings.len()
        );

        ValidationResult {
            passed: warnings.is_empty(),
            char_count: length,
            warnings,
        }
    }

    fn check_length(&self, length: usize, section_type: SectionType) -> Option<Warning> {
        let band = section_type.band(&self.bands);

        if length > band.max {
            return Some(Warning {
                code: WarningCode::CharExceeded,
                message: format!(
                    "{} characters exceeds the {}-{} band for {}",
                    length,
                    band.min,
                    band.max,
                    section_type.name()
                ),
                items: Vec::new(),
            });
        }

        match band.awkward {
            Some((low, high)) if (low..=high).contains(&length) => Some(Warning {
                code: WarningCode::CharAwkward,
                message: format!(
                    "{} characters falls in the awkward {}-{} range for {}",
                    length,
                    low,
                    high,
                    section_type.name()
                ),
                items: Vec::new(),
            }),
            _ => None,
        }
    }

    /// Each metric occurrence in the original must survive as a literal
    /// substring. Order does not matter; duplicates count individually.
    fn check_metrics(&self, original: &str, proposed: &str) -> Option<Warning> {
        let metrics = self.processor.extract_metrics(original);

        let mut lost = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for literal in &metrics {
            if !seen.insert(literal.as_str()) {
                continue;
            }
            let needed = metrics.iter().filter(|m| *m == literal).count();
            let present = proposed.matches(literal.as_str()).count();
            lost.extend(std::iter::repeat(literal.clone()).take(needed.saturating_sub(present)));
        }

        if lost.is_empty() {
            return None;
        }
        Some(Warning {
            code: WarningCode::MetricsLost,
            message: format!("Metrics missing from the proposed text: {}", lost.join(", ")),
            items: lost,
        })
    }

    /// Words that appear in neither the original nor the corpus.
    fn check_vocabulary(
        &self,
        proposed: &str,
        original_words: &HashSet<String>,
        corpus: &CorpusVocabulary,
    ) -> Option<Warning> {
        let mut unknown: Vec<String> = Vec::new();
        for word in self.processor.tokenize(proposed) {
            if original_words.contains(&word)
                || corpus.contains(&word)
                || (self.exempt_stopwords && self.processor.is_stop_word(&word))
                || unknown.contains(&word)
            {
                continue;
            }
            unknown.push(word);
        }

        if unknown.is_empty() {
            return None;
        }
        Some(Warning {
            code: WarningCode::HallucinationRisk,
            message: format!("Words not found in the corpus: {}", unknown.join(", ")),
            items: unknown,
        })
    }

    /// Capitalized words absent from the original with the same casing, so a
    /// lowercase "apple" does not vouch for "Apple".
    fn check_proper_nouns(&self, original: &str, proposed: &str, corpus: &CorpusVocabulary) -> Option<Warning> {
        let original_words: HashSet<&str> = self.processor.words_preserving_case(original).into_iter().collect();
        let mut nouns: Vec<String> = Vec::new();
        for word in self.processor.words_preserving_case(proposed) {
            let capitalized = word.chars().next().map_or(false, char::is_uppercase);
            let letters = word.chars().filter(|c| c.is_alphabetic()).count();
            if !capitalized || letters < 2 {
                continue;
            }
            if original_words.contains(word) || corpus.contains(word) || nouns.iter().any(|n| n == word) {
                continue;
            }
            nouns.push(word.to_string());
        }

        if nouns.is_empty() {
            return None;
        }
        Some(Warning {
            code: WarningCode::NewProperNoun,
            message: format!("New capitalized terms: {}", nouns.join(", ")),
            items: nouns,
        })
    }
}

/// Parse an edits document: a JSON array of [`EditRequest`] objects. The
/// first malformed entry fails the whole batch and is named by index.
pub fn parse_edit_requests(json: &str) -> Result<Vec<EditRequest>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| {
        ResumeTailorError::InvalidInput(format!("Edits must be a JSON array of objects: {}", e))
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<EditRequest>(entry).map_err(|e| ResumeTailorError::Schema {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
