//! Keyword extraction from job descriptions against a configured pattern table

use crate::config::{ImportanceWeights, KeywordConfig};
use crate::error::{Result, ResumeTailorError};
use crate::processing::text_processor::TextProcessor;
use aho_corasick::{AhoCorasick, MatchKind};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub category: String,
    pub importance: Importance,
    /// Sentence containing the first occurrence.
    pub context: String,
}

/// Which importance signals fired for one keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportanceSignals {
    pub early: bool,
    pub repeated: bool,
    pub in_requirements: bool,
}

impl ImportanceSignals {
    pub fn score(&self, weights: &ImportanceWeights) -> f32 {
        let mut score = 0.0;
        if self.early {
            score += weights.position_weight;
        }
        if self.repeated {
            score += weights.frequency_weight;
        }
        if self.in_requirements {
            score += weights.requirements_weight;
        }
        score
    }

    pub fn classify(&self, weights: &ImportanceWeights) -> Importance {
        if self.score(weights) >= weights.primary_threshold {
            Importance::Primary
        } else {
            Importance::Secondary
        }
    }
}

#[derive(Debug, Clone)]
struct Pattern {
    surface: String,
    normalized: String,
    category: usize,
}

/// Immutable category → surface-form table, built once from configuration.
pub struct PatternTable {
    categories: Vec<String>,
    patterns: Vec<Pattern>,
    matcher: Option<AhoCorasick>,
    experience_category: Option<usize>,
    experience_regex: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    Pattern(usize),
    Experience(String),
}

#[derive(Debug, Clone)]
struct Occurrence {
    start: usize,
    end: usize,
    source: Source,
}

impl PatternTable {
    pub fn from_config(config: &KeywordConfig, processor: &TextProcessor) -> Result<Self> {
        let mut categories: Vec<String> = Vec::with_capacity(config.categories.len());
        let mut patterns: Vec<Pattern> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (category_idx, category) in config.categories.iter().enumerate() {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(ResumeTailorError::Configuration(
                    "Keyword category names must not be empty".to_string(),
                ));
            }
            if categories.iter().any(|c| c == name) {
                return Err(ResumeTailorError::Configuration(format!(
                    "Keyword category '{}' is declared twice",
                    name
                )));
            }
            categories.push(name.to_string());

            for term in &category.terms {
                let normalized = processor.normalize(term).text;
                if normalized.is_empty() {
                    return Err(ResumeTailorError::Configuration(format!(
                        "Term '{}' in category '{}' has no matchable characters",
                        term, name
                    )));
                }

                if let Some(&existing) = seen.get(&normalized) {
                    let owner = &categories[patterns[existing].category];
                    debug!("Term '{}' already declared under '{}', ignoring it in '{}'", term, owner, name);
                    continue;
                }

                seen.insert(normalized.clone(), patterns.len());
                patterns.push(Pattern {
                    surface: term.trim().to_string(),
                    normalized,
                    category: category_idx,
                });
            }
        }

        let experience_category = match &config.experience_category {
            Some(name) => Some(categories.iter().position(|c| c == name.trim()).ok_or_else(|| {
                ResumeTailorError::Configuration(format!(
                    "experience_category '{}' is not a declared category",
                    name
                ))
            })?),
            None => None,
        };

        let matcher = if patterns.is_empty() {
            None
        } else {
            let needles: Vec<&str> = patterns.iter().map(|p| p.normalized.as_str()).collect();
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::Standard)
                    .build(&needles)
                    .map_err(|e| ResumeTailorError::Processing(format!("Failed to build keyword matcher: {}", e)))?,
            )
        };

        let experience_regex = Regex::new(r"\b(\d+)\s*years?\s+(?:of\s+)?experience\b")
            .map_err(|e| ResumeTailorError::Processing(format!("Invalid experience pattern: {}", e)))?;

        debug!("Pattern table built: {} categories, {} terms", categories.len(), patterns.len());

        Ok(Self {
            categories,
            patterns,
            matcher,
            experience_category,
            experience_regex,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn term_count(&self) -> usize {
        self.patterns.len()
    }

    /// Whole-word occurrences in normalized text under the leftmost-longest
    /// policy: a match starting inside an accepted longer match is dropped.
    fn find_occurrences(&self, text: &str) -> Vec<Occurrence> {
        let bytes = text.as_bytes();
        let bounded = |start: usize, end: usize| {
            (start == 0 || matches!(bytes[start - 1], b' ' | b'-'))
                && (end == bytes.len() || matches!(bytes[end], b' ' | b'-'))
        };

        let mut candidates = Vec::new();

        if let Some(matcher) = &self.matcher {
            for mat in matcher.find_overlapping_iter(text) {
                if bounded(mat.start(), mat.end()) {
                    candidates.push(Occurrence {
                        start: mat.start(),
                        end: mat.end(),
                        source: Source::Pattern(mat.pattern().as_usize()),
                    });
                }
            }
        }

        if self.experience_category.is_some() {
            for caps in self.experience_regex.captures_iter(text) {
                if let (Some(whole), Some(years)) = (caps.get(0), caps.get(1)) {
                    candidates.push(Occurrence {
                        start: whole.start(),
                        end: whole.end(),
                        source: Source::Experience(years.as_str().to_string()),
                    });
                }
            }
        }

        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.end.cmp(&a.end))
                .then_with(|| a.source.cmp(&b.source))
        });

        let mut accepted = Vec::with_capacity(candidates.len());
        let mut covered_until = 0;
        for candidate in candidates {
            if candidate.start >= covered_until {
                covered_until = candidate.end;
                accepted.push(candidate);
            }
        }
        accepted
    }
}

/// Extracts [`Keyword`]s from job-description text.
pub struct KeywordExtractor<'a> {
    table: &'a PatternTable,
    processor: &'a TextProcessor,
    weights: ImportanceWeights,
}

struct Tally {
    text: String,
    category: usize,
    first_start: usize,
    count: usize,
    in_requirements: bool,
}

impl<'a> KeywordExtractor<'a> {
    pub fn new(table: &'a PatternTable, processor: &'a TextProcessor, weights: ImportanceWeights) -> Self {
        Self { table, processor, weights }
    }

    /// Keywords in order of first occurrence. No match is an empty result.
    pub fn extract(&self, jd_text: &str) -> Vec<Keyword> {
        let normalized = self.processor.normalize(jd_text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let requirement_blocks = requirement_blocks(jd_text);
        let in_requirements = |normalized_offset: usize| {
            let offset = normalized.original_offset(normalized_offset);
            requirement_blocks.iter().any(|block| block.contains(&offset))
        };

        let mut tallies: Vec<Tally> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for occurrence in self.table.find_occurrences(&normalized.text) {
            let (identity, text, category) = match &occurrence.source {
                Source::Pattern(id) => {
                    let pattern = &self.table.patterns[*id];
                    (pattern.normalized.clone(), pattern.surface.clone(), pattern.category)
                }
                Source::Experience(years) => {
                    let text = format!("{}+ years experience", years);
                    let identity = self.processor.normalize(&text).text;
                    // Only reachable when the table has an experience category.
                    let category = self.table.experience_category.unwrap_or_default();
                    (identity, text, category)
                }
            };

            let inside = in_requirements(occurrence.start);
            match index.get(&identity) {
                Some(&i) => {
                    let tally = &mut tallies[i];
                    tally.count += 1;
                    tally.in_requirements |= inside;
                }
                None => {
                    index.insert(identity, tallies.len());
                    tallies.push(Tally {
                        text,
                        category,
                        first_start: occurrence.start,
                        count: 1,
                        in_requirements: inside,
                    });
                }
            }
        }

        let document_len = normalized.len();
        let keywords: Vec<Keyword> = tallies
            .into_iter()
            .map(|tally| {
                let signals = ImportanceSignals {
                    early: tally.first_start * 3 < document_len,
                    repeated: tally.count >= 2,
                    in_requirements: tally.in_requirements,
                };
                let context = self
                    .processor
                    .sentence_at(jd_text, normalized.original_offset(tally.first_start))
                    .to_string();

                Keyword {
                    text: tally.text,
                    category: self.table.categories[tally.category].clone(),
                    importance: signals.classify(&self.weights),
                    context,
                }
            })
            .collect();

        debug!("Extracted {} keywords from {} normalized bytes", keywords.len(), document_len);
        keywords
    }
}

/// Byte ranges of the original text that sit under a requirements or
/// qualifications heading, up to the next heading of any kind.
fn requirement_blocks(text: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if let Some(is_requirements) = classify_heading(line) {
            if let Some(start) = open.take() {
                blocks.push(start..line_start);
            }
            if is_requirements {
                open = Some(line_start);
            }
        }
    }

    if let Some(start) = open {
        blocks.push(start..text.len());
    }
    blocks
}

/// `Some(is_requirements)` when the line is a heading.
fn classify_heading(line: &str) -> Option<bool> {
    const SECTION_WORDS: [&str; 11] = [
        "requirement", "qualification", "must have", "must-have", "nice to have",
        "preferred", "responsibilit", "about", "benefit", "bonus", "what you",
    ];
    const REQUIREMENT_WORDS: [&str; 4] = ["requirement", "qualification", "must have", "must-have"];

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with('•') {
        return None;
    }

    let markdown = trimmed.starts_with('#');
    let core = trimmed.trim_start_matches('#').trim().trim_matches(|c: char| c == '*' || c == '_').trim();
    let is_requirements = |label: &str| {
        let lower = label.to_lowercase();
        REQUIREMENT_WORDS.iter().any(|w| lower.contains(w))
    };

    if let Some(label) = core.strip_suffix(':') {
        let label = label.trim_matches(|c: char| c == '*' || c == '_').trim();
        if label.split_whitespace().count() <= 6 {
            return Some(is_requirements(label));
        }
    }

    let words = core.split_whitespace().count();
    let all_caps = core.chars().any(char::is_alphabetic) && !core.chars().any(char::is_lowercase);
    if markdown || (all_caps && words <= 6) {
        return Some(is_requirements(core));
    }

    // Inline form: "Requirements: Python, SQL".
    if let Some((label, rest)) = core.split_once(':') {
        let label = label.trim_matches(|c: char| c == '*' || c == '_').trim();
        let lower = label.to_lowercase();
        if !rest.trim().is_empty()
            && label.split_whitespace().count() <= 4
            && SECTION_WORDS.iter().any(|w| lower.contains(w))
        {
            return Some(is_requirements(label));
        }
    }

    None
}
