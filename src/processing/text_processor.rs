//! Text normalization, tokenization and metric extraction shared by the
//! extraction, parsing and validation stages.

use crate::config::MetricConfig;
use crate::error::{Result, ResumeTailorError};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    stop_words: HashSet<String>,
    metric_regex: Regex,
}

/// Lowercased, punctuation-free text with a byte map back to the source.
///
/// `offsets[i]` is the byte offset in the original text of the character that
/// produced byte `i` of `text`.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub text: String,
    offsets: Vec<usize>,
}

impl NormalizedText {
    /// Byte offset in the original text for a byte offset in `text`.
    pub fn original_offset(&self, normalized_offset: usize) -> usize {
        self.offsets
            .get(normalized_offset)
            .copied()
            .unwrap_or_else(|| self.offsets.last().map(|o| o + 1).unwrap_or(0))
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The set of words a user has already written. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusVocabulary {
    words: BTreeSet<String>,
}

impl CorpusVocabulary {
    pub fn build(processor: &TextProcessor, corpus_text: &str) -> Self {
        let words: BTreeSet<String> = processor.tokenize(corpus_text).into_iter().collect();
        log::debug!("Corpus vocabulary built with {} distinct words", words.len());
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(&MetricConfig::default()).expect("default metric grammar is valid")
    }
}

impl TextProcessor {
    pub fn new(metrics: &MetricConfig) -> Result<Self> {
        let metric_regex = Self::build_metric_regex(&metrics.unit_words)?;

        Ok(Self {
            stop_words: Self::create_stop_words(),
            metric_regex,
        })
    }

    /// Lowercase, replace punctuation with spaces (hyphens between two
    /// alphanumerics survive) and collapse whitespace.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let mut out = String::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len());
        let mut pending_space = false;
        let mut prev: Option<char> = None;
        let mut chars = text.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            let next = chars.peek().map(|&(_, n)| n);
            let keep_hyphen = c == '-'
                && prev.map_or(false, char::is_alphanumeric)
                && next.map_or(false, char::is_alphanumeric);

            if c.is_alphanumeric() || keep_hyphen {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                    offsets.push(idx);
                }
                pending_space = false;

                for lower in c.to_lowercase() {
                    let before = out.len();
                    out.push(lower);
                    offsets.extend(std::iter::repeat(idx).take(out.len() - before));
                }
            } else {
                pending_space = true;
            }
            prev = Some(c);
        }

        NormalizedText { text: out, offsets }
    }

    /// Split text into lowercase words using Unicode word boundaries.
    ///
    /// Every stage that compares vocabularies goes through this function so
    /// the corpus and the edits are cut the same way.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(|w| w.to_lowercase()).collect()
    }

    /// Words with their original casing, for proper-noun detection.
    pub fn words_preserving_case<'t>(&self, text: &'t str) -> Vec<&'t str> {
        text.unicode_words().collect()
    }

    /// Metric literals in left-to-right order, duplicates kept.
    pub fn extract_metrics(&self, text: &str) -> Vec<String> {
        self.metric_regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// The sentence containing byte `offset`, delimited by `!`, `?`, a line
    /// break, or a `.` followed by whitespace or the end of the text.
    pub fn sentence_at<'t>(&self, text: &'t str, offset: usize) -> &'t str {
        let bytes = text.as_bytes();
        let offset = offset.min(bytes.len());

        let is_boundary = |i: usize| -> bool {
            match bytes[i] {
                b'!' | b'?' | b'\n' | b'\r' => true,
                b'.' => bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace()),
                _ => false,
            }
        };

        let start = (0..offset)
            .rev()
            .find(|&i| is_boundary(i))
            .map(|i| i + 1)
            .unwrap_or(0);

        let end = (offset..bytes.len())
            .find(|&i| is_boundary(i))
            .map(|i| if matches!(bytes[i], b'\n' | b'\r') { i } else { i + 1 })
            .unwrap_or(bytes.len());

        // Delimiters are ASCII, so both ends are char boundaries.
        text[start..end].trim()
    }

    fn build_metric_regex(unit_words: &[String]) -> Result<Regex> {
        let mut units: Vec<String> = unit_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .map(|w| regex::escape(&w))
            .collect();
        // Longer unit words first so alternation prefers "engineers" over "engineer".
        units.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        units.dedup();

        let mut alternatives = vec![
            // currency: $1,200,000 / $59M / $1.5B
            r"\$\d{1,3}(?:,\d{3})+(?:\.\d+)?[KMB]?".to_string(),
            r"\$\d+(?:\.\d+)?[KMB]?".to_string(),
            // percentages
            r"\b\d+(?:\.\d+)?%".to_string(),
            // multipliers
            r"\b\d+(?:\.\d+)?x\b".to_string(),
        ];
        if !units.is_empty() {
            alternatives.push(format!(r"\b\d+\+?\s+(?i:{})\b", units.join("|")));
        }
        // plus-counts: 15+
        alternatives.push(r"\b\d+\+".to_string());

        Regex::new(&alternatives.join("|"))
            .map_err(|e| ResumeTailorError::Configuration(format!("Invalid metric grammar: {}", e)))
    }

    /// Create set of common English stop words
    fn create_stop_words() -> HashSet<String> {
        let stop_words = [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
            "of", "with", "by", "from", "as", "is", "was", "are", "were", "been",
            "be", "have", "has", "had", "do", "does", "did", "will", "would",
            "could", "should", "may", "might", "must", "that", "which", "who",
            "this", "these", "those", "it", "its", "i", "my", "our", "we", "they",
            "their", "your", "up", "out", "into", "over", "under", "through",
            "during", "before", "after", "above", "below", "between", "among",
            "while", "when", "where", "how", "what", "why", "all", "each", "every",
            "both", "few", "more", "most", "other", "some", "such", "no", "not",
            "only", "same", "so", "than", "too", "very", "just", "also", "now",
            "new", "first", "last", "long", "great", "little", "own", "well",
            "back", "way", "even", "still", "here", "there", "then", "can", "any",
            "about", "across", "within", "including", "led", "leading", "using",
        ];

        stop_words.iter().map(|&s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        let processor = TextProcessor::default();
        let normalized = processor.normalize("  Machine   Learning,\nA/B testing; state-of-the-art -- done. ");

        assert_eq!(normalized.text, "machine learning a b testing state-of-the-art done");
    }

    #[test]
    fn test_normalize_keeps_only_internal_hyphens() {
        let processor = TextProcessor::default();
        assert_eq!(processor.normalize("- cross-functional -").text, "cross-functional");
        assert_eq!(processor.normalize("0-1 builds").text, "0-1 builds");
    }

    #[test]
    fn test_normalized_offsets_point_into_original() {
        let processor = TextProcessor::default();
        let original = "Hello,  World";
        let normalized = processor.normalize(original);

        let idx = normalized.text.find("world").unwrap();
        assert_eq!(&original[normalized.original_offset(idx)..], "World");
    }

    #[test]
    fn test_tokenization() {
        let processor = TextProcessor::default();
        let tokens = processor.tokenize("Drove $59M in revenue, scaling Node.js adoption!");

        assert_eq!(tokens, vec!["drove", "59m", "in", "revenue", "scaling", "node.js", "adoption"]);
    }

    #[test]
    fn test_metric_extraction_grammar() {
        let processor = TextProcessor::default();
        let metrics = processor.extract_metrics(
            "Drove $59M and $1,200,000 (+35%) with 3x faster delivery, led 12 engineers and 50+ partners across 15+ regions; $59M again.",
        );

        assert_eq!(
            metrics,
            vec!["$59M", "$1,200,000", "35%", "3x", "12 engineers", "50+ partners", "15+ regions", "$59M"]
        );
    }

    #[test]
    fn test_bare_integers_without_units_are_not_metrics() {
        let processor = TextProcessor::default();
        assert!(processor.extract_metrics("Shipped 8 ML models in 2021").is_empty());
    }

    #[test]
    fn test_decimal_percentage_is_one_literal() {
        let processor = TextProcessor::default();
        assert_eq!(processor.extract_metrics("grew 12.5% QoQ"), vec!["12.5%"]);
    }

    #[test]
    fn test_sentence_at() {
        let processor = TextProcessor::default();
        let text = "We build with Node.js daily. You know machine learning well!\nNext line";

        let offset = text.find("machine").unwrap();
        assert_eq!(processor.sentence_at(text, offset), "You know machine learning well!");

        let offset = text.find("Node").unwrap();
        assert_eq!(processor.sentence_at(text, offset), "We build with Node.js daily.");

        let offset = text.find("Next").unwrap();
        assert_eq!(processor.sentence_at(text, offset), "Next line");
    }

    #[test]
    fn test_corpus_vocabulary_is_case_insensitive() {
        let processor = TextProcessor::default();
        let vocabulary = CorpusVocabulary::build(&processor, "Scaling Enterprise adoption.");

        assert_eq!(vocabulary.len(), 3);
        assert!(vocabulary.contains("enterprise"));
        assert!(vocabulary.contains("Scaling"));
        assert!(!vocabulary.contains("revenue"));
    }
}
