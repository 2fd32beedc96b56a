//! Keyword coverage of a parsed résumé

use crate::processing::document::{ParsedResume, ResumeSection, SpanKind};
use crate::processing::keyword_extractor::{Importance, Keyword};
use crate::processing::text_processor::TextProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub total_keywords: usize,
    pub explicit_matches: usize,
    /// `explicit_matches / total_keywords` as a round-half-up percentage.
    pub coverage_percent: usize,
    pub missing: Vec<MissingKeyword>,
    pub match_details: Vec<KeywordLocations>,
    pub section_coverage: Vec<SectionCoverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingKeyword {
    pub keyword: String,
    pub category: String,
    pub importance: Importance,
    pub closest_match: Option<String>,
    pub match_score: f64,
}

/// Every span that contains a matched keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordLocations {
    pub keyword: String,
    pub locations: Vec<SpanLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanLocation {
    pub section: ResumeSection,
    pub kind: SpanKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCoverage {
    pub section: ResumeSection,
    pub found: Vec<String>,
    pub missing: Vec<String>,
}

pub struct GapAnalyzer<'a> {
    processor: &'a TextProcessor,
    closest_match_floor: f64,
}

/// A résumé span reduced to its normalized text and words.
struct NormalizedSpan<'r> {
    kind: SpanKind,
    id: &'r str,
    text: String,
    words: Vec<String>,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(processor: &'a TextProcessor, closest_match_floor: f64) -> Self {
        Self {
            processor,
            closest_match_floor,
        }
    }

    pub fn analyze(&self, keywords: &[Keyword], resume: &ParsedResume) -> GapReport {
        let spans: Vec<NormalizedSpan<'_>> = resume
            .spans()
            .into_iter()
            .map(|span| {
                let normalized = self.processor.normalize(span.text).text;
                NormalizedSpan {
                    kind: span.kind,
                    id: span.id,
                    words: normalized.split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect(),
                    text: normalized,
                }
            })
            .collect();

        let mut missing = Vec::new();
        let mut match_details = Vec::new();
        let mut section_coverage: Vec<SectionCoverage> = [
            ResumeSection::Summary,
            ResumeSection::Highlights,
            ResumeSection::Experience,
        ]
        .into_iter()
        .map(|section| SectionCoverage {
            section,
            found: Vec::new(),
            missing: Vec::new(),
        })
        .collect();

        for keyword in keywords {
            // Plain containment, so "apis" and "ai-powered" cover "api" and "ai".
            let needle = self.processor.normalize(&keyword.text).text;
            let locations: Vec<SpanLocation> = spans
                .iter()
                .filter(|span| !needle.is_empty() && span.text.contains(&needle))
                .map(|span| SpanLocation {
                    section: span.kind.section(),
                    kind: span.kind,
                    id: span.id.to_string(),
                })
                .collect();

            for coverage in &mut section_coverage {
                if locations.iter().any(|l| l.section == coverage.section) {
                    coverage.found.push(keyword.text.clone());
                } else {
                    coverage.missing.push(keyword.text.clone());
                }
            }

            if locations.is_empty() {
                let (closest_match, match_score) = self.closest_match(&keyword.text, &spans);
                debug!(
                    "Missing keyword '{}' (closest: {:?}, {:.2})",
                    keyword.text, closest_match, match_score
                );
                missing.push(MissingKeyword {
                    keyword: keyword.text.clone(),
                    category: keyword.category.clone(),
                    importance: keyword.importance,
                    closest_match,
                    match_score,
                });
            } else {
                match_details.push(KeywordLocations {
                    keyword: keyword.text.clone(),
                    locations,
                });
            }
        }

        // Stable: extraction order survives within each importance level.
        missing.sort_by_key(|m| m.importance);

        let total_keywords = keywords.len();
        let explicit_matches = match_details.len();

        GapReport {
            total_keywords,
            explicit_matches,
            coverage_percent: coverage_percent(explicit_matches, total_keywords),
            missing,
            match_details,
            section_coverage,
        }
    }

    /// Best n-gram of the keyword's word count across all spans. Ties keep the
    /// earliest candidate.
    fn closest_match(&self, keyword: &str, spans: &[NormalizedSpan<'_>]) -> (Option<String>, f64) {
        let target = self.processor.normalize(keyword).text;
        let width = target.split(' ').count();
        if target.is_empty() {
            return (None, 0.0);
        }

        let mut best: Option<(String, f64)> = None;
        for span in spans {
            for window in span.words.windows(width) {
                let candidate = window.join(" ");
                let score = normalized_levenshtein(&target, &candidate);
                if best.as_ref().map_or(true, |(_, s)| score > *s) {
                    best = Some((candidate, score));
                }
            }
        }

        match best {
            Some((candidate, score)) if score >= self.closest_match_floor => (Some(candidate), score),
            _ => (None, 0.0),
        }
    }
}

/// Round-half-up integer percentage; 0 when there is nothing to cover.
pub fn coverage_percent(found: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (found * 200 + total) / (2 * total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::{Bullet, Highlight, ResumeSummary};

    fn keyword(text: &str, importance: Importance) -> Keyword {
        Keyword {
            text: text.to_string(),
            category: "ai_ml".to_string(),
            importance,
            context: String::new(),
        }
    }

    fn resume(bullets: &[&str]) -> ParsedResume {
        ParsedResume {
            summary: ResumeSummary::new(
                "Product Leader | AI Platforms".to_string(),
                "Builds machine-learning products for enterprise customers.".to_string(),
            ),
            highlights: vec![Highlight {
                id: "highlight_0".to_string(),
                label: "Growth".to_string(),
                text: "Tripled revenue".to_string(),
                full_text: "Growth: Tripled revenue".to_string(),
                char_count: 23,
                metrics: Vec::new(),
            }],
            experience_bullets: bullets
                .iter()
                .enumerate()
                .map(|(i, text)| Bullet {
                    id: format!("acme_{}", i),
                    employer: "Acme".to_string(),
                    role: None,
                    text: text.to_string(),
                    char_count: text.chars().count(),
                    metrics: Vec::new(),
                })
                .collect(),
            rejected_lines: Vec::new(),
        }
    }

    #[test]
    fn test_locations_cover_every_matching_span() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let report = analyzer.analyze(
            &[keyword("revenue", Importance::Primary)],
            &resume(&["Grew revenue 3x"]),
        );

        assert_eq!(report.explicit_matches, 1);
        let ids: Vec<&str> = report.match_details[0].locations.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["highlight_0", "acme_0"]);
        assert_eq!(report.section_coverage[0].missing, vec!["revenue"]);
        assert_eq!(report.section_coverage[1].found, vec!["revenue"]);
        assert_eq!(report.section_coverage[2].found, vec!["revenue"]);
    }

    #[test]
    fn test_plural_and_hyphenated_forms_match() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let keywords = vec![
            keyword("api", Importance::Primary),
            keyword("ai", Importance::Primary),
            keyword("platform", Importance::Secondary),
        ];
        let report = analyzer.analyze(&keywords, &resume(&["Built public APIs and AI-powered platforms for partners"]));

        assert_eq!(report.explicit_matches, 3);
        assert!(report.missing.is_empty());
        assert_eq!(report.coverage_percent, 100);
        for detail in &report.match_details {
            assert!(
                detail.locations.iter().any(|l| l.id == "acme_0"),
                "{} not located in the bullet",
                detail.keyword
            );
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let report = analyzer.analyze(&[keyword("AI PLATFORMS", Importance::Primary)], &resume(&[]));

        assert_eq!(report.explicit_matches, 1);
        assert_eq!(report.match_details[0].locations[0].kind, SpanKind::SummaryTagline);
    }

    #[test]
    fn test_missing_sorted_primary_first_in_extraction_order() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let keywords = vec![
            keyword("kanban", Importance::Secondary),
            keyword("fintech", Importance::Primary),
            keyword("scrum", Importance::Secondary),
            keyword("web3", Importance::Primary),
        ];
        let report = analyzer.analyze(&keywords, &resume(&[]));

        let order: Vec<&str> = report.missing.iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(order, vec!["fintech", "web3", "kanban", "scrum"]);
        assert_eq!(report.coverage_percent, 0);
    }

    #[test]
    fn test_closest_match_above_floor() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let report = analyzer.analyze(
            &[keyword("recommender systems", Importance::Primary)],
            &resume(&["Shipped recommender system for retail"]),
        );

        let missing = &report.missing[0];
        assert_eq!(missing.closest_match.as_deref(), Some("recommender system"));
        assert!(missing.match_score >= 0.75 && missing.match_score < 1.0);
    }

    #[test]
    fn test_closest_match_below_floor_is_none() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let report = analyzer.analyze(&[keyword("blockchain", Importance::Primary)], &resume(&["Ran payroll"]));

        assert_eq!(report.missing[0].closest_match, None);
        assert_eq!(report.missing[0].match_score, 0.0);
    }

    #[test]
    fn test_coverage_is_monotonic() {
        let processor = TextProcessor::default();
        let analyzer = GapAnalyzer::new(&processor, 0.75);
        let keywords = vec![
            keyword("kubernetes", Importance::Primary),
            keyword("revenue", Importance::Primary),
            keyword("churn", Importance::Secondary),
        ];

        let before = analyzer.analyze(&keywords, &resume(&["Owned churn dashboards"]));
        let after = analyzer.analyze(
            &keywords,
            &resume(&["Owned churn dashboards", "Migrated services to Kubernetes"]),
        );

        assert!(after.explicit_matches >= before.explicit_matches);
        assert_eq!(before.explicit_matches, 2);
        assert_eq!(after.explicit_matches, 3);
        assert_eq!(before.coverage_percent, 67);
        assert_eq!(after.coverage_percent, 100);
    }

    #[test]
    fn test_coverage_percent_rounds_half_up() {
        assert_eq!(coverage_percent(0, 0), 0);
        assert_eq!(coverage_percent(1, 8), 13);
        assert_eq!(coverage_percent(1, 3), 33);
        assert_eq!(coverage_percent(1, 200), 1);
        assert_eq!(coverage_percent(5, 5), 100);
    }
}
