//! Configuration management for the resume tailor

use crate::error::{Result, ResumeTailorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub keywords: KeywordConfig,
    pub resume: ResumeConfig,
    pub metrics: MetricConfig,
    pub gap: GapConfig,
    pub validation: ValidationConfig,
    pub output: OutputConfig,
}

/// Keyword pattern table and importance scoring.
///
/// `categories` is an ordered list: when a surface form is declared under
/// more than one category, the first declaration wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Category that receives "N+ years of experience" requirements.
    /// Disabled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_category: Option<String>,
    pub importance: ImportanceWeights,
    pub categories: Vec<CategoryPatterns>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPatterns {
    pub name: String,
    pub terms: Vec<String>,
}

/// Weights of the importance signals. A keyword is PRIMARY when the sum of
/// the weights of its satisfied signals reaches `primary_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportanceWeights {
    /// First occurrence within the first third of the document.
    pub position_weight: f32,
    /// Surface form occurs two or more times.
    pub frequency_weight: f32,
    /// Occurrence inside a "requirements"/"qualifications" block.
    pub requirements_weight: f32,
    pub primary_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeConfig {
    /// Character that marks the summary tagline line.
    pub tagline_separator: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Words that turn an adjacent bare integer into a metric ("8 engineers").
    pub unit_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapConfig {
    /// Minimum normalized Levenshtein similarity for a closest-match suggestion.
    pub closest_match_floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Skip common stopwords in the hallucination check.
    pub exempt_stopwords: bool,
    pub bands: CharBands,
}

/// Character-count bands, one per section type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharBands {
    pub summary_tagline: CharBand,
    pub summary_body: CharBand,
    pub highlight: CharBand,
    pub bullet_one_line: CharBand,
    pub bullet_two_line: CharBand,
}

/// `(min, max)` acceptable length plus an optional awkward sub-range.
/// Lengths below `min` are never flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharBand {
    pub min: usize,
    pub max: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awkward: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl CharBand {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max, awkward: None }
    }

    pub const fn with_awkward(mut self, low: usize, high: usize) -> Self {
        self.awkward = Some((low, high));
        self
    }
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            position_weight: 1.0,
            frequency_weight: 1.0,
            requirements_weight: 1.0,
            primary_threshold: 1.0,
        }
    }
}

impl Default for CharBands {
    fn default() -> Self {
        Self {
            summary_tagline: CharBand::new(60, 100),
            summary_body: CharBand::new(300, 500),
            highlight: CharBand::new(150, 250),
            bullet_one_line: CharBand::new(80, 116),
            // A bullet between one and two full lines leaves a ragged second line.
            bullet_two_line: CharBand::new(175, 235).with_awkward(117, 174),
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let category = |name: &str, terms: &[&str]| CategoryPatterns {
            name: name.to_string(),
            terms: terms.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            experience_category: Some("qualification".to_string()),
            importance: ImportanceWeights::default(),
            categories: vec![
                category("strategy", &[
                    "product strategy", "product vision", "roadmap", "strategic", "vision",
                    "go-to-market", "gtm", "north star", "product-market fit", "pmf",
                    "product-led growth", "plg", "okrs", "kpis",
                ]),
                category("ai_ml", &[
                    "ai", "ml", "machine learning", "artificial intelligence", "deep learning",
                    "nlp", "natural language processing", "llm", "large language model",
                    "genai", "generative ai", "agentic", "autonomous", "intelligent",
                    "recommendation", "recommender", "predictive", "computer vision",
                ]),
                category("outcome", &[
                    "growth", "acquisition", "retention", "engagement", "conversion",
                    "arr", "revenue", "arpu", "ltv", "cltv", "churn", "nps",
                    "adoption", "activation", "onboarding", "funnel", "metrics",
                ]),
                category("methodology", &[
                    "agile", "scrum", "lean", "kanban", "sprint", "velocity",
                    "design thinking", "a/b testing", "ab testing", "experimentation",
                    "jtbd", "jobs to be done",
                ]),
                category("leadership", &[
                    "cross-functional", "stakeholder", "executive", "leadership",
                    "team management", "mentorship", "coaching", "collaboration",
                    "high-performing", "building teams", "scaling teams",
                ]),
                category("domain", &[
                    "fintech", "healthtech", "automotive", "enterprise", "consumer",
                    "e-commerce", "ecommerce", "web3", "blockchain", "saas", "b2b", "b2c",
                    "b2b2c",
                ]),
                category("product", &[
                    "product management", "product lifecycle", "0-1", "zero-to-one",
                    "discovery", "validation", "mvp", "iteration", "hypothesis",
                    "user research", "customer discovery", "customer-centric", "user-centric",
                ]),
                category("technical", &[
                    "platform", "api", "integration", "data-driven", "analytics",
                    "data strategy", "scalable", "scale",
                ]),
                category("qualification", &[]),
            ],
        }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            unit_words: [
                "models", "engineers", "products", "customers", "users", "teams",
                "countries", "markets", "people", "employees", "clients", "partners",
                "features", "launches", "patents", "reports", "languages", "regions",
                "designers", "scientists", "brands", "stores", "sites", "apps",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: KeywordConfig::default(),
            resume: ResumeConfig { tagline_separator: '|' },
            metrics: MetricConfig::default(),
            gap: GapConfig { closest_match_floor: 0.75 },
            validation: ValidationConfig {
                exempt_stopwords: true,
                bands: CharBands::default(),
            },
            output: OutputConfig {
                format: OutputFormat::Json,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the user configuration, writing the defaults on first use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit configuration file. Unlike [`Config::load`] a missing
    /// file is an error, never silently replaced by defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ResumeTailorError::InputNotFound(format!(
                "Configuration file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ResumeTailorError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeTailorError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-tailor")
            .join("config.toml")
    }

    /// Check value ranges. Category tables are checked when the pattern
    /// table is built.
    pub fn validate(&self) -> Result<()> {
        let bands = &self.validation.bands;
        for (name, band) in [
            ("summary_tagline", &bands.summary_tagline),
            ("summary_body", &bands.summary_body),
            ("highlight", &bands.highlight),
            ("bullet_one_line", &bands.bullet_one_line),
            ("bullet_two_line", &bands.bullet_two_line),
        ] {
            if band.min > band.max {
                return Err(ResumeTailorError::Configuration(format!(
                    "Band {} has min {} above max {}",
                    name, band.min, band.max
                )));
            }
            if let Some((low, high)) = band.awkward {
                if low > high {
                    return Err(ResumeTailorError::Configuration(format!(
                        "Band {} has an empty awkward range ({}, {})",
                        name, low, high
                    )));
                }
            }
        }

        if !(0.0..=1.0).contains(&self.gap.closest_match_floor) {
            return Err(ResumeTailorError::Configuration(format!(
                "gap.closest_match_floor must be within 0.0..=1.0, got {}",
                self.gap.closest_match_floor
            )));
        }

        if self.resume.tagline_separator.is_whitespace() {
            return Err(ResumeTailorError::Configuration(
                "resume.tagline_separator must not be whitespace".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validation.bands.summary_tagline, CharBand::new(60, 100));
        assert_eq!(config.validation.bands.bullet_two_line.awkward, Some((117, 174)));
    }

    #[test]
    fn test_config_round_trip_through_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::default();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.keywords.categories[0].name, "strategy");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ResumeTailorError::InputNotFound(_))));
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let mut config = Config::default();
        config.validation.bands.highlight = CharBand::new(300, 100);
        assert!(matches!(config.validate(), Err(ResumeTailorError::Configuration(_))));
    }

    #[test]
    fn test_floor_out_of_range_is_rejected() {
        let mut config = Config::default();
        config.gap.closest_match_floor = 1.5;
        assert!(config.validate().is_err());
    }
}
