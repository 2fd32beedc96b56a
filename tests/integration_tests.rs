//! Integration tests for the resume tailor

use resume_tailor::config::{CharBand, Config, OutputFormat};
use resume_tailor::input::manager::InputManager;
use resume_tailor::output::formatter::{save_report_to_file, ReportGenerator};
use resume_tailor::processing::edit_validator::WarningCode;
use resume_tailor::processing::keyword_extractor::Importance;
use resume_tailor::{ResumeTailorError, TailorEngine};
use std::path::Path;
use tempfile::tempdir;

async fn read_fixture(name: &str) -> String {
    let mut manager = InputManager::new();
    manager
        .extract_text(&Path::new("tests/fixtures").join(name))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let result = manager.extract_text(path).await;
    assert!(result.is_ok());

    let text = result.unwrap();
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("PROFESSIONAL IMPACT"));
    assert!(text.contains("$59M"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let text = read_fixture("sample_resume.md").await;

    assert!(text.contains("Jane Doe"));
    assert!(text.contains("Node.js"));
    assert!(text.contains("- Launched a recommendation platform"));
    // Emphasis and code markers are gone, heading markers stay.
    assert!(!text.contains("**"));
    assert!(!text.contains('`'));
    assert!(text.contains("## Career Highlights"));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text1 = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let text2 = manager.extract_text(path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/unsupported.xyz")).await;

    assert!(matches!(result, Err(ResumeTailorError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/nonexistent.txt")).await;

    assert!(matches!(result, Err(ResumeTailorError::InputNotFound(_))));
}

#[tokio::test]
async fn test_preprocess_from_fixtures() {
    let jd = read_fixture("sample_jd.md").await;
    let resume = read_fixture("sample_resume.txt").await;
    let corpus = read_fixture("corpus.txt").await;

    let engine = TailorEngine::new(&Config::default()).unwrap();
    let report = engine.preprocess(&jd, &resume, &corpus).unwrap();

    assert_eq!(report.keywords[0].text, "ai");
    let years = report
        .keywords
        .iter()
        .find(|k| k.text == "5+ years experience")
        .unwrap();
    assert_eq!(years.category, "qualification");
    assert_eq!(years.importance, Importance::Primary);

    let fintech = report.keywords.iter().find(|k| k.text == "fintech").unwrap();
    assert_eq!(fintech.category, "domain");
    assert_eq!(fintech.importance, Importance::Primary);
    assert!(fintech.context.ends_with("Fintech or B2B SaaS background"));

    let resume = &report.parsed_resume;
    assert_eq!(resume.summary.tagline, "Product Strategy & Innovation | AI/ML Platforms | Enterprise SaaS");
    assert_eq!(resume.highlights.len(), 2);
    assert_eq!(resume.experience_bullets.len(), 3);
    assert_eq!(resume.experience_bullets[0].metrics, vec!["35%", "15+ markets"]);
    assert_eq!(resume.rejected_lines.len(), 1);

    let gap = &report.gap_report;
    assert_eq!(gap.total_keywords, report.keywords.len());
    assert!(gap.explicit_matches > 0);
    assert!(gap.match_details.iter().any(|d| d.keyword == "machine learning"));
    assert!(gap.missing.iter().any(|m| m.keyword == "roadmap"));

    assert!(report.corpus_supported.contains(&"fintech".to_string()));
    assert!(report.corpus_supported.contains(&"stakeholder".to_string()));
    assert!(report.corpus_supported.contains(&"experimentation".to_string()));
    // The corpus only has the plural "roadmaps".
    assert!(report.corpus_supported.contains(&"roadmap".to_string()));
    assert!(!report.corpus_supported.contains(&"b2b".to_string()));
}

#[tokio::test]
async fn test_markdown_resume_parses_like_text() {
    let resume = read_fixture("sample_resume.md").await;
    let engine = TailorEngine::new(&Config::default()).unwrap();
    let parsed = engine.parse_resume(&resume).unwrap();

    assert_eq!(parsed.summary.tagline, "Product Strategy & Innovation | AI/ML Platforms | Enterprise SaaS");
    assert_eq!(parsed.highlights[0].label, "AI/ML & Product Innovation");
    assert_eq!(parsed.highlights[0].metrics, vec!["$59M"]);

    let ids: Vec<&str> = parsed.experience_bullets.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["acme_corp_0", "acme_corp_1"]);
    assert_eq!(parsed.experience_bullets[1].metrics, vec!["50+ partners"]);
    assert_eq!(parsed.experience_bullets[1].role.as_deref(), Some("Senior Product Manager"));
}

#[tokio::test]
async fn test_preprocess_output_is_deterministic() {
    let jd = read_fixture("sample_jd.md").await;
    let resume = read_fixture("sample_resume.txt").await;
    let corpus = read_fixture("corpus.txt").await;

    let generator = ReportGenerator::with_options(false, false, true);
    let render = || {
        let engine = TailorEngine::new(&Config::default()).unwrap();
        let report = engine.preprocess(&jd, &resume, &corpus).unwrap();
        generator.generate_preprocess(&report, &OutputFormat::Json).unwrap()
    };

    assert_eq!(render(), render());
}

#[tokio::test]
async fn test_validate_edits_from_fixtures() {
    let edits = read_fixture("edits.json").await;
    let corpus = read_fixture("corpus.txt").await;

    let engine = TailorEngine::new(&Config::default()).unwrap();
    let report = engine.validate_json(&edits, &corpus).unwrap();

    let ids: Vec<&str> = report.results.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["acme_corp_0", "acme_corp_1", "summary_tagline"]);

    let first = &report.results[0];
    assert!(first.result.passed);
    assert_eq!(first.keyword_added.as_deref(), Some("enterprise"));

    let second = &report.results[1].result;
    assert!(!second.passed);
    let lost = second
        .warnings
        .iter()
        .find(|w| w.code == WarningCode::MetricsLost)
        .unwrap();
    assert_eq!(lost.items, vec!["$59M"]);

    let third = &report.results[2].result;
    assert_eq!(third.char_count, 121);
    assert_eq!(third.warning_codes(), vec![WarningCode::CharExceeded]);

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 2);
}

#[tokio::test]
async fn test_invalid_edits_fail_with_schema_error() {
    let edits = read_fixture("invalid_edits.json").await;
    let engine = TailorEngine::new(&Config::default()).unwrap();

    match engine.validate_json(&edits, "") {
        Err(ResumeTailorError::Schema { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_header_less_resume_is_structural_error() {
    let engine = TailorEngine::new(&Config::default()).unwrap();
    let result = engine.preprocess("Machine learning role", "I build things.\n- and ship them", "");

    assert!(matches!(result, Err(ResumeTailorError::StructuralParse(_))));
}

#[test]
fn test_custom_config_changes_bands() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.validation.bands.summary_tagline = CharBand::new(10, 130);
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    let engine = TailorEngine::new(&loaded).unwrap();
    let edits = r#"[{"section_type": "summary_tagline", "id": "t", "original": "x",
        "proposed": "Product Strategy & Innovation | AI/ML Platforms | Enterprise SaaS | Fintech Lending | Stakeholder Trust | Experimentation"}]"#;
    let corpus = "fintech lending stakeholder trust experimentation product strategy innovation ai ml platforms enterprise saas";

    let report = engine.validate_json(edits, corpus).unwrap();
    assert!(report.all_passed(), "{:?}", report.results[0].result.warnings);
}

#[test]
fn test_report_written_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("report.json");

    let engine = TailorEngine::new(&Config::default()).unwrap();
    let report = engine.validate(&[], "");
    let rendered = ReportGenerator::default()
        .generate_validation(&report, &OutputFormat::Json)
        .unwrap();
    save_report_to_file(&rendered, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["summary"]["total"], 0);
    assert_eq!(value["results"].as_array().map(|r| r.len()), Some(0));
}
