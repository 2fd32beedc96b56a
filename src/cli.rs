//! CLI interface for the resume tailor

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-tailor")]
#[command(about = "Deterministic keyword gap analysis and edit validation for tailoring a resume")]
#[command(long_about = "Extract job-description keywords, map them onto a parsed resume, and check proposed edits against character budgets, metrics and the vocabulary of your own writing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract keywords, parse the resume and report coverage gaps
    Preprocess {
        /// Path to job description file (TXT, MD)
        #[arg(short, long)]
        jd: PathBuf,

        /// Path to resume file (TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to corpus of your own writing (TXT, MD)
        #[arg(long)]
        corpus: PathBuf,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, console
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Validate proposed edits against integrity rules
    Validate {
        /// Path to edits file (JSON array)
        #[arg(short, long)]
        edits: PathBuf,

        /// Path to corpus of your own writing (TXT, MD)
        #[arg(long)]
        corpus: PathBuf,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, console
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_preprocess_args() {
        let cli = Cli::try_parse_from([
            "resume-tailor", "-v", "preprocess", "--jd", "jd.md", "--resume", "resume.txt", "--corpus", "corpus.txt", "-f", "console",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Preprocess { jd, format, output, .. } => {
                assert_eq!(jd, PathBuf::from("jd.md"));
                assert_eq!(format.as_deref(), Some("console"));
                assert!(output.is_none());
            }
            _ => panic!("expected preprocess"),
        }
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("console"), Ok(OutputFormat::Console));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("edits.JSON"), &["json"]).is_ok());
        assert!(validate_file_extension(Path::new("resume.pdf"), &["txt", "md"]).is_err());
        assert!(validate_file_extension(Path::new("README"), &["txt"]).is_err());
    }
}
