//! resume-tailor: deterministic keyword gap analysis and edit validation

use clap::Parser;
use log::{error, info};
use resume_tailor::cli::{self, Cli, Commands, ConfigAction};
use resume_tailor::config::{Config, OutputFormat};
use resume_tailor::error::{Result, ResumeTailorError};
use resume_tailor::input::InputManager;
use resume_tailor::output::formatter::{save_report_to_file, ReportGenerator};
use resume_tailor::TailorEngine;
use std::path::{Path, PathBuf};
use std::process;

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run_command(cli.command, cli.config, cli.verbose).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config_path: Option<PathBuf>, verbose: bool) -> Result<()> {
    match command {
        Commands::Preprocess {
            jd,
            resume,
            corpus,
            output,
            format,
        } => {
            let config = load_config(config_path.as_deref())?;
            info!("Starting preprocess");

            for (label, path) in [("Job description", &jd), ("Resume", &resume), ("Corpus", &corpus)] {
                cli::validate_file_extension(path, &TEXT_EXTENSIONS)
                    .map_err(|e| ResumeTailorError::InvalidInput(format!("{} file: {}", label, e)))?;
            }
            let format = resolve_format(format.as_deref(), &config)?;

            let mut input_manager = InputManager::new();
            let jd_text = input_manager.extract_text(&jd).await?;
            let resume_text = input_manager.extract_text(&resume).await?;
            let corpus_text = input_manager.extract_text(&corpus).await?;

            let engine = TailorEngine::new(&config)?;
            let report = engine.preprocess(&jd_text, &resume_text, &corpus_text)?;

            let generator = ReportGenerator::with_options(config.output.color_output && output.is_none(), verbose, true);
            let rendered = generator.generate_preprocess(&report, &format)?;
            emit(&rendered, output.as_deref())?;
        }

        Commands::Validate {
            edits,
            corpus,
            output,
            format,
        } => {
            let config = load_config(config_path.as_deref())?;
            info!("Starting validation");

            cli::validate_file_extension(&edits, &["json"])
                .map_err(|e| ResumeTailorError::InvalidInput(format!("Edits file: {}", e)))?;
            cli::validate_file_extension(&corpus, &TEXT_EXTENSIONS)
                .map_err(|e| ResumeTailorError::InvalidInput(format!("Corpus file: {}", e)))?;
            let format = resolve_format(format.as_deref(), &config)?;

            let mut input_manager = InputManager::new();
            let edits_json = input_manager.extract_text(&edits).await?;
            let corpus_text = input_manager.extract_text(&corpus).await?;

            let engine = TailorEngine::new(&config)?;
            let report = engine.validate_json(&edits_json, &corpus_text)?;

            let generator = ReportGenerator::with_options(config.output.color_output && output.is_none(), verbose, true);
            let rendered = generator.generate_validation(&report, &format)?;
            emit(&rendered, output.as_deref())?;
        }

        Commands::Config { action } => {
            let explicit = config_path.is_some();
            let path = config_path.unwrap_or_else(Config::config_path);

            match action {
                Some(ConfigAction::Show) | None => {
                    let config = if explicit { Config::load_from(&path)? } else { Config::load()? };
                    let content = toml::to_string_pretty(&config)
                        .map_err(|e| ResumeTailorError::Configuration(format!("Failed to serialize config: {}", e)))?;
                    println!("# {}\n{}", path.display(), content);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    info!("Configuration reset to defaults at {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(ResumeTailorError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            save_report_to_file(rendered, path)?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
