//! cv-ranker: compare and rank CVs by skills, similarity and pairwise ratings

use anyhow::Context;
use clap::Parser;
use cv_ranker::cli::{self, Cli, Commands, ConfigAction};
use cv_ranker::config::{Config, OutputFormat};
use cv_ranker::error::CvRankerError;
use cv_ranker::input::InputManager;
use cv_ranker::output::{save_report_to_file, suggest_filename, ReportGenerator};
use cv_ranker::processing::{KeywordSet, RankingEngine};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level)
    ).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Rank {
            files,
            keywords,
            output,
            save,
            no_rating,
            no_similarity,
            detailed,
        } => {
            let output_format = match output {
                Some(format) => {
                    cli::parse_output_format(&format).map_err(CvRankerError::InvalidInput)?
                }
                None => config.output.format,
            };

            let keywords = match keywords {
                Some(list) => KeywordSet::parse(&list),
                None => KeywordSet::new(&config.default_keywords),
            };
            if keywords.is_empty() {
                warn!("No keywords given; every CV will score 0");
            }

            info!("Ranking {} CVs", files.len());
            let texts = extract_all(&files).await;
            let names = document_names(&files);
            let documents: Vec<(String, String)> = names.into_iter().zip(texts).collect();

            let mut engine = RankingEngine::new(&config).context("Invalid rating configuration")?;
            if no_rating {
                engine = engine.with_rating(false);
            }
            if no_similarity {
                engine = engine.with_similarity(false);
            }
            let report = engine
                .rank(documents, &keywords)
                .with_context(|| format!("Failed to rank {} CVs", files.len()))?;

            let detailed = detailed || config.output.detailed;
            let generator =
                ReportGenerator::with_options(config.output.color_output, detailed, true, true);
            let rendered = generator
                .generate_report(&report, &output_format)
                .context("Failed to render report")?;
            println!("{}", rendered);

            if let Some(save_path) = save {
                // Files never carry terminal colour codes
                let plain = ReportGenerator::with_options(false, detailed, true, true);
                let content = plain
                    .generate_report(&report, &output_format)
                    .context("Failed to render report")?;
                let target = resolve_save_path(save_path, &output_format);
                save_report_to_file(&content, &target)
                    .with_context(|| format!("Failed to save report to {}", target.display()))?;
                println!("💾 Saved report to {}", target.display());
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let rendered =
                    toml::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("{}", rendered);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default()
                    .save_to(config_path)
                    .with_context(|| format!("Failed to write {}", config_path.display()))?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}

/// Extract every file in order. Unreadable or unsupported files become empty
/// documents so they still appear on the leaderboard with a zero score.
async fn extract_all(files: &[PathBuf]) -> Vec<String> {
    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut input_manager = InputManager::new();
    let mut texts = Vec::with_capacity(files.len());

    for path in files {
        if let Err(e) = cli::validate_file_extension(path, cli::SUPPORTED_EXTENSIONS) {
            warn!("{}: {}", path.display(), e);
        }
        progress.set_message(path.display().to_string());
        texts.push(input_manager.extract_or_empty(path).await);
        progress.inc(1);
    }

    progress.finish_and_clear();
    texts
}

/// File names identify CVs; full paths are used when two names collide.
/// The same path given twice is suffixed by the ranking engine.
fn document_names(files: &[PathBuf]) -> Vec<String> {
    let short: Vec<String> = files
        .iter()
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        })
        .collect();

    let unique: HashSet<&String> = short.iter().collect();
    if unique.len() == short.len() {
        short
    } else {
        files.iter().map(|path| path.display().to_string()).collect()
    }
}

fn resolve_save_path(path: PathBuf, format: &OutputFormat) -> PathBuf {
    if path.is_dir() {
        path.join(suggest_filename(format, "cv_leaderboard", true))
    } else {
        path
    }
}
