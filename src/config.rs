//! Configuration management for the CV ranker

use crate::error::{CvRankerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub rating: RatingConfig,
    pub output: OutputConfig,
    pub default_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub compute_similarity: bool,
    pub refine_ratings: bool,
}

/// Gaussian rating environment. Defaults follow the usual TrueSkill
/// constants scaled from a mean of 25.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    pub initial_sigma: f64,
    pub beta: f64,
    pub tau: f64,
    pub sigma_floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_sigma: 25.0 / 3.0,
            beta: 25.0 / 6.0,
            tau: 25.0 / 300.0,
            sigma_floor: 0.01,
        }
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_sigma > 0.0) {
            return Err(CvRankerError::Configuration(format!(
                "rating.initial_sigma must be positive, got {}",
                self.initial_sigma
            )));
        }
        if !(self.beta > 0.0) {
            return Err(CvRankerError::Configuration(format!(
                "rating.beta must be positive, got {}",
                self.beta
            )));
        }
        if !(self.tau >= 0.0) {
            return Err(CvRankerError::Configuration(format!(
                "rating.tau must not be negative, got {}",
                self.tau
            )));
        }
        if !(self.sigma_floor >= 0.0) {
            return Err(CvRankerError::Configuration(format!(
                "rating.sigma_floor must not be negative, got {}",
                self.sigma_floor
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig {
                compute_similarity: true,
                refine_ratings: true,
            },
            rating: RatingConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
            default_keywords: vec![
                "Python".to_string(),
                "Machine Learning".to_string(),
                "Data Analysis".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| CvRankerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.rating.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvRankerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-ranker")
            .join("config.toml")
    }
}
