use std::path::Path;

use eyre::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;
use tracing::debug;

use crate::{error::ReportError, plot::Plot};

pub const DEFAULT_CONFIG: &str = "report.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub settings: Settings,
    /// Plots to render, [`None`] renders the default set
    pub plots: Option<Vec<Box<dyn Plot>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Regex matched against directory names under the root to find runs
    pub run_pattern: String,
    /// Name of the output directory, both inside each run and under the root
    pub output_dir: String,
    /// Chart width and height in pixels
    pub chart_size: (u32, u32),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_pattern: "_results$".to_owned(),
            output_dir: "results".to_owned(),
            chart_size: (1000, 600),
        }
    }
}

impl Settings {
    pub fn run_regex(&self) -> Result<Regex, ReportError> {
        Ok(Regex::new(&self.run_pattern)?)
    }
}

impl Config {
    /// Reads a yaml config, falling back to defaults when the file does not exist.
    pub async fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!("No config at {path:?}, using defaults");
            return Ok(Config::default());
        }
        let config = serde_yml::from_str(&read_to_string(path).await?).map_err(|source| {
            ReportError::Config {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(config)
    }
}
