//! Command-line arguments for the `rate-impact` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, StudyConfig};
use crate::profiles;

/// Residential bill impact of a large flexible load.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Load the study from a TOML file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (regulated, pjm, miso, ercot).
    #[arg(long, value_name = "NAME", conflicts_with = "utility")]
    pub preset: Option<String>,

    /// Use a named utility from the catalog (e.g., dominion-virginia).
    #[arg(long, value_name = "ID", conflicts_with = "config")]
    pub utility: Option<String>,

    /// List catalog utilities by region and exit.
    #[arg(long)]
    pub list_utilities: bool,

    /// Override the projection horizon (5-30 years).
    #[arg(long, value_name = "N")]
    pub years: Option<usize>,

    /// Export all four trajectories to CSV.
    #[arg(long, value_name = "PATH")]
    pub csv_out: Option<PathBuf>,

    /// Print trajectories and summary as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Start the REST API server after the report.
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    /// Resolves the study from `--config`, `--preset` or `--utility`, else
    /// `regulated`. `--years` overrides the study's horizon.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file, preset or utility cannot be loaded.
    pub fn load_study(&self) -> Result<StudyConfig, ConfigError> {
        let mut study = if let Some(path) = &self.config {
            StudyConfig::from_toml_file(path)?
        } else if let Some(name) = &self.preset {
            StudyConfig::from_preset(name)?
        } else if let Some(id) = &self.utility {
            profiles::study_for(id)?
        } else {
            StudyConfig::regulated()
        };
        if let Some(years) = self.years {
            study.projection.years = years;
        }
        Ok(study)
    }
}
