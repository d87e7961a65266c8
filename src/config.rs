//! Run configuration loading and validation.
//!
//! A batch run is described by a single YAML file shared with the
//! preprocessing tools. The configuration is loaded once at startup into an
//! immutable [`ProcessingConfig`] value and passed by reference into every
//! component; there is no ambient state.

use crate::error::{PppError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which external solver convention to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Direct convention: `<exe> <obs> <conf>`, fixed-name output file that
    /// is renamed to the day's target afterwards.
    RtPpp,
    /// Positioning convention: `<exe> -x 2 -y 0 -k <conf> -o <out> <obs> <nav>`.
    Rtklib,
}

/// Immutable configuration for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Four-character station identifier, e.g. `onrj`.
    pub station: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Working directory the solver runs in; also roots the per-station
    /// archive tree and the `output/` folder.
    pub run_folder: PathBuf,
    pub experiment_name: String,
    pub ppp_solution: SolverKind,
    pub ppp_executable: PathBuf,
    /// Optional command (executable plus arguments) used for the preflight
    /// check instead of running `ppp_executable` bare. Split on whitespace,
    /// so the program path cannot itself contain spaces.
    #[serde(default)]
    pub ppp_executable_test: Option<String>,
    pub ppp_template_conf: PathBuf,
    /// ECEF reference position in meters, the ENU anchor.
    pub reference_position: [f64; 3],
    pub ionex_folder: PathBuf,
    /// Daily ionospheric correction file name; `{doy}` and `{y2d}` are
    /// substituted literally.
    #[serde(default = "default_ionex_pattern")]
    pub ionex_pattern: String,
    /// Path of the aggregated dataset; defaults to
    /// `<run_folder>/<experiment_name>.parquet`.
    #[serde(default)]
    pub save_array_as: Option<PathBuf>,
    /// Force solver re-runs even when a day's output file already exists.
    #[serde(default)]
    pub update_pos: bool,
}

fn default_ionex_pattern() -> String {
    "codg{doy}0.{y2d}i".to_string()
}

impl ProcessingConfig {
    /// Load and validate a run configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PppError::Configuration {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config: ProcessingConfig =
            serde_yaml::from_str(&text).map_err(|e| PppError::Configuration {
                message: format!("invalid configuration {}: {}", path.display(), e),
            })?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.station.trim().is_empty() {
            return Err(PppError::Configuration {
                message: "`station` must not be empty".to_string(),
            });
        }
        if self.end_date < self.start_date {
            return Err(PppError::Configuration {
                message: format!(
                    "`end_date` {} precedes `start_date` {}",
                    self.end_date, self.start_date
                ),
            });
        }
        if self.experiment_name.trim().is_empty() && self.save_array_as.is_none() {
            return Err(PppError::Configuration {
                message: "either `experiment_name` or `save_array_as` must be set".to_string(),
            });
        }
        Ok(())
    }

    /// Root of the per-station archive tree.
    pub fn station_folder(&self) -> PathBuf {
        self.run_folder.join(&self.station)
    }

    /// Folder holding the per-day solver output files.
    pub fn output_folder(&self) -> PathBuf {
        self.run_folder.join("output")
    }

    /// Fixed rendered-configuration path, overwritten once per day. The
    /// templater and the invoker must agree on this name; it is the reason
    /// the date loop is strictly sequential.
    pub fn temporary_conf(&self) -> PathBuf {
        self.run_folder.join("temporary.inp")
    }

    /// Where the aggregated dataset is written.
    pub fn dataset_path(&self) -> PathBuf {
        match &self.save_array_as {
            Some(path) => path.clone(),
            None => self
                .run_folder
                .join(format!("{}.parquet", self.experiment_name)),
        }
    }
}
