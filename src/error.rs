//! Error handling for PPP batch processing.
//!
//! Per-day failures (missing archive, extraction, solver launch, parse) are
//! non-fatal: the orchestrator downgrades them to a logged skip. Only the
//! preflight check and an empty aggregate abort the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("No observation archive for day {ordinal:03}: {path}")]
    MissingArchive { ordinal: u32, path: PathBuf },

    #[error("Failed to extract archive {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("Template rendering failed for {path}: {reason}")]
    Template { path: PathBuf, reason: String },

    #[error("Solver ran but produced no output file at {expected}")]
    SolverLaunch { expected: PathBuf },

    #[error("Malformed solver output in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error(
        "PPP solver unavailable: {reason}. \
         Install the solver and point `ppp_executable` at it"
    )]
    Preflight { reason: String },

    /// Every day in the range was skipped. An inverted date range never gets
    /// this far; it is rejected as [`PppError::Configuration`] at load time.
    #[error("No day in the requested range produced usable data; nothing was written")]
    Data,
}

impl PppError {
    /// True for errors the orchestrator downgrades to a per-day skip.
    pub fn is_day_skip(&self) -> bool {
        matches!(
            self,
            PppError::MissingArchive { .. }
                | PppError::Extraction { .. }
                | PppError::Template { .. }
                | PppError::SolverLaunch { .. }
                | PppError::Parse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PppError>;
