//! PPP Batch Processor Library
//!
//! Batch-processes daily GNSS observation archives through an external
//! Precise Point Positioning solver and aggregates the results into one
//! georeferenced time series.
//!
//! The pipeline per calendar day:
//! - locate and extract the station's observation archive
//! - render the solver configuration from a template
//! - invoke the external solver (skipped when the day's output already
//!   exists)
//! - parse the solver output into position samples
//! - transform ECEF positions into local East-North-Up coordinates
//!
//! Successful days are concatenated, indexed by timestamp and written once
//! as a Parquet dataset for comparison against the reference position.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod processor;
pub mod solver;
pub mod template;
pub mod transform;

pub use config::{ProcessingConfig, SolverKind};
pub use error::{PppError, Result};
pub use models::{BatchStats, DayContext, DaySeries, PositionSample};
pub use processor::BatchProcessor;
