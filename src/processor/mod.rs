//! Batch orchestration.
//!
//! Walks the configured date range one calendar day at a time, strictly
//! sequentially (the rendered configuration and the direct convention's
//! fixed output name are shared, so concurrent days would corrupt each
//! other), coordinates archive resolution, solver invocation, parsing and
//! the ENU transform, and writes the aggregated dataset once at the end.

#[cfg(test)]
mod tests;

use crate::archive::ArchiveResolver;
use crate::config::{ProcessingConfig, SolverKind};
use crate::error::{PppError, Result};
use crate::models::{BatchStats, DaySeries};
use crate::parser::parse_output;
use crate::solver::SolverInvoker;
use crate::transform::EnuFrame;

use chrono::{Datelike, NaiveDate};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::fs;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Drives the whole batch for one run configuration.
pub struct BatchProcessor {
    config: ProcessingConfig,
}

impl BatchProcessor {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Process the full date range and write the aggregated dataset.
    pub fn run(&self) -> Result<BatchStats> {
        let start_time = Instant::now();
        let output_path = self.config.dataset_path();

        println!("{}", "Starting PPP batch processing".bright_green().bold());
        println!("  {} {}", "Station:".bright_cyan(), self.config.station);
        println!(
            "  {} {} to {}",
            "Range:".bright_cyan(),
            self.config.start_date,
            self.config.end_date
        );
        println!(
            "  {} {:?}",
            "Solver:".bright_cyan(),
            self.config.ppp_solution
        );
        println!("  {} {}", "Output:".bright_cyan(), output_path.display());

        // A broken solver setup must abort before any day is touched.
        let invoker = SolverInvoker::new(&self.config);
        invoker.preflight()?;

        let resolver = ArchiveResolver::new(&self.config);
        let enu = EnuFrame::from_ecef(self.config.reference_position);

        let days: Vec<NaiveDate> = self
            .config
            .start_date
            .iter_days()
            .take_while(|day| *day <= self.config.end_date)
            .collect();

        let pb = ProgressBar::new(days.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut day_frames: Vec<LazyFrame> = Vec::new();
        let mut total_rows = 0usize;
        let mut days_skipped = 0usize;

        for day in &days {
            pb.set_message(day.to_string());
            match self.process_day(&resolver, &invoker, &enu, *day) {
                Ok(frame) => {
                    total_rows += frame.height();
                    day_frames.push(frame.lazy());
                }
                Err(error) => {
                    days_skipped += 1;
                    if error.is_day_skip() {
                        warn!("Skipping day {} (doy {:03}): {}", day, day.ordinal(), error);
                    } else {
                        error!(
                            "Day {} (doy {:03}) failed unexpectedly, skipping: {}",
                            day,
                            day.ordinal(),
                            error
                        );
                    }
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        if day_frames.is_empty() {
            return Err(PppError::Data);
        }

        let days_processed = day_frames.len();

        // Day order is already chronological; the sort handles solver files
        // with unsorted or duplicate epochs.
        let mut dataset = concat(day_frames, UnionArgs::default())?
            .sort(["epoch"], SortMultipleOptions::default())
            .with_column(col("epoch").cast(DataType::Datetime(TimeUnit::Microseconds, None)))
            .collect()?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&output_path)?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut dataset)?;

        let processing_time_ms = start_time.elapsed().as_millis();
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}/{}",
            "Days processed:".bright_cyan(),
            days_processed.to_string().bright_white().bold(),
            days.len()
        );
        if days_skipped > 0 {
            println!(
                "  {} {}",
                "Days skipped:".bright_red(),
                days_skipped.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Total rows:".bright_cyan(),
            total_rows.to_string().bright_white().bold()
        );
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            processing_time_ms
        );

        Ok(BatchStats {
            days_total: days.len(),
            days_processed,
            days_skipped,
            total_rows,
            output_path,
            processing_time_ms,
        })
    }

    /// One day end to end: resolve, invoke, parse, transform. Every error
    /// out of here is downgraded to a skip by the caller.
    fn process_day(
        &self,
        resolver: &ArchiveResolver,
        invoker: &SolverInvoker,
        enu: &EnuFrame,
        day: NaiveDate,
    ) -> Result<DataFrame> {
        let ctx = resolver.resolve(day)?;
        invoker.invoke(&ctx)?;

        let samples = parse_output(&ctx.output_file, self.config.ppp_solution)?;
        if samples.is_empty() {
            return Err(PppError::Parse {
                path: ctx.output_file.clone(),
                reason: "no data rows".to_string(),
            });
        }

        let series = DaySeries { day, samples };
        debug!("Day {} produced {} samples", day, series.len());
        self.day_frame(enu, &series)
    }

    /// Build the day's frame with the fixed per-run column schema; position
    /// columns are replaced by ENU, standard deviations pass through in the
    /// solver's native axes.
    fn day_frame(&self, enu: &EnuFrame, series: &DaySeries) -> Result<DataFrame> {
        let rows = series.len();
        let mut epoch = Vec::with_capacity(rows);
        let mut east = Vec::with_capacity(rows);
        let mut north = Vec::with_capacity(rows);
        let mut up = Vec::with_capacity(rows);
        let mut sd_x = Vec::with_capacity(rows);
        let mut sd_y = Vec::with_capacity(rows);
        let mut sd_z = Vec::with_capacity(rows);

        for sample in &series.samples {
            let [e, n, u] = enu.to_enu(sample.ecef);
            epoch.push(sample.epoch.and_utc().timestamp_micros());
            east.push(e);
            north.push(n);
            up.push(u);
            if let Some([x, y, z]) = sample.sdev {
                sd_x.push(x);
                sd_y.push(y);
                sd_z.push(z);
            }
        }

        let frame = match self.config.ppp_solution {
            SolverKind::RtPpp => df!(
                "epoch" => epoch,
                "east_m" => east,
                "north_m" => north,
                "up_m" => up
            )?,
            SolverKind::Rtklib => df!(
                "epoch" => epoch,
                "east_m" => east,
                "north_m" => north,
                "up_m" => up,
                "sd_x_m" => sd_x,
                "sd_y_m" => sd_y,
                "sd_z_m" => sd_z
            )?,
        };
        Ok(frame)
    }
}
