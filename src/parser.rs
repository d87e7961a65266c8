//! Solver output parsing.
//!
//! Both solver conventions emit a whitespace-delimited table with
//! `%`-prefixed header and comment lines. The column schema is fixed per
//! convention:
//!
//! - direct: `date time x y z`
//! - positioning: `date time x y z Q ns sdx sdy sdz sdxy sdyz sdzx age ratio`
//!
//! The full per-row series is returned; collapsing a day to its mean is
//! deliberately not done here so daily granularity survives aggregation.

use crate::config::SolverKind;
use crate::error::{PppError, Result};
use crate::models::PositionSample;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Combined date + time-of-day format, e.g. `2015/01/01 00:00:30.000`.
const EPOCH_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

const DIRECT_COLUMNS: usize = 5;
const POSITIONING_COLUMNS: usize = 15;

/// Parse a solver output file into position samples.
pub fn parse_output(path: &Path, kind: SolverKind) -> Result<Vec<PositionSample>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut samples = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        samples.push(parse_row(path, kind, line_num + 1, &fields)?);
    }

    debug!("Parsed {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

fn parse_row(
    path: &Path,
    kind: SolverKind,
    line_num: usize,
    fields: &[&str],
) -> Result<PositionSample> {
    let expected = match kind {
        SolverKind::RtPpp => DIRECT_COLUMNS,
        SolverKind::Rtklib => POSITIONING_COLUMNS,
    };
    if fields.len() != expected {
        return Err(PppError::Parse {
            path: path.to_path_buf(),
            reason: format!(
                "line {line_num}: expected {expected} columns, found {}",
                fields.len()
            ),
        });
    }

    let epoch = parse_epoch(path, line_num, fields[0], fields[1])?;
    let ecef = [
        parse_float(path, line_num, fields[2])?,
        parse_float(path, line_num, fields[3])?,
        parse_float(path, line_num, fields[4])?,
    ];

    let (quality, sdev) = match kind {
        SolverKind::RtPpp => (None, None),
        SolverKind::Rtklib => {
            let quality = fields[5].parse::<u8>().map_err(|e| PppError::Parse {
                path: path.to_path_buf(),
                reason: format!("line {line_num}: bad quality flag {:?}: {e}", fields[5]),
            })?;
            fields[6].parse::<u32>().map_err(|e| PppError::Parse {
                path: path.to_path_buf(),
                reason: format!("line {line_num}: bad satellite count {:?}: {e}", fields[6]),
            })?;
            let sdev = [
                parse_float(path, line_num, fields[7])?,
                parse_float(path, line_num, fields[8])?,
                parse_float(path, line_num, fields[9])?,
            ];
            // sdxy/sdyz/sdzx, age and ratio are validated but not retained.
            for field in &fields[10..] {
                parse_float(path, line_num, field)?;
            }
            (Some(quality), Some(sdev))
        }
    };

    Ok(PositionSample {
        epoch,
        ecef,
        quality,
        sdev,
    })
}

fn parse_epoch(path: &Path, line_num: usize, date: &str, time: &str) -> Result<NaiveDateTime> {
    let combined = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&combined, EPOCH_FORMAT).map_err(|e| PppError::Parse {
        path: path.to_path_buf(),
        reason: format!("line {line_num}: bad timestamp {combined:?}: {e}"),
    })
}

fn parse_float(path: &Path, line_num: usize, field: &str) -> Result<f64> {
    field.parse::<f64>().map_err(|e| PppError::Parse {
        path: path.to_path_buf(),
        reason: format!("line {line_num}: bad numeric field {field:?}: {e}"),
    })
}
