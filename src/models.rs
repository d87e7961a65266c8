//! Core data structures for the batch pipeline.

use crate::config::ProcessingConfig;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Everything the pipeline needs to know about one calendar day, derived
/// fresh each iteration from the run configuration.
#[derive(Debug, Clone)]
pub struct DayContext {
    pub day: NaiveDate,
    /// Day-of-year ordinal, 1-based. Used in archive names and diagnostics.
    pub ordinal: u32,
    /// Archive file name, e.g. `onrj0321.zip`.
    pub archive_name: String,
    /// Year-scoped folder holding the archive; extraction target too.
    pub year_folder: PathBuf,
    pub archive_path: PathBuf,
    /// RINEX observation file extracted from the archive.
    pub obs_file: PathBuf,
    /// GPS navigation file (`.{y2d}n`).
    pub nav_file: PathBuf,
    /// GLONASS navigation file (`.{y2d}g`).
    pub nav_file_glonass: PathBuf,
    /// Daily ionospheric correction file.
    pub ionex_file: PathBuf,
    /// Target path of the solver output for this day.
    pub output_file: PathBuf,
}

impl DayContext {
    pub fn for_day(config: &ProcessingConfig, day: NaiveDate) -> Self {
        let ordinal = day.ordinal();
        let year = day.year();
        let y2d = year.rem_euclid(100);

        let stem = format!("{}{:03}1", config.station, ordinal);
        let archive_name = format!("{stem}.zip");
        let year_folder = config.station_folder().join(year.to_string());
        let archive_path = year_folder.join(&archive_name);

        let ionex_name = config
            .ionex_pattern
            .replace("{doy}", &format!("{ordinal:03}"))
            .replace("{y2d}", &format!("{y2d:02}"));

        Self {
            day,
            ordinal,
            archive_path,
            obs_file: year_folder.join(format!("{stem}.{y2d:02}o")),
            nav_file: year_folder.join(format!("{stem}.{y2d:02}n")),
            nav_file_glonass: year_folder.join(format!("{stem}.{y2d:02}g")),
            ionex_file: config.ionex_folder.join(ionex_name),
            output_file: config.output_folder().join(format!("{year}_{stem}.pos")),
            archive_name,
            year_folder,
        }
    }
}

/// One row of solver output. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub epoch: NaiveDateTime,
    /// ECEF position in meters as reported by the solver.
    pub ecef: [f64; 3],
    /// Fix quality indicator (positioning convention only).
    pub quality: Option<u8>,
    /// Per-axis standard deviations in the solver's native frame
    /// (positioning convention only); never converted to ENU.
    pub sdev: Option<[f64; 3]>,
}

/// Ordered samples for one day. Order follows the solver output file;
/// timestamps are not guaranteed sorted or unique.
#[derive(Debug, Clone)]
pub struct DaySeries {
    pub day: NaiveDate,
    pub samples: Vec<PositionSample>,
}

impl DaySeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Summary of one batch run.
#[derive(Debug, Default)]
pub struct BatchStats {
    pub days_total: usize,
    pub days_processed: usize,
    pub days_skipped: usize,
    pub total_rows: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverKind;
    use std::path::Path;

    fn test_config() -> ProcessingConfig {
        ProcessingConfig {
            station: "onrj".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2015, 12, 31).unwrap(),
            run_folder: PathBuf::from("/data/rt_ppp"),
            experiment_name: "onrj_2015".to_string(),
            ppp_solution: SolverKind::Rtklib,
            ppp_executable: PathBuf::from("./rnx2rtkp"),
            ppp_executable_test: None,
            ppp_template_conf: PathBuf::from("template.conf"),
            reference_position: [4283638.361, -4026028.823, -2466096.837],
            ionex_folder: PathBuf::from("/data/ionex"),
            ionex_pattern: "codg{doy}0.{y2d}i".to_string(),
            save_array_as: None,
            update_pos: false,
        }
    }

    #[test]
    fn derives_day_paths() {
        let config = test_config();
        let day = NaiveDate::from_ymd_opt(2015, 2, 1).unwrap(); // doy 032
        let ctx = DayContext::for_day(&config, day);

        assert_eq!(ctx.ordinal, 32);
        assert_eq!(ctx.archive_name, "onrj0321.zip");
        assert_eq!(ctx.year_folder, Path::new("/data/rt_ppp/onrj/2015"));
        assert_eq!(
            ctx.archive_path,
            Path::new("/data/rt_ppp/onrj/2015/onrj0321.zip")
        );
        assert_eq!(
            ctx.obs_file,
            Path::new("/data/rt_ppp/onrj/2015/onrj0321.15o")
        );
        assert_eq!(
            ctx.nav_file,
            Path::new("/data/rt_ppp/onrj/2015/onrj0321.15n")
        );
        assert_eq!(
            ctx.nav_file_glonass,
            Path::new("/data/rt_ppp/onrj/2015/onrj0321.15g")
        );
        assert_eq!(ctx.ionex_file, Path::new("/data/ionex/codg0320.15i"));
        assert_eq!(
            ctx.output_file,
            Path::new("/data/rt_ppp/output/2015_onrj0321.pos")
        );
    }

    #[test]
    fn ionex_pattern_substitution_is_literal() {
        let mut config = test_config();
        config.ionex_pattern = "c1pg{doy}0.{y2d}i".to_string();
        let day = NaiveDate::from_ymd_opt(2015, 1, 5).unwrap();
        let ctx = DayContext::for_day(&config, day);
        assert_eq!(ctx.ionex_file, Path::new("/data/ionex/c1pg0050.15i"));
    }
}
