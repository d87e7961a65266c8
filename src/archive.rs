//! Daily observation archive resolution and extraction.
//!
//! Archives are zip bundles of RINEX observation and navigation files,
//! staged per station and year by the preprocessing tools. A missing or
//! unreadable archive is never fatal to the batch; the day is reported and
//! skipped.

use crate::config::ProcessingConfig;
use crate::error::{PppError, Result};
use crate::models::DayContext;
use chrono::NaiveDate;
use std::fs::File;
use tracing::debug;
use zip::ZipArchive;

pub struct ArchiveResolver<'a> {
    config: &'a ProcessingConfig,
}

impl<'a> ArchiveResolver<'a> {
    pub fn new(config: &'a ProcessingConfig) -> Self {
        Self { config }
    }

    /// Locate the day's archive and extract it into the year folder.
    pub fn resolve(&self, day: NaiveDate) -> Result<DayContext> {
        let ctx = DayContext::for_day(self.config, day);

        if !ctx.archive_path.exists() {
            return Err(PppError::MissingArchive {
                ordinal: ctx.ordinal,
                path: ctx.archive_path,
            });
        }

        self.extract(&ctx)?;
        Ok(ctx)
    }

    fn extract(&self, ctx: &DayContext) -> Result<()> {
        let file = File::open(&ctx.archive_path).map_err(|e| PppError::Extraction {
            path: ctx.archive_path.clone(),
            reason: e.to_string(),
        })?;

        let mut archive = ZipArchive::new(file).map_err(|e| PppError::Extraction {
            path: ctx.archive_path.clone(),
            reason: e.to_string(),
        })?;

        archive
            .extract(&ctx.year_folder)
            .map_err(|e| PppError::Extraction {
                path: ctx.archive_path.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            "Extracted {} into {}",
            ctx.archive_name,
            ctx.year_folder.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverKind;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn test_config(run_folder: &Path) -> ProcessingConfig {
        ProcessingConfig {
            station: "onrj".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2015, 1, 3).unwrap(),
            run_folder: run_folder.to_path_buf(),
            experiment_name: "test".to_string(),
            ppp_solution: SolverKind::Rtklib,
            ppp_executable: PathBuf::from("/bin/true"),
            ppp_executable_test: None,
            ppp_template_conf: run_folder.join("template.conf"),
            reference_position: [4283638.361, -4026028.823, -2466096.837],
            ionex_folder: run_folder.join("ionex"),
            ionex_pattern: "codg{doy}0.{y2d}i".to_string(),
            save_array_as: None,
            update_pos: false,
        }
    }

    fn stage_archive(config: &ProcessingConfig, day: NaiveDate, entries: &[(&str, &str)]) {
        let ctx = DayContext::for_day(config, day);
        std::fs::create_dir_all(&ctx.year_folder).unwrap();
        let file = File::create(&ctx.archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_into_year_folder() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let day = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        stage_archive(
            &config,
            day,
            &[("onrj0011.15o", "obs data"), ("onrj0011.15n", "nav data")],
        );

        let ctx = ArchiveResolver::new(&config).resolve(day).unwrap();
        assert!(ctx.obs_file.exists());
        assert!(ctx.nav_file.exists());
        assert_eq!(std::fs::read_to_string(&ctx.obs_file).unwrap(), "obs data");
    }

    #[test]
    fn missing_archive_reports_ordinal() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let day = NaiveDate::from_ymd_opt(2015, 2, 1).unwrap();

        let err = ArchiveResolver::new(&config).resolve(day).unwrap_err();
        match err {
            PppError::MissingArchive { ordinal, .. } => assert_eq!(ordinal, 32),
            other => panic!("expected MissingArchive, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_archive_is_an_extraction_error() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let day = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
        let ctx = DayContext::for_day(&config, day);
        std::fs::create_dir_all(&ctx.year_folder).unwrap();
        std::fs::write(&ctx.archive_path, b"not a zip file").unwrap();

        let err = ArchiveResolver::new(&config).resolve(day).unwrap_err();
        assert!(matches!(err, PppError::Extraction { .. }));
    }
}
