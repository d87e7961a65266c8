//! Integration tests for the batch orchestrator.
//!
//! Pipelines are staged in temporary directories: archives are real zip
//! bundles and per-day solver outputs are pre-staged `.pos` files, so the
//! idempotency rule routes every day straight to the parser without a real
//! solver binary.


use crate::config::{ProcessingConfig, SolverKind};
use crate::models::DayContext;
use chrono::{Datelike, NaiveDate};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub fn test_config(run_folder: &Path, start: NaiveDate, end: NaiveDate) -> ProcessingConfig {
    let template = run_folder.join("template.conf");
    fs::write(&template, "pos={x0} {y0} {z0}\nion={ionex}\n").unwrap();
    ProcessingConfig {
        station: "onrj".to_string(),
        start_date: start,
        end_date: end,
        run_folder: run_folder.to_path_buf(),
        experiment_name: "test_run".to_string(),
        ppp_solution: SolverKind::Rtklib,
        // Never actually invoked: outputs are pre-staged and update_pos is
        // off, so only the preflight check runs this.
        ppp_executable: "/bin/true".into(),
        ppp_executable_test: None,
        ppp_template_conf: template,
        reference_position: [4283638.3610, -4026028.8230, -2466096.8370],
        ionex_folder: run_folder.join("ionex"),
        ionex_pattern: "codg{doy}0.{y2d}i".to_string(),
        save_array_as: None,
        update_pos: false,
    }
}

pub fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap()
}

/// Stage the day's observation archive (a real zip bundle).
pub fn stage_archive(config: &ProcessingConfig, date: NaiveDate) {
    let ctx = DayContext::for_day(config, date);
    fs::create_dir_all(&ctx.year_folder).unwrap();
    let file = File::create(&ctx.archive_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for extension in ["o", "n", "g"] {
        let name = format!(
            "onrj{:03}1.{:02}{}",
            ctx.ordinal,
            date.year().rem_euclid(100),
            extension
        );
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"rinex placeholder").unwrap();
    }
    writer.finish().unwrap();
}

/// Stage the day's solver output file with `rows` positioning-convention
/// samples at the reference position.
pub fn stage_output(config: &ProcessingConfig, date: NaiveDate, rows: usize) {
    let [x, y, z] = config.reference_position;
    let mut content = String::from("% fake positioning solution\n");
    for row in 0..rows {
        let offset = row as u32 * 30;
        content.push_str(&format!(
            "{}/{:02}/{:02} 00:{:02}:{:02}.000 {x:.4} {y:.4} {z:.4} 1 7 0.01 0.02 0.03 0.0 0.0 0.0 0.0 1.5\n",
            date.year(),
            date.month(),
            date.day(),
            offset / 60,
            offset % 60,
        ));
    }
    stage_raw_output(config, date, &content);
}

/// Stage arbitrary text as the day's solver output file.
pub fn stage_raw_output(config: &ProcessingConfig, date: NaiveDate, content: &str) {
    let ctx = DayContext::for_day(config, date);
    fs::create_dir_all(ctx.output_file.parent().unwrap()).unwrap();
    fs::write(&ctx.output_file, content).unwrap();
}

/// A complete staged day: archive plus parseable output.
pub fn stage_day(config: &ProcessingConfig, date: NaiveDate, rows: usize) {
    stage_archive(config, date);
    stage_output(config, date, rows);
}

pub fn workspace() -> TempDir {
    TempDir::new().unwrap()
}
