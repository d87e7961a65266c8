//! External PPP solver invocation.
//!
//! Solver runs are the expensive step of the batch, so invocation is
//! idempotent: when the day's output file already exists and `update_pos`
//! is off, the solver is not launched and the existing file goes straight
//! to the parser. That is an existence check only; a truncated or corrupt
//! file short-circuits invocation here and fails at the parsing stage
//! instead.
//!
//! Solver stdout/stderr are discarded and the exit status is ignored; the
//! only success criterion after a run is that the expected output file
//! exists.

use crate::config::{ProcessingConfig, SolverKind};
use crate::error::{PppError, Result};
use crate::models::DayContext;
use crate::template::{TemplateVars, render_config};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Whether `invoke` actually launched the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Ran,
    SkippedExisting,
}

pub struct SolverInvoker<'a> {
    config: &'a ProcessingConfig,
}

impl<'a> SolverInvoker<'a> {
    pub fn new(config: &'a ProcessingConfig) -> Self {
        Self { config }
    }

    /// Run the solver (or its designated test command) once before the date
    /// loop and check that the configuration template exists. Any failure
    /// here aborts the whole batch.
    pub fn preflight(&self) -> Result<()> {
        if !self.config.ppp_template_conf.exists() {
            return Err(PppError::Preflight {
                reason: format!(
                    "configuration template {} not found",
                    self.config.ppp_template_conf.display()
                ),
            });
        }

        let (program, args) = match &self.config.ppp_executable_test {
            Some(command) => {
                let mut parts = command.split_whitespace();
                let program = parts.next().ok_or_else(|| PppError::Preflight {
                    reason: "`ppp_executable_test` is empty".to_string(),
                })?;
                (
                    self.resolve_program(Path::new(program)),
                    parts.map(str::to_string).collect::<Vec<_>>(),
                )
            }
            None => (self.resolve_program(&self.config.ppp_executable), vec![]),
        };

        let status = Command::new(&program)
            .args(&args)
            .current_dir(&self.config.run_folder)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| PppError::Preflight {
                reason: format!("cannot run {}: {}", program.display(), e),
            })?;

        if !status.success() {
            return Err(PppError::Preflight {
                reason: format!("{} exited with {}", program.display(), status),
            });
        }

        info!("Using PPP executable: {}", self.config.ppp_executable.display());
        Ok(())
    }

    /// Produce the day's solver output file, honoring the idempotency rule.
    pub fn invoke(&self, ctx: &DayContext) -> Result<InvokeOutcome> {
        if ctx.output_file.exists() && !self.config.update_pos {
            debug!(
                "Output {} exists, skipping solver run",
                ctx.output_file.display()
            );
            return Ok(InvokeOutcome::SkippedExisting);
        }

        if let Some(parent) = ctx.output_file.parent() {
            fs::create_dir_all(parent)?;
        }

        // The rendered configuration must be fully written before the solver
        // is launched; both share the one fixed temporary path.
        let rendered = self.config.temporary_conf();
        render_config(&self.config.ppp_template_conf, &rendered, &self.day_vars(ctx))?;

        match self.config.ppp_solution {
            SolverKind::RtPpp => self.run_direct(ctx, &rendered)?,
            SolverKind::Rtklib => self.run_positioning(ctx, &rendered)?,
        }

        if !ctx.output_file.exists() {
            return Err(PppError::SolverLaunch {
                expected: ctx.output_file.clone(),
            });
        }
        Ok(InvokeOutcome::Ran)
    }

    fn day_vars(&self, ctx: &DayContext) -> TemplateVars {
        TemplateVars::new()
            .with("ionex", ctx.ionex_file.display())
            .with("x0", self.config.reference_position[0])
            .with("y0", self.config.reference_position[1])
            .with("z0", self.config.reference_position[2])
    }

    /// Direct convention: the solver takes only the observation file and the
    /// rendered configuration and writes a fixed-name output relative to its
    /// working directory, which is then moved to the day's target.
    fn run_direct(&self, ctx: &DayContext, rendered: &Path) -> Result<()> {
        let program = self.resolve_program(&self.config.ppp_executable);
        debug!(
            "Running {} {} {}",
            program.display(),
            ctx.obs_file.display(),
            rendered.display()
        );

        // Exit status deliberately ignored; the output-file check decides.
        let _ = Command::new(&program)
            .arg(&ctx.obs_file)
            .arg(rendered)
            .current_dir(&self.config.run_folder)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(PppError::Io)?;

        let fixed_output = self.config.run_folder.join("output").join("RT_PPP.out");
        if fixed_output.exists() {
            fs::rename(&fixed_output, &ctx.output_file)?;
        }
        Ok(())
    }

    /// Positioning convention: explicit flags, the solver writes the output
    /// path itself.
    fn run_positioning(&self, ctx: &DayContext, rendered: &Path) -> Result<()> {
        let program = self.resolve_program(&self.config.ppp_executable);
        debug!(
            "Running {} -x 2 -y 0 -k {} -o {} {} {}",
            program.display(),
            rendered.display(),
            ctx.output_file.display(),
            ctx.obs_file.display(),
            ctx.nav_file.display()
        );

        let _ = Command::new(&program)
            .args(["-x", "2", "-y", "0", "-k"])
            .arg(rendered)
            .arg("-o")
            .arg(&ctx.output_file)
            .arg(&ctx.obs_file)
            .arg(&ctx.nav_file)
            .current_dir(&self.config.run_folder)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(PppError::Io)?;

        Ok(())
    }

    /// Executables named relative to the run folder (`./rt_ppp`) must stay
    /// resolvable even though the parent process keeps its own cwd.
    fn resolve_program(&self, program: &Path) -> PathBuf {
        if program.is_relative() && self.config.run_folder.join(program).exists() {
            self.config.run_folder.join(program)
        } else {
            program.to_path_buf()
        }
    }
}
