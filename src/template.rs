//! Solver configuration templating.
//!
//! Substitution is literal: every `{key}` occurrence is replaced by the
//! stringified value, nothing else is interpreted, and placeholders without
//! a value are left untouched. The rendered file is overwritten on every
//! call; the invoker reads it only after `render_config` has returned.

use crate::error::{PppError, Result};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ordered key/value list for one rendering pass. Keys are bare names; the
/// surrounding braces are added at substitution time.
#[derive(Debug, Default, Clone)]
pub struct TemplateVars {
    vars: Vec<(String, String)>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Display) {
        self.vars.push((key.to_string(), value.to_string()));
    }

    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.push(key, value);
        self
    }
}

/// Render `template` into `out`, replacing every `{key}` placeholder.
pub fn render_config(template: &Path, out: &Path, vars: &TemplateVars) -> Result<()> {
    let mut text = fs::read_to_string(template).map_err(|e| PppError::Template {
        path: template.to_path_buf(),
        reason: format!("cannot read template: {e}"),
    })?;

    for (key, value) in &vars.vars {
        text = text.replace(&format!("{{{key}}}"), value);
    }

    fs::write(out, text).map_err(|e| PppError::Template {
        path: out.to_path_buf(),
        reason: format!("cannot write rendered configuration: {e}"),
    })?;

    debug!("Rendered {} -> {}", template.display(), out.display());
    Ok(())
}
