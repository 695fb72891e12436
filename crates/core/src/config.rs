//! Unwind configuration.

use crate::constants::{
    DEFAULT_LABEL, ROLLBACKCTX_CATCH_UNDO_PANICS_VAR, ROLLBACKCTX_DROP_OUTCOME_VAR,
    ROLLBACKCTX_LABEL_VAR,
};
use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How to unwind a context that is dropped without an explicit exit while
/// no panic is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropOutcome {
    /// Run every pending entry, auto-committed ones included
    #[default]
    Failure,
    /// Skip auto-committed entries, as a successful exit would
    Success,
}

impl FromStr for DropOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "failure" | "fail" | "rollback" => Ok(DropOutcome::Failure),
            "success" | "ok" | "commit" => Ok(DropOutcome::Success),
            other => Err(Error::configuration(format!(
                "{ROLLBACKCTX_DROP_OUTCOME_VAR}: expected 'failure' or 'success', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DropOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropOutcome::Failure => f.write_str("failure"),
            DropOutcome::Success => f.write_str("success"),
        }
    }
}

/// Configuration for a rollback context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindConfig {
    /// Name recorded on the tracing span of every unwind
    pub label: String,
    /// Catch panics raised by undo actions so the remaining entries still run.
    ///
    /// When off, an undo action panicking during a drop-time unwind of an
    /// already panicking thread aborts the process.
    pub catch_undo_panics: bool,
    /// Exit kind used when a context is dropped without exit
    pub drop_outcome: DropOutcome,
}

impl Default for UnwindConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            catch_undo_panics: true,
            drop_outcome: DropOutcome::default(),
        }
    }
}

impl UnwindConfig {
    /// Default configuration with a custom span label
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Load configuration from `ROLLBACKCTX_*` environment variables,
    /// falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(label) = read_var(ROLLBACKCTX_LABEL_VAR)? {
            config.label = label;
        }
        if let Some(value) = read_var(ROLLBACKCTX_CATCH_UNDO_PANICS_VAR)? {
            config.catch_undo_panics = parse_bool(ROLLBACKCTX_CATCH_UNDO_PANICS_VAR, &value)?;
        }
        if let Some(value) = read_var(ROLLBACKCTX_DROP_OUTCOME_VAR)? {
            config.drop_outcome = value.parse()?;
        }

        tracing::trace!(
            label = %config.label,
            catch_undo_panics = config.catch_undo_panics,
            drop_outcome = %config.drop_outcome,
            "loaded unwind config from environment"
        );
        Ok(config)
    }
}

fn read_var(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(Error::configuration(format!(
            "{name} is not valid unicode"
        ))),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::configuration(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}
