//! Fatal error reporting.
//!
//! Bootstrap failures are not recoverable: there is no renderer without a
//! context. Errors travel up to [`crate::bootstrap::run`] which hands them to
//! a [`FatalHandler`]. The production handler logs a structured diagnostic
//! and terminates the process.

use tracing::error;

use crate::error::{BootstrapError, Stage};

/// Structured description of a fatal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub condition: String,
    pub entry_point: Option<String>,
}

impl From<&BootstrapError> for Diagnostic {
    fn from(err: &BootstrapError) -> Self {
        Self {
            stage: err.stage(),
            condition: err.to_string(),
            entry_point: err.entry_point().map(str::to_string),
        }
    }
}

/// Receives a bootstrap failure. Implementations must not attempt recovery.
pub trait FatalHandler {
    fn fatal(&self, err: &BootstrapError);
}

/// Logs the diagnostic and exits with status 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessAbort;

impl FatalHandler for ProcessAbort {
    fn fatal(&self, err: &BootstrapError) {
        let diagnostic = Diagnostic::from(err);
        error!(
            stage = %diagnostic.stage,
            entry_point = diagnostic.entry_point.as_deref().unwrap_or("-"),
            condition = %diagnostic.condition,
            "Fatal OpenGL bootstrap failure"
        );
        std::process::exit(1);
    }
}
