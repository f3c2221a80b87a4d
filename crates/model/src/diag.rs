//! Error and warning accounting across the parse of a sheet.
//!
//! Nothing in the parsing core aborts on bad input. Every detected condition
//! is counted here and parsing continues with a degraded fallback; the caller
//! decides after the fact whether the accumulated error count invalidates the
//! result (row sorting is skipped on any error, for instance).

use serde::Serialize;

/// Counter for errors and warnings, shared by injection into the parsing
/// components of one sheet.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ErrorCounter {
    errors: u32,
    warnings: u32,
}

impl ErrorCounter {
    /// Create a counter with both counts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one error.
    pub fn error(&mut self) {
        self.errors += 1;
    }

    /// Count one warning.
    pub fn warning(&mut self) {
        self.warnings += 1;
    }

    /// Number of errors counted so far.
    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    /// Number of warnings counted so far.
    #[must_use]
    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    /// Whether no error has been counted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }

    /// Reset both counts to zero, e.g. between input files.
    pub fn reset(&mut self) {
        self.errors = 0;
        self.warnings = 0;
    }

    /// Fold another counter into this one, for an overall result across
    /// several sheets or workbooks.
    pub fn absorb(&mut self, other: &ErrorCounter) {
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}
