//! Diagnostic collector.
//!
//! Diagnostics accumulate for the whole pass; nothing here stops
//! processing. Only errors gate emission of the target file.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single finding, attributed to a source line (0 when no line applies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line,
            severity: Severity::Error,
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line,
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.severity, self.message)
    }
}

/// Append-only, capacity-bounded list of diagnostics in discovery order.
///
/// Once full, further diagnostics are counted but not stored, so
/// [`Diagnostics::has_errors`] stays accurate.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    capacity: usize,
    dropped_errors: usize,
    dropped_warnings: usize,
}

impl Diagnostics {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            dropped_errors: 0,
            dropped_warnings: 0,
        }
    }

    /// Record a diagnostic. Returns `false` if it was dropped for capacity.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.entries.len() >= self.capacity {
            match diagnostic.severity {
                Severity::Error => self.dropped_errors += 1,
                Severity::Warning => self.dropped_warnings += 1,
            }
            return false;
        }
        self.entries.push(diagnostic);
        true
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::error(line, message));
    }

    pub fn warning(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::warning(line, message));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors().count() + self.dropped_errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count() + self.dropped_warnings
    }

    /// Diagnostics that were counted but not stored.
    pub fn dropped(&self) -> usize {
        self.dropped_errors + self.dropped_warnings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| !d.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(crate::config::Limits::default().max_diagnostics)
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Summary report: counts, then errors, then warnings.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}, {}",
            plural(self.error_count(), "error"),
            plural(self.warning_count(), "warning")
        )?;
        if self.errors().next().is_some() {
            writeln!(f, "errors:")?;
            for d in self.errors() {
                writeln!(f, "  {}", d)?;
            }
        }
        if self.warnings().next().is_some() {
            writeln!(f, "warnings:")?;
            for d in self.warnings() {
                writeln!(f, "  {}", d)?;
            }
        }
        if self.dropped() > 0 {
            writeln!(f, "({} not recorded)", plural(self.dropped(), "more diagnostic"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_gate() {
        let mut diags = Diagnostics::default();
        assert!(!diags.has_errors());
        diags.warning(3, "mismatched closer");
        assert!(!diags.has_errors());
        diags.error(5, "missing ':'");
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_capacity_drops_but_still_gates() {
        let mut diags = Diagnostics::with_capacity(1);
        diags.warning(1, "first");
        assert!(!diags.push(Diagnostic::error(2, "second")));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.dropped(), 1);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_no_deduplication() {
        let mut diags = Diagnostics::default();
        diags.error(1, "same");
        diags.error(1, "same");
        assert_eq!(diags.error_count(), 2);
    }

    #[test]
    fn test_report_groups_by_severity() {
        let mut diags = Diagnostics::default();
        diags.warning(2, "w1");
        diags.error(4, "e1");
        diags.error(1, "e2");
        let report = diags.to_string();
        assert_eq!(
            report,
            "2 errors, 1 warning\n\
             errors:\n  line 4: error: e1\n  line 1: error: e2\n\
             warnings:\n  line 2: warning: w1\n"
        );
    }
}
