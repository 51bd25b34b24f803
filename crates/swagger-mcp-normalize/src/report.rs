//! Normalization diagnostics (design §4.1 "Public contract").

use serde::{Deserialize, Serialize};

/// Severity of one diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Non-fatal; the walker continues.
    Warning,
    /// Would be fatal in strict mode.
    Error,
    /// An unresolvable `$ref`. Always fatal, independent of `strict`.
    Reference,
}

/// One diagnostic raised during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Where in the spec this was raised (a JSON-pointer-ish path, best effort).
    pub location: Option<String>,
}

/// Counters summarizing one normalization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    /// Number of endpoints extracted.
    pub endpoints: u64,
    /// Number of named schemas normalized.
    pub schemas: u64,
    /// Number of security schemes normalized.
    pub security_schemes: u64,
    /// Number of schema cycles detected.
    pub cycles_detected: u64,
    /// Number of `operationId`s synthesized.
    pub operation_ids_synthesized: u64,
}

/// Accumulates diagnostics and counters across one `Normalize` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// All diagnostics raised, in the order they occurred.
    pub diagnostics: Vec<Diagnostic>,
    /// Summary counters.
    pub counters: Counters,
}

impl Report {
    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>, location: Option<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            location,
        });
    }

    /// Record an error-severity diagnostic (not necessarily fatal; see
    /// `strict` handling in the pipeline).
    pub fn error(&mut self, message: impl Into<String>, location: Option<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            location,
        });
    }

    /// Record an unresolvable-`$ref` diagnostic. Unlike [`Report::error`],
    /// this is always fatal — see [`Report::has_reference_errors`].
    pub fn reference_error(&mut self, message: impl Into<String>, location: Option<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Reference,
            message: message.into(),
            location,
        });
    }

    /// Whether any `Error`- or `Reference`-severity diagnostic was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| matches!(d.severity, Severity::Error | Severity::Reference))
    }

    /// Whether any unresolvable-`$ref` diagnostic was recorded. These are
    /// fatal regardless of `strict`.
    #[must_use]
    pub fn has_reference_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Reference)
    }
}
