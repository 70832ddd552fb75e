//! Structured diagnostics for recoverable conditions
//!
//! The rewrite and alias engines never print. Anything worth telling the user
//! about (a strategy fallback, a cyclic `var()` chain, ...) is returned as a
//! [`Diagnostic`] next to the result, and the caller decides where it goes.

use std::fmt;

/// How loud a diagnostic should be when shown to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, nothing was lost
    Info,
    /// Something degraded gracefully and may need attention
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Strategy selector was not `ast` or `regex`
    UnknownStrategy,
    /// Structural rewrite failed and the textual strategy produced the output
    StructuralFallback,
    /// Literal mapping keys are not applied by the structural strategy
    LiteralKeysSkipped,
    /// A `var()` chain loops back on itself
    CyclicReference,
    /// A `var()` chain is longer than the resolver follows
    DepthExceeded,
    /// A custom property is declared more than once
    Redeclared,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnknownStrategy
            | DiagnosticKind::StructuralFallback
            | DiagnosticKind::CyclicReference
            | DiagnosticKind::DepthExceeded => Severity::Warning,
            DiagnosticKind::LiteralKeysSkipped | DiagnosticKind::Redeclared => Severity::Info,
        }
    }
}

/// A non-fatal report produced by one engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The property, key or selector the diagnostic is about
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, subject: subject.into(), message: message.into() }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subject.is_empty() {
            write!(f, "{}: {}", self.severity(), self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity(), self.subject, self.message)
        }
    }
}
