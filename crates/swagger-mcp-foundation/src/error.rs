//! Error taxonomy shared across the conversion pipeline and the MCP server.
//!
//! One flat enum covers every kind named in the design's §7 rather than
//! a separate type per crate, because most of the kinds (storage, index,
//! timeout, overloaded) are meaningful at more than one component
//! boundary and a shared `From` impl keeps `?` working end to end.

use crate::CorrelationId;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure, independent of the message text. Kept separate
/// from [`Error`] so callers can match on kind without string-sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input file: missing, too large, unrecognized dialect, malformed.
    Input,
    /// An OpenAPI invariant was violated (fatal only in strict mode).
    SpecInvariant,
    /// A `$ref` target could not be resolved. Always fatal.
    UnresolvableReference,
    /// SQLite open/transaction/migration/integrity failure.
    Storage,
    /// Weighted index build or open failure.
    Index,
    /// Used only internally; the server degrades instead of surfacing this.
    QuerySyntax,
    /// An MCP tool argument named an absent entity.
    NotFound,
    /// A deadline was exceeded.
    Timeout,
    /// Too many in-flight requests.
    Overloaded,
    /// Anything else.
    Internal,
}

/// A typed error carrying its [`ErrorKind`], a human-readable message,
/// and a [`CorrelationId`] for tying a log line back to a response.
#[derive(Debug, thiserror::Error)]
#[error("{kind:?}: {message} (correlation_id={correlation_id})")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    correlation_id: CorrelationId,
}

impl Error {
    /// Build an error of the given kind with a freshly minted correlation id.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            correlation_id: CorrelationId::new(),
        }
    }

    /// `ErrorKind::Input`.
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    /// `ErrorKind::SpecInvariant`.
    pub fn spec_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SpecInvariant, message)
    }

    /// `ErrorKind::UnresolvableReference`.
    pub fn unresolvable_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvableReference, message)
    }

    /// `ErrorKind::Storage`.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// `ErrorKind::Index`.
    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message)
    }

    /// `ErrorKind::QuerySyntax`.
    pub fn query_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuerySyntax, message)
    }

    /// `ErrorKind::NotFound`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// `ErrorKind::Timeout`.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// `ErrorKind::Overloaded`.
    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Overloaded, message)
    }

    /// `ErrorKind::Internal`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// The kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The correlation id to surface to the caller.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Whether a retry of the same request might succeed (timeouts only).
    #[must_use]
    pub fn is_retry_safe(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// A short, user-actionable troubleshooting hint derived from the
    /// message text, per the design's §7 "small rule table keyed on
    /// error substring".
    #[must_use]
    pub fn troubleshooting_hint(&self) -> Option<&'static str> {
        let lower = self.message.to_lowercase();
        if lower.contains("no such file") || lower.contains("not found") && self.kind == ErrorKind::Input {
            Some("Check that the file path is correct and readable.")
        } else if lower.contains("permission") {
            Some("Check file permissions for the spec file and data directory.")
        } else if lower.contains("json") || lower.contains("yaml") || lower.contains("parse") {
            Some("Validate the spec file's syntax with a JSON/YAML linter.")
        } else if lower.contains("memory") || lower.contains("too large") || lower.contains("size") {
            Some("Try a smaller spec file or raise the configured size limit.")
        } else {
            None
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::input(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::input(format!("JSON error: {err}"))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::input(format!("YAML error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_constructor_sets_the_matching_kind() {
        assert_eq!(Error::input("x").kind(), ErrorKind::Input);
        assert_eq!(Error::storage("x").kind(), ErrorKind::Storage);
        assert_eq!(Error::timeout("x").kind(), ErrorKind::Timeout);
    }

    #[test]
    fn only_timeout_is_retry_safe() {
        assert!(Error::timeout("deadline exceeded").is_retry_safe());
        assert!(!Error::storage("disk full").is_retry_safe());
    }

    #[test]
    fn troubleshooting_hint_matches_known_substrings() {
        let err = Error::input("failed to parse YAML: while scanning");
        assert!(err.troubleshooting_hint().unwrap().contains("syntax"));
    }

    #[test]
    fn correlation_ids_differ_across_errors() {
        let a = Error::internal("a");
        let b = Error::internal("b");
        assert_ne!(a.correlation_id().to_string(), b.correlation_id().to_string());
    }
}
