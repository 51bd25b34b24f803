//! The tool-call boundary error type: wraps `swagger_mcp_foundation::Error`
//! and renders it the way spec.md §7 requires a user-visible failure to
//! read — a short cause line, an actionable suggestion, and a
//! correlation id — then maps it onto `rmcp`'s `ErrorData` for the MCP
//! wire.

use rmcp::model::ErrorData as McpError;
use swagger_mcp_foundation::{Error as CoreError, ErrorKind};

/// Errors raised anywhere in this crate's request handling.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// An error from one of the pipeline/storage/query crates.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// The conversion pipeline or a tool call exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// The in-flight request limit (`server.max_connections`) was reached.
    #[error("server is at capacity")]
    Overloaded,
}

impl ServerError {
    /// The user-facing message spec.md §7 mandates: cause, suggestion,
    /// correlation id.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(err) => {
                let hint = err.troubleshooting_hint().unwrap_or("Check the server logs for more detail.");
                format!("{err} — {hint} (correlation_id={})", err.correlation_id())
            }
            Self::Timeout(duration) => {
                format!("operation timed out after {duration:?} — retry, or raise the configured timeout (correlation_id=n/a)")
            }
            Self::Overloaded => {
                "server is at capacity — retry shortly, or raise server.max_connections (correlation_id=n/a)".to_string()
            }
        }
    }

    /// Whether retrying the same request might succeed without any
    /// change on the caller's part.
    #[must_use]
    pub fn is_retry_safe(&self) -> bool {
        match self {
            Self::Core(err) => err.is_retry_safe(),
            Self::Timeout(_) | Self::Overloaded => true,
        }
    }
}

impl From<ServerError> for McpError {
    fn from(err: ServerError) -> Self {
        let message = err.user_message();
        match &err {
            ServerError::Core(core) => match core.kind() {
                ErrorKind::NotFound => Self::resource_not_found(message, None),
                ErrorKind::Input | ErrorKind::QuerySyntax | ErrorKind::SpecInvariant | ErrorKind::UnresolvableReference => {
                    Self::invalid_params(message, None)
                }
                ErrorKind::Timeout | ErrorKind::Overloaded | ErrorKind::Storage | ErrorKind::Index | ErrorKind::Internal => {
                    Self::internal_error(message, None)
                }
            },
            ServerError::Timeout(_) => Self::internal_error(message, None),
            ServerError::Overloaded => Self::internal_error(message, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_core_error_message_carries_a_correlation_id() {
        let core = CoreError::not_found("schema 'Widget' not found");
        let server_err = ServerError::Core(core);
        let message = server_err.user_message();
        assert!(message.contains("correlation_id="));
        let _mcp: McpError = server_err.into();
    }

    #[test]
    fn overloaded_is_retry_safe() {
        assert!(ServerError::Overloaded.is_retry_safe());
    }
}
