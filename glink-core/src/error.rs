use std::time::Duration;
use thiserror::Error;

use crate::id::RequestId;

/// Errors surfaced by the transaction multiplexing layer.
///
/// Errors are `Clone` because a single failure (a transport error, a forced
/// close) is fanned out to every outstanding collector of a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("The transaction has been closed and no further operation is allowed")]
    TransactionClosed,

    #[error("The transaction has been closed with error(s): {0}")]
    TransactionClosedWithErrors(String),

    #[error("The client has been closed and no further operation is allowed")]
    ClientClosed,

    #[error("The session has been closed and no further operation is allowed")]
    SessionClosed,

    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    #[error("Request id {0} is already in flight on this transaction")]
    DuplicateRequestId(RequestId),

    #[error("Received a response with unknown request id {0}")]
    UnknownRequestId(RequestId),

    #[error("Missing field in server response: {0}")]
    MissingResponseField(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Server error [{code}]: {message}")]
    Server { code: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns a stable error code for this error variant.
    pub fn code(&self) -> &'static str {
        match self {
            Error::TransactionClosed => "TRANSACTION_CLOSED",
            Error::TransactionClosedWithErrors(_) => "TRANSACTION_CLOSED_WITH_ERRORS",
            Error::ClientClosed => "CLIENT_CLOSED",
            Error::SessionClosed => "SESSION_CLOSED",
            Error::Timeout(_) => "TIMEOUT",
            Error::DuplicateRequestId(_) => "DUPLICATE_REQUEST_ID",
            Error::UnknownRequestId(_) => "UNKNOWN_REQUEST_ID",
            Error::MissingResponseField(_) => "MISSING_RESPONSE_FIELD",
            Error::UnexpectedResponse(_) => "UNEXPECTED_RESPONSE",
            Error::Server { .. } => "SERVER_ERROR",
            Error::Transport(_) => "TRANSPORT_ERROR",
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error is potentially retryable.
    ///
    /// A timeout leaves the request in flight, so waiting again may succeed.
    /// Transport errors may clear once the channel reconnects. Everything
    /// else is either terminal for the transaction or a logical failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Transport(_) => true,

            Error::TransactionClosed => false,
            Error::TransactionClosedWithErrors(_) => false,
            Error::ClientClosed => false,
            Error::SessionClosed => false,
            Error::DuplicateRequestId(_) => false,
            Error::UnknownRequestId(_) => false,
            Error::MissingResponseField(_) => false,
            Error::UnexpectedResponse(_) => false,
            Error::Server { .. } => false,
            Error::InvalidArgument(_) => false,
            Error::Internal(_) => false,
        }
    }

    /// Returns true if this error means the owning transaction is gone.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Error::TransactionClosed
                | Error::TransactionClosedWithErrors(_)
                | Error::ClientClosed
                | Error::SessionClosed
                | Error::UnknownRequestId(_)
        )
    }

    /// Adds context to an error by wrapping it in an Internal error.
    pub fn with_context(self, context: &str) -> Error {
        Error::Internal(format!("{}: {}", context, self))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::TransactionClosed.code(), "TRANSACTION_CLOSED");
        assert_eq!(
            Error::UnknownRequestId(RequestId::generate()).code(),
            "UNKNOWN_REQUEST_ID"
        );
        assert_eq!(Error::Timeout(Duration::from_millis(5)).code(), "TIMEOUT");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(Error::Transport("reset".into()).is_retryable());
        assert!(!Error::TransactionClosed.is_retryable());
        assert!(!Error::Server {
            code: "QUERY".into(),
            message: "bad syntax".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_closed_errors() {
        assert!(Error::TransactionClosed.is_closed());
        assert!(Error::TransactionClosedWithErrors("boom".into()).is_closed());
        assert!(!Error::Timeout(Duration::from_secs(1)).is_closed());
    }

    #[test]
    fn test_with_context() {
        let err = Error::Transport("broken pipe".into()).with_context("commit");
        assert_eq!(
            err.to_string(),
            "Internal error: commit: Transport error: broken pipe"
        );
    }
}
