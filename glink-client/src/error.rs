/// Error types for the GraphLink client
use thiserror::Error;
use tonic::Status;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Server unavailable: {0}")]
    Unavailable(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unknown error: {0}")]
    Unknown(String),

    /// Failure reported by a transaction stream.
    #[error(transparent)]
    Transaction(#[from] glink_core::Error),
}

impl ClientError {
    /// Returns a stable error code for this error variant.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ClientError::FailedPrecondition(_) => "FAILED_PRECONDITION",
            ClientError::ConnectionError(_) => "CONNECTION_ERROR",
            ClientError::Unavailable(_) => "UNAVAILABLE",
            ClientError::Timeout(_) => "TIMEOUT",
            ClientError::InternalError(_) => "INTERNAL_ERROR",
            ClientError::Aborted(_) => "ABORTED",
            ClientError::AlreadyExists(_) => "ALREADY_EXISTS",
            ClientError::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            ClientError::Unimplemented(_) => "UNIMPLEMENTED",
            ClientError::PermissionDenied(_) => "PERMISSION_DENIED",
            ClientError::Unknown(_) => "UNKNOWN",
            ClientError::Transaction(err) => err.code(),
        }
    }

    /// Returns true if the failed call may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Unavailable(_) => true,
            ClientError::Timeout(_) => true,
            ClientError::ResourceExhausted(_) => true,
            ClientError::Aborted(_) => true,
            ClientError::Transaction(err) => err.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Convert gRPC Status to ClientError
impl From<Status> for ClientError {
    fn from(status: Status) -> Self {
        let msg = status.message().to_string();

        match status.code() {
            tonic::Code::NotFound => ClientError::NotFound(msg),
            tonic::Code::InvalidArgument => ClientError::InvalidArgument(msg),
            tonic::Code::FailedPrecondition => ClientError::FailedPrecondition(msg),
            tonic::Code::Unavailable => ClientError::Unavailable(msg),
            tonic::Code::DeadlineExceeded => ClientError::Timeout(msg),
            tonic::Code::Internal => ClientError::InternalError(msg),
            tonic::Code::Aborted => ClientError::Aborted(msg),
            tonic::Code::AlreadyExists => ClientError::AlreadyExists(msg),
            tonic::Code::ResourceExhausted => ClientError::ResourceExhausted(msg),
            tonic::Code::Unimplemented => ClientError::Unimplemented(msg),
            tonic::Code::PermissionDenied => ClientError::PermissionDenied(msg),
            _ => ClientError::Unknown(msg),
        }
    }
}

/// Convert a gRPC Status that ended a transaction stream to a core error
pub(crate) fn stream_status(status: Status) -> glink_core::Error {
    match status.code() {
        tonic::Code::Unavailable | tonic::Code::Cancelled => {
            glink_core::Error::Transport(status.message().to_string())
        }
        code => glink_core::Error::Server {
            code: format!("{:?}", code),
            message: status.message().to_string(),
        },
    }
}
