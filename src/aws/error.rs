// ABOUTME: Error type shared by every AWS capability trait.
// ABOUTME: Classifies throttling responses so the gateway can retry them.

/// Signatures AWS uses for request throttling across ECS, Autoscaling,
/// ELBv2 and Application Auto Scaling.
const THROTTLING_SIGNATURES: &[&str] = &[
    "Rate exceeded",
    "ThrottlingException",
    "Throttling",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

/// Errors from AWS API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The service rejected the call (including throttling responses).
    #[error("{operation} failed: {message}")]
    Call { operation: String, message: String },

    /// The call succeeded but the response could not be understood.
    #[error("unexpected response from {operation}: {message}")]
    Response { operation: String, message: String },

    /// The API could not be reached at all.
    #[error("AWS transport error: {0}")]
    Transport(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Throttled,
    Rejected,
    MalformedResponse,
    Transport,
}

impl ApiError {
    pub fn call(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Call {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Response {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True when the error carries one of AWS's throttling signatures.
    pub fn is_throttling(&self) -> bool {
        match self {
            ApiError::Call { message, .. } => THROTTLING_SIGNATURES
                .iter()
                .any(|signature| message.contains(signature)),
            _ => false,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            _ if self.is_throttling() => ApiErrorKind::Throttled,
            ApiError::Call { .. } => ApiErrorKind::Rejected,
            ApiError::Response { .. } => ApiErrorKind::MalformedResponse,
            ApiError::Transport(_) => ApiErrorKind::Transport,
        }
    }
}
