//! Error types for txnreview-core
//!
//! Remote failures surface as `RequestFailed` and always propagate to the
//! orchestration call that started them. Programming errors at the mode
//! boundary surface as `InvalidModeTransition` and never touch cache state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A remote call failed
    RequestFailed,
    /// A transition was requested that the current view mode does not allow
    InvalidModeTransition,
    /// An approval mutation for the same transaction is already outstanding
    MutationInFlight,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::RequestFailed => write!(f, "REQUEST_FAILED"),
            ErrorCode::InvalidModeTransition => write!(f, "INVALID_MODE_TRANSITION"),
            ErrorCode::MutationInFlight => write!(f, "MUTATION_IN_FLIGHT"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Failure reported by a remote data service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Request rejected with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unknown operation: {operation}")]
    UnknownOperation { operation: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

/// Main error type for txnreview-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Request '{operation}' failed: {cause}")]
    RequestFailed {
        operation: String,
        #[source]
        cause: ServiceError,
    },

    #[error("Invalid mode transition: {reason}")]
    InvalidModeTransition { reason: String },

    #[error("Approval already being saved for transaction {transaction_id}")]
    MutationInFlight { transaction_id: String },
}

impl CoreError {
    pub fn request_failed(operation: &str, cause: ServiceError) -> Self {
        CoreError::RequestFailed {
            operation: operation.to_string(),
            cause,
        }
    }

    pub fn invalid_transition(reason: impl Into<String>) -> Self {
        CoreError::InvalidModeTransition {
            reason: reason.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::RequestFailed { .. } => ErrorCode::RequestFailed,
            CoreError::InvalidModeTransition { .. } => ErrorCode::InvalidModeTransition,
            CoreError::MutationInFlight { .. } => ErrorCode::MutationInFlight,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::RequestFailed { .. } => ErrorSeverity::Error,
            CoreError::InvalidModeTransition { .. } => ErrorSeverity::Warning,
            CoreError::MutationInFlight { .. } => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::RequestFailed { operation, cause } => {
                details = details.with_detail(serde_json::json!({
                    "operation": operation,
                    "cause": cause.to_string(),
                }));
                details = details.with_suggestion(
                    "Retry the action; failed requests are never retried automatically.".to_string()
                );
            }
            CoreError::InvalidModeTransition { .. } => {
                details = details.with_suggestion(
                    "Select all employees before loading more transactions.".to_string()
                );
            }
            CoreError::MutationInFlight { .. } => {
                details = details.with_suggestion(
                    "Wait for the pending approval to finish before changing it again.".to_string()
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
