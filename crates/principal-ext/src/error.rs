//! Directory error types
//!
//! Errors raised by the directory collaborator. The principal layer never
//! constructs, catches or translates these; it forwards them with `?`.

use thiserror::Error;

/// Error that can occur while talking to the directory store.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Availability errors (usually transient)
    /// The directory server could not be reached.
    #[error("directory server unavailable: {message}")]
    ServerDown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Authentication errors (permanent)
    /// The context credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    // Configuration errors (permanent)
    /// The principal context is not usable.
    #[error("invalid principal context: {message}")]
    InvalidContext { message: String },

    /// The account triple supplied for a new principal is not acceptable.
    #[error("invalid account: {message}")]
    InvalidAccount { message: String },

    // Write errors
    /// Attribute name is not a valid attribute description.
    #[error("invalid attribute syntax for '{attribute}': {message}")]
    InvalidAttributeSyntax { attribute: String, message: String },

    /// The store refused the write.
    #[error("constraint violation on '{attribute}': {message}")]
    ConstraintViolation { attribute: String, message: String },

    // Query errors
    /// A filter value could not be represented.
    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    /// The entry does not exist in the store.
    #[error("no such object: {dn}")]
    NoSuchObject { dn: String },

    /// Any other failure reported by the store.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization error.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl DirectoryError {
    /// Check if this error is transient and the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, DirectoryError::ServerDown { .. })
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ServerDown { .. } => "SERVER_DOWN",
            DirectoryError::InvalidCredentials => "INVALID_CREDENTIALS",
            DirectoryError::InvalidContext { .. } => "INVALID_CONTEXT",
            DirectoryError::InvalidAccount { .. } => "INVALID_ACCOUNT",
            DirectoryError::InvalidAttributeSyntax { .. } => "INVALID_ATTRIBUTE_SYNTAX",
            DirectoryError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            DirectoryError::InvalidFilter { .. } => "INVALID_FILTER",
            DirectoryError::NoSuchObject { .. } => "NO_SUCH_OBJECT",
            DirectoryError::OperationFailed { .. } => "OPERATION_FAILED",
            DirectoryError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    // Convenience constructors

    /// Create a server down error.
    pub fn server_down(message: impl Into<String>) -> Self {
        DirectoryError::ServerDown {
            message: message.into(),
            source: None,
        }
    }

    /// Create a server down error with source.
    pub fn server_down_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ServerDown {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an operation failed error with source.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid context error.
    pub fn invalid_context(message: impl Into<String>) -> Self {
        DirectoryError::InvalidContext {
            message: message.into(),
        }
    }

    /// Create an invalid account error.
    pub fn invalid_account(message: impl Into<String>) -> Self {
        DirectoryError::InvalidAccount {
            message: message.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint_violation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::ConstraintViolation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
