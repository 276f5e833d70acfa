// Error types for the Trellis registration layer

use serde_json::Value;
use thiserror::Error;

/// Failures raised during request dispatch.
///
/// Declared variants carry a status code and a message that is always safe
/// to expose verbatim to the caller, plus optional structured details.
/// Everything else is an undeclared failure: its message is logged
/// internally and the caller only ever sees a generic 500.
#[derive(Error, Debug)]
pub enum Error {
    // Declared failures
    #[error("Bad Request: {message}")]
    BadRequest { message: String, details: Option<Value> },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, details: Option<Value> },

    #[error("Forbidden: {message}")]
    Forbidden { message: String, details: Option<Value> },

    #[error("Not Found: {message}")]
    NotFound { message: String, details: Option<Value> },

    #[error("Conflict: {message}")]
    Conflict { message: String, details: Option<Value> },

    #[error("Too Many Requests: {message}")]
    TooManyRequests { message: String, details: Option<Value> },

    #[error("Internal Server Error: {message}")]
    InternalServerError { message: String, details: Option<Value> },

    // Undeclared failures
    #[error("internal error: {0}")]
    Internal(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Error::Unauthorized {
            message: message.into(),
            details: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Error::Forbidden {
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Error::TooManyRequests {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Error::InternalServerError {
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details to a declared failure.
    ///
    /// No-op on undeclared variants, which never expose details anyway.
    pub fn with_details(mut self, value: Value) -> Self {
        match &mut self {
            Error::BadRequest { details, .. }
            | Error::Unauthorized { details, .. }
            | Error::Forbidden { details, .. }
            | Error::NotFound { details, .. }
            | Error::Conflict { details, .. }
            | Error::TooManyRequests { details, .. }
            | Error::InternalServerError { details, .. } => *details = Some(value),
            _ => {}
        }
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::BadRequest { .. } => 400,
            Error::Unauthorized { .. } => 401,
            Error::Forbidden { .. } => 403,
            Error::NotFound { .. } => 404,
            Error::Conflict { .. } => 409,
            Error::TooManyRequests { .. } => 429,
            Error::InternalServerError { .. } => 500,
            // Undeclared failures always surface as 500
            _ => 500,
        }
    }

    /// Status, message, and details when this is a declared failure.
    ///
    /// Returns `None` for undeclared failures, whose contents must never
    /// cross the wire.
    pub fn declared(&self) -> Option<(u16, &str, Option<&Value>)> {
        match self {
            Error::BadRequest { message, details }
            | Error::Unauthorized { message, details }
            | Error::Forbidden { message, details }
            | Error::NotFound { message, details }
            | Error::Conflict { message, details }
            | Error::TooManyRequests { message, details }
            | Error::InternalServerError { message, details } => {
                Some((self.status_code(), message, details.as_ref()))
            }
            _ => None,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Misconfigurations detected while populating the registry.
///
/// These abort the offending call, never the application: a correctly
/// configured owner is unaffected by its neighbor's mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("owner already registered: {0}")]
    DuplicateOwner(String),

    #[error("owner not registered: {0}")]
    UnknownOwner(String),

    #[error("invalid placeholder in \"{path}\": {reason}")]
    InvalidPlaceholder { path: String, reason: String },
}
