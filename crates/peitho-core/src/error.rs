//! Error types for Peitho.
//!
//! This module provides the [`PeithoError`] type used throughout the
//! toolkit, split into two tiers:
//!
//! - **Fatal** errors abort processing: a schema problem found while
//!   compiling a route's declared options, or a payload transport failure
//!   while reading a request body.
//! - **Validation** errors are aggregated: every missing or malformed
//!   option on a request is collected before a single error is produced,
//!   so a caller sees all problems in one report.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PeithoError`].
pub type PeithoResult<T> = Result<T, PeithoError>;

/// Categories of errors for classification and handling.
///
/// Upstream error-handling middleware discriminates on the category rather
/// than on error identity, e.g. to map [`ErrorCategory::Validation`] to a
/// 400-class response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request option validation errors (missing, malformed, uncoercible).
    Validation,
    /// Route schema errors found at compile time (unknown type or source).
    Schema,
    /// Transport-level payload read failures.
    Payload,
    /// Internal errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Schema => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Payload => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A single validation problem scoped to one declared option.
///
/// Accumulated on the value bag while a request is processed and merged
/// into one [`PeithoError::Validation`] at the end of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the declared option the problem applies to.
    pub option: String,
    /// Human-readable problem description, e.g. `"Required"`.
    pub message: String,
}

impl FieldError {
    /// Creates a field error for the named option.
    #[must_use]
    pub fn new(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            message: message.into(),
        }
    }
}

/// Standard error type for Peitho.
///
/// # Example
///
/// ```
/// use peitho_core::{ErrorCategory, FieldError, PeithoError};
///
/// let err = PeithoError::validation(vec![
///     FieldError::new("id", "Required"),
///     FieldError::new("limit", "Invalid integer: abc"),
/// ]);
///
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// assert_eq!(err.to_string(), "id: Required. limit: Invalid integer: abc");
/// ```
#[derive(Error, Debug)]
pub enum PeithoError {
    /// One or more declared options failed validation.
    #[error("{message}")]
    Validation {
        /// Aggregate message, one `"<name>: <message>"` entry per problem
        /// joined by `". "`.
        message: String,
        /// The individual problems, in the order they were recorded.
        errors: Vec<FieldError>,
    },

    /// A route's declared options could not be compiled.
    #[error("Schema error: {message}")]
    Schema {
        /// Human-readable error message.
        message: String,
    },

    /// The request payload could not be read from the transport.
    #[error("Payload error: {message}")]
    Payload {
        /// Human-readable error message.
        message: String,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl PeithoError {
    /// Creates a validation error aggregating the given field errors.
    ///
    /// The message concatenates each `"<name>: <message>"` entry joined by
    /// `". "`, so callers see every problem in a single report.
    #[must_use]
    pub fn validation(errors: Vec<FieldError>) -> Self {
        let message = errors
            .iter()
            .map(|e| format!("{}: {}", e.option, e.message))
            .collect::<Vec<_>>()
            .join(". ");
        Self::Validation { message, errors }
    }

    /// Creates a schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates a payload transport error.
    #[must_use]
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::Payload { .. } => ErrorCategory::Payload,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the field errors if this is a validation error.
    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Returns true if this is an aggregated validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
