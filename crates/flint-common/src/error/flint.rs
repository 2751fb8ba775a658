//! Engine error types.
//!
//! Every failure surfaced by the catalog, the function layer or the
//! executor is a `FlintError`. Operator errors abort the whole execution
//! call; nothing is retried or swallowed inside the engine.

use std::fmt;
use thiserror::Error;

/// Failure raised by an external scalar function implementation.
pub type UdfError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Internal error (bug).
    Internal = 0x0000,
    /// Operation not supported.
    Unsupported = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0002,
    /// Invalid configuration.
    InvalidConfig = 0x0003,

    // Catalog errors (0x0100 - 0x01FF)
    /// View not found in the session catalog.
    UnresolvedView = 0x0100,
    /// View name already taken.
    ViewAlreadyExists = 0x0101,
    /// Session was closed.
    SessionClosed = 0x0102,

    // Function errors (0x0200 - 0x02FF)
    /// Function name not registered.
    UnresolvedFunction = 0x0200,
    /// No overload accepts the argument types.
    NoMatchingOverload = 0x0201,
    /// Function implementation failed.
    InvocationError = 0x0202,

    // Execution errors (0x0300 - 0x03FF)
    /// Value does not match its declared type.
    TypeMismatch = 0x0300,
    /// Plan is structurally invalid.
    MalformedPlan = 0x0301,
    /// Division by zero.
    DivisionByZero = 0x0302,
    /// Cast failed.
    Cast = 0x0303,
    /// External planner failed.
    Planning = 0x0304,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Catalog",
            0x02 => "Function",
            0x03 => "Execution",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for flint.
///
/// # Example
///
/// ```rust
/// use flint_common::error::{ErrorCode, FlintError};
///
/// let err = FlintError::UnresolvedFunction { name: "hive_strlen".into() };
/// assert_eq!(err.code(), ErrorCode::UnresolvedFunction);
/// ```
#[derive(Debug, Error)]
pub enum FlintError {
    // ==========================================================================
    // Catalog Errors
    // ==========================================================================
    /// A scan references a view the session does not know.
    #[error("table or view '{name}' not found")]
    UnresolvedView {
        /// The missing view name.
        name: String,
    },

    /// A view with this name already exists and replacement was not requested.
    #[error("temporary view '{name}' already exists")]
    ViewAlreadyExists {
        /// The conflicting view name.
        name: String,
    },

    /// The session has been closed.
    #[error("{session} is closed")]
    SessionClosed {
        /// Display form of the closed session.
        session: String,
    },

    // ==========================================================================
    // Function Errors
    // ==========================================================================
    /// A call to a function name with no registration.
    #[error("undefined function: '{name}'")]
    UnresolvedFunction {
        /// The function name.
        name: String,
    },

    /// The arguments match none of the registered overloads.
    #[error("no overload of '{name}' accepts argument types ({arg_types})")]
    NoMatchingOverload {
        /// The function name.
        name: String,
        /// Comma-separated runtime argument types.
        arg_types: String,
    },

    /// An external function implementation raised an error.
    #[error("function '{name}' failed: {source}")]
    InvocationError {
        /// The function name.
        name: String,
        /// The original failure.
        #[source]
        source: UdfError,
    },

    // ==========================================================================
    // Execution Errors
    // ==========================================================================
    /// A value disagrees with its declared type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type.
        expected: String,
        /// Actual type.
        actual: String,
    },

    /// The plan is structurally invalid.
    #[error("malformed plan: {message}")]
    MalformedPlan {
        /// What is wrong with the plan.
        message: String,
    },

    /// Integer or floating division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A value could not be cast.
    #[error("cannot cast '{value}' to {target}")]
    Cast {
        /// The value being cast.
        value: String,
        /// The target type.
        target: String,
    },

    /// The external planner could not produce a plan.
    #[error("planning failed: {message}")]
    Planning {
        /// Planner message.
        message: String,
    },

    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Operation not supported.
    #[error("operation not supported: {operation}")]
    Unsupported {
        /// The unsupported operation.
        operation: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl FlintError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedView { .. } => ErrorCode::UnresolvedView,
            Self::ViewAlreadyExists { .. } => ErrorCode::ViewAlreadyExists,
            Self::SessionClosed { .. } => ErrorCode::SessionClosed,
            Self::UnresolvedFunction { .. } => ErrorCode::UnresolvedFunction,
            Self::NoMatchingOverload { .. } => ErrorCode::NoMatchingOverload,
            Self::InvocationError { .. } => ErrorCode::InvocationError,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::MalformedPlan { .. } => ErrorCode::MalformedPlan,
            Self::DivisionByZero => ErrorCode::DivisionByZero,
            Self::Cast { .. } => ErrorCode::Cast,
            Self::Planning { .. } => ErrorCode::Planning,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Unsupported { .. } => ErrorCode::Unsupported,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates a malformed plan error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPlan {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
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
}
