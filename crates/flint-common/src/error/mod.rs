//! Error handling for flint.
//!
//! This module provides the unified error type and result alias used
//! across all flint components.

mod flint;

pub use flint::{ErrorCode, FlintError, UdfError};

/// Result type alias for flint operations.
pub type FlintResult<T> = std::result::Result<T, FlintError>;
