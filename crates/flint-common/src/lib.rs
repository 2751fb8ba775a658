//! # flint-common
//!
//! Common errors, configuration and constants for flint.
//!
//! This crate provides the foundations shared by every flint component:
//!
//! - **Errors**: the unified `FlintError` taxonomy with stable `ErrorCode`s
//! - **Config**: engine, execution and catalog settings loadable from TOML
//! - **Constants**: defaults and reserved names
//!
//! ## Example
//!
//! ```rust
//! use flint_common::error::{FlintError, FlintResult};
//!
//! fn lookup(name: &str) -> FlintResult<()> {
//!     Err(FlintError::UnresolvedView { name: name.to_string() })
//! }
//!
//! assert!(lookup("people").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod error;

pub use config::{CatalogSettings, EngineConfig, EngineConfigBuilder, ExecutionSettings};
pub use constants::*;
pub use error::{ErrorCode, FlintError, FlintResult, UdfError};
