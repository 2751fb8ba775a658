//! Configuration for flint.
//!
//! This module provides configuration structures for the engine, the
//! executor and the session catalog.

mod engine;

pub use engine::{CatalogSettings, EngineConfig, EngineConfigBuilder, ExecutionSettings};
