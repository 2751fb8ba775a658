//! # flint-session
//!
//! Engine and session management for flint.
//!
//! An [`Engine`] owns everything sessions share: the configuration, the
//! permanent function catalog, the built-in functions, the optional query
//! planner and reference executor, and engine-wide statistics. A
//! [`Session`] owns its temporary views and temporary functions and is the
//! entry point for direct execution.
//!
//! ## Example
//!
//! ```rust,ignore
//! use flint_session::Engine;
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let session = engine.create_session();
//! session.create_or_replace_temp_view("people", people)?;
//! let table = session.execute_direct(&plan)?;
//! assert_eq!(table.to_string(), "[0,2],[1,3]");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod session;
mod stats;
mod traits;

#[cfg(test)]
mod testing;

pub use engine::{Engine, EngineBuilder};
pub use session::{FunctionLifetime, Session, SessionId};
pub use stats::EngineStats;
pub use traits::{QueryPlanner, ReferenceExecutor};
