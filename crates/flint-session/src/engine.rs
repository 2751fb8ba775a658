//! Main engine.
//!
//! The `Engine` is the top-level entry point for flint. It owns the state
//! every session shares and hands out sessions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flint_common::{EngineConfig, FlintResult};
use flint_sql::functions::{FunctionDescriptor, FunctionRegistry, Overload};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::session::{Session, SessionCatalog, SessionId};
use crate::stats::{EngineStats, StatsCounters};
use crate::traits::{QueryPlanner, ReferenceExecutor};

/// State shared by the engine handle and every session it created.
pub(crate) struct EngineShared {
    /// Configuration.
    pub(crate) config: EngineConfig,
    /// Built-in functions, immutable after construction.
    builtins: FunctionRegistry,
    /// Engine-wide function registrations.
    permanent: RwLock<FunctionRegistry>,
    /// Turns SQL text into physical plans.
    pub(crate) planner: Option<Arc<dyn QueryPlanner>>,
    /// Reference execution path.
    pub(crate) reference: Option<Arc<dyn ReferenceExecutor>>,
    /// Next session ID.
    next_session_id: AtomicU64,
    /// Statistics counters.
    pub(crate) stats: StatsCounters,
    /// When the engine was created.
    started_at: Instant,
}

impl EngineShared {
    pub(crate) fn allocate_session_id(&self) -> SessionId {
        SessionId::new(self.next_session_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Applies the catalog's case rules to a view or function name.
    pub(crate) fn normalize(&self, name: &str) -> String {
        self.config.catalog.normalize(name)
    }

    /// Looks up a normalized name among permanent, then built-in functions.
    pub(crate) fn shared_function(&self, name: &str) -> Option<Arc<FunctionDescriptor>> {
        self.permanent
            .read()
            .get(name)
            .or_else(|| self.builtins.get(name))
    }

    pub(crate) fn register_permanent(&self, name: String, overloads: Vec<Overload>) {
        debug!("Registering permanent function {}", name);
        self.permanent.write().register(name, overloads);
    }
}

/// The flint engine.
///
/// Cloning an `Engine` yields another handle to the same shared state.
///
/// # Example
///
/// ```rust,ignore
/// let engine = Engine::new(EngineConfig::default())?;
/// let session = engine.create_session();
/// let table = session.execute_direct(&plan)?;
/// ```
#[derive(Clone)]
pub struct Engine {
    shared: Arc<EngineShared>,
}

impl Engine {
    /// Creates an engine with no planner and no reference executor.
    pub fn new(config: EngineConfig) -> FlintResult<Self> {
        Self::builder().config(config).build()
    }

    /// Returns a builder for an engine with external collaborators.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    // =========================================================================
    // Session Management
    // =========================================================================

    /// Creates a session with an empty catalog.
    pub fn create_session(&self) -> Arc<Session> {
        Session::open(self.shared.clone(), SessionCatalog::default())
    }

    // =========================================================================
    // Permanent Functions
    // =========================================================================

    /// Registers overloads visible to every session of this engine.
    pub fn register_permanent_function(&self, name: &str, overloads: Vec<Overload>) {
        let name = self.shared.normalize(name);
        self.shared.register_permanent(name, overloads);
    }

    /// Removes a permanent function; returns true if it existed.
    pub fn drop_permanent_function(&self, name: &str) -> bool {
        let name = self.shared.normalize(name);
        self.shared.permanent.write().remove(&name)
    }

    /// Returns the permanent function names, sorted.
    pub fn permanent_function_names(&self) -> Vec<String> {
        self.shared.permanent.read().names()
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns engine statistics.
    pub fn stats(&self) -> EngineStats {
        self.shared.stats.snapshot(self.uptime())
    }

    /// Returns uptime.
    pub fn uptime(&self) -> Duration {
        self.shared.started_at.elapsed()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.shared.config)
            .field("planner", &self.shared.planner.is_some())
            .field("reference", &self.shared.reference.is_some())
            .finish()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    planner: Option<Arc<dyn QueryPlanner>>,
    reference: Option<Arc<dyn ReferenceExecutor>>,
}

impl EngineBuilder {
    /// Sets the configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the planner used by `Session::sql_directly`.
    pub fn planner(mut self, planner: impl QueryPlanner + 'static) -> Self {
        self.planner = Some(Arc::new(planner));
        self
    }

    /// Sets the executor used by `Session::sql`.
    pub fn reference_executor(mut self, executor: impl ReferenceExecutor + 'static) -> Self {
        self.reference = Some(Arc::new(executor));
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> FlintResult<Engine> {
        self.config.validate()?;
        info!(
            "Starting engine: batch_size={}, case_sensitive={}, planner={}, reference={}",
            self.config.execution.batch_size,
            self.config.catalog.case_sensitive,
            self.planner.is_some(),
            self.reference.is_some()
        );
        Ok(Engine {
            shared: Arc::new(EngineShared {
                config: self.config,
                builtins: FunctionRegistry::with_builtins(),
                permanent: RwLock::new(FunctionRegistry::new()),
                planner: self.planner,
                reference: self.reference,
                next_session_id: AtomicU64::new(1),
                stats: StatsCounters::default(),
                started_at: Instant::now(),
            }),
        })
    }
}
