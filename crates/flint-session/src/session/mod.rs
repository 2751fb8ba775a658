//! Sessions.
//!
//! A Session owns the temporary views and temporary functions registered
//! through it and is the entry point for direct execution. Sessions share
//! only their engine: configuration, permanent functions and built-ins.
//! Every catalog mutation is visible to the next call on the same session
//! and never to any other session.

mod catalog;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flint_common::{EngineConfig, FlintError, FlintResult};
use flint_sql::functions::{FunctionDescriptor, Overload};
use flint_sql::physical::{ExecutionCatalog, PhysicalPlan};
use flint_sql::{QueryExecutor, Table};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

pub(crate) use catalog::SessionCatalog;

use crate::engine::EngineShared;

/// Unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

/// Where a function registration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionLifetime {
    /// Visible only to the registering session.
    Temporary,
    /// Visible to every session of the engine, including existing ones.
    Permanent,
}

/// A flint session.
pub struct Session {
    /// Session ID.
    id: SessionId,
    /// Shared engine state.
    engine: Arc<EngineShared>,
    /// Temporary views and functions.
    catalog: RwLock<SessionCatalog>,
    /// Set once by `close`.
    closed: AtomicBool,
    /// When the session was created.
    created_at: Instant,
    /// Statement counter.
    statement_count: AtomicU64,
}

impl Session {
    pub(crate) fn open(engine: Arc<EngineShared>, catalog: SessionCatalog) -> Arc<Self> {
        let id = engine.allocate_session_id();
        engine.stats.session_opened();
        info!("Opened {}", id);
        Arc::new(Self {
            id,
            engine,
            catalog: RwLock::new(catalog),
            closed: AtomicBool::new(false),
            created_at: Instant::now(),
            statement_count: AtomicU64::new(0),
        })
    }

    /// Returns the session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.engine.config
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns how long the session has existed.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Returns the number of statements executed.
    pub fn statement_count(&self) -> u64 {
        self.statement_count.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> FlintResult<()> {
        if self.is_closed() {
            return Err(FlintError::SessionClosed {
                session: self.id.to_string(),
            });
        }
        Ok(())
    }

    // The closed flag is checked under the catalog lock so that no mutation
    // lands after `close` cleared the maps.

    fn read_catalog(&self) -> FlintResult<RwLockReadGuard<'_, SessionCatalog>> {
        let catalog = self.catalog.read();
        self.ensure_open()?;
        Ok(catalog)
    }

    fn write_catalog(&self) -> FlintResult<RwLockWriteGuard<'_, SessionCatalog>> {
        let catalog = self.catalog.write();
        self.ensure_open()?;
        Ok(catalog)
    }

    // =========================================================================
    // Temporary Views
    // =========================================================================

    /// Registers `table` under `name`, replacing any existing view.
    pub fn create_or_replace_temp_view(&self, name: &str, table: Table) -> FlintResult<()> {
        let key = self.engine.normalize(name);
        let replaced = self.write_catalog()?.insert_view(key, table).is_some();
        debug!("{} registered view {} (replaced: {})", self.id, name, replaced);
        Ok(())
    }

    /// Registers `table` under `name`; fails if the name is taken.
    pub fn create_temp_view(&self, name: &str, table: Table) -> FlintResult<()> {
        let key = self.engine.normalize(name);
        let mut catalog = self.write_catalog()?;
        if catalog.contains_view(&key) {
            return Err(FlintError::ViewAlreadyExists {
                name: name.to_string(),
            });
        }
        catalog.insert_view(key, table);
        debug!("{} created view {}", self.id, name);
        Ok(())
    }

    /// Registers a result table as a view, replacing any existing one.
    pub fn register_temp_view(&self, name: &str, table: Table) -> FlintResult<()> {
        self.create_or_replace_temp_view(name, table)
    }

    /// Returns the view registered under `name`.
    pub fn temp_view(&self, name: &str) -> FlintResult<Table> {
        let key = self.engine.normalize(name);
        self.read_catalog()?
            .view(&key)
            .ok_or_else(|| FlintError::UnresolvedView {
                name: name.to_string(),
            })
    }

    /// Removes a view; returns true if it existed.
    pub fn drop_temp_view(&self, name: &str) -> FlintResult<bool> {
        let key = self.engine.normalize(name);
        let dropped = self.write_catalog()?.remove_view(&key);
        debug!("{} dropped view {} (existed: {})", self.id, name, dropped);
        Ok(dropped)
    }

    /// Returns the registered view names, sorted.
    pub fn temp_view_names(&self) -> FlintResult<Vec<String>> {
        Ok(self.read_catalog()?.view_names())
    }

    // =========================================================================
    // Derived Sessions
    // =========================================================================

    /// Opens a session on the same engine with an empty catalog.
    pub fn new_session(&self) -> FlintResult<Arc<Session>> {
        self.ensure_open()?;
        Ok(Session::open(self.engine.clone(), SessionCatalog::default()))
    }

    /// Opens a session whose catalog starts as a copy of this one.
    pub fn clone_session(&self) -> FlintResult<Arc<Session>> {
        let snapshot = self.read_catalog()?.clone();
        let session = Session::open(self.engine.clone(), snapshot);
        debug!("{} cloned into {}", self.id, session.id);
        Ok(session)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Registers function overloads with the given lifetime.
    ///
    /// Overloads merge with earlier registrations of the same name and
    /// lifetime; an identical signature replaces the earlier overload.
    pub fn register_function(
        &self,
        name: &str,
        overloads: Vec<Overload>,
        lifetime: FunctionLifetime,
    ) -> FlintResult<()> {
        let key = self.engine.normalize(name);
        match lifetime {
            FunctionLifetime::Temporary => {
                debug!("{} registered temporary function {}", self.id, key);
                self.write_catalog()?.register_function(key, overloads);
            }
            FunctionLifetime::Permanent => {
                self.ensure_open()?;
                self.engine.register_permanent(key, overloads);
            }
        }
        Ok(())
    }

    /// Removes a temporary function; returns true if it existed.
    pub fn drop_temporary_function(&self, name: &str) -> FlintResult<bool> {
        let key = self.engine.normalize(name);
        Ok(self.write_catalog()?.remove_function(&key))
    }

    /// Returns the temporary function names, sorted.
    pub fn temporary_function_names(&self) -> FlintResult<Vec<String>> {
        Ok(self.read_catalog()?.function_names())
    }

    /// Resolves a function: temporaries first, then permanent registrations,
    /// then built-ins.
    pub fn resolve_function(&self, name: &str) -> FlintResult<Arc<FunctionDescriptor>> {
        let key = self.engine.normalize(name);
        let temporary = self.read_catalog()?.function(&key);
        temporary
            .or_else(|| self.engine.shared_function(&key))
            .ok_or_else(|| FlintError::UnresolvedFunction {
                name: name.to_string(),
            })
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Runs `sql` through the reference executor.
    pub fn sql(&self, sql: &str) -> FlintResult<Table> {
        self.ensure_open()?;
        let executor = self
            .engine
            .reference
            .clone()
            .ok_or_else(|| FlintError::Unsupported {
                operation: "sql without a reference executor".to_string(),
            })?;
        self.statement_count.fetch_add(1, Ordering::Relaxed);
        self.engine.stats.reference_execution();
        if self.engine.config.query_logging {
            info!("{} reference execution: {}", self.id, sql);
        }
        executor.execute(sql, self)
    }

    /// Plans `sql` with the engine's planner and executes it directly.
    pub fn sql_directly(&self, sql: &str) -> FlintResult<Table> {
        self.ensure_open()?;
        let planner = self
            .engine
            .planner
            .clone()
            .ok_or_else(|| FlintError::Unsupported {
                operation: "sql_directly without a query planner".to_string(),
            })?;

        let start = Instant::now();
        let plan = planner
            .plan(sql, self)?
            .with_sql(sql)
            .with_planning_time(start.elapsed().as_micros() as u64);
        self.execute_direct(&plan)
    }

    /// Executes a resolved physical plan against this session's catalog.
    pub fn execute_direct(&self, plan: &PhysicalPlan) -> FlintResult<Table> {
        self.ensure_open()?;
        self.statement_count.fetch_add(1, Ordering::Relaxed);

        let config = &self.engine.config;
        if config.query_logging {
            info!(
                "{} direct execution of {} operators: {}",
                self.id,
                plan.operator_count(),
                plan.metadata.sql.as_deref().unwrap_or("<plan>")
            );
        }

        let result = QueryExecutor::new(self, config.execution.clone())
            .with_slow_query_threshold(config.slow_query_threshold)
            .execute(plan);

        match &result {
            Ok(table) => self.engine.stats.direct_execution(Some(table.num_rows())),
            Err(e) => {
                self.engine.stats.direct_execution(None);
                debug!("{} direct execution failed: {}", self.id, e);
            }
        }
        result
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Clears this session's views and functions and marks it closed.
    ///
    /// Closing twice is a no-op. Other sessions are unaffected.
    pub fn close(&self) {
        let mut catalog = self.catalog.write();
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        catalog.clear();
        drop(catalog);

        self.engine.stats.session_closed();
        info!(
            "Closed {} after {} statements",
            self.id,
            self.statement_count()
        );
    }
}

impl ExecutionCatalog for Session {
    fn lookup_view(&self, name: &str) -> FlintResult<Table> {
        self.temp_view(name)
    }

    fn lookup_function(&self, name: &str) -> FlintResult<Arc<FunctionDescriptor>> {
        self.resolve_function(name)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("statement_count", &self.statement_count())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !*self.closed.get_mut() {
            self.engine.stats.session_closed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{call_plan, group_count_plan, init_tracing, people};
    use crate::Engine;
    use flint_common::ErrorCode;
    use flint_sql::physical::PhysicalExpr;
    use flint_sql::{DataType, Value};

    fn engine() -> Engine {
        init_tracing();
        Engine::new(EngineConfig::for_testing()).unwrap()
    }

    fn constant(value: i32) -> Vec<Overload> {
        vec![Overload::new(
            vec![DataType::Int],
            DataType::Int,
            move |_: &[Value]| Ok(Value::Int(value)),
        )]
    }

    fn answer(session: &Session) -> FlintResult<String> {
        session
            .execute_direct(&call_plan("answer", PhysicalExpr::lit_i64(1), DataType::Int))
            .map(|table| table.to_string())
    }

    fn plan_people(sql: &str, _session: &Session) -> FlintResult<PhysicalPlan> {
        match sql {
            "select sex, count(*) from people group by sex order by sex" => {
                Ok(group_count_plan())
            }
            other => Err(FlintError::Planning {
                message: format!("cannot plan '{}'", other),
            }),
        }
    }

    fn reference_people(_sql: &str, session: &Session) -> FlintResult<Table> {
        session.temp_view("people")
    }

    #[test]
    fn test_temp_view_lifecycle() {
        let session = engine().create_session();
        session.create_or_replace_temp_view("people", people()).unwrap();
        session.create_or_replace_temp_view("people", people()).unwrap();
        session.register_temp_view("people2", people()).unwrap();
        assert_eq!(session.temp_view_names().unwrap(), vec!["people", "people2"]);

        assert!(session.drop_temp_view("people2").unwrap());
        assert!(!session.drop_temp_view("people2").unwrap());
        assert!(matches!(
            session.temp_view("people2"),
            Err(FlintError::UnresolvedView { .. })
        ));
    }

    #[test]
    fn test_create_temp_view_collision() {
        let session = engine().create_session();
        session.create_temp_view("people", people()).unwrap();
        let err = session.create_temp_view("PEOPLE", people()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ViewAlreadyExists);
    }

    #[test]
    fn test_execute_direct_group_count() {
        let session = engine().create_session();
        session.create_or_replace_temp_view("People", people()).unwrap();
        let table = session.execute_direct(&group_count_plan()).unwrap();
        assert_eq!(table.to_string(), "[0,2],[1,3]");
        assert_eq!(session.statement_count(), 1);
    }

    #[test]
    fn test_case_sensitive_catalog() {
        let config = EngineConfig::builder().case_sensitive(true).build();
        let session = Engine::new(config).unwrap().create_session();
        session.create_or_replace_temp_view("People", people()).unwrap();
        assert!(session.temp_view("People").is_ok());
        assert!(matches!(
            session.execute_direct(&group_count_plan()),
            Err(FlintError::UnresolvedView { .. })
        ));
    }

    #[test]
    fn test_result_registered_as_view() {
        let session = engine().create_session();
        session.create_or_replace_temp_view("people", people()).unwrap();
        let counts = session.execute_direct(&group_count_plan()).unwrap();
        session.register_temp_view("counts", counts.clone()).unwrap();
        assert_eq!(session.temp_view("counts").unwrap(), counts);
    }

    #[test]
    fn test_new_session_is_empty() {
        let engine = engine();
        let session = engine.create_session();
        session.create_or_replace_temp_view("people", people()).unwrap();
        session
            .register_function("answer", constant(1), FunctionLifetime::Temporary)
            .unwrap();

        let fresh = session.new_session().unwrap();
        assert_ne!(fresh.id(), session.id());
        assert!(fresh.temp_view_names().unwrap().is_empty());
        assert!(matches!(
            answer(&fresh),
            Err(FlintError::UnresolvedFunction { .. })
        ));
    }

    #[test]
    fn test_clone_session_snapshot() {
        let session = engine().create_session();
        session.create_or_replace_temp_view("people", people()).unwrap();

        let cloned = session.clone_session().unwrap();
        cloned.create_or_replace_temp_view("extra", people()).unwrap();
        session.drop_temp_view("people").unwrap();

        assert_eq!(cloned.temp_view_names().unwrap(), vec!["extra", "people"]);
        assert!(session.temp_view_names().unwrap().is_empty());
    }

    #[test]
    fn test_function_resolution_order() {
        let engine = engine();
        let session = engine.create_session();
        let other = engine.create_session();

        session
            .register_function("answer", constant(1), FunctionLifetime::Permanent)
            .unwrap();
        assert_eq!(answer(&session).unwrap(), "[1]");
        assert_eq!(answer(&other).unwrap(), "[1]");

        session
            .register_function("Answer", constant(2), FunctionLifetime::Temporary)
            .unwrap();
        assert_eq!(answer(&session).unwrap(), "[2]");
        assert_eq!(answer(&other).unwrap(), "[1]");
        assert_eq!(answer(&engine.create_session()).unwrap(), "[1]");

        assert!(session.drop_temporary_function("answer").unwrap());
        assert_eq!(answer(&session).unwrap(), "[1]");
        assert!(session.temporary_function_names().unwrap().is_empty());
    }

    #[test]
    fn test_temporary_shadows_builtin() {
        let session = engine().create_session();
        let builtin = session.resolve_function("upper").unwrap();
        session
            .register_function("upper", constant(3), FunctionLifetime::Temporary)
            .unwrap();
        let shadowed = session.resolve_function("UPPER").unwrap();
        assert!(!Arc::ptr_eq(&builtin, &shadowed));
    }

    #[test]
    fn test_close() {
        let engine = engine();
        let session = engine.create_session();
        let other = engine.create_session();
        session.create_or_replace_temp_view("people", people()).unwrap();
        other.create_or_replace_temp_view("people", people()).unwrap();

        session.close();
        session.close();
        assert!(session.is_closed());

        let err = session.temp_view("people").unwrap_err();
        assert_eq!(err.to_string(), format!("{} is closed", session.id()));
        assert!(matches!(
            session.execute_direct(&group_count_plan()),
            Err(FlintError::SessionClosed { .. })
        ));
        assert!(matches!(
            session.create_or_replace_temp_view("people", people()),
            Err(FlintError::SessionClosed { .. })
        ));
        assert!(session.new_session().is_err());

        assert_eq!(
            other.execute_direct(&group_count_plan()).unwrap().to_string(),
            "[0,2],[1,3]"
        );
        assert_eq!(engine.stats().active_sessions, 1);
    }

    #[test]
    fn test_sql_entry_points_need_collaborators() {
        let session = engine().create_session();
        assert!(matches!(
            session.sql("select 1"),
            Err(FlintError::Unsupported { .. })
        ));
        assert!(matches!(
            session.sql_directly("select 1"),
            Err(FlintError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_sql_directly_with_planner() {
        let engine = Engine::builder()
            .config(EngineConfig::for_testing())
            .planner(plan_people)
            .reference_executor(reference_people)
            .build()
            .unwrap();
        let session = engine.create_session();
        session.create_or_replace_temp_view("people", people()).unwrap();

        let direct = session
            .sql_directly("select sex, count(*) from people group by sex order by sex")
            .unwrap();
        assert_eq!(direct.to_string(), "[0,2],[1,3]");
        assert!(matches!(
            session.sql_directly("select nothing"),
            Err(FlintError::Planning { .. })
        ));
        assert_eq!(session.sql("select * from people").unwrap(), people());

        let stats = engine.stats();
        assert_eq!(stats.direct_executions, 1);
        assert_eq!(stats.rows_returned, 2);
        assert_eq!(stats.reference_executions, 1);
    }
}
