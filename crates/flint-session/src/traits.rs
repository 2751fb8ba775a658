//! Seams to the collaborators that live outside the engine.

use flint_common::FlintResult;
use flint_sql::physical::PhysicalPlan;
use flint_sql::Table;

use crate::session::Session;

/// Turns SQL text into a resolved physical plan.
///
/// Implementations may consult the session for view schemas and function
/// signatures. Closures with the matching signature implement this trait.
pub trait QueryPlanner: Send + Sync {
    /// Plans `sql` against `session`.
    fn plan(&self, sql: &str, session: &Session) -> FlintResult<PhysicalPlan>;
}

impl<F> QueryPlanner for F
where
    F: Fn(&str, &Session) -> FlintResult<PhysicalPlan> + Send + Sync,
{
    fn plan(&self, sql: &str, session: &Session) -> FlintResult<PhysicalPlan> {
        self(sql, session)
    }
}

/// The reference execution path that direct results are compared against.
pub trait ReferenceExecutor: Send + Sync {
    /// Runs `sql` against `session` and returns its result.
    fn execute(&self, sql: &str, session: &Session) -> FlintResult<Table>;
}

impl<F> ReferenceExecutor for F
where
    F: Fn(&str, &Session) -> FlintResult<Table> + Send + Sync,
{
    fn execute(&self, sql: &str, session: &Session) -> FlintResult<Table> {
        self(sql, session)
    }
}
