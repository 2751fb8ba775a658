//! A planner that answers from a fixed table of SQL texts.

use std::collections::HashMap;

use flint_common::{FlintError, FlintResult};
use flint_session::{QueryPlanner, Session};
use flint_sql::physical::PhysicalPlan;
use tracing::debug;

/// Maps known SQL statements to prebuilt physical plans.
///
/// Statements are matched after collapsing whitespace, so formatting
/// differences in test sources do not matter.
#[derive(Debug, Clone, Default)]
pub struct LookupPlanner {
    plans: HashMap<String, PhysicalPlan>,
}

impl LookupPlanner {
    /// Creates an empty planner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement and its plan.
    pub fn with(mut self, sql: &str, plan: PhysicalPlan) -> Self {
        self.plans.insert(collapse(sql), plan);
        self
    }

    /// Returns the number of known statements.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Returns true if no statement is known.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

fn collapse(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl QueryPlanner for LookupPlanner {
    fn plan(&self, sql: &str, session: &Session) -> FlintResult<PhysicalPlan> {
        debug!("{} planning: {}", session.id(), sql);
        self.plans
            .get(&collapse(sql))
            .cloned()
            .ok_or_else(|| FlintError::Planning {
                message: format!("no plan registered for '{}'", sql),
            })
    }
}
