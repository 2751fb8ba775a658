//! Physical plan representation and display.
//!
//! A PhysicalPlan wraps a tree of PhysicalOperators and provides
//! methods for displaying, explaining, and analyzing the plan.

use std::fmt;
use std::sync::Arc;

use super::operator::PhysicalOperator;
use crate::schema::SchemaRef;

/// A physical execution plan.
///
/// Immutable once built; cloning shares the operator tree.
#[derive(Debug, Clone)]
pub struct PhysicalPlan {
    /// Root operator of the plan.
    pub root: Arc<PhysicalOperator>,
    /// Plan-level metadata.
    pub metadata: PlanMetadata,
}

/// Metadata about a physical plan.
#[derive(Debug, Clone, Default)]
pub struct PlanMetadata {
    /// Original SQL query (if available).
    pub sql: Option<String>,
    /// Planning time in microseconds.
    pub planning_time_us: u64,
}

impl PhysicalPlan {
    /// Creates a new physical plan.
    pub fn new(root: PhysicalOperator) -> Self {
        Self {
            root: Arc::new(root),
            metadata: PlanMetadata::default(),
        }
    }

    /// Creates a plan with the given root operator.
    pub fn with_root(root: Arc<PhysicalOperator>) -> Self {
        Self {
            root,
            metadata: PlanMetadata::default(),
        }
    }

    /// Sets the original SQL.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.metadata.sql = Some(sql.into());
        self
    }

    /// Sets the planning time.
    pub fn with_planning_time(mut self, time_us: u64) -> Self {
        self.metadata.planning_time_us = time_us;
        self
    }

    /// Returns the root operator.
    pub fn root(&self) -> &PhysicalOperator {
        &self.root
    }

    /// Returns the output schema.
    pub fn schema(&self) -> SchemaRef {
        self.root.schema()
    }

    /// Generates an EXPLAIN output for the plan.
    pub fn explain(&self, verbose: bool) -> String {
        let mut output = String::new();
        self.explain_recursive(&self.root, 0, verbose, &mut output);
        output
    }

    fn explain_recursive(
        &self,
        op: &PhysicalOperator,
        indent: usize,
        verbose: bool,
        output: &mut String,
    ) {
        let prefix = "  ".repeat(indent);

        output.push_str(&prefix);
        output.push_str(op.name());

        match op {
            PhysicalOperator::Scan(scan) => {
                output.push_str(&format!(" (view={})", scan.view_name));
                if let Some(ref proj) = scan.projection {
                    output.push_str(&format!(", cols={:?}", proj));
                }
            }
            PhysicalOperator::Values(vals) => {
                output.push_str(&format!(" (rows={})", vals.values.len()));
            }
            PhysicalOperator::Projection(proj) => {
                if verbose {
                    let exprs: Vec<String> = proj.exprs.iter().map(|e| e.to_string()).collect();
                    output.push_str(&format!(" ({})", exprs.join(", ")));
                } else {
                    output.push_str(&format!(" (cols={})", proj.exprs.len()));
                }
            }
            PhysicalOperator::Filter(filter) => {
                if verbose {
                    output.push_str(&format!(" ({})", filter.predicate));
                }
            }
            PhysicalOperator::Generate(generate) => {
                output.push_str(&format!(" ({}", generate.generator));
                if generate.outer {
                    output.push_str(", outer");
                }
                output.push(')');
            }
            PhysicalOperator::HashAggregate(agg) => {
                output.push_str(&format!(
                    " (groups={}, aggs={})",
                    agg.group_by.len(),
                    agg.aggregates.len()
                ));
                if verbose {
                    for aggregate in &agg.aggregates {
                        output.push_str(&format!(" {}", aggregate));
                    }
                }
            }
            PhysicalOperator::HashJoin(join) => {
                output.push_str(&format!(" (type={})", join.join_type));
                output.push_str(&format!(", keys={}", join.left_keys.len()));
            }
            PhysicalOperator::NestedLoopJoin(join) => {
                output.push_str(&format!(" (type={})", join.join_type));
            }
            PhysicalOperator::Window(window) => {
                output.push_str(&format!(" (exprs={})", window.window_exprs.len()));
            }
            PhysicalOperator::Union(union) => {
                if union.all {
                    output.push_str(" (all)");
                }
            }
            PhysicalOperator::Sort(sort) => {
                output.push_str(&format!(" (cols={})", sort.order_by.len()));
            }
            PhysicalOperator::Limit(limit) => {
                output.push_str(&format!(" (offset={}", limit.offset));
                if let Some(fetch) = limit.fetch {
                    output.push_str(&format!(", fetch={}", fetch));
                }
                output.push(')');
            }
            PhysicalOperator::TakeOrderedAndProject(take) => {
                output.push_str(&format!(
                    " (limit={}, cols={})",
                    take.limit,
                    take.order_by.len()
                ));
            }
            PhysicalOperator::Expand(expand) => {
                output.push_str(&format!(" (sets={})", expand.projections.len()));
            }
        }

        output.push('\n');

        for child in op.children() {
            self.explain_recursive(child, indent + 1, verbose, output);
        }
    }

    /// Generates a tree visualization of the plan.
    pub fn display_tree(&self) -> String {
        let mut output = String::new();
        self.display_tree_recursive(&self.root, "", true, &mut output);
        output
    }

    fn display_tree_recursive(
        &self,
        op: &PhysicalOperator,
        prefix: &str,
        is_last: bool,
        output: &mut String,
    ) {
        let connector = if is_last { "\\-- " } else { "|-- " };
        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(op.name());
        output.push('\n');

        let children = op.children();
        let child_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "|" });

        for (i, child) in children.iter().enumerate() {
            let is_last_child = i == children.len() - 1;
            self.display_tree_recursive(child, &child_prefix, is_last_child, output);
        }
    }

    /// Counts the total number of operators in the plan.
    pub fn operator_count(&self) -> usize {
        self.count_operators(&self.root)
    }

    fn count_operators(&self, op: &PhysicalOperator) -> usize {
        1 + op
            .children()
            .iter()
            .map(|c| self.count_operators(c))
            .sum::<usize>()
    }

    /// Returns the depth of the plan tree.
    pub fn depth(&self) -> usize {
        self.calculate_depth(&self.root)
    }

    fn calculate_depth(&self, op: &PhysicalOperator) -> usize {
        let children = op.children();
        if children.is_empty() {
            1
        } else {
            1 + children
                .iter()
                .map(|c| self.calculate_depth(c))
                .max()
                .unwrap_or(0)
        }
    }

    /// Collects all operators matching a predicate, in pre-order.
    pub fn find_operators<F>(&self, predicate: F) -> Vec<&PhysicalOperator>
    where
        F: Fn(&PhysicalOperator) -> bool,
    {
        let mut result = Vec::new();
        self.collect_operators(&self.root, &predicate, &mut result);
        result
    }

    fn collect_operators<'a, F>(
        &'a self,
        op: &'a PhysicalOperator,
        predicate: &F,
        result: &mut Vec<&'a PhysicalOperator>,
    ) where
        F: Fn(&PhysicalOperator) -> bool,
    {
        if predicate(op) {
            result.push(op);
        }
        for child in op.children() {
            self.collect_operators(child, predicate, result);
        }
    }

    /// Returns the names of every view scanned by the plan.
    pub fn scanned_views(&self) -> Vec<&str> {
        self.find_operators(|op| matches!(op, PhysicalOperator::Scan(_)))
            .into_iter()
            .filter_map(|op| match op {
                PhysicalOperator::Scan(scan) => Some(scan.view_name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the plan contains any joins.
    pub fn has_joins(&self) -> bool {
        !self
            .find_operators(|op| {
                matches!(
                    op,
                    PhysicalOperator::HashJoin(_) | PhysicalOperator::NestedLoopJoin(_)
                )
            })
            .is_empty()
    }

    /// Returns true if the plan contains any aggregates.
    pub fn has_aggregates(&self) -> bool {
        !self
            .find_operators(|op| matches!(op, PhysicalOperator::HashAggregate(_)))
            .is_empty()
    }

    /// Returns true if the plan contains any sorts.
    pub fn has_sorts(&self) -> bool {
        !self
            .find_operators(|op| {
                matches!(
                    op,
                    PhysicalOperator::Sort(_) | PhysicalOperator::TakeOrderedAndProject(_)
                )
            })
            .is_empty()
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain(false))
    }
}

impl From<PhysicalOperator> for PhysicalPlan {
    fn from(root: PhysicalOperator) -> Self {
        PhysicalPlan::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physical::{
        AggregateFunc, BinaryOp, FilterPhysicalOperator, HashAggregateOperator,
        LimitPhysicalOperator, PhysicalAggregateExpr, PhysicalExpr, ScanOperator,
    };
    use crate::schema::{Field, Schema};
    use crate::types::DataType;

    fn test_schema() -> Schema {
        Schema::new(vec![
            Field::nullable("name", DataType::Text),
            Field::nullable("age", DataType::Int),
            Field::nullable("sex", DataType::Int),
        ])
    }

    fn scan() -> Arc<PhysicalOperator> {
        Arc::new(PhysicalOperator::Scan(ScanOperator::new("people", test_schema())))
    }

    #[test]
    fn test_simple_plan() {
        let plan = PhysicalPlan::with_root(scan());

        assert_eq!(plan.operator_count(), 1);
        assert_eq!(plan.depth(), 1);
        assert!(!plan.has_joins());
        assert_eq!(plan.scanned_views(), vec!["people"]);
    }

    #[test]
    fn test_plan_with_filter() {
        let filter = FilterPhysicalOperator::new(
            scan(),
            PhysicalExpr::binary(
                PhysicalExpr::column("age", 1),
                BinaryOp::Gt,
                PhysicalExpr::lit_i64(2),
            ),
        );
        let plan = PhysicalPlan::new(PhysicalOperator::Filter(filter));

        assert_eq!(plan.operator_count(), 2);
        assert_eq!(plan.depth(), 2);
        assert!(plan.explain(true).contains("(age > 2)"));
    }

    #[test]
    fn test_explain_output() {
        let plan = PhysicalPlan::with_root(scan());
        let explain = plan.explain(false);
        assert!(explain.contains("Scan"));
        assert!(explain.contains("people"));
    }

    #[test]
    fn test_display_tree() {
        let limit = LimitPhysicalOperator::new(scan(), 0, Some(10));
        let plan = PhysicalPlan::new(PhysicalOperator::Limit(limit));

        let tree = plan.display_tree();
        assert!(tree.contains("Limit"));
        assert!(tree.contains("Scan"));
    }

    #[test]
    fn test_has_aggregates() {
        let agg = HashAggregateOperator::new(
            scan(),
            vec![],
            vec![PhysicalAggregateExpr::new(
                AggregateFunc::CountStar,
                vec![],
                false,
                "count",
            )],
        );
        let plan = PhysicalPlan::new(PhysicalOperator::HashAggregate(agg));

        assert!(plan.has_aggregates());
        assert!(!plan.has_sorts());
    }

    #[test]
    fn test_plan_metadata() {
        let plan = PhysicalPlan::with_root(scan())
            .with_sql("SELECT * FROM people")
            .with_planning_time(1000);

        assert_eq!(plan.metadata.sql, Some("SELECT * FROM people".to_string()));
        assert_eq!(plan.metadata.planning_time_us, 1000);
    }
}
