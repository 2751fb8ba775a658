//! Physical operators.
//!
//! A plan is a tree of `PhysicalOperator` nodes. Each node carries its
//! expressions, its output schema and `Arc` handles to its children, so a
//! plan can be shared between threads and executed any number of times.

use std::fmt;
use std::sync::Arc;

use flint_common::GROUPING_ID_COLUMN;
use flint_common::{GENERATOR_ELEMENT_COLUMN, GENERATOR_POSITION_COLUMN};

use super::expr::{
    PhysicalAggregateExpr, PhysicalExpr, PhysicalSortExpr, PhysicalWindowExpr, WindowFunc,
};
use crate::schema::{Field, Schema, SchemaRef};
use crate::types::{DataType, JoinType, Literal};

/// A physical operator in the execution plan.
#[derive(Debug, Clone)]
pub enum PhysicalOperator {
    /// Temp view scan.
    Scan(ScanOperator),

    /// Inline rows.
    Values(ValuesPhysicalOperator),

    /// Projection operator.
    Projection(ProjectionPhysicalOperator),

    /// Filter operator.
    Filter(FilterPhysicalOperator),

    /// Array explode.
    Generate(GenerateOperator),

    /// Hash aggregate.
    HashAggregate(HashAggregateOperator),

    /// Hash join on equi-keys.
    HashJoin(HashJoinOperator),

    /// Nested loop join.
    NestedLoopJoin(NestedLoopJoinOperator),

    /// Window functions.
    Window(WindowPhysicalOperator),

    /// Union of two inputs.
    Union(UnionOperator),

    /// Full sort.
    Sort(SortPhysicalOperator),

    /// Offset and fetch.
    Limit(LimitPhysicalOperator),

    /// Top-K sort followed by an optional projection.
    TakeOrderedAndProject(TakeOrderedAndProjectOperator),

    /// Grouping set expansion.
    Expand(ExpandOperator),
}

impl PhysicalOperator {
    /// Returns the output schema.
    pub fn schema(&self) -> SchemaRef {
        match self {
            PhysicalOperator::Scan(op) => op.projected_schema.clone(),
            PhysicalOperator::Values(op) => op.schema.clone(),
            PhysicalOperator::Projection(op) => op.schema.clone(),
            PhysicalOperator::Filter(op) => op.input.schema(),
            PhysicalOperator::Generate(op) => op.schema.clone(),
            PhysicalOperator::HashAggregate(op) => op.schema.clone(),
            PhysicalOperator::HashJoin(op) => op.schema.clone(),
            PhysicalOperator::NestedLoopJoin(op) => op.schema.clone(),
            PhysicalOperator::Window(op) => op.schema.clone(),
            PhysicalOperator::Union(op) => op.schema.clone(),
            PhysicalOperator::Sort(op) => op.input.schema(),
            PhysicalOperator::Limit(op) => op.input.schema(),
            PhysicalOperator::TakeOrderedAndProject(op) => op.schema.clone(),
            PhysicalOperator::Expand(op) => op.schema.clone(),
        }
    }

    /// Returns child operators.
    pub fn children(&self) -> Vec<&Arc<PhysicalOperator>> {
        match self {
            PhysicalOperator::Scan(_) | PhysicalOperator::Values(_) => vec![],

            PhysicalOperator::Projection(op) => vec![&op.input],
            PhysicalOperator::Filter(op) => vec![&op.input],
            PhysicalOperator::Generate(op) => vec![&op.input],
            PhysicalOperator::HashAggregate(op) => vec![&op.input],
            PhysicalOperator::Window(op) => vec![&op.input],
            PhysicalOperator::Sort(op) => vec![&op.input],
            PhysicalOperator::Limit(op) => vec![&op.input],
            PhysicalOperator::TakeOrderedAndProject(op) => vec![&op.input],
            PhysicalOperator::Expand(op) => vec![&op.input],

            PhysicalOperator::HashJoin(op) => vec![&op.left, &op.right],
            PhysicalOperator::NestedLoopJoin(op) => vec![&op.left, &op.right],
            PhysicalOperator::Union(op) => vec![&op.left, &op.right],
        }
    }

    /// Returns the operator name.
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalOperator::Scan(_) => "Scan",
            PhysicalOperator::Values(_) => "Values",
            PhysicalOperator::Projection(_) => "Projection",
            PhysicalOperator::Filter(_) => "Filter",
            PhysicalOperator::Generate(_) => "Generate",
            PhysicalOperator::HashAggregate(_) => "HashAggregate",
            PhysicalOperator::HashJoin(_) => "HashJoin",
            PhysicalOperator::NestedLoopJoin(_) => "NestedLoopJoin",
            PhysicalOperator::Window(_) => "Window",
            PhysicalOperator::Union(_) => "Union",
            PhysicalOperator::Sort(_) => "Sort",
            PhysicalOperator::Limit(_) => "Limit",
            PhysicalOperator::TakeOrderedAndProject(_) => "TakeOrderedAndProject",
            PhysicalOperator::Expand(_) => "Expand",
        }
    }

    /// Returns every expression evaluated against this node's input rows,
    /// paired with the width of the row it is evaluated on.
    pub fn expressions(&self) -> Vec<(&PhysicalExpr, usize)> {
        fn width(op: &Arc<PhysicalOperator>) -> usize {
            op.schema().len()
        }
        match self {
            PhysicalOperator::Scan(_) => vec![],
            PhysicalOperator::Values(op) => op.values.iter().flatten().map(|e| (e, 0)).collect(),
            PhysicalOperator::Projection(op) => {
                let w = width(&op.input);
                op.exprs.iter().map(|e| (e, w)).collect()
            }
            PhysicalOperator::Filter(op) => vec![(&op.predicate, width(&op.input))],
            PhysicalOperator::Generate(op) => vec![(&op.generator, width(&op.input))],
            PhysicalOperator::HashAggregate(op) => {
                let w = width(&op.input);
                let mut exprs: Vec<&PhysicalExpr> = op.group_by.iter().collect();
                for agg in &op.aggregates {
                    exprs.extend(agg.args.iter());
                    exprs.extend(agg.filter.as_deref());
                }
                exprs.into_iter().map(|e| (e, w)).collect()
            }
            PhysicalOperator::HashJoin(op) => {
                let (lw, rw) = (width(&op.left), width(&op.right));
                let mut exprs: Vec<(&PhysicalExpr, usize)> =
                    op.left_keys.iter().map(|e| (e, lw)).collect();
                exprs.extend(op.right_keys.iter().map(|e| (e, rw)));
                exprs.extend(op.filter.iter().map(|e| (e, lw + rw)));
                exprs
            }
            PhysicalOperator::NestedLoopJoin(op) => op
                .condition
                .iter()
                .map(|e| (e, width(&op.left) + width(&op.right)))
                .collect(),
            PhysicalOperator::Window(op) => {
                let w = width(&op.input);
                let mut exprs: Vec<&PhysicalExpr> = op.partition_by.iter().collect();
                exprs.extend(op.order_by.iter().map(|s| &s.expr));
                for window in &op.window_exprs {
                    exprs.extend(window.args.iter());
                }
                exprs.into_iter().map(|e| (e, w)).collect()
            }
            PhysicalOperator::Union(_) | PhysicalOperator::Limit(_) => vec![],
            PhysicalOperator::Sort(op) => {
                let w = width(&op.input);
                op.order_by.iter().map(|s| (&s.expr, w)).collect()
            }
            PhysicalOperator::TakeOrderedAndProject(op) => {
                let w = width(&op.input);
                let mut exprs: Vec<&PhysicalExpr> = op.order_by.iter().map(|s| &s.expr).collect();
                if let Some(projection) = &op.projection {
                    exprs.extend(projection.iter());
                }
                exprs.into_iter().map(|e| (e, w)).collect()
            }
            PhysicalOperator::Expand(op) => {
                let w = width(&op.input);
                op.projections.iter().flatten().map(|e| (e, w)).collect()
            }
        }
    }
}

impl fmt::Display for PhysicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Builds output fields for named expressions over `input`.
fn named_fields(exprs: &[(PhysicalExpr, String)], input: &Schema) -> Vec<Field> {
    exprs
        .iter()
        .map(|(expr, name)| {
            if expr.nullable(input) {
                Field::nullable(name.clone(), expr.data_type(input))
            } else {
                Field::not_null(name.clone(), expr.data_type(input))
            }
        })
        .collect()
}

// ============================================================================
// Leaf Operators
// ============================================================================

/// Scan of a session temp view.
///
/// The view is resolved by name when the plan is bound; its schema must be
/// positionally compatible with `view_schema`.
#[derive(Debug, Clone)]
pub struct ScanOperator {
    /// View name.
    pub view_name: String,
    /// Schema the plan expects the view to have.
    pub view_schema: SchemaRef,
    /// Column indices to project.
    pub projection: Option<Vec<usize>>,
    /// Projected schema.
    pub projected_schema: SchemaRef,
}

impl ScanOperator {
    /// Creates a new scan.
    pub fn new(view_name: impl Into<String>, schema: Schema) -> Self {
        let schema = Arc::new(schema);
        Self {
            view_name: view_name.into(),
            view_schema: schema.clone(),
            projection: None,
            projected_schema: schema,
        }
    }

    /// Adds a projection.
    pub fn with_projection(mut self, indices: Vec<usize>) -> Self {
        self.projected_schema = Arc::new(self.view_schema.project(&indices));
        self.projection = Some(indices);
        self
    }
}

/// Values operator (inline data).
#[derive(Debug, Clone)]
pub struct ValuesPhysicalOperator {
    /// Rows of expressions, evaluated once each.
    pub values: Vec<Vec<PhysicalExpr>>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl ValuesPhysicalOperator {
    /// Creates a values operator.
    pub fn new(values: Vec<Vec<PhysicalExpr>>, schema: Schema) -> Self {
        Self {
            values,
            schema: Arc::new(schema),
        }
    }

    /// A single row with no columns.
    pub fn one_row() -> Self {
        Self::new(vec![vec![]], Schema::empty())
    }
}

// ============================================================================
// Filter and Projection
// ============================================================================

/// Physical projection operator.
#[derive(Debug, Clone)]
pub struct ProjectionPhysicalOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Projection expressions.
    pub exprs: Vec<PhysicalExpr>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl ProjectionPhysicalOperator {
    /// Creates a projection; the schema is derived from the expressions.
    pub fn new(input: Arc<PhysicalOperator>, exprs: Vec<(PhysicalExpr, String)>) -> Self {
        let schema = Schema::new(named_fields(&exprs, &input.schema()));
        Self {
            input,
            exprs: exprs.into_iter().map(|(e, _)| e).collect(),
            schema: Arc::new(schema),
        }
    }
}

/// Physical filter operator.
#[derive(Debug, Clone)]
pub struct FilterPhysicalOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Filter predicate.
    pub predicate: PhysicalExpr,
}

impl FilterPhysicalOperator {
    /// Creates a filter.
    pub fn new(input: Arc<PhysicalOperator>, predicate: PhysicalExpr) -> Self {
        Self { input, predicate }
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Emits one output row per element of an array-valued generator.
///
/// Output columns are the `required_child_output` columns of the input,
/// then the position (when `with_position`), then the element.
#[derive(Debug, Clone)]
pub struct GenerateOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Array-valued generator expression.
    pub generator: PhysicalExpr,
    /// Input columns carried into the output.
    pub required_child_output: Vec<usize>,
    /// Emit a position column before the element.
    pub with_position: bool,
    /// Emit one null-padded row for a null or empty array.
    pub outer: bool,
    /// Output schema.
    pub schema: SchemaRef,
}

impl GenerateOperator {
    /// Creates an inner explode carrying `required_child_output`.
    pub fn new(
        input: Arc<PhysicalOperator>,
        generator: PhysicalExpr,
        required_child_output: Vec<usize>,
    ) -> Self {
        let mut op = Self {
            input,
            generator,
            required_child_output,
            with_position: false,
            outer: false,
            schema: Arc::new(Schema::empty()),
        };
        op.schema = Arc::new(op.derive_schema());
        op
    }

    /// Adds the position column (`posexplode`).
    pub fn with_position(mut self) -> Self {
        self.with_position = true;
        self.schema = Arc::new(self.derive_schema());
        self
    }

    /// Switches to outer semantics.
    pub fn outer(mut self) -> Self {
        self.outer = true;
        self.schema = Arc::new(self.derive_schema());
        self
    }

    fn derive_schema(&self) -> Schema {
        let input = self.input.schema();
        let mut fields: Vec<Field> = input.project(&self.required_child_output).fields().to_vec();
        if self.with_position {
            let pos = if self.outer {
                Field::nullable(GENERATOR_POSITION_COLUMN, DataType::Int)
            } else {
                Field::not_null(GENERATOR_POSITION_COLUMN, DataType::Int)
            };
            fields.push(pos);
        }
        let element = self
            .generator
            .data_type(&input)
            .element_type()
            .cloned()
            .unwrap_or(DataType::Null);
        fields.push(Field::nullable(GENERATOR_ELEMENT_COLUMN, element));
        Schema::new(fields)
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Hash aggregate operator.
///
/// Output columns are the group keys followed by the aggregates.
#[derive(Debug, Clone)]
pub struct HashAggregateOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Group-by expressions.
    pub group_by: Vec<PhysicalExpr>,
    /// Aggregate expressions.
    pub aggregates: Vec<PhysicalAggregateExpr>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl HashAggregateOperator {
    /// Creates an aggregate; the schema is derived from keys and aggregates.
    pub fn new(
        input: Arc<PhysicalOperator>,
        group_by: Vec<(PhysicalExpr, String)>,
        aggregates: Vec<PhysicalAggregateExpr>,
    ) -> Self {
        let input_schema = input.schema();
        let mut fields = named_fields(&group_by, &input_schema);
        for agg in &aggregates {
            let data_type = agg.return_type(&input_schema);
            fields.push(if agg.nullable() {
                Field::nullable(agg.name.clone(), data_type)
            } else {
                Field::not_null(agg.name.clone(), data_type)
            });
        }
        Self {
            input,
            group_by: group_by.into_iter().map(|(e, _)| e).collect(),
            aggregates,
            schema: Arc::new(Schema::new(fields)),
        }
    }
}

// ============================================================================
// Join Operators
// ============================================================================

/// Output schema of a join: left ++ right, or left only for semi/anti.
pub fn join_schema(left: &Schema, right: &Schema, join_type: JoinType) -> Schema {
    if join_type.is_left_only() {
        return left.clone();
    }
    let left = if join_type.preserves_right() {
        left.to_nullable()
    } else {
        left.clone()
    };
    let right = if join_type.preserves_left() {
        right.to_nullable()
    } else {
        right.clone()
    };
    left.merge(&right)
}

/// Hash join operator.
///
/// Builds a hash table on the right side, then probes with the left side.
/// The residual `filter` sees the concatenated left ++ right row.
#[derive(Debug, Clone)]
pub struct HashJoinOperator {
    /// Left (probe) input.
    pub left: Arc<PhysicalOperator>,
    /// Right (build) input.
    pub right: Arc<PhysicalOperator>,
    /// Join type.
    pub join_type: JoinType,
    /// Left join keys.
    pub left_keys: Vec<PhysicalExpr>,
    /// Right join keys.
    pub right_keys: Vec<PhysicalExpr>,
    /// Additional join filter.
    pub filter: Option<PhysicalExpr>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl HashJoinOperator {
    /// Creates a hash join.
    pub fn new(
        left: Arc<PhysicalOperator>,
        right: Arc<PhysicalOperator>,
        join_type: JoinType,
        left_keys: Vec<PhysicalExpr>,
        right_keys: Vec<PhysicalExpr>,
    ) -> Self {
        let schema = join_schema(&left.schema(), &right.schema(), join_type);
        Self {
            left,
            right,
            join_type,
            left_keys,
            right_keys,
            filter: None,
            schema: Arc::new(schema),
        }
    }

    /// Adds a residual filter.
    pub fn with_filter(mut self, filter: PhysicalExpr) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Nested loop join operator.
///
/// O(n*m); used for non-equi conditions and cross joins.
#[derive(Debug, Clone)]
pub struct NestedLoopJoinOperator {
    /// Left (outer) input.
    pub left: Arc<PhysicalOperator>,
    /// Right (inner) input.
    pub right: Arc<PhysicalOperator>,
    /// Join type.
    pub join_type: JoinType,
    /// Join condition over left ++ right; `None` matches every pair.
    pub condition: Option<PhysicalExpr>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl NestedLoopJoinOperator {
    /// Creates a nested loop join.
    pub fn new(
        left: Arc<PhysicalOperator>,
        right: Arc<PhysicalOperator>,
        join_type: JoinType,
        condition: Option<PhysicalExpr>,
    ) -> Self {
        let schema = join_schema(&left.schema(), &right.schema(), join_type);
        Self {
            left,
            right,
            join_type,
            condition,
            schema: Arc::new(schema),
        }
    }
}

// ============================================================================
// Window
// ============================================================================

/// Window operator.
///
/// Every window expression shares the same partitioning and ordering.
/// Output is the input columns followed by one column per window expression.
#[derive(Debug, Clone)]
pub struct WindowPhysicalOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Partition keys.
    pub partition_by: Vec<PhysicalExpr>,
    /// Ordering within a partition.
    pub order_by: Vec<PhysicalSortExpr>,
    /// Window functions.
    pub window_exprs: Vec<PhysicalWindowExpr>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl WindowPhysicalOperator {
    /// Creates a window operator.
    pub fn new(
        input: Arc<PhysicalOperator>,
        partition_by: Vec<PhysicalExpr>,
        order_by: Vec<PhysicalSortExpr>,
        window_exprs: Vec<PhysicalWindowExpr>,
    ) -> Self {
        let input_schema = input.schema();
        let mut schema = input_schema.as_ref().clone();
        for window in &window_exprs {
            let data_type = window.return_type(&input_schema);
            schema.add_field(match window.func {
                WindowFunc::RowNumber | WindowFunc::Rank | WindowFunc::DenseRank => {
                    Field::not_null(window.name.clone(), data_type)
                }
                _ => Field::nullable(window.name.clone(), data_type),
            });
        }
        Self {
            input,
            partition_by,
            order_by,
            window_exprs,
            schema: Arc::new(schema),
        }
    }
}

// ============================================================================
// Set Operations
// ============================================================================

/// Union of two positionally compatible inputs.
#[derive(Debug, Clone)]
pub struct UnionOperator {
    /// Left input.
    pub left: Arc<PhysicalOperator>,
    /// Right input.
    pub right: Arc<PhysicalOperator>,
    /// Keep duplicates.
    pub all: bool,
    /// Output schema (left names, nullable if either side is).
    pub schema: SchemaRef,
}

impl UnionOperator {
    /// Creates a deduplicating union.
    pub fn new(left: Arc<PhysicalOperator>, right: Arc<PhysicalOperator>) -> Self {
        let (ls, rs) = (left.schema(), right.schema());
        let fields = ls
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let right_nullable = rs.field(i).map_or(true, |f| f.nullable);
                let data_type = rs
                    .field(i)
                    .and_then(|f| field.data_type.common_supertype(&f.data_type))
                    .unwrap_or_else(|| field.data_type.clone());
                Field::new(field.column.clone(), data_type, field.nullable || right_nullable)
            })
            .collect();
        Self {
            left,
            right,
            all: false,
            schema: Arc::new(Schema::new(fields)),
        }
    }

    /// Keeps duplicates (`UNION ALL`).
    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }
}

// ============================================================================
// Sort and Limit
// ============================================================================

/// Sort operator.
#[derive(Debug, Clone)]
pub struct SortPhysicalOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Sort expressions.
    pub order_by: Vec<PhysicalSortExpr>,
}

impl SortPhysicalOperator {
    /// Creates a sort.
    pub fn new(input: Arc<PhysicalOperator>, order_by: Vec<PhysicalSortExpr>) -> Self {
        Self { input, order_by }
    }
}

/// Limit operator.
#[derive(Debug, Clone)]
pub struct LimitPhysicalOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Number of rows to skip.
    pub offset: usize,
    /// Maximum rows to return.
    pub fetch: Option<usize>,
}

impl LimitPhysicalOperator {
    /// Creates a limit.
    pub fn new(input: Arc<PhysicalOperator>, offset: usize, fetch: Option<usize>) -> Self {
        Self {
            input,
            offset,
            fetch,
        }
    }
}

/// Top-K by `order_by`, then an optional projection.
#[derive(Debug, Clone)]
pub struct TakeOrderedAndProjectOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// Number of rows to return.
    pub limit: usize,
    /// Sort expressions.
    pub order_by: Vec<PhysicalSortExpr>,
    /// Projection applied to the selected rows.
    pub projection: Option<Vec<PhysicalExpr>>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl TakeOrderedAndProjectOperator {
    /// Creates a top-K operator without projection.
    pub fn new(input: Arc<PhysicalOperator>, limit: usize, order_by: Vec<PhysicalSortExpr>) -> Self {
        let schema = input.schema();
        Self {
            input,
            limit,
            order_by,
            projection: None,
            schema,
        }
    }

    /// Adds a projection.
    pub fn with_projection(mut self, exprs: Vec<(PhysicalExpr, String)>) -> Self {
        self.schema = Arc::new(Schema::new(named_fields(&exprs, &self.input.schema())));
        self.projection = Some(exprs.into_iter().map(|(e, _)| e).collect());
        self
    }
}

// ============================================================================
// Expand
// ============================================================================

/// Replays each input row once per projection list.
#[derive(Debug, Clone)]
pub struct ExpandOperator {
    /// Input operator.
    pub input: Arc<PhysicalOperator>,
    /// One projection per grouping set.
    pub projections: Vec<Vec<PhysicalExpr>>,
    /// Output schema.
    pub schema: SchemaRef,
}

impl ExpandOperator {
    /// Creates an expand from explicit projections.
    pub fn new(input: Arc<PhysicalOperator>, projections: Vec<Vec<PhysicalExpr>>, schema: Schema) -> Self {
        Self {
            input,
            projections,
            schema: Arc::new(schema),
        }
    }

    /// Expands into the given grouping sets.
    ///
    /// Output columns are every input column, then one column per grouping
    /// expression (NULL when the expression does not participate in the
    /// set), then the grouping id. Bit `n - 1 - i` of the id is set when
    /// grouping expression `i` is absent from the set.
    pub fn grouping_sets(
        input: Arc<PhysicalOperator>,
        group_by: Vec<(PhysicalExpr, String)>,
        sets: &[Vec<usize>],
    ) -> Self {
        let input_schema = input.schema();
        let n = group_by.len();

        let mut fields = input_schema.fields().to_vec();
        for (expr, name) in &group_by {
            fields.push(Field::nullable(name.clone(), expr.data_type(&input_schema)));
        }
        fields.push(Field::not_null(GROUPING_ID_COLUMN, DataType::BigInt));

        let passthrough: Vec<PhysicalExpr> = input_schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| PhysicalExpr::column(f.name(), i))
            .collect();

        let projections = sets
            .iter()
            .map(|set| {
                let mut projection = passthrough.clone();
                let mut grouping_id = 0i64;
                for (i, (expr, _)) in group_by.iter().enumerate() {
                    if set.contains(&i) {
                        projection.push(expr.clone());
                    } else {
                        projection.push(PhysicalExpr::null());
                        grouping_id |= 1 << (n - 1 - i);
                    }
                }
                projection.push(PhysicalExpr::Literal(Literal::Integer(grouping_id)));
                projection
            })
            .collect();

        Self::new(input, projections, Schema::new(fields))
    }

    /// `ROLLUP(e1, ..., en)`: the sets `(e1..en), (e1..en-1), ..., ()`.
    pub fn rollup(input: Arc<PhysicalOperator>, group_by: Vec<(PhysicalExpr, String)>) -> Self {
        let n = group_by.len();
        let sets: Vec<Vec<usize>> = (0..=n).rev().map(|k| (0..k).collect()).collect();
        Self::grouping_sets(input, group_by, &sets)
    }

    /// `CUBE(e1, ..., en)`: every subset, ordered by grouping id.
    pub fn cube(input: Arc<PhysicalOperator>, group_by: Vec<(PhysicalExpr, String)>) -> Self {
        let n = group_by.len();
        let sets: Vec<Vec<usize>> = (0..(1u64 << n))
            .map(|mask| (0..n).filter(|i| mask & (1 << (n - 1 - i)) == 0).collect())
            .collect();
        Self::grouping_sets(input, group_by, &sets)
    }
}
