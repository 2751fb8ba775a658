//! Join operators.
//!
//! Both joins materialize the right input on the first pull and stream the
//! left input against it. Unmatched right rows of right and full outer joins
//! are emitted after the left input is exhausted.

use std::collections::HashMap;
use std::sync::Arc;

use flint_common::{FlintError, FlintResult};

use super::{BoxedOperator, Operator, RowBuffer};
use crate::executor::{evaluate_expr, evaluate_predicate, Row, Value};
use crate::physical::{ExecutionContext, PhysicalExpr};
use crate::schema::SchemaRef;
use crate::types::JoinType;

/// Materialized right side plus the per-row match state.
#[derive(Debug)]
struct JoinCore {
    join_type: JoinType,
    /// Residual condition over left ++ right.
    condition: Option<PhysicalExpr>,
    build: Vec<Row>,
    matched: Vec<bool>,
    left_width: usize,
    right_width: usize,
    ctx: Arc<ExecutionContext>,
}

impl JoinCore {
    fn new(
        join_type: JoinType,
        condition: Option<PhysicalExpr>,
        left: &BoxedOperator,
        right: &BoxedOperator,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            join_type,
            condition,
            build: Vec::new(),
            matched: Vec::new(),
            left_width: left.schema().len(),
            right_width: right.schema().len(),
            ctx,
        }
    }

    fn load(&mut self, rows: Vec<Row>) {
        self.matched = vec![false; rows.len()];
        self.build = rows;
    }

    /// Joins one left row against the candidate build rows.
    fn probe(
        &mut self,
        left: &Row,
        candidates: impl IntoIterator<Item = usize>,
        output: &mut Vec<Row>,
    ) -> FlintResult<()> {
        let mut found = false;
        for i in candidates {
            let combined = left.concat(&self.build[i]);
            if let Some(condition) = &self.condition {
                if !evaluate_predicate(condition, &combined, &self.ctx)? {
                    continue;
                }
            }
            found = true;
            self.matched[i] = true;
            if self.join_type.is_left_only() {
                break;
            }
            output.push(combined);
        }

        match self.join_type {
            JoinType::LeftSemi if found => output.push(left.clone()),
            JoinType::LeftAnti if !found => output.push(left.clone()),
            JoinType::LeftOuter | JoinType::FullOuter if !found => {
                output.push(left.pad_right(self.right_width));
            }
            _ => {}
        }
        Ok(())
    }

    /// Right rows no left row matched, padded on the left.
    fn unmatched_right(&self) -> Vec<Row> {
        if !self.join_type.preserves_right() {
            return Vec::new();
        }
        self.build
            .iter()
            .zip(&self.matched)
            .filter(|(_, matched)| !**matched)
            .map(|(row, _)| row.pad_left(self.left_width))
            .collect()
    }
}

fn drain(op: &mut BoxedOperator) -> FlintResult<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(batch) = op.next_batch()? {
        rows.extend(batch);
    }
    Ok(rows)
}

fn evaluate_key(keys: &[PhysicalExpr], row: &Row, ctx: &ExecutionContext) -> FlintResult<Vec<Value>> {
    keys.iter().map(|k| evaluate_expr(k, row, ctx)).collect()
}

/// Hash join operator for equi-joins.
///
/// Builds a hash table on the right input. Keys containing NULL never
/// match.
#[derive(Debug)]
pub struct HashJoinExec {
    /// Left (probe) input.
    left: BoxedOperator,
    /// Right (build) input.
    right: BoxedOperator,
    /// Left join keys.
    left_keys: Vec<PhysicalExpr>,
    /// Right join keys.
    right_keys: Vec<PhysicalExpr>,
    /// Output schema.
    schema: SchemaRef,
    core: JoinCore,
    /// Build row indices by key.
    hash_table: Option<HashMap<Vec<Value>, Vec<usize>>>,
    left_done: bool,
    /// Unmatched right rows, emitted last.
    remainder: RowBuffer,
}

impl HashJoinExec {
    /// Creates a new hash join operator.
    pub fn new(
        left: BoxedOperator,
        right: BoxedOperator,
        join_type: JoinType,
        left_keys: Vec<PhysicalExpr>,
        right_keys: Vec<PhysicalExpr>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        let core = JoinCore::new(join_type, None, &left, &right, ctx);
        Self {
            left,
            right,
            left_keys,
            right_keys,
            schema,
            core,
            hash_table: None,
            left_done: false,
            remainder: RowBuffer::default(),
        }
    }

    /// Adds a residual filter evaluated over the joined row.
    pub fn with_filter(mut self, filter: Option<PhysicalExpr>) -> Self {
        self.core.condition = filter;
        self
    }

    fn build_hash_table(&mut self) -> FlintResult<()> {
        if self.left_keys.len() != self.right_keys.len() {
            return Err(FlintError::malformed(format!(
                "hash join has {} left keys but {} right keys",
                self.left_keys.len(),
                self.right_keys.len()
            )));
        }

        let rows = drain(&mut self.right)?;
        let mut hash_table: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            let key = evaluate_key(&self.right_keys, row, &self.core.ctx)?;
            if key.iter().any(Value::is_null) {
                continue;
            }
            hash_table.entry(key).or_default().push(i);
        }

        self.core.load(rows);
        self.hash_table = Some(hash_table);
        Ok(())
    }

    fn probe_batch(&mut self, batch: &[Row]) -> FlintResult<Vec<Row>> {
        let mut output = Vec::new();
        let Some(hash_table) = self.hash_table.as_ref() else {
            return Err(FlintError::internal("hash join probed before build"));
        };
        for row in batch {
            let key = evaluate_key(&self.left_keys, row, &self.core.ctx)?;
            let candidates: &[usize] = if key.iter().any(Value::is_null) {
                &[]
            } else {
                hash_table.get(&key).map(Vec::as_slice).unwrap_or_default()
            };
            self.core.probe(row, candidates.iter().copied(), &mut output)?;
        }
        Ok(output)
    }
}

impl Operator for HashJoinExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if self.hash_table.is_none() {
            self.build_hash_table()?;
        }

        while !self.left_done {
            match self.left.next_batch()? {
                Some(batch) => {
                    let output = self.probe_batch(&batch)?;
                    if !output.is_empty() {
                        return Ok(Some(output));
                    }
                }
                None => {
                    self.left_done = true;
                    self.remainder.load(self.core.unmatched_right());
                }
            }
        }

        Ok(self.remainder.next_batch(self.core.ctx.batch_size()))
    }
}

/// Nested loop join operator.
///
/// Evaluates the condition for every (left, right) pair; a missing
/// condition joins every pair.
#[derive(Debug)]
pub struct NestedLoopJoinExec {
    /// Left (outer) input.
    left: BoxedOperator,
    /// Right (inner) input.
    right: BoxedOperator,
    /// Output schema.
    schema: SchemaRef,
    core: JoinCore,
    loaded: bool,
    left_done: bool,
    remainder: RowBuffer,
}

impl NestedLoopJoinExec {
    /// Creates a new nested loop join operator.
    pub fn new(
        left: BoxedOperator,
        right: BoxedOperator,
        join_type: JoinType,
        condition: Option<PhysicalExpr>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        let core = JoinCore::new(join_type, condition, &left, &right, ctx);
        Self {
            left,
            right,
            schema,
            core,
            loaded: false,
            left_done: false,
            remainder: RowBuffer::default(),
        }
    }
}

impl Operator for NestedLoopJoinExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if !self.loaded {
            let rows = drain(&mut self.right)?;
            self.core.load(rows);
            self.loaded = true;
        }

        while !self.left_done {
            match self.left.next_batch()? {
                Some(batch) => {
                    let mut output = Vec::new();
                    for row in &batch {
                        let candidates = 0..self.core.build.len();
                        self.core.probe(row, candidates, &mut output)?;
                    }
                    if !output.is_empty() {
                        return Ok(Some(output));
                    }
                }
                None => {
                    self.left_done = true;
                    self.remainder.load(self.core.unmatched_right());
                }
            }
        }

        Ok(self.remainder.next_batch(self.core.ctx.batch_size()))
    }
}
