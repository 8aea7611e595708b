//! Aggregation of single-use temporaries.
//!
//! ```text
//! $i0 = a + b          x = a + b
//! x = $i0        →
//! ```
//!
//! The temporary must be defined exactly once, read exactly once by the very
//! next unit, and nothing may jump between the two. Stores into fields and
//! array elements only absorb bare immediates so every statement keeps a
//! single operation.

use crate::{
    analysis::DefUseIndex,
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, Expr, LocalId, Place, Stmt, Value},
    Result,
};

/// Folds `t = e; place = t` into `place = e`.
pub struct AggregationPass;

impl Default for AggregationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationPass {
    /// Creates a new aggregation pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Indices of the traps protecting `pos`.
    fn coverage(body: &Body, pos: usize) -> Vec<usize> {
        body.traps()
            .iter()
            .enumerate()
            .filter(|(_, trap)| {
                body.trap_range(trap)
                    .is_some_and(|(begin, end)| begin <= pos && pos < end)
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn is_candidate(body: &Body, index: &DefUseIndex, pos: usize, temp: LocalId) -> bool {
        let Some(next) = body.unit_at(pos + 1) else {
            return false;
        };
        let Stmt::Assign {
            place,
            expr: Expr::Value(Value::Local(read)),
        } = &next.stmt
        else {
            return false;
        };
        let Some(Stmt::Assign { expr, .. }) = body.unit_at(pos).map(|unit| &unit.stmt) else {
            return false;
        };

        *read == temp
            && index.defs_of(temp) == [pos]
            && index.reads_of(temp) == [pos + 1]
            && index.uses_of(pos) == [pos + 1]
            && !body.is_referenced(next.id)
            && !place.values().contains(&&Value::Local(temp))
            && (matches!(place, Place::Local(_)) || matches!(expr, Expr::Value(_)))
            && Self::coverage(body, pos) == Self::coverage(body, pos + 1)
    }

    fn find(body: &Body) -> Option<usize> {
        let index = DefUseIndex::build(body);
        body.stmts().enumerate().find_map(|(pos, stmt)| match stmt {
            Stmt::Assign {
                place: Place::Local(temp),
                ..
            } if Self::is_candidate(body, &index, pos, *temp) => Some(pos),
            _ => None,
        })
    }
}

impl BodyPass for AggregationPass {
    fn name(&self) -> &'static str {
        "aggregation"
    }

    fn description(&self) -> &'static str {
        "Folds single-use temporaries into the statement that reads them"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = false;

        while let Some(pos) = Self::find(body) {
            let next = body
                .unit_at(pos + 1)
                .map(|unit| unit.id)
                .ok_or_else(|| invariant_error!("aggregation target at {} vanished", pos + 1))?;
            let Stmt::Assign { place, .. } = body.remove(next)? else {
                return Err(invariant_error!("aggregation target {} is not a store", next));
            };
            if let Some(Stmt::Assign { place: dest, .. }) = body.stmt_at_mut(pos) {
                *dest = place;
            }

            ctx.record(EventKind::StatementAggregated)
                .location(pos)
                .message("single-use temporary folded into its use");
            changed = true;
        }

        Ok(changed)
    }
}
