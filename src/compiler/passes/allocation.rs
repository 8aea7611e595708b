//! Dead allocation elimination.
//!
//! `x = new T` whose value no unit reads is removed. Construction is treated
//! as free of side effects at this level; dead-assignment elimination leaves
//! allocations alone, so this pass runs first.

use crate::{
    analysis::DefUseIndex,
    compiler::{passes::prune_traps, BodyPass, EventKind, PassContext},
    ir::{Body, Expr, Place, Stmt, UnitId},
    Result,
};

/// Removes object allocations whose result is never used.
pub struct DeadAllocationPass;

impl Default for DeadAllocationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadAllocationPass {
    /// Creates a new dead allocation pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for DeadAllocationPass {
    fn name(&self) -> &'static str {
        "dead-allocation-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes allocations whose result is never read"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let index = DefUseIndex::build(body);
        let dead: Vec<(usize, UnitId)> = body
            .units()
            .iter()
            .enumerate()
            .filter(|(pos, unit)| match &unit.stmt {
                Stmt::Assign {
                    place: Place::Local(_),
                    expr,
                } => expr.is_construction() && index.is_unused(*pos),
                _ => false,
            })
            .map(|(pos, unit)| (pos, unit.id))
            .collect();

        let mut changed = false;
        for (pos, id) in dead {
            if !body.can_remove(id) {
                continue;
            }
            if let Stmt::Assign {
                expr: Expr::New { ty },
                ..
            } = body.remove(id)?
            {
                ctx.record(EventKind::AllocationRemoved)
                    .location(pos)
                    .message(format!("unused allocation of {ty} removed"));
            }
            changed = true;
        }

        let pruned = prune_traps(body, ctx);
        Ok(changed || pruned)
    }
}
