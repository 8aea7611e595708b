//! Unreachable code elimination.
//!
//! A unit is live when some path from the first unit reaches it through
//! normal or exceptional edges. Dead units are removed in sequence order so
//! references into a dead run slide forward to the first unit after it.
//! A dead trailing unit that is still referenced as a trap end is blanked to
//! `nop` instead.

use crate::{
    analysis::UnitGraph,
    compiler::{passes::prune_traps, BodyPass, EventKind, PassContext},
    ir::{Body, Stmt, UnitId},
    Result,
};

/// Removes units with no path from the entry.
pub struct UnreachableCodePass;

impl Default for UnreachableCodePass {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreachableCodePass {
    /// Creates a new unreachable code pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for UnreachableCodePass {
    fn name(&self) -> &'static str {
        "unreachable-code-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes units that cannot be reached from the method entry"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let graph = UnitGraph::from_body(body);
        let reachable = graph.reachable();
        let dead: Vec<(usize, UnitId)> = reachable
            .iter()
            .enumerate()
            .filter(|(_, live)| !**live)
            .map(|(pos, _)| (pos, graph.unit_id(pos)))
            .collect();
        if dead.is_empty() {
            return Ok(false);
        }

        let mut changed = false;
        let before = body.traps().len();
        body.traps_mut()
            .retain(|trap| !dead.iter().any(|&(_, id)| id == trap.handler));
        for _ in body.traps().len()..before {
            ctx.record(EventKind::TrapRemoved)
                .message("trap with unreachable handler dropped");
            changed = true;
        }

        for &(pos, id) in &dead {
            if body.can_remove(id) {
                body.remove(id)?;
                ctx.record(EventKind::UnitRemoved)
                    .location(pos)
                    .message(format!("unreachable unit {id} removed"));
                changed = true;
            } else if let Some(stmt) = body.stmt_mut(id) {
                if *stmt != Stmt::Nop {
                    *stmt = Stmt::Nop;
                    ctx.record(EventKind::UnitRemoved)
                        .location(pos)
                        .message(format!("unreachable trailing unit {id} blanked"));
                    changed = true;
                }
            }
        }

        let pruned = prune_traps(body, ctx);
        Ok(changed || pruned)
    }
}
