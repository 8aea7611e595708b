//! No-op elimination.

use crate::{
    compiler::{passes::prune_traps, BodyPass, EventKind, PassContext},
    ir::{Body, Stmt, UnitId},
    Result,
};

/// Removes `nop` units and gotos to the next unit.
///
/// References to a removed unit move to its successor. A trailing unit that
/// is still referenced stays, as does the only unit of a body.
pub struct NopEliminationPass;

impl Default for NopEliminationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl NopEliminationPass {
    /// Creates a new no-op elimination pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn find(body: &Body) -> Option<(usize, UnitId)> {
        if body.len() < 2 {
            return None;
        }
        let units = body.units();
        units.iter().enumerate().find_map(|(pos, unit)| {
            let redundant = match unit.stmt {
                Stmt::Nop => true,
                Stmt::Goto { target } => units.get(pos + 1).is_some_and(|next| next.id == target),
                _ => false,
            };
            (redundant && body.can_remove(unit.id)).then_some((pos, unit.id))
        })
    }
}

impl BodyPass for NopEliminationPass {
    fn name(&self) -> &'static str {
        "nop-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes statements without effect"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = false;
        while let Some((pos, id)) = Self::find(body) {
            body.remove(id)?;
            ctx.record(EventKind::UnitRemoved)
                .location(pos)
                .message(format!("no-op {id} removed"));
            changed = true;
        }
        let pruned = prune_traps(body, ctx);
        Ok(changed || pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ir::Value, test::run_pass};

    #[test]
    fn test_nops_removed_and_targets_moved() -> Result<()> {
        let mut body = Body::new();
        let jump = body.push(Stmt::Nop);
        let nop = body.push(Stmt::Nop);
        let ret = body.push(Stmt::Return(Some(Value::int(0))));
        if let Some(stmt) = body.stmt_mut(jump) {
            *stmt = Stmt::Goto { target: nop };
        }

        assert!(run_pass(&NopEliminationPass::new(), &mut body)?);
        assert_eq!(body.len(), 1);
        assert_eq!(body.first(), Some(ret));
        body.validate()
    }

    #[test]
    fn test_last_remaining_unit_kept() -> Result<()> {
        let mut body = Body::new();
        let jump = body.push(Stmt::Nop);
        let tail = body.push(Stmt::Nop);
        if let Some(stmt) = body.stmt_mut(jump) {
            *stmt = Stmt::Goto { target: tail };
        }

        assert!(run_pass(&NopEliminationPass::new(), &mut body)?);
        assert_eq!(body.first(), Some(tail));
        assert_eq!(body.len(), 1);
        assert!(!run_pass(&NopEliminationPass::new(), &mut body)?);
        Ok(())
    }

    #[test]
    fn test_referenced_trailing_nop_kept() -> Result<()> {
        let mut body = Body::new();
        let ret = body.push(Stmt::Return(None));
        let tail = body.push(Stmt::Nop);
        body.add_trap(crate::ir::Trap::new(ret, tail, ret, crate::ir::TacType::class("E")));

        assert!(!run_pass(&NopEliminationPass::new(), &mut body)?);
        assert_eq!(body.len(), 2);
        Ok(())
    }
}
