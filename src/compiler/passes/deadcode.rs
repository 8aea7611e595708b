//! Dead assignment elimination.
//!
//! Removes `x = e` when no unit reads the value and evaluating `e` can
//! neither throw nor have side effects. A self-copy `x = x` is removed even
//! when `x` is read later, since it leaves every local unchanged. Local
//! packing produces these when it merges a copy's source and target.
//! Removing one assignment can make the assignments feeding it dead, so the
//! pass iterates until nothing changes.

use crate::{
    analysis::DefUseIndex,
    compiler::{passes::prune_traps, BodyPass, EventKind, PassContext},
    ir::{Body, Expr, Place, Stmt, UnitId, Value},
    Result,
};

/// Removes side-effect-free assignments whose value is never read.
pub struct DeadAssignmentPass;

impl Default for DeadAssignmentPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadAssignmentPass {
    /// Creates a new dead assignment pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn dead_units(body: &Body) -> Vec<(usize, UnitId)> {
        let index = DefUseIndex::build(body);
        body.units()
            .iter()
            .enumerate()
            .filter(|(pos, unit)| match &unit.stmt {
                Stmt::Assign {
                    place: Place::Local(target),
                    expr: Expr::Value(Value::Local(source)),
                } if target == source => true,
                Stmt::Assign {
                    place: Place::Local(_),
                    expr,
                } => expr.is_pure() && index.is_unused(*pos),
                _ => false,
            })
            .map(|(pos, unit)| (pos, unit.id))
            .filter(|&(_, id)| body.can_remove(id))
            .collect()
    }
}

impl BodyPass for DeadAssignmentPass {
    fn name(&self) -> &'static str {
        "dead-assignment-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes pure assignments whose result is never read"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = false;

        loop {
            let dead = Self::dead_units(body);
            if dead.is_empty() {
                break;
            }
            let mut removed_any = false;
            for (pos, id) in dead {
                if !body.can_remove(id) {
                    continue;
                }
                let removed = body.remove(id)?;
                removed_any = true;
                if let Some(local) = removed.def() {
                    ctx.record(EventKind::AssignmentRemoved)
                        .location(pos)
                        .message(format!("dead assignment to {local} removed"));
                }
            }
            if !removed_any {
                break;
            }
            changed = true;
        }

        let pruned = prune_traps(body, ctx);
        Ok(changed || pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{BinaryOp, Expr, LocalGenerator, TacType, Value},
        test::{call_with, run_pass},
    };

    #[test]
    fn test_chain_of_dead_assignments_removed() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let a = generator.named("a", TacType::Int);
        let b = generator.named("b", TacType::Int);
        let (aid, bid) = (a.id, b.id);
        let mut body = Body::new();
        body.add_local(a);
        body.add_local(b);
        body.push(Stmt::assign(aid, Value::int(1)));
        body.push(Stmt::assign(
            bid,
            Expr::Binary {
                op: BinaryOp::Add,
                left: Value::Local(aid),
                right: Value::int(2),
            },
        ));
        body.push(Stmt::Return(None));

        assert!(run_pass(&DeadAssignmentPass::new(), &mut body)?);
        assert_eq!(body.len(), 1);
        body.validate()
    }

    #[test]
    fn test_effects_and_possible_exceptions_are_kept() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let a = generator.named("a", TacType::Int);
        let q = generator.named("q", TacType::Int);
        let (aid, qid) = (a.id, q.id);
        let mut body = Body::new();
        body.add_local(a);
        body.add_local(q);
        body.push(Stmt::assign(aid, Expr::Invoke(call_with(Vec::new()))));
        body.push(Stmt::assign(
            qid,
            Expr::Binary {
                op: BinaryOp::Div,
                left: Value::int(1),
                right: Value::Local(aid),
            },
        ));
        body.push(Stmt::Return(None));

        assert!(!run_pass(&DeadAssignmentPass::new(), &mut body)?);
        assert_eq!(body.len(), 3);
        Ok(())
    }

    #[test]
    fn test_self_copy_removed_even_when_read() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Int);
        let xid = x.id;
        let mut body = Body::new();
        body.add_local(x);
        body.push(Stmt::assign(xid, Value::int(4)));
        body.push(Stmt::assign(xid, Value::Local(xid)));
        body.push(Stmt::Return(Some(Value::Local(xid))));

        assert!(run_pass(&DeadAssignmentPass::new(), &mut body)?);
        let stmts: Vec<&Stmt> = body.stmts().collect();
        assert_eq!(
            stmts,
            [
                &Stmt::assign(xid, Value::int(4)),
                &Stmt::Return(Some(Value::Local(xid))),
            ]
        );
        body.validate()
    }
}
