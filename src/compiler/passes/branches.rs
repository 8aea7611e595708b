//! Branch folding passes.
//!
//! ## Unconditional folding
//!
//! - `goto L1; ... L1: goto L2` → `goto L2` (also for `if` and `switch` targets)
//! - `goto L; L: ...` → the goto is removed
//!
//! Chains are followed until a non-goto unit or a cycle is reached, so
//! `L: goto L` is left alone.
//!
//! ## Conditional folding
//!
//! - `if 1 == 1 goto L` → `goto L`
//! - `if 1 == 2 goto L` → removed
//! - `switch(2) { ... }` → `goto` to the selected case

use std::collections::HashSet;

use crate::{
    compiler::{passes::prune_traps, BodyPass, EventKind, PassContext},
    ir::{Body, Constant, Stmt, UnitId, Value},
    Result,
};

/// Collapses goto chains and removes gotos to the next unit.
pub struct UnconditionalBranchFoldingPass;

impl Default for UnconditionalBranchFoldingPass {
    fn default() -> Self {
        Self::new()
    }
}

impl UnconditionalBranchFoldingPass {
    /// Creates a new unconditional branch folding pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Follows a chain of gotos starting at `start`.
    fn final_target(body: &Body, start: UnitId) -> UnitId {
        let mut visited = HashSet::new();
        let mut current = start;
        while let Some(Stmt::Goto { target }) = body.stmt(current) {
            if !visited.insert(current) {
                break;
            }
            current = *target;
        }
        current
    }

    fn collapse_chains(body: &mut Body, ctx: &PassContext<'_>) -> bool {
        let mut rewrites = Vec::new();
        for (pos, unit) in body.units().iter().enumerate() {
            for (slot, target) in unit.stmt.targets().into_iter().enumerate() {
                let last = Self::final_target(body, target);
                if last != target {
                    rewrites.push((pos, slot, last));
                }
            }
        }

        for &(pos, slot, last) in &rewrites {
            if let Some(stmt) = body.stmt_at_mut(pos) {
                if let Some(target) = stmt.targets_mut().into_iter().nth(slot) {
                    *target = last;
                }
            }
            ctx.record(EventKind::BranchFolded)
                .location(pos)
                .message(format!("goto chain collapsed to {last}"));
        }
        !rewrites.is_empty()
    }

    fn remove_gotos_to_next(body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = false;
        loop {
            let found = body.units().windows(2).enumerate().find_map(|(pos, pair)| {
                match pair[0].stmt {
                    Stmt::Goto { target } if target == pair[1].id => Some((pos, pair[0].id)),
                    _ => None,
                }
            });
            let Some((pos, id)) = found else {
                break;
            };
            body.remove(id)?;
            ctx.record(EventKind::BranchFolded)
                .location(pos)
                .message("goto to next unit removed");
            changed = true;
        }
        Ok(changed)
    }
}

impl BodyPass for UnconditionalBranchFoldingPass {
    fn name(&self) -> &'static str {
        "unconditional-branch-folding"
    }

    fn description(&self) -> &'static str {
        "Collapses goto chains and removes gotos to the fall-through unit"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let collapsed = Self::collapse_chains(body, ctx);
        let removed = Self::remove_gotos_to_next(body, ctx)?;
        let pruned = prune_traps(body, ctx);
        Ok(collapsed || removed || pruned)
    }
}

/// Folds branches whose condition is known at compile time.
pub struct ConditionalBranchFoldingPass;

impl Default for ConditionalBranchFoldingPass {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do with a branch on a constant.
enum Folding {
    Jump(UnitId),
    FallThrough,
}

impl ConditionalBranchFoldingPass {
    /// Creates a new conditional branch folding pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn fold(stmt: &Stmt) -> Option<Folding> {
        match stmt {
            Stmt::If { condition, target } => Some(if condition.evaluate()? {
                Folding::Jump(*target)
            } else {
                Folding::FallThrough
            }),
            Stmt::Switch {
                key: Value::Const(key),
                targets,
                default,
            } => {
                let index = match key {
                    Constant::Int(_) | Constant::Long(_) => key.as_i64()?,
                    _ => return None,
                };
                let chosen = usize::try_from(index)
                    .ok()
                    .and_then(|index| targets.get(index))
                    .unwrap_or(default);
                Some(Folding::Jump(*chosen))
            }
            _ => None,
        }
    }
}

impl BodyPass for ConditionalBranchFoldingPass {
    fn name(&self) -> &'static str {
        "conditional-branch-folding"
    }

    fn description(&self) -> &'static str {
        "Replaces branches on constant conditions by gotos or removes them"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let candidates: Vec<(UnitId, Folding)> = body
            .units()
            .iter()
            .filter_map(|unit| Self::fold(&unit.stmt).map(|folding| (unit.id, folding)))
            .collect();

        let mut changed = false;
        for (id, folding) in candidates {
            let pos = body.position(id).unwrap_or_default();
            match folding {
                Folding::Jump(target) => {
                    if let Some(stmt) = body.stmt_mut(id) {
                        *stmt = Stmt::Goto { target };
                    }
                    ctx.record(EventKind::BranchFolded)
                        .location(pos)
                        .message(format!("constant branch always jumps to {target}"));
                }
                Folding::FallThrough => {
                    if !body.can_remove(id) {
                        continue;
                    }
                    body.remove(id)?;
                    ctx.record(EventKind::BranchFolded)
                        .location(pos)
                        .message("constant branch never taken");
                }
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
        ir::{LocalGenerator, RelationalExpr, RelationalOp, TacType},
        test::run_pass as run,
    };

    #[test]
    fn test_goto_chain_collapsed() -> Result<()> {
        let mut body = Body::new();
        let first = body.push(Stmt::Nop);
        let middle = body.push(Stmt::Nop);
        body.push(Stmt::Return(Some(Value::int(1))));
        let end = body.push(Stmt::Return(Some(Value::int(2))));
        *body.stmt_mut(first).unwrap() = Stmt::Goto { target: middle };
        *body.stmt_mut(middle).unwrap() = Stmt::Goto { target: end };

        assert!(run(&UnconditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body.stmt(first), Some(&Stmt::Goto { target: end }));
        body.validate()
    }

    #[test]
    fn test_goto_to_next_removed_and_idempotent() -> Result<()> {
        let mut body = Body::new();
        let jump = body.push(Stmt::Nop);
        let next = body.push(Stmt::Return(None));
        *body.stmt_mut(jump).unwrap() = Stmt::Goto { target: next };

        assert!(run(&UnconditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body.len(), 1);
        let snapshot = body.clone();
        assert!(!run(&UnconditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body, snapshot);
        Ok(())
    }

    #[test]
    fn test_self_loop_is_left_alone() -> Result<()> {
        let mut body = Body::new();
        let spin = body.push(Stmt::Nop);
        body.push(Stmt::Return(None));
        *body.stmt_mut(spin).unwrap() = Stmt::Goto { target: spin };

        assert!(!run(&UnconditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body.stmt(spin), Some(&Stmt::Goto { target: spin }));
        Ok(())
    }

    #[test]
    fn test_constant_conditions() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Int);
        let xid = x.id;
        let mut body = Body::new();
        body.add_local(x);
        let taken = body.push(Stmt::Nop);
        let never = body.push(Stmt::Nop);
        body.push(Stmt::assign(xid, Value::int(1)));
        let ret = body.push(Stmt::Return(Some(Value::Local(xid))));
        *body.stmt_mut(taken).unwrap() = Stmt::If {
            condition: RelationalExpr::new(RelationalOp::Lt, Value::int(1), Value::int(2)),
            target: ret,
        };
        *body.stmt_mut(never).unwrap() = Stmt::If {
            condition: RelationalExpr::new(RelationalOp::Gt, Value::int(1), Value::int(2)),
            target: ret,
        };

        assert!(run(&ConditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body.stmt(taken), Some(&Stmt::Goto { target: ret }));
        assert!(body.stmt(never).is_none());
        assert_eq!(body.len(), 3);
        body.validate()
    }

    #[test]
    fn test_constant_switch() -> Result<()> {
        let mut body = Body::new();
        let switch = body.push(Stmt::Nop);
        let zero = body.push(Stmt::Return(Some(Value::int(0))));
        let one = body.push(Stmt::Return(Some(Value::int(1))));
        let other = body.push(Stmt::Return(Some(Value::int(2))));
        *body.stmt_mut(switch).unwrap() = Stmt::Switch {
            key: Value::int(1),
            targets: vec![zero, one],
            default: other,
        };

        assert!(run(&ConditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body.stmt(switch), Some(&Stmt::Goto { target: one }));

        *body.stmt_mut(switch).unwrap() = Stmt::Switch {
            key: Value::int(-3),
            targets: vec![zero, one],
            default: other,
        };
        assert!(run(&ConditionalBranchFoldingPass::new(), &mut body)?);
        assert_eq!(body.stmt(switch), Some(&Stmt::Goto { target: other }));
        Ok(())
    }
}
