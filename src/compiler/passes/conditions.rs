//! Condition-to-branch rewriting.
//!
//! A normalized body never stores a comparison result directly:
//!
//! ```text
//!                          if a == b goto T
//!                          x = false
//! x = a == b         →     goto S
//!                       T: x = true
//! S: ...                S: ...
//! ```
//!
//! The four units take the original unit's place, so every jump or trap
//! boundary that referred to it now refers to the conditional branch.

use crate::{
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, Expr, Stmt, UnitId, Value},
    Result,
};

/// Rewrites `place = a <op> b` into a branch assigning boolean literals.
pub struct ConditionRewritePass;

impl Default for ConditionRewritePass {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionRewritePass {
    /// Creates a new condition rewrite pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn rewrite(body: &mut Body, id: UnitId) -> Result<()> {
        let successor = body
            .successor(id)
            .ok_or_else(|| invariant_error!("comparison at {} is the last unit", id))?;
        let Some(Stmt::Assign {
            place,
            expr: Expr::Relational(condition),
        }) = body.stmt(id).cloned()
        else {
            return Err(invariant_error!("unit {} is not a comparison assignment", id));
        };

        let ids = body.replace(
            id,
            vec![
                Stmt::If {
                    condition,
                    target: successor,
                },
                Stmt::Assign {
                    place: place.clone(),
                    expr: Expr::Value(Value::bool(false)),
                },
                Stmt::Goto { target: successor },
                Stmt::Assign {
                    place,
                    expr: Expr::Value(Value::bool(true)),
                },
            ],
        )?;

        let (Some(&branch), Some(&when_true)) = (ids.first(), ids.get(3)) else {
            return Err(invariant_error!("comparison at {} expanded short", id));
        };
        if let Some(Stmt::If { target, .. }) = body.stmt_mut(branch) {
            *target = when_true;
        }
        Ok(())
    }
}

impl BodyPass for ConditionRewritePass {
    fn name(&self) -> &'static str {
        "condition-to-branch"
    }

    fn description(&self) -> &'static str {
        "Turns stored comparison results into explicit two-way branches"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let candidates: Vec<UnitId> = body
            .units()
            .iter()
            .filter(|unit| {
                matches!(
                    unit.stmt,
                    Stmt::Assign {
                        expr: Expr::Relational(_),
                        ..
                    }
                )
            })
            .map(|unit| unit.id)
            .collect();

        for &id in &candidates {
            let pos = body.position(id).unwrap_or_default();
            Self::rewrite(body, id)?;
            ctx.record(EventKind::ConditionRewritten)
                .location(pos)
                .message(format!("comparison at {id} rewritten to a branch"));
        }

        Ok(!candidates.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{
            Constant, IdentitySource, LocalGenerator, LocalId, RelationalExpr, RelationalOp,
            TacType, Trap,
        },
        test::{interpret, run_pass},
    };

    /// `a := @parameter0; b := @parameter1; x = a == b; return x`
    fn equality() -> (Body, LocalId) {
        let mut generator = LocalGenerator::new();
        let a = generator.named("a", TacType::Int);
        let b = generator.named("b", TacType::Int);
        let x = generator.named("x", TacType::Boolean);
        let (aid, bid, xid) = (a.id, b.id, x.id);
        let mut body = Body::new();
        body.add_local(a);
        body.add_local(b);
        body.add_local(x);
        body.push(Stmt::Identity {
            local: aid,
            source: IdentitySource::Parameter(0),
        });
        body.push(Stmt::Identity {
            local: bid,
            source: IdentitySource::Parameter(1),
        });
        body.push(Stmt::assign(
            xid,
            RelationalExpr::new(RelationalOp::Eq, Value::Local(aid), Value::Local(bid)),
        ));
        body.push(Stmt::Return(Some(Value::Local(xid))));
        (body, xid)
    }

    #[test]
    fn test_rewrite_shape() -> Result<()> {
        let (mut body, xid) = equality();
        assert!(run_pass(&ConditionRewritePass::new(), &mut body)?);
        body.validate()?;
        assert_eq!(body.len(), 7);

        let units = body.units();
        let Stmt::If { target, .. } = &units[2].stmt else {
            panic!("expected a conditional branch, got {:?}", units[2].stmt);
        };
        assert_eq!(*target, units[5].id);
        assert_eq!(units[3].stmt, Stmt::assign(xid, Value::bool(false)));
        assert_eq!(units[4].stmt, Stmt::Goto { target: units[6].id });
        assert_eq!(units[5].stmt, Stmt::assign(xid, Value::bool(true)));
        assert!(body.stmts().all(|stmt| !matches!(
            stmt,
            Stmt::Assign {
                expr: Expr::Relational(_),
                ..
            }
        )));
        Ok(())
    }

    #[test]
    fn test_rewrite_preserves_results() -> Result<()> {
        let (original, _) = equality();
        let mut rewritten = original.clone();
        run_pass(&ConditionRewritePass::new(), &mut rewritten)?;

        for (a, b, expected) in [(5, 5, true), (5, 6, false)] {
            let args = [Constant::Int(a), Constant::Int(b)];
            assert_eq!(interpret(&original, &args)?, Some(Constant::Bool(expected)));
            assert_eq!(interpret(&rewritten, &args)?, Some(Constant::Bool(expected)));
        }
        Ok(())
    }

    #[test]
    fn test_references_move_to_the_branch() -> Result<()> {
        let (mut body, _) = equality();
        let compare = body.units()[2].id;
        let ret = body.units()[3].id;
        let entry = body.units()[0].id;
        body.add_trap(Trap::new(compare, ret, entry, TacType::class("E")));

        run_pass(&ConditionRewritePass::new(), &mut body)?;
        let branch = body.units()[2].id;
        assert_eq!(body.traps()[0].begin, branch);
        assert_eq!(body.traps()[0].end, ret);
        Ok(())
    }

    #[test]
    fn test_comparison_as_last_unit_is_an_invariant_error() {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Boolean);
        let xid = x.id;
        let mut body = Body::new();
        body.add_local(x);
        body.push(Stmt::assign(
            xid,
            RelationalExpr::new(RelationalOp::Lt, Value::int(1), Value::int(2)),
        ));

        let err = run_pass(&ConditionRewritePass::new(), &mut body).unwrap_err();
        assert!(!err.is_recoverable());
    }
}
