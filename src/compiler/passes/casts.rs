//! Cast elimination.
//!
//! - `x = (long) 3` → `x = 3L`
//! - `x = (int) y` where `y` is already `int` → `x = y`

use crate::{
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, Expr, Stmt, Value},
    Result,
};

/// Folds casts whose operand is a constant.
pub struct ConstantCastPass;

impl Default for ConstantCastPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantCastPass {
    /// Creates a new constant cast pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for ConstantCastPass {
    fn name(&self) -> &'static str {
        "constant-cast-elimination"
    }

    fn description(&self) -> &'static str {
        "Evaluates casts of constants at compile time"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = false;
        for pos in 0..body.len() {
            let Some(Stmt::Assign { expr, .. }) = body.stmt_at_mut(pos) else {
                continue;
            };
            let Expr::Cast {
                ty,
                value: Value::Const(constant),
            } = expr
            else {
                continue;
            };
            let Some(converted) = constant.convert_to(ty) else {
                continue;
            };

            let message = format!("({ty}) {constant} folded to {converted}");
            *expr = Expr::Value(Value::Const(converted));
            ctx.record(EventKind::CastRemoved).location(pos).message(message);
            changed = true;
        }
        Ok(changed)
    }
}

/// Drops casts of a local to the type it already has.
pub struct IdentityCastPass;

impl Default for IdentityCastPass {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityCastPass {
    /// Creates a new identity cast pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for IdentityCastPass {
    fn name(&self) -> &'static str {
        "identity-cast-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes casts of a local to its own declared type"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let types = body.local_types();
        let mut changed = false;

        for pos in 0..body.len() {
            let Some(Stmt::Assign { expr, .. }) = body.stmt_at_mut(pos) else {
                continue;
            };
            let Expr::Cast {
                ty,
                value: Value::Local(local),
            } = expr
            else {
                continue;
            };
            if types.get(&*local) != Some(&*ty) {
                continue;
            }

            let message = format!("cast of {local} to its own type {ty} removed");
            *expr = Expr::Value(Value::Local(*local));
            ctx.record(EventKind::CastRemoved).location(pos).message(message);
            changed = true;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Constant, LocalGenerator, TacType},
        test::run_pass,
    };

    #[test]
    fn test_constant_cast_folded() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Long);
        let b = generator.named("b", TacType::Byte);
        let (xid, bid) = (x.id, b.id);
        let mut body = Body::new();
        body.add_local(x);
        body.add_local(b);
        body.push(Stmt::assign(
            xid,
            Expr::Cast {
                ty: TacType::Long,
                value: Value::int(3),
            },
        ));
        body.push(Stmt::assign(
            bid,
            Expr::Cast {
                ty: TacType::Byte,
                value: Value::int(300),
            },
        ));
        body.push(Stmt::Return(None));

        assert!(run_pass(&ConstantCastPass::new(), &mut body)?);
        assert_eq!(
            body.unit_at(0).map(|unit| &unit.stmt),
            Some(&Stmt::assign(xid, Value::Const(Constant::Long(3))))
        );
        assert_eq!(
            body.unit_at(1).map(|unit| &unit.stmt),
            Some(&Stmt::assign(bid, Value::int(44)))
        );
        Ok(())
    }

    #[test]
    fn test_reference_cast_of_string_is_kept() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::class("Foo"));
        let xid = x.id;
        let mut body = Body::new();
        body.add_local(x);
        body.push(Stmt::assign(
            xid,
            Expr::Cast {
                ty: TacType::class("Foo"),
                value: Value::Const(Constant::Str("s".into())),
            },
        ));
        body.push(Stmt::Return(None));

        assert!(!run_pass(&ConstantCastPass::new(), &mut body)?);
        Ok(())
    }

    #[test]
    fn test_identity_cast_removed_only_for_same_type() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let y = generator.named("y", TacType::Int);
        let x = generator.named("x", TacType::Int);
        let z = generator.named("z", TacType::Long);
        let (yid, xid, zid) = (y.id, x.id, z.id);
        let mut body = Body::new();
        body.add_local(y);
        body.add_local(x);
        body.add_local(z);
        body.push(Stmt::assign(yid, Value::int(7)));
        body.push(Stmt::assign(
            xid,
            Expr::Cast {
                ty: TacType::Int,
                value: Value::Local(yid),
            },
        ));
        let widening = Expr::Cast {
            ty: TacType::Long,
            value: Value::Local(yid),
        };
        body.push(Stmt::assign(zid, widening.clone()));
        body.push(Stmt::Return(None));

        assert!(run_pass(&IdentityCastPass::new(), &mut body)?);
        assert_eq!(
            body.unit_at(1).map(|unit| &unit.stmt),
            Some(&Stmt::assign(xid, Value::Local(yid)))
        );
        assert_eq!(
            body.unit_at(2).map(|unit| &unit.stmt),
            Some(&Stmt::assign(zid, widening))
        );
        Ok(())
    }
}
