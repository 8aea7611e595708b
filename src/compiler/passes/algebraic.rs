//! Identity operation elimination.
//!
//! Rewrites binary operations with an identity element into a plain copy of
//! the other operand:
//!
//! ## Additive identities (constant 0 or `false`)
//! - `x + 0` / `0 + x` → `x`
//! - `x - 0` → `x`
//! - `x | 0` / `0 | x` → `x`
//! - `x ^ 0` / `0 ^ x` → `x`
//! - `x << 0`, `x >> 0`, `x >>> 0` → `x`
//!
//! ## Multiplicative identities (constant 1)
//! - `x * 1` / `1 * x` → `x`
//! - `x / 1` → `x`
//!
//! ## All-bits-set identity (constant -1 or `true`)
//! - `x & -1` / `-1 & x` → `x`
//!
//! Floating point operands are left alone: `-0.0 + 0.0` is not `-0.0`.
//! This covers float locals paired with an integral constant as well.

use std::collections::HashMap;

use crate::{
    compiler::{BodyPass, EventKind, PassContext},
    ir::{BinaryOp, Body, Constant, Expr, LocalId, Stmt, TacType, Value},
    Result,
};

/// Replaces binary operations with an identity operand by the other operand.
pub struct IdentityOperationPass;

impl Default for IdentityOperationPass {
    fn default() -> Self {
        Self::new()
    }
}

/// Which operand survives a simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Survivor {
    Left,
    Right,
}

impl IdentityOperationPass {
    /// Creates a new identity operation pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_floating(value: &Value, types: &HashMap<LocalId, TacType>) -> bool {
        match value {
            Value::Local(id) => matches!(types.get(id), Some(TacType::Float | TacType::Double)),
            Value::Const(constant) => matches!(constant, Constant::Float(_) | Constant::Double(_)),
        }
    }

    fn is_integral(value: &Value) -> bool {
        matches!(
            value,
            Value::Const(Constant::Int(_) | Constant::Long(_) | Constant::Bool(_))
        )
    }

    /// Decides whether `left op right` reduces to one of its operands.
    fn simplify(op: BinaryOp, left: &Value, right: &Value) -> Option<Survivor> {
        let constant = |value: &Value, test: fn(&Constant) -> bool| {
            Self::is_integral(value) && value.as_const().is_some_and(test)
        };
        let zero = |value: &Value| constant(value, Constant::is_zero);
        let one = |value: &Value| constant(value, Constant::is_one);
        let ones = |value: &Value| constant(value, Constant::is_all_ones);

        match op {
            BinaryOp::Add | BinaryOp::Or | BinaryOp::Xor => {
                if zero(right) {
                    Some(Survivor::Left)
                } else if zero(left) {
                    Some(Survivor::Right)
                } else {
                    None
                }
            }
            BinaryOp::Mul => {
                if one(right) {
                    Some(Survivor::Left)
                } else if one(left) {
                    Some(Survivor::Right)
                } else {
                    None
                }
            }
            BinaryOp::And => {
                if ones(right) {
                    Some(Survivor::Left)
                } else if ones(left) {
                    Some(Survivor::Right)
                } else {
                    None
                }
            }
            BinaryOp::Sub | BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
                zero(right).then_some(Survivor::Left)
            }
            BinaryOp::Div => one(right).then_some(Survivor::Left),
            BinaryOp::Rem => None,
        }
    }
}

impl BodyPass for IdentityOperationPass {
    fn name(&self) -> &'static str {
        "identity-operation-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes arithmetic and logical operations with an identity operand"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let types = body.local_types();
        let mut changed = false;

        for pos in 0..body.len() {
            let Some(Stmt::Assign { expr, .. }) = body.stmt_at_mut(pos) else {
                continue;
            };
            let Expr::Binary { op, left, right } = expr else {
                continue;
            };
            if Self::is_floating(left, &types) || Self::is_floating(right, &types) {
                continue;
            }
            let Some(survivor) = Self::simplify(*op, left, right) else {
                continue;
            };

            let message = format!("identity operand of {} dropped", op.symbol());
            let kept = match survivor {
                Survivor::Left => left.clone(),
                Survivor::Right => right.clone(),
            };
            *expr = Expr::Value(kept);
            ctx.record(EventKind::ConstantFolded).location(pos).message(message);
            changed = true;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{LocalGenerator, LocalId, TacType},
        test::run_pass,
    };

    fn single(op: BinaryOp, left: Value, right: Value, ty: TacType) -> (Body, LocalId, LocalId) {
        let mut generator = LocalGenerator::new();
        let y = generator.named("y", ty.clone());
        let x = generator.named("x", ty);
        let (yid, xid) = (y.id, x.id);
        let mut body = Body::new();
        body.add_local(y);
        body.add_local(x);
        let subst = |value: Value| match value {
            Value::Local(_) => Value::Local(yid),
            other => other,
        };
        body.push(Stmt::assign(
            xid,
            Expr::Binary {
                op,
                left: subst(left),
                right: subst(right),
            },
        ));
        body.push(Stmt::Return(Some(Value::Local(xid))));
        (body, yid, xid)
    }

    fn placeholder() -> Value {
        Value::Local(LocalId::new(0))
    }

    #[test]
    fn test_identities_reduce_to_the_operand() -> Result<()> {
        let cases = [
            (BinaryOp::Add, placeholder(), Value::int(0)),
            (BinaryOp::Add, Value::int(0), placeholder()),
            (BinaryOp::Sub, placeholder(), Value::int(0)),
            (BinaryOp::Mul, Value::int(1), placeholder()),
            (BinaryOp::Div, placeholder(), Value::int(1)),
            (BinaryOp::Xor, placeholder(), Value::int(0)),
            (BinaryOp::And, placeholder(), Value::int(-1)),
            (BinaryOp::Shl, placeholder(), Value::int(0)),
        ];
        for (op, left, right) in cases {
            let (mut body, yid, xid) = single(op, left, right, TacType::Int);
            assert!(run_pass(&IdentityOperationPass::new(), &mut body)?, "{op:?}");
            assert_eq!(
                body.unit_at(0).map(|unit| &unit.stmt),
                Some(&Stmt::assign(xid, Value::Local(yid)))
            );
        }
        Ok(())
    }

    #[test]
    fn test_boolean_identities() -> Result<()> {
        let (mut body, yid, xid) = single(
            BinaryOp::Or,
            placeholder(),
            Value::bool(false),
            TacType::Boolean,
        );
        assert!(run_pass(&IdentityOperationPass::new(), &mut body)?);
        assert_eq!(
            body.unit_at(0).map(|unit| &unit.stmt),
            Some(&Stmt::assign(xid, Value::Local(yid)))
        );

        let (mut body, yid, xid) = single(
            BinaryOp::And,
            Value::bool(true),
            placeholder(),
            TacType::Boolean,
        );
        assert!(run_pass(&IdentityOperationPass::new(), &mut body)?);
        assert_eq!(
            body.unit_at(0).map(|unit| &unit.stmt),
            Some(&Stmt::assign(xid, Value::Local(yid)))
        );
        Ok(())
    }

    #[test]
    fn test_non_identities_are_kept() -> Result<()> {
        let cases = [
            (BinaryOp::Sub, Value::int(0), placeholder()),
            (BinaryOp::Div, Value::int(1), placeholder()),
            (BinaryOp::Mul, placeholder(), Value::int(2)),
            (BinaryOp::Rem, placeholder(), Value::int(1)),
            (BinaryOp::And, placeholder(), Value::int(0)),
        ];
        for (op, left, right) in cases {
            let (mut body, _, _) = single(op, left, right, TacType::Int);
            assert!(!run_pass(&IdentityOperationPass::new(), &mut body)?, "{op:?}");
        }

        let (mut body, _, _) = single(
            BinaryOp::Add,
            placeholder(),
            Value::Const(Constant::Double(0.0)),
            TacType::Double,
        );
        assert!(!run_pass(&IdentityOperationPass::new(), &mut body)?);
        Ok(())
    }

    #[test]
    fn test_floating_local_with_integral_constant_is_kept() -> Result<()> {
        for ty in [TacType::Float, TacType::Double] {
            for (op, left, right) in [
                (BinaryOp::Add, placeholder(), Value::int(0)),
                (BinaryOp::Mul, Value::int(1), placeholder()),
            ] {
                let (mut body, _, _) = single(op, left, right, ty.clone());
                let before = body.clone();
                assert!(!run_pass(&IdentityOperationPass::new(), &mut body)?, "{op:?}");
                assert_eq!(body, before);
            }
        }
        Ok(())
    }
}
