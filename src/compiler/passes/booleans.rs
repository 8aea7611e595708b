//! Integer-to-boolean normalization.
//!
//! Stack bytecode has no boolean type: `true` and `false` are loaded as the
//! integers 1 and 0. Once the body is typed, an integer constant used where a
//! boolean is expected is rewritten to the boolean constant (any non-zero
//! value is `true`). Boolean contexts are:
//!
//! - assignment to a boolean local or boolean field
//! - `return` in a method returning `bool`
//! - the constant side of a comparison whose other side is boolean
//! - the constant operand of `&`, `|`, `^` whose other operand is boolean
//! - call arguments whose parameter type is `bool`

use std::collections::HashMap;

use crate::{
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, Constant, Expr, InvokeExpr, LocalId, Place, Stmt, TacType, Value},
    Result,
};

/// Rewrites integer constants in boolean contexts to boolean constants.
pub struct BooleanNormalizationPass;

impl Default for BooleanNormalizationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl BooleanNormalizationPass {
    /// Creates a new boolean normalization pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Converts an `int` constant to `bool` in place.
    fn retype(value: &mut Value) -> bool {
        match value {
            Value::Const(Constant::Int(n)) => {
                let truth = *n != 0;
                *value = Value::bool(truth);
                true
            }
            _ => false,
        }
    }

    fn is_boolean(value: &Value, types: &HashMap<LocalId, TacType>) -> bool {
        match value {
            Value::Local(id) => types.get(id) == Some(&TacType::Boolean),
            Value::Const(constant) => matches!(constant, Constant::Bool(_)),
        }
    }

    /// Retypes whichever operand is an integer constant when the other is
    /// boolean.
    fn retype_pair(left: &mut Value, right: &mut Value, types: &HashMap<LocalId, TacType>) -> bool {
        if Self::is_boolean(left, types) {
            Self::retype(right)
        } else if Self::is_boolean(right, types) {
            Self::retype(left)
        } else {
            false
        }
    }

    fn retype_args(invoke: &mut InvokeExpr) -> usize {
        invoke
            .args
            .iter_mut()
            .zip(&invoke.method.parameters)
            .filter(|(_, ty)| **ty == TacType::Boolean)
            .map(|(arg, _)| Self::retype(arg))
            .filter(|&changed| changed)
            .count()
    }

    fn normalize(
        stmt: &mut Stmt,
        types: &HashMap<LocalId, TacType>,
        return_type: &TacType,
    ) -> usize {
        match stmt {
            Stmt::Assign { place, expr } => {
                let target_is_bool = match &*place {
                    Place::Local(id) => types.get(id) == Some(&TacType::Boolean),
                    Place::Field { field, .. } => field.ty == TacType::Boolean,
                    Place::ArrayElement { .. } => false,
                };
                match expr {
                    Expr::Value(value) if target_is_bool => usize::from(Self::retype(value)),
                    Expr::Binary { op, left, right } if op.is_logical() => {
                        usize::from(Self::retype_pair(left, right, types))
                    }
                    Expr::Relational(rel) => {
                        let [left, right] = rel.operands_mut();
                        usize::from(Self::retype_pair(left, right, types))
                    }
                    Expr::Invoke(invoke) => Self::retype_args(invoke),
                    _ => 0,
                }
            }
            Stmt::Return(Some(value)) if *return_type == TacType::Boolean => {
                usize::from(Self::retype(value))
            }
            Stmt::If { condition, .. } => {
                let [left, right] = condition.operands_mut();
                usize::from(Self::retype_pair(left, right, types))
            }
            Stmt::Invoke(invoke) => Self::retype_args(invoke),
            _ => 0,
        }
    }
}

impl BodyPass for BooleanNormalizationPass {
    fn name(&self) -> &'static str {
        "boolean-normalization"
    }

    fn description(&self) -> &'static str {
        "Rewrites 0/1 integer constants used as booleans to boolean constants"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let types = body.local_types();
        let return_type = &ctx.signature.return_type;
        let mut changed = false;

        for pos in 0..body.len() {
            let Some(stmt) = body.stmt_at_mut(pos) else {
                continue;
            };
            let count = Self::normalize(stmt, &types, return_type);
            if count > 0 {
                ctx.record(EventKind::BooleanNormalized)
                    .location(pos)
                    .message(format!("{count} integer constant(s) retyped to bool"));
                changed = true;
            }
        }

        Ok(changed)
    }
}
