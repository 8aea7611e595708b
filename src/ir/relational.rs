//! Relational (comparison) expressions.
//!
//! A relational expression compares two immediates and always yields a
//! `bool`. It may appear as the condition of an [`If`](crate::ir::Stmt::If),
//! but a normalized body never stores one into a place: the condition-to-branch
//! rewriter turns every `x = a <op> b` into an explicit two-way branch.
//!
//! All six comparison kinds share one representation, [`RelationalExpr`], with
//! the kind in [`RelationalOp`]. Passes therefore ask "is this relational?"
//! with a single match instead of checking each comparison separately.

use std::{collections::HashMap, fmt};

use strum::{EnumCount, EnumIter};

use crate::{
    ir::{Constant, LocalId, TacType, Value},
    Result,
};

/// The comparison performed by a [`RelationalExpr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum RelationalOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl RelationalOp {
    /// The infix symbol of this comparison.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            RelationalOp::Eq => "==",
            RelationalOp::Ne => "!=",
            RelationalOp::Lt => "<",
            RelationalOp::Le => "<=",
            RelationalOp::Gt => ">",
            RelationalOp::Ge => ">=",
        }
    }

    /// The comparison that holds exactly when this one does not.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            RelationalOp::Eq => RelationalOp::Ne,
            RelationalOp::Ne => RelationalOp::Eq,
            RelationalOp::Lt => RelationalOp::Ge,
            RelationalOp::Le => RelationalOp::Gt,
            RelationalOp::Gt => RelationalOp::Le,
            RelationalOp::Ge => RelationalOp::Lt,
        }
    }

    /// The comparison with swapped operands (`a < b` ⇔ `b > a`).
    #[must_use]
    pub fn swap(self) -> Self {
        match self {
            RelationalOp::Eq => RelationalOp::Eq,
            RelationalOp::Ne => RelationalOp::Ne,
            RelationalOp::Lt => RelationalOp::Gt,
            RelationalOp::Le => RelationalOp::Ge,
            RelationalOp::Gt => RelationalOp::Lt,
            RelationalOp::Ge => RelationalOp::Le,
        }
    }

    fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            RelationalOp::Eq => ordering == Equal,
            RelationalOp::Ne => ordering != Equal,
            RelationalOp::Lt => ordering == Less,
            RelationalOp::Le => ordering != Greater,
            RelationalOp::Gt => ordering == Greater,
            RelationalOp::Ge => ordering != Less,
        }
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A two-operand comparison yielding `bool`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalExpr {
    /// The comparison kind.
    pub op: RelationalOp,
    /// Left operand.
    pub left: Value,
    /// Right operand.
    pub right: Value,
}

impl RelationalExpr {
    /// Creates a new comparison.
    #[must_use]
    pub fn new(op: RelationalOp, left: impl Into<Value>, right: impl Into<Value>) -> Self {
        Self {
            op,
            left: left.into(),
            right: right.into(),
        }
    }

    /// The result type, which is `bool` for every comparison kind.
    #[must_use]
    pub fn ty(&self) -> TacType {
        TacType::Boolean
    }

    /// The symbol of the comparison kind.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        self.op.symbol()
    }

    /// Both operands, left first.
    #[must_use]
    pub fn operands(&self) -> (&Value, &Value) {
        (&self.left, &self.right)
    }

    /// Both operands, mutably.
    pub fn operands_mut(&mut self) -> [&mut Value; 2] {
        [&mut self.left, &mut self.right]
    }

    /// The comparison that holds exactly when this one does not.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            op: self.op.negate(),
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }

    /// Deep copy with local references rebound through `map`.
    ///
    /// Locals missing from `map` and constants are copied unchanged.
    #[must_use]
    pub fn rebind(&self, map: &HashMap<LocalId, LocalId>) -> Self {
        let rebind = |value: &Value| match value {
            Value::Local(id) => Value::Local(*map.get(id).unwrap_or(id)),
            Value::Const(c) => Value::Const(c.clone()),
        };
        Self {
            op: self.op,
            left: rebind(&self.left),
            right: rebind(&self.right),
        }
    }

    /// Evaluates the comparison when both operands are constants.
    ///
    /// Integral and boolean constants compare as integers, any other numeric
    /// pairing compares as floating point (unordered comparisons yield
    /// `false` except `!=`), `null` equals only `null` and strings compare by
    /// content.
    #[must_use]
    pub fn evaluate(&self) -> Option<bool> {
        let (Value::Const(left), Value::Const(right)) = (&self.left, &self.right) else {
            return None;
        };
        Self::compare(self.op, left, right)
    }

    pub(crate) fn compare(op: RelationalOp, left: &Constant, right: &Constant) -> Option<bool> {
        match (left, right) {
            (Constant::Null, Constant::Null) => match op {
                RelationalOp::Eq => Some(true),
                RelationalOp::Ne => Some(false),
                _ => None,
            },
            (Constant::Str(a), Constant::Str(b)) => match op {
                RelationalOp::Eq => Some(a == b),
                RelationalOp::Ne => Some(a != b),
                _ => None,
            },
            _ => {
                if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
                    return Some(op.holds(a.cmp(&b)));
                }
                let (a, b) = (left.as_f64()?, right.as_f64()?);
                match a.partial_cmp(&b) {
                    Some(ordering) => Some(op.holds(ordering)),
                    None => Some(op == RelationalOp::Ne),
                }
            }
        }
    }

    /// Lowers the comparison to a single stack-machine opcode.
    ///
    /// A relational expression has no single-instruction form in this IR:
    /// stack backends have to lower the enclosing statement to a branch.
    /// This always fails with an unsupported-construct error.
    ///
    /// # Errors
    ///
    /// Always returns [`crate::Error::Unsupported`].
    pub fn to_stack_opcode(&self) -> Result<u8> {
        Err(unsupported_error!(
            "relational expression '{}' has no single-opcode lowering",
            self.op
        ))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::Error;

    #[test]
    fn test_every_kind_is_boolean() {
        assert_eq!(RelationalOp::COUNT, 6);
        for op in RelationalOp::iter() {
            let expr = RelationalExpr::new(op, LocalId::new(0), Value::int(1));
            assert_eq!(expr.ty(), TacType::Boolean);
            assert_eq!(op.negate().negate(), op);
            assert_eq!(op.swap().swap(), op);
        }
    }

    #[test]
    fn test_symbols() {
        assert_eq!(RelationalOp::Eq.symbol(), "==");
        assert_eq!(RelationalOp::Gt.symbol(), ">");
        assert_eq!(RelationalOp::Le.to_string(), "<=");
    }

    #[test]
    fn test_rebind_leaves_constants_untouched() {
        let a = LocalId::new(1);
        let b = LocalId::new(2);
        let expr = RelationalExpr::new(RelationalOp::Lt, a, Value::int(7));
        let map: HashMap<LocalId, LocalId> = [(a, b)].into();
        let copy = expr.rebind(&map);
        assert_eq!(copy.left, Value::Local(b));
        assert_eq!(copy.right, Value::int(7));
        assert_eq!(expr.left, Value::Local(a));
    }

    #[test]
    fn test_evaluate() {
        let eq = RelationalExpr::new(RelationalOp::Eq, Value::int(5), Value::int(5));
        assert_eq!(eq.evaluate(), Some(true));
        let gt = RelationalExpr::new(RelationalOp::Gt, Value::int(5), Value::int(6));
        assert_eq!(gt.evaluate(), Some(false));
        let mixed = RelationalExpr::new(
            RelationalOp::Le,
            Value::Const(Constant::Double(1.5)),
            Value::int(2),
        );
        assert_eq!(mixed.evaluate(), Some(true));
        let nan = RelationalExpr::new(
            RelationalOp::Eq,
            Value::Const(Constant::Double(f64::NAN)),
            Value::Const(Constant::Double(f64::NAN)),
        );
        assert_eq!(nan.evaluate(), Some(false));
        let nulls = RelationalExpr::new(
            RelationalOp::Eq,
            Value::Const(Constant::Null),
            Value::Const(Constant::Null),
        );
        assert_eq!(nulls.evaluate(), Some(true));
        let open = RelationalExpr::new(RelationalOp::Eq, LocalId::new(0), Value::int(5));
        assert_eq!(open.evaluate(), None);
    }

    #[test]
    fn test_stack_opcode_is_unsupported() {
        let expr = RelationalExpr::new(RelationalOp::Eq, LocalId::new(0), LocalId::new(1));
        assert!(matches!(
            expr.to_stack_opcode(),
            Err(Error::Unsupported { .. })
        ));
    }
}
