//! TAC statements.
//!
//! A statement lives inside a [`Unit`], which gives it a stable [`UnitId`].
//! Branch targets and trap boundaries refer to units by id, so inserting or
//! deleting statements never silently retargets a jump.

use std::fmt;

use crate::ir::{Expr, InvokeExpr, LocalId, Place, RelationalExpr, Value};

/// Stable identifier of a unit within a body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a unit id from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index of this id.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Shifts the id by `offset` (used when a fragment is merged into a body).
    #[must_use]
    pub const fn rebased(self, offset: u32) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// The implicit input an identity statement binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentitySource {
    /// The receiver (`@this`).
    This,
    /// The formal parameter at the given position (`@parameterN`).
    Parameter(u16),
    /// The exception caught by a trap handler (`@caughtexception`).
    CaughtException,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentitySource::This => f.write_str("@this"),
            IdentitySource::Parameter(index) => write!(f, "@parameter{index}"),
            IdentitySource::CaughtException => f.write_str("@caughtexception"),
        }
    }
}

/// A single TAC statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `local := @source`
    Identity {
        /// The local receiving the input.
        local: LocalId,
        /// The implicit input.
        source: IdentitySource,
    },
    /// `place = expr`
    Assign {
        /// Destination.
        place: Place,
        /// Value computed.
        expr: Expr,
    },
    /// `if condition goto target`
    If {
        /// Branch condition.
        condition: RelationalExpr,
        /// Unit reached when the condition holds.
        target: UnitId,
    },
    /// `goto target`
    Goto {
        /// Jump destination.
        target: UnitId,
    },
    /// Multi-way branch on an integer key.
    Switch {
        /// The value switched on.
        key: Value,
        /// `targets[i]` is taken when `key == i`.
        targets: Vec<UnitId>,
        /// Taken for every other key.
        default: UnitId,
    },
    /// A call whose result is discarded.
    Invoke(InvokeExpr),
    /// `return` / `return value`
    Return(Option<Value>),
    /// `throw value`
    Throw(Value),
    /// No operation.
    Nop,
}

impl Stmt {
    /// Convenience constructor for `local = expr`.
    #[must_use]
    pub fn assign(local: LocalId, expr: impl Into<Expr>) -> Self {
        Stmt::Assign {
            place: Place::Local(local),
            expr: expr.into(),
        }
    }

    /// Units this statement may jump to (excluding fall-through).
    #[must_use]
    pub fn targets(&self) -> Vec<UnitId> {
        match self {
            Stmt::If { target, .. } | Stmt::Goto { target } => vec![*target],
            Stmt::Switch {
                targets, default, ..
            } => targets.iter().copied().chain(Some(*default)).collect(),
            _ => Vec::new(),
        }
    }

    /// Branch targets, mutably.
    pub fn targets_mut(&mut self) -> Vec<&mut UnitId> {
        match self {
            Stmt::If { target, .. } | Stmt::Goto { target } => vec![target],
            Stmt::Switch {
                targets, default, ..
            } => targets.iter_mut().chain(Some(default)).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether control may continue with the next unit in sequence.
    #[must_use]
    pub fn falls_through(&self) -> bool {
        !matches!(
            self,
            Stmt::Goto { .. } | Stmt::Switch { .. } | Stmt::Return(_) | Stmt::Throw(_)
        )
    }

    /// Whether this statement ends a basic block.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        !self.falls_through() || matches!(self, Stmt::If { .. })
    }

    /// The local this statement defines, if any.
    #[must_use]
    pub fn def(&self) -> Option<LocalId> {
        match self {
            Stmt::Identity { local, .. } => Some(*local),
            Stmt::Assign { place, .. } => place.as_local(),
            _ => None,
        }
    }

    /// Immediates read by this statement.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Stmt::Identity { .. } | Stmt::Goto { .. } | Stmt::Nop | Stmt::Return(None) => {
                Vec::new()
            }
            Stmt::Assign { place, expr } => {
                let mut values = place.values();
                values.extend(expr.values());
                values
            }
            Stmt::If { condition, .. } => vec![&condition.left, &condition.right],
            Stmt::Switch { key, .. } => vec![key],
            Stmt::Invoke(invoke) => invoke.values().collect(),
            Stmt::Return(Some(value)) | Stmt::Throw(value) => vec![value],
        }
    }

    /// Immediates read by this statement, mutably. The defined local is
    /// never part of this list.
    pub fn values_mut(&mut self) -> Vec<&mut Value> {
        match self {
            Stmt::Identity { .. } | Stmt::Goto { .. } | Stmt::Nop | Stmt::Return(None) => {
                Vec::new()
            }
            Stmt::Assign { place, expr } => {
                let mut values = place.values_mut();
                values.extend(expr.values_mut());
                values
            }
            Stmt::If { condition, .. } => condition.operands_mut().into(),
            Stmt::Switch { key, .. } => vec![key],
            Stmt::Invoke(invoke) => invoke.values_mut().collect(),
            Stmt::Return(Some(value)) | Stmt::Throw(value) => vec![value],
        }
    }

    /// Locals read by this statement.
    #[must_use]
    pub fn uses(&self) -> Vec<LocalId> {
        self.values().into_iter().filter_map(Value::as_local).collect()
    }

    /// Every local this statement mentions, defined or read.
    #[must_use]
    pub fn locals(&self) -> Vec<LocalId> {
        let mut locals = self.uses();
        locals.extend(self.def());
        locals
    }

    /// Rewrites every local reference (definitions included) through `f`.
    pub fn map_locals(&mut self, f: impl Fn(LocalId) -> LocalId) {
        match self {
            Stmt::Identity { local, .. } => *local = f(*local),
            Stmt::Assign {
                place: Place::Local(local),
                ..
            } => *local = f(*local),
            _ => {}
        }
        for value in self.values_mut() {
            if let Value::Local(id) = value {
                *id = f(*id);
            }
        }
    }

    /// Whether executing this statement may raise an exception.
    #[must_use]
    pub fn may_throw(&self) -> bool {
        match self {
            Stmt::Assign { place, expr } => place.may_throw() || expr.may_throw(),
            Stmt::Invoke(_) | Stmt::Throw(_) => true,
            Stmt::Identity { .. }
            | Stmt::If { .. }
            | Stmt::Goto { .. }
            | Stmt::Switch { .. }
            | Stmt::Return(_)
            | Stmt::Nop => false,
        }
    }
}

/// A statement together with its stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Stable identity of this unit.
    pub id: UnitId,
    /// The statement.
    pub stmt: Stmt,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BinaryOp, RelationalOp};

    #[test]
    fn test_targets() {
        let switch = Stmt::Switch {
            key: Value::Local(LocalId::new(0)),
            targets: vec![UnitId::new(3), UnitId::new(4)],
            default: UnitId::new(5),
        };
        assert_eq!(
            switch.targets(),
            vec![UnitId::new(3), UnitId::new(4), UnitId::new(5)]
        );
        assert!(!switch.falls_through());
        assert!(Stmt::If {
            condition: RelationalExpr::new(RelationalOp::Eq, Value::int(0), Value::int(0)),
            target: UnitId::new(1),
        }
        .falls_through());
    }

    #[test]
    fn test_def_and_uses() {
        let x = LocalId::new(0);
        let y = LocalId::new(1);
        let stmt = Stmt::assign(
            x,
            Expr::Binary {
                op: BinaryOp::Add,
                left: Value::Local(y),
                right: Value::int(1),
            },
        );
        assert_eq!(stmt.def(), Some(x));
        assert_eq!(stmt.uses(), vec![y]);
        assert_eq!(stmt.locals(), vec![y, x]);
    }

    #[test]
    fn test_map_locals() {
        let x = LocalId::new(0);
        let y = LocalId::new(1);
        let z = LocalId::new(2);
        let mut stmt = Stmt::assign(x, Value::Local(y));
        stmt.map_locals(|id| if id == y { z } else { id });
        assert_eq!(stmt, Stmt::assign(x, Value::Local(z)));
    }

    #[test]
    fn test_rebased() {
        assert_eq!(UnitId::new(3).rebased(10), UnitId::new(13));
    }
}
