//! Immediates: constants and local references.
//!
//! Every operand of a TAC expression is a [`Value`], so an expression never
//! nests another expression. Constants carry their own static type.

use std::fmt;

use crate::ir::{LocalId, TacType};

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// 32-bit integer (also used for byte, char and short).
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Boolean literal.
    Bool(bool),
    /// String literal.
    Str(String),
    /// The null reference.
    Null,
}

impl Constant {
    /// The static type of this constant.
    #[must_use]
    pub fn ty(&self) -> TacType {
        match self {
            Constant::Int(_) => TacType::Int,
            Constant::Long(_) => TacType::Long,
            Constant::Float(_) => TacType::Float,
            Constant::Double(_) => TacType::Double,
            Constant::Bool(_) => TacType::Boolean,
            Constant::Str(_) => TacType::class("System.String"),
            Constant::Null => TacType::Null,
        }
    }

    /// Integral view of the constant, with `true`/`false` as 1/0.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Constant::Int(v) => Some(i64::from(*v)),
            Constant::Long(v) => Some(*v),
            Constant::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Floating point view of any numeric constant.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Constant::Float(v) => Some(f64::from(*v)),
            Constant::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Returns `true` for `0`, `0L` and `false`.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_i64() == Some(0)
    }

    /// Returns `true` for `1`, `1L` and `true`.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_i64() == Some(1)
    }

    /// Returns `true` for an all-bits-set integral constant or `true`.
    #[must_use]
    pub fn is_all_ones(&self) -> bool {
        match self {
            Constant::Int(v) => *v == -1,
            Constant::Long(v) => *v == -1,
            Constant::Bool(v) => *v,
            _ => false,
        }
    }

    /// Converts this constant to the given primitive type, the way a
    /// `conv.*` instruction would.
    ///
    /// Returns `None` when the conversion has no constant result (for example
    /// a string cast to `int`). Casting `null` to any reference type yields
    /// `null`.
    #[must_use]
    pub fn convert_to(&self, ty: &TacType) -> Option<Constant> {
        if ty.is_reference() {
            return match self {
                Constant::Null => Some(Constant::Null),
                Constant::Str(_) if *ty == self.ty() => Some(self.clone()),
                _ => None,
            };
        }

        let integral = || match self {
            Constant::Float(v) => Some(*v as i64),
            Constant::Double(v) => Some(*v as i64),
            other => other.as_i64(),
        };

        match ty {
            TacType::Boolean => integral().map(|v| Constant::Bool(v != 0)),
            TacType::Byte => integral().map(|v| Constant::Int(i32::from(v as u8))),
            TacType::Char => integral().map(|v| Constant::Int(i32::from(v as u16))),
            TacType::Short => integral().map(|v| Constant::Int(i32::from(v as i16))),
            TacType::Int => integral().map(|v| Constant::Int(v as i32)),
            TacType::Long => integral().map(Constant::Long),
            TacType::Float => self.as_f64().map(|v| Constant::Float(v as f32)),
            TacType::Double => self.as_f64().map(Constant::Double),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Long(v) => write!(f, "{v}L"),
            Constant::Float(v) => write!(f, "{v}F"),
            Constant::Double(v) => write!(f, "{v}"),
            Constant::Bool(v) => write!(f, "{v}"),
            Constant::Str(v) => write!(f, "{v:?}"),
            Constant::Null => f.write_str("null"),
        }
    }
}

/// An immediate operand: a local or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Reference to a local of the enclosing body.
    Local(LocalId),
    /// A literal.
    Const(Constant),
}

impl Value {
    /// Shorthand for an `Int` constant operand.
    #[must_use]
    pub fn int(v: i32) -> Self {
        Value::Const(Constant::Int(v))
    }

    /// Shorthand for a `Bool` constant operand.
    #[must_use]
    pub fn bool(v: bool) -> Self {
        Value::Const(Constant::Bool(v))
    }

    /// The local this value reads, if any.
    #[must_use]
    pub fn as_local(&self) -> Option<LocalId> {
        match self {
            Value::Local(id) => Some(*id),
            Value::Const(_) => None,
        }
    }

    /// The constant this value holds, if any.
    #[must_use]
    pub fn as_const(&self) -> Option<&Constant> {
        match self {
            Value::Const(c) => Some(c),
            Value::Local(_) => None,
        }
    }
}

impl From<LocalId> for Value {
    fn from(id: LocalId) -> Self {
        Value::Local(id)
    }
}

impl From<Constant> for Value {
    fn from(c: Constant) -> Self {
        Value::Const(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_predicates() {
        assert!(Constant::Int(0).is_zero());
        assert!(Constant::Bool(false).is_zero());
        assert!(Constant::Long(1).is_one());
        assert!(Constant::Bool(true).is_all_ones());
        assert!(Constant::Int(-1).is_all_ones());
        assert!(!Constant::Null.is_zero());
    }

    #[test]
    fn test_constant_conversions() {
        assert_eq!(
            Constant::Int(300).convert_to(&TacType::Byte),
            Some(Constant::Int(44))
        );
        assert_eq!(
            Constant::Int(5).convert_to(&TacType::Long),
            Some(Constant::Long(5))
        );
        assert_eq!(
            Constant::Double(2.75).convert_to(&TacType::Int),
            Some(Constant::Int(2))
        );
        assert_eq!(
            Constant::Int(2).convert_to(&TacType::Boolean),
            Some(Constant::Bool(true))
        );
        assert_eq!(
            Constant::Null.convert_to(&TacType::class("System.Object")),
            Some(Constant::Null)
        );
        assert_eq!(
            Constant::Str("x".into()).convert_to(&TacType::Int),
            None
        );
    }
}
