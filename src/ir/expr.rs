//! TAC expressions and assignable places.
//!
//! Expressions are a closed sum type, so "which kind of expression is this"
//! is an exhaustive match everywhere. Every operand is an immediate
//! [`Value`]; nesting only happens through locals.

#![allow(missing_docs)]

use std::fmt;

use crate::ir::{LocalId, RelationalExpr, TacType, Value};

/// Non-comparison binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
}

impl BinaryOp {
    /// The infix symbol of this operator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
        }
    }

    /// Division and remainder raise on a zero divisor.
    #[must_use]
    pub fn may_throw(self) -> bool {
        matches!(self, BinaryOp::Div | BinaryOp::Rem)
    }

    /// Bitwise operators whose operands may be booleans.
    #[must_use]
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Bitwise complement.
    Not,
}

/// Reference to a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Fully qualified name of the declaring type.
    pub declaring_type: String,
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TacType,
}

impl FieldRef {
    /// Creates a field reference.
    #[must_use]
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>, ty: TacType) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            ty,
        }
    }
}

/// Reference to a callee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Fully qualified name of the declaring type.
    pub declaring_type: String,
    /// Method name.
    pub name: String,
    /// Parameter types, receiver excluded.
    pub parameters: Vec<TacType>,
    /// Return type.
    pub return_type: TacType,
}

impl MethodRef {
    /// Creates a callee reference.
    #[must_use]
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<TacType>,
        return_type: TacType,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameters,
            return_type,
        }
    }
}

/// Dispatch kind of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// Call without receiver.
    Static,
    /// Virtual dispatch on the receiver.
    Virtual,
    /// Dispatch through an interface.
    Interface,
    /// Non-virtual instance call (constructors, base calls).
    Special,
}

/// A method call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr {
    /// Dispatch kind.
    pub kind: InvokeKind,
    /// The callee.
    pub method: MethodRef,
    /// Receiver; absent for static calls.
    pub base: Option<Value>,
    /// Arguments in order.
    pub args: Vec<Value>,
}

impl InvokeExpr {
    /// Every immediate the call reads, receiver first.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.base.iter().chain(self.args.iter())
    }

    /// Every immediate the call reads, mutably.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.base.iter_mut().chain(self.args.iter_mut())
    }
}

/// The right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare immediate (copy or constant load).
    Value(Value),
    /// A comparison yielding `bool`.
    Relational(RelationalExpr),
    /// `left op right`
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Value,
        /// Right operand.
        right: Value,
    },
    /// `op operand`
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Value,
    },
    /// `(ty) value`
    Cast {
        /// Target type.
        ty: TacType,
        /// Converted value.
        value: Value,
    },
    /// Object construction (allocation only; the constructor is a separate
    /// `Special` invoke).
    New {
        /// Allocated type.
        ty: TacType,
    },
    /// `new element[size]`
    NewArray {
        /// Element type.
        element: TacType,
        /// Element count.
        size: Value,
    },
    /// `value instanceof ty`
    InstanceOf {
        /// Tested type.
        ty: TacType,
        /// Tested value.
        value: Value,
    },
    /// `lengthof array`
    Length {
        /// The array.
        array: Value,
    },
    /// Field read; static when `base` is absent.
    Field {
        /// Receiver.
        base: Option<Value>,
        /// The field.
        field: FieldRef,
    },
    /// `base[index]`
    ArrayElement {
        /// The array.
        base: Value,
        /// Element index.
        index: Value,
    },
    /// Call whose result is used.
    Invoke(InvokeExpr),
}

impl Expr {
    /// Returns the comparison if this expression is relational.
    #[must_use]
    pub fn as_relational(&self) -> Option<&RelationalExpr> {
        match self {
            Expr::Relational(rel) => Some(rel),
            _ => None,
        }
    }

    /// Returns `true` for object-construction expressions.
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(self, Expr::New { .. })
    }

    /// The immediate if this expression is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Expr::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Every immediate operand this expression reads.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Expr::Value(v) => vec![v],
            Expr::Relational(rel) => vec![&rel.left, &rel.right],
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Unary { operand, .. } => vec![operand],
            Expr::Cast { value, .. } | Expr::InstanceOf { value, .. } => vec![value],
            Expr::New { .. } => Vec::new(),
            Expr::NewArray { size, .. } => vec![size],
            Expr::Length { array } => vec![array],
            Expr::Field { base, .. } => base.iter().collect(),
            Expr::ArrayElement { base, index } => vec![base, index],
            Expr::Invoke(invoke) => invoke.values().collect(),
        }
    }

    /// Every immediate operand this expression reads, mutably.
    pub fn values_mut(&mut self) -> Vec<&mut Value> {
        match self {
            Expr::Value(v) => vec![v],
            Expr::Relational(rel) => rel.operands_mut().into(),
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Unary { operand, .. } => vec![operand],
            Expr::Cast { value, .. } | Expr::InstanceOf { value, .. } => vec![value],
            Expr::New { .. } => Vec::new(),
            Expr::NewArray { size, .. } => vec![size],
            Expr::Length { array } => vec![array],
            Expr::Field { base, .. } => base.iter_mut().collect(),
            Expr::ArrayElement { base, index } => vec![base, index],
            Expr::Invoke(invoke) => invoke.values_mut().collect(),
        }
    }

    /// Locals read by this expression.
    #[must_use]
    pub fn uses(&self) -> Vec<LocalId> {
        self.values().into_iter().filter_map(Value::as_local).collect()
    }

    /// Whether evaluating the expression may raise an exception.
    #[must_use]
    pub fn may_throw(&self) -> bool {
        match self {
            Expr::Value(_) | Expr::Relational(_) | Expr::Unary { .. } | Expr::InstanceOf { .. } => {
                false
            }
            Expr::Binary { op, .. } => op.may_throw(),
            Expr::Cast { ty, .. } => ty.is_reference(),
            Expr::New { .. }
            | Expr::NewArray { .. }
            | Expr::Length { .. }
            | Expr::Field { .. }
            | Expr::ArrayElement { .. }
            | Expr::Invoke(_) => true,
        }
    }

    /// Whether the expression can be dropped when its result is unused.
    ///
    /// Allocation is excluded here; dead allocations are removed by a
    /// dedicated pass that reasons about constructor calls separately.
    #[must_use]
    pub fn is_pure(&self) -> bool {
        match self {
            Expr::Value(_) | Expr::Relational(_) | Expr::Unary { .. } | Expr::InstanceOf { .. } => {
                true
            }
            Expr::Binary { op, .. } => !op.may_throw(),
            Expr::Cast { ty, .. } => ty.is_primitive(),
            Expr::New { .. }
            | Expr::NewArray { .. }
            | Expr::Length { .. }
            | Expr::Field { .. }
            | Expr::ArrayElement { .. }
            | Expr::Invoke(_) => false,
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

impl From<RelationalExpr> for Expr {
    fn from(rel: RelationalExpr) -> Self {
        Expr::Relational(rel)
    }
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    /// A local.
    Local(LocalId),
    /// Instance field when `base` is present, static field otherwise.
    Field {
        /// Receiver.
        base: Option<Value>,
        /// The field.
        field: FieldRef,
    },
    /// `base[index]`
    ArrayElement {
        /// The array.
        base: Value,
        /// Element index.
        index: Value,
    },
}

impl Place {
    /// The local written, if this place is a local.
    #[must_use]
    pub fn as_local(&self) -> Option<LocalId> {
        match self {
            Place::Local(id) => Some(*id),
            _ => None,
        }
    }

    /// Immediates read while computing the address of this place.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Place::Local(_) => Vec::new(),
            Place::Field { base, .. } => base.iter().collect(),
            Place::ArrayElement { base, index } => vec![base, index],
        }
    }

    /// Immediates read while computing the address of this place, mutably.
    pub fn values_mut(&mut self) -> Vec<&mut Value> {
        match self {
            Place::Local(_) => Vec::new(),
            Place::Field { base, .. } => base.iter_mut().collect(),
            Place::ArrayElement { base, index } => vec![base, index],
        }
    }

    /// Whether storing into this place may raise (null base, bad index).
    #[must_use]
    pub fn may_throw(&self) -> bool {
        match self {
            Place::Local(_) => false,
            Place::Field { base, .. } => base.is_some(),
            Place::ArrayElement { .. } => true,
        }
    }
}

impl From<LocalId> for Place {
    fn from(id: LocalId) -> Self {
        Place::Local(id)
    }
}

impl fmt::Display for InvokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvokeKind::Static => "staticinvoke",
            InvokeKind::Virtual => "virtualinvoke",
            InvokeKind::Interface => "interfaceinvoke",
            InvokeKind::Special => "specialinvoke",
        })
    }
}
