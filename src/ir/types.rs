//! Static types of TAC locals and values.
//!
//! The type model is deliberately small: the primitive kinds the CLI evaluation
//! stack distinguishes, named reference types, arrays and the type of the `null`
//! literal. Generic instantiation and by-ref types are resolved by the front end
//! before a body reaches this crate and show up here as plain class names.

use std::fmt;

use crate::ir::Constant;

/// The static type of a local, constant or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TacType {
    /// No value (method return type only).
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Byte` / `System.SByte`
    Byte,
    /// `System.Char`
    Char,
    /// `System.Int16`
    Short,
    /// `System.Int32`
    Int,
    /// `System.Int64`
    Long,
    /// `System.Single`
    Float,
    /// `System.Double`
    Double,
    /// A named reference type (class, interface, boxed struct).
    Class(String),
    /// A single-dimensional array of the element type.
    Array(Box<TacType>),
    /// The type of the `null` literal.
    Null,
}

impl TacType {
    /// Creates a class type from its fully qualified name.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        TacType::Class(name.into())
    }

    /// Creates an array type with the given element type.
    #[must_use]
    pub fn array_of(element: TacType) -> Self {
        TacType::Array(Box::new(element))
    }

    /// Returns `true` for value types that live directly in a local slot.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TacType::Boolean
                | TacType::Byte
                | TacType::Char
                | TacType::Short
                | TacType::Int
                | TacType::Long
                | TacType::Float
                | TacType::Double
        )
    }

    /// Returns `true` for the integral primitive kinds (booleans excluded).
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TacType::Byte | TacType::Char | TacType::Short | TacType::Int | TacType::Long
        )
    }

    /// Returns `true` for class, array and null types.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, TacType::Class(_) | TacType::Array(_) | TacType::Null)
    }

    /// The zero value a local of this type holds before its first store.
    ///
    /// Used for stub bodies that must return *something*. `Void` has no value.
    #[must_use]
    pub fn default_value(&self) -> Option<Constant> {
        match self {
            TacType::Void => None,
            TacType::Boolean => Some(Constant::Bool(false)),
            TacType::Byte | TacType::Char | TacType::Short | TacType::Int => {
                Some(Constant::Int(0))
            }
            TacType::Long => Some(Constant::Long(0)),
            TacType::Float => Some(Constant::Float(0.0)),
            TacType::Double => Some(Constant::Double(0.0)),
            TacType::Class(_) | TacType::Array(_) | TacType::Null => Some(Constant::Null),
        }
    }

    /// The prefix used when generating temporary local names of this type.
    pub(crate) fn name_prefix(&self) -> char {
        match self {
            TacType::Boolean => 'z',
            TacType::Byte => 'b',
            TacType::Char => 'c',
            TacType::Short => 's',
            TacType::Int => 'i',
            TacType::Long => 'l',
            TacType::Float => 'f',
            TacType::Double => 'd',
            TacType::Void | TacType::Class(_) | TacType::Array(_) | TacType::Null => 'r',
        }
    }
}

impl fmt::Display for TacType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacType::Void => f.write_str("void"),
            TacType::Boolean => f.write_str("bool"),
            TacType::Byte => f.write_str("byte"),
            TacType::Char => f.write_str("char"),
            TacType::Short => f.write_str("short"),
            TacType::Int => f.write_str("int"),
            TacType::Long => f.write_str("long"),
            TacType::Float => f.write_str("float"),
            TacType::Double => f.write_str("double"),
            TacType::Class(name) => f.write_str(name),
            TacType::Array(element) => write!(f, "{element}[]"),
            TacType::Null => f.write_str("null_type"),
        }
    }
}
