//! Method signature metadata consumed by the lowering driver.
//!
//! Signatures arrive already resolved and validated; the lowering only reads
//! the declaring type, the static flag, parameter types and the return type.

use std::fmt;

use bitflags::bitflags;

use crate::ir::TacType;

bitflags! {
    /// Method attributes relevant to body construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u16 {
        /// The method has no receiver.
        const STATIC = 0x0010;
        /// The method has no body of its own.
        const ABSTRACT = 0x0400;
    }
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Source-level name, when the metadata carries one.
    pub name: Option<String>,
    /// Parameter type.
    pub ty: TacType,
}

impl Parameter {
    /// A named parameter.
    #[must_use]
    pub fn named(name: impl Into<String>, ty: TacType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    /// A parameter without a recorded name.
    #[must_use]
    pub fn unnamed(ty: TacType) -> Self {
        Self { name: None, ty }
    }
}

/// The signature of the method whose body is being lowered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Fully qualified name of the declaring type.
    pub declaring_type: String,
    /// Method name.
    pub name: String,
    /// Attributes.
    pub flags: MethodFlags,
    /// Formal parameters in order (receiver excluded).
    pub parameters: Vec<Parameter>,
    /// Return type.
    pub return_type: TacType,
}

impl MethodSignature {
    /// Creates a signature for an instance method.
    #[must_use]
    pub fn instance(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: TacType,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            flags: MethodFlags::empty(),
            parameters,
            return_type,
        }
    }

    /// Creates a signature for a static method.
    #[must_use]
    pub fn static_method(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: TacType,
    ) -> Self {
        Self {
            flags: MethodFlags::STATIC,
            ..Self::instance(declaring_type, name, parameters, return_type)
        }
    }

    /// Adds attribute flags.
    #[must_use]
    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Whether the method has no receiver.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// Whether the method is declared without a body.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MethodFlags::ABSTRACT)
    }

    /// The receiver type (the declaring type as a class).
    #[must_use]
    pub fn receiver_type(&self) -> TacType {
        TacType::Class(self.declaring_type.clone())
    }

    /// `Declaring.Type::Name`. Overloads share it.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.name)
    }

    /// The full signature text, e.g. `static int A::f(long)`.
    ///
    /// Unlike [`qualified_name`](Self::qualified_name) this tells overloads
    /// apart, including conversion operators that differ only in their
    /// return type. Bodies and events are keyed by it.
    #[must_use]
    pub fn unique_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static() {
            f.write_str("static ")?;
        }
        write!(f, "{} {}(", self.return_type, self.qualified_name())?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        f.write_str(")")
    }
}
