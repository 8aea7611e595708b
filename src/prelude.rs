//! # tacnorm Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the tacnorm library. Import it to get the IR, the driver and the front-end
//! interface in one line.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tacnorm operations
pub use crate::Error;

/// The result type used throughout tacnorm
pub use crate::Result;

// ================================================================================================
// Intermediate Representation
// ================================================================================================

/// Bodies, units and traps
pub use crate::ir::{Body, Trap, Unit, UnitId};

/// Statements and expressions
pub use crate::ir::{
    BinaryOp, Expr, FieldRef, IdentitySource, InvokeExpr, InvokeKind, MethodRef, Place,
    RelationalExpr, RelationalOp, Stmt, UnaryOp,
};

/// Values, locals and types
pub use crate::ir::{Constant, Local, LocalGenerator, LocalId, TacType, Value};

/// Method metadata
pub use crate::ir::{MethodFlags, MethodSignature, Parameter};

// ================================================================================================
// Pipeline
// ================================================================================================

/// Pass trait, pipeline and event log
pub use crate::compiler::{BodyPass, EventKind, EventLog, PassContext, PassPipeline};

// ================================================================================================
// Front End and Lowering
// ================================================================================================

/// Front-end interface
pub use crate::frontend::{Fragment, FragmentBuilder, FrontEnd, VariableDecl, VariableScope};

/// Lowering driver
pub use crate::lowering::{LoweredMethod, LoweringConfig, LoweringContext, MethodInput, MethodLowering};
