//! Three-address code (TAC) representation of method bodies.
//!
//! Every statement performs at most one operation and writes at most one
//! destination; every operand is a local or a constant. This is the form the
//! normalization pipeline consumes and produces.
//!
//! # Architecture
//!
//! - [`types`] - static types of locals and values
//! - [`value`] - constants and immediates
//! - [`local`] - locals, their identity and id generation
//! - [`relational`] - comparison expressions (the only boolean-valued kind)
//! - [`expr`] - the expression sum type and assignable places
//! - [`stmt`] - statements and stable unit identifiers
//! - [`body`] - the body container with reference-preserving mutation
//! - [`method`] - signature metadata for the method being lowered
//!
//! # Example
//!
//! ```rust
//! use tacnorm::ir::{Body, LocalGenerator, RelationalExpr, RelationalOp, Stmt, TacType, Value};
//!
//! let mut locals = LocalGenerator::new();
//! let x = locals.named("x", TacType::Boolean);
//! let xid = x.id;
//!
//! let mut body = Body::new();
//! body.add_local(x);
//! body.push(Stmt::assign(xid, Value::bool(true)));
//! body.push(Stmt::Return(Some(Value::Local(xid))));
//! assert!(body.validate().is_ok());
//! ```

mod body;
mod display;
mod expr;
mod local;
mod method;
mod relational;
mod stmt;
mod types;
mod value;

pub use body::{Body, Trap};
pub use display::render_stmt;
pub use expr::{BinaryOp, Expr, FieldRef, InvokeExpr, InvokeKind, MethodRef, Place, UnaryOp};
pub use local::{Local, LocalGenerator, LocalId};
pub use method::{MethodFlags, MethodSignature, Parameter};
pub use relational::{RelationalExpr, RelationalOp};
pub use stmt::{IdentitySource, Stmt, Unit, UnitId};
pub use types::TacType;
pub use value::{Constant, Value};
