// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # tacnorm
//!
//! Normalization of naively translated method bodies into well-formed
//! three-address code (TAC).
//!
//! A decompiling front end turns a method's block-structured bytecode into a
//! raw TAC fragment: correct, but full of goto chains, redundant temporaries,
//! loose exception regions and comparison results stored in locals. `tacnorm`
//! binds the receiver and parameters, merges the fragment into a method body,
//! and runs a fixed pipeline of structural and optimization passes that leave
//! a body ready for dataflow analysis or code generation.
//!
//! ## Features
//!
//! - **Stable unit identities** - branches and traps refer to units by id, so
//!   removing or replacing a statement never retargets a jump by accident
//! - **Identity-based locals** - independently generated locals never merge,
//!   names are made unique once at the end
//! - **No boolean comparison values** - every `x = a < b` becomes an explicit
//!   two-way branch
//! - **Fresh analyses** - def-use and liveness are rebuilt whenever a pass
//!   needs them, never cached across mutations
//! - **Graceful failure** - methods with unsupported input get a throwing stub
//!   body instead of disappearing
//! - **Parallel batches** - methods are independent and lowered on rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use tacnorm::prelude::*;
//!
//! /// A front end for methods that return a constant.
//! struct ConstantFrontEnd;
//!
//! impl FrontEnd for ConstantFrontEnd {
//!     type Input = i32;
//!
//!     fn translate(&self, input: &i32, _scope: &mut VariableScope) -> Result<Fragment> {
//!         let mut builder = FragmentBuilder::new();
//!         builder.goto_label("exit");
//!         builder.push(Stmt::Nop);
//!         builder.label("exit");
//!         builder.push(Stmt::Return(Some(Value::int(*input))));
//!         builder.build()
//!     }
//! }
//!
//! let driver = MethodLowering::new(ConstantFrontEnd, LoweringConfig::default());
//! let signature = MethodSignature::static_method("Demo", "answer", Vec::new(), TacType::Int);
//! let events = EventLog::new();
//! let body = driver.lower(&MethodInput::new(signature, 42), &events)?;
//!
//! assert_eq!(body.len(), 1);
//! println!("{body}");
//! # Ok::<(), tacnorm::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] - types, values, expressions, statements, units, traps, bodies
//! - [`analysis`] - unit graph, reaching definitions, liveness
//! - [`compiler`] - the pass trait, the 23-stage pipeline, every pass and
//!   the event log
//! - [`frontend`] - the interface to the external decoder and fragments
//! - [`lowering`] - bindings, fragment merging, stubs and batch lowering
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Unsupported input is
//! recoverable per method, broken invariants are not:
//!
//! ```rust
//! use tacnorm::Error;
//!
//! fn report(err: &Error) -> &'static str {
//!     if err.is_recoverable() {
//!         "method replaced by a stub"
//!     } else {
//!         "pipeline defect"
//!     }
//! }
//! # let _ = report;
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use tacnorm::prelude::*;
///
/// let pipeline = PassPipeline::standard();
/// assert_eq!(pipeline.len(), 23);
/// ```
pub mod prelude;

/// The TAC intermediate representation.
pub mod ir;

/// Dataflow analyses over TAC bodies.
pub mod analysis;

/// Normalization passes and the pipeline running them.
pub mod compiler;

/// Interface to the block-structured front end.
pub mod frontend;

/// From front-end input to normalized method bodies.
pub mod lowering;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `tacnorm` Error type
///
/// The main error type for all operations in this crate. See [`Error::is_recoverable`]
/// for how lowering treats each category.
pub use error::Error;
