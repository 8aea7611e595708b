//! Body normalization pipeline.
//!
//! This module sits between the IR and the lowering driver:
//!
//! - [`crate::ir`] - TAC bodies, units, locals and traps
//! - [`crate::analysis`] - unit graph, reaching definitions, liveness
//! - [`compiler`](self) - the pass trait, the pipeline and every pass
//! - [`crate::lowering`] - binding, unification, stub fallback, batching
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Normalization Pipeline                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  PassPipeline                 Fixed, ordered list of passes      │
//! │    ├─ standard()              The 23-stage normalization order   │
//! │    ├─ add()                   Custom orders for tests/tools      │
//! │    └─ run()                   Pass → validate → next pass        │
//! │                                                                  │
//! │  BodyPass trait               Interface for all passes           │
//! │    ├─ name()                  Stable kebab-case identifier       │
//! │    └─ run_on_body()           In-place rewrite, reports change   │
//! │                                                                  │
//! │  Passes (17 built-in)                                            │
//! │    ├─ Control flow: branch folding, unreachable code, nop,       │
//! │    │                condition-to-branch                          │
//! │    ├─ Traps: tightening, minimization                            │
//! │    ├─ Values: aggregation, casts, identities, booleans, copies   │
//! │    └─ Cleanup: dead allocations/assignments, locals, names       │
//! │                                                                  │
//! │  EventLog                     Change tracking and diagnostics    │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use tacnorm::{
//!     compiler::{EventLog, PassPipeline},
//!     ir::{Body, MethodSignature, Stmt, TacType, Value},
//! };
//!
//! let signature = MethodSignature::static_method("Demo", "zero", Vec::new(), TacType::Int);
//! let mut body = Body::new();
//! body.push(Stmt::Nop);
//! body.push(Stmt::Return(Some(Value::int(0))));
//!
//! let events = EventLog::new();
//! let changed = PassPipeline::standard().run(&mut body, &signature, &events)?;
//! assert!(changed);
//! assert_eq!(body.len(), 1);
//! # Ok::<(), tacnorm::Error>(())
//! ```

mod events;
mod pass;
mod passes;
mod pipeline;

pub use events::{DerivedStats, Event, EventBuilder, EventKind, EventLog};
pub use pass::{BodyPass, PassContext};
pub use passes::{
    AggregationPass, BooleanNormalizationPass, ConditionRewritePass, ConditionalBranchFoldingPass,
    ConstantCastPass, CopyPropagationPass, DeadAllocationPass, DeadAssignmentPass,
    IdentityCastPass, IdentityOperationPass, LocalPackingPass, NameDisambiguationPass,
    NopEliminationPass, TrapMinimizationPass, TrapTighteningPass, UnconditionalBranchFoldingPass,
    UnreachableCodePass, UnusedLocalPass,
};
pub use pipeline::PassPipeline;
