//! Built-in normalization passes.
//!
//! Every pass implements [`BodyPass`](crate::compiler::BodyPass) and is a
//! value-less struct. The [`PassPipeline`](crate::compiler::PassPipeline)
//! runs them in a fixed order; some appear twice.
//!
//! ## Control flow
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`UnconditionalBranchFoldingPass`] | Collapses goto chains, drops gotos to the next unit |
//! | [`ConditionalBranchFoldingPass`] | Folds branches on constant conditions |
//! | [`UnreachableCodePass`] | Removes units with no path from the entry |
//! | [`NopEliminationPass`] | Removes `nop` and redundant gotos |
//! | [`ConditionRewritePass`] | Turns `x = a < b` into branches assigning literals |
//!
//! ## Exception regions
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`TrapTighteningPass`] | Shrinks trap ranges to the units that may throw |
//! | [`TrapMinimizationPass`] | Drops empty and duplicate traps, merges adjacent ones |
//!
//! ## Values
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`AggregationPass`] | Folds a single-use temporary into its use |
//! | [`ConstantCastPass`] | Folds casts of constants |
//! | [`IdentityCastPass`] | Drops casts to the operand's own type |
//! | [`IdentityOperationPass`] | Drops `x + 0`, `x * 1`, `x & -1` and friends |
//! | [`BooleanNormalizationPass`] | Retypes 0/1 integer constants in boolean contexts |
//! | [`CopyPropagationPass`] | Replaces uses of copies and constants by their source |
//!
//! ## Cleanup
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`DeadAllocationPass`] | Removes allocations whose result is never used |
//! | [`DeadAssignmentPass`] | Removes side-effect-free assignments nobody reads |
//! | [`LocalPackingPass`] | Shares one local between non-interfering locals |
//! | [`UnusedLocalPass`] | Drops locals no unit mentions |
//! | [`NameDisambiguationPass`] | Makes local names pairwise distinct |

mod aggregation;
mod algebraic;
mod allocation;
mod booleans;
mod branches;
mod casts;
mod conditions;
mod copying;
mod deadcode;
mod locals;
mod names;
mod nop;
mod packing;
mod traps;
mod unreachable;

pub use aggregation::AggregationPass;
pub use algebraic::IdentityOperationPass;
pub use allocation::DeadAllocationPass;
pub use booleans::BooleanNormalizationPass;
pub use branches::{ConditionalBranchFoldingPass, UnconditionalBranchFoldingPass};
pub use casts::{ConstantCastPass, IdentityCastPass};
pub use conditions::ConditionRewritePass;
pub use copying::CopyPropagationPass;
pub use deadcode::DeadAssignmentPass;
pub use locals::UnusedLocalPass;
pub use names::NameDisambiguationPass;
pub use nop::NopEliminationPass;
pub use packing::LocalPackingPass;
pub use traps::{TrapMinimizationPass, TrapTighteningPass};
pub use unreachable::UnreachableCodePass;

use crate::{
    compiler::{EventKind, PassContext},
    ir::Body,
};

/// Drops traps left empty by unit removal, recording one event per trap.
fn prune_traps(body: &mut Body, ctx: &PassContext<'_>) -> bool {
    let pruned = body.prune_empty_traps();
    for trap in &pruned {
        ctx.record(EventKind::TrapRemoved)
            .message(format!("empty trap for {} dropped", trap.exception));
    }
    !pruned.is_empty()
}
