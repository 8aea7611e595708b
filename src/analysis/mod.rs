//! Dataflow analyses over TAC bodies.
//!
//! Everything here works on a snapshot of a [`Body`](crate::ir::Body) keyed by
//! unit position. Nothing is cached between mutations: a pass that changes
//! the body and needs fresh facts builds the analysis again.
//!
//! - [`UnitGraph`] - control flow between units, with exceptional edges
//! - [`DefUseIndex`] - reaching definitions and def-use chains
//! - [`Liveness`] - live locals before and after every unit

mod cfg;
mod defuse;
mod liveness;

pub use cfg::UnitGraph;
pub use defuse::DefUseIndex;
pub use liveness::Liveness;
