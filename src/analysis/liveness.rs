//! Backward liveness of locals.
//!
//! A local is live at a point if some path from that point reads it before
//! writing it. Handlers are reached before the protected unit's own effect
//! takes place, so whatever is live at a handler is live on entry to every
//! unit that may throw into it, even if that unit redefines the local.

use std::collections::{HashSet, VecDeque};

use crate::{
    analysis::UnitGraph,
    ir::{Body, LocalId},
};

/// Live-in and live-out sets per unit position.
#[derive(Debug, Clone)]
pub struct Liveness {
    live_in: Vec<HashSet<LocalId>>,
    live_out: Vec<HashSet<LocalId>>,
}

impl Liveness {
    /// Computes liveness for the current state of `body`.
    #[must_use]
    pub fn compute(body: &Body) -> Self {
        let graph = UnitGraph::from_body(body);
        Self::with_graph(body, &graph)
    }

    /// Computes liveness over a graph already built for `body`.
    #[must_use]
    pub fn with_graph(body: &Body, graph: &UnitGraph) -> Self {
        let count = graph.len();
        let uses: Vec<Vec<LocalId>> = body.stmts().map(|stmt| stmt.uses()).collect();
        let defs: Vec<Option<LocalId>> = body.stmts().map(|stmt| stmt.def()).collect();

        let mut live_in = vec![HashSet::new(); count];
        let mut live_out = vec![HashSet::new(); count];
        let mut worklist: VecDeque<usize> = (0..count).rev().collect();
        let mut queued = vec![true; count];

        while let Some(pos) = worklist.pop_front() {
            queued[pos] = false;

            let mut normal_out: HashSet<LocalId> = HashSet::new();
            for &succ in graph.succs(pos) {
                normal_out.extend(live_in[succ].iter().copied());
            }
            let mut handler_in: HashSet<LocalId> = HashSet::new();
            for &handler in graph.exceptional_succs(pos) {
                handler_in.extend(live_in[handler].iter().copied());
            }

            let mut entry: HashSet<LocalId> = normal_out
                .iter()
                .copied()
                .filter(|local| Some(*local) != defs[pos])
                .collect();
            entry.extend(uses[pos].iter().copied());
            entry.extend(handler_in.iter().copied());

            let mut exit = normal_out;
            exit.extend(handler_in);

            live_out[pos] = exit;
            if entry != live_in[pos] {
                live_in[pos] = entry;
                for &pred in graph.preds(pos).iter().chain(graph.exceptional_preds(pos)) {
                    if !queued[pred] {
                        queued[pred] = true;
                        worklist.push_back(pred);
                    }
                }
            }
        }

        Self { live_in, live_out }
    }

    /// Locals live on entry to the unit at `pos`.
    #[must_use]
    pub fn live_in(&self, pos: usize) -> &HashSet<LocalId> {
        &self.live_in[pos]
    }

    /// Locals live right after the unit at `pos` completes (or throws).
    #[must_use]
    pub fn live_out(&self, pos: usize) -> &HashSet<LocalId> {
        &self.live_out[pos]
    }

    /// Number of positions covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_in.len()
    }

    /// Whether the body had no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_in.is_empty()
    }
}
