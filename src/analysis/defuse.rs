//! Reaching definitions and def-use chains over a TAC body.
//!
//! [`DefUseIndex`] answers the questions the cleanup passes ask:
//!
//! - **Reaching definitions**: which definitions of `x` may reach the unit at
//!   position `p`?
//! - **Uses of a definition**: which units may read the value a definition
//!   writes?
//! - **Definitions of a local**: where is `x` written at all?
//!
//! # Usage
//!
//! ```rust
//! use tacnorm::{
//!     analysis::DefUseIndex,
//!     ir::{Body, LocalGenerator, Stmt, TacType, Value},
//! };
//!
//! let mut locals = LocalGenerator::new();
//! let x = locals.named("x", TacType::Int);
//! let xid = x.id;
//! let mut body = Body::new();
//! body.add_local(x);
//! body.push(Stmt::assign(xid, Value::int(1)));
//! body.push(Stmt::Return(Some(Value::Local(xid))));
//!
//! let index = DefUseIndex::build(&body);
//! assert_eq!(index.reaching_defs(xid, 1), vec![0]);
//! assert_eq!(index.uses_of(0), &[1]);
//! ```
//!
//! The index is a snapshot keyed by unit position. It is never cached across
//! mutations; passes rebuild it whenever they need fresh facts.
//!
//! Along an exceptional edge the protected unit may or may not have completed
//! its definition, so a handler sees the definitions reaching the unit *and*
//! those leaving it.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::{
    analysis::UnitGraph,
    ir::{Body, LocalId},
};

/// Def-use facts for one body snapshot.
#[derive(Debug, Clone)]
pub struct DefUseIndex {
    graph: UnitGraph,
    /// Local defined at each position.
    defined: Vec<Option<LocalId>>,
    /// Definition positions reaching the entry of each position.
    reaching_in: Vec<BTreeSet<usize>>,
    /// Positions reading the value written at a definition position.
    uses: HashMap<usize, Vec<usize>>,
    /// Definition positions per local.
    defs: HashMap<LocalId, Vec<usize>>,
    /// Positions syntactically reading each local.
    reads: HashMap<LocalId, Vec<usize>>,
    /// Locals that may still be unassigned on entry to each position.
    undefined_in: Vec<HashSet<LocalId>>,
}

impl DefUseIndex {
    /// Computes reaching definitions and def-use chains for `body`.
    #[must_use]
    pub fn build(body: &Body) -> Self {
        let graph = UnitGraph::from_body(body);
        let count = graph.len();

        let defined: Vec<Option<LocalId>> = body.stmts().map(|stmt| stmt.def()).collect();
        let mut defs: HashMap<LocalId, Vec<usize>> = HashMap::new();
        for (pos, def) in defined.iter().enumerate() {
            if let Some(local) = def {
                defs.entry(*local).or_default().push(pos);
            }
        }

        let mut reaching_in = vec![BTreeSet::new(); count];
        let mut reaching_out = vec![BTreeSet::new(); count];
        let mut worklist: VecDeque<usize> = (0..count).collect();
        let mut queued = vec![true; count];

        while let Some(pos) = worklist.pop_front() {
            queued[pos] = false;

            let mut entry = BTreeSet::new();
            for &pred in graph.preds(pos) {
                entry.extend(reaching_out[pred].iter().copied());
            }
            for &pred in graph.exceptional_preds(pos) {
                entry.extend(reaching_in[pred].iter().copied());
                entry.extend(reaching_out[pred].iter().copied());
            }

            let exit: BTreeSet<usize> = match defined[pos] {
                Some(local) => entry
                    .iter()
                    .copied()
                    .filter(|&def| defined[def] != Some(local))
                    .chain(Some(pos))
                    .collect(),
                None => entry.clone(),
            };

            let in_changed = entry != reaching_in[pos];
            let out_changed = exit != reaching_out[pos];
            reaching_in[pos] = entry;
            reaching_out[pos] = exit;

            if out_changed || in_changed {
                for &succ in graph.succs(pos).iter().chain(graph.exceptional_succs(pos)) {
                    if !queued[succ] {
                        queued[succ] = true;
                        worklist.push_back(succ);
                    }
                }
            }
        }

        let undefined_in = Self::undefined_locals(body, &graph, &defined);

        let mut uses: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut reads: HashMap<LocalId, Vec<usize>> = HashMap::new();
        for (pos, stmt) in body.stmts().enumerate() {
            let mut read = stmt.uses();
            read.sort_unstable();
            read.dedup();
            for local in read {
                reads.entry(local).or_default().push(pos);
                for &def in &reaching_in[pos] {
                    if defined[def] == Some(local) {
                        uses.entry(def).or_default().push(pos);
                    }
                }
            }
        }

        Self {
            graph,
            defined,
            reaching_in,
            uses,
            defs,
            reads,
            undefined_in,
        }
    }

    /// Forward "maybe unassigned" analysis. Every local starts unassigned at
    /// the entry; a definition assigns it on the normal path only.
    fn undefined_locals(
        body: &Body,
        graph: &UnitGraph,
        defined: &[Option<LocalId>],
    ) -> Vec<HashSet<LocalId>> {
        let count = graph.len();
        let all: HashSet<LocalId> = body.stmts().flat_map(|stmt| stmt.locals()).collect();

        let mut undefined_in = vec![HashSet::new(); count];
        let mut worklist: VecDeque<usize> = (0..count).collect();
        let mut queued = vec![true; count];

        while let Some(pos) = worklist.pop_front() {
            queued[pos] = false;

            let mut entry = if pos == 0 { all.clone() } else { HashSet::new() };
            for &pred in graph.preds(pos) {
                entry.extend(
                    undefined_in[pred]
                        .iter()
                        .copied()
                        .filter(|&local| defined[pred] != Some(local)),
                );
            }
            for &pred in graph.exceptional_preds(pos) {
                entry.extend(undefined_in[pred].iter().copied());
            }

            if entry != undefined_in[pos] {
                undefined_in[pos] = entry;
                for &succ in graph.succs(pos).iter().chain(graph.exceptional_succs(pos)) {
                    if !queued[succ] {
                        queued[succ] = true;
                        worklist.push_back(succ);
                    }
                }
            }
        }

        undefined_in
    }

    /// The control flow graph the facts were computed on.
    #[must_use]
    pub fn graph(&self) -> &UnitGraph {
        &self.graph
    }

    /// Definitions of `local` that may reach position `pos`, in ascending
    /// position order.
    #[must_use]
    pub fn reaching_defs(&self, local: LocalId, pos: usize) -> Vec<usize> {
        self.reaching_in
            .get(pos)
            .map(|set| {
                set.iter()
                    .copied()
                    .filter(|&def| self.defined[def] == Some(local))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Positions that may read the value defined at `def_pos`.
    #[must_use]
    pub fn uses_of(&self, def_pos: usize) -> &[usize] {
        self.uses.get(&def_pos).map_or(&[][..], Vec::as_slice)
    }

    /// Whether the value defined at `def_pos` is never read.
    #[must_use]
    pub fn is_unused(&self, def_pos: usize) -> bool {
        self.uses_of(def_pos).is_empty()
    }

    /// Every position that defines `local`.
    #[must_use]
    pub fn defs_of(&self, local: LocalId) -> &[usize] {
        self.defs.get(&local).map_or(&[][..], Vec::as_slice)
    }

    /// Whether some path from the entry reaches `pos` without assigning
    /// `local`.
    #[must_use]
    pub fn may_be_undefined(&self, local: LocalId, pos: usize) -> bool {
        self.undefined_in
            .get(pos)
            .is_some_and(|set| set.contains(&local))
    }

    /// Every position whose statement reads `local`, regardless of which
    /// definition reaches it.
    #[must_use]
    pub fn reads_of(&self, local: LocalId) -> &[usize] {
        self.reads.get(&local).map_or(&[][..], Vec::as_slice)
    }
}
