//! Unit-level control flow graph.
//!
//! Nodes are unit *positions* in the body at the time the graph is built.
//! The graph is a snapshot: any mutation of the body invalidates it, so
//! passes build a fresh graph each time they need one.
//!
//! # Edges
//!
//! - **Normal edges**: fall-through to the next unit and explicit branch
//!   targets.
//! - **Exceptional edges**: from every unit that may throw inside a trap
//!   range to that trap's handler. Dataflow clients must treat these edges as
//!   leaving *before* the unit's own effect, since a throwing unit does not
//!   complete.

use std::collections::VecDeque;

use crate::ir::{Body, UnitId};

/// Control flow graph over the units of a [`Body`].
#[derive(Debug, Clone)]
pub struct UnitGraph {
    ids: Vec<UnitId>,
    succs: Vec<Vec<usize>>,
    exceptional_succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    exceptional_preds: Vec<Vec<usize>>,
}

impl UnitGraph {
    /// Builds the graph for the current state of `body`.
    ///
    /// Branch targets or trap boundaries that do not resolve are skipped;
    /// [`Body::validate`] reports those.
    #[must_use]
    pub fn from_body(body: &Body) -> Self {
        let count = body.len();
        let positions = body.positions();
        let ids: Vec<UnitId> = body.units().iter().map(|unit| unit.id).collect();

        let mut succs = vec![Vec::new(); count];
        let mut exceptional_succs = vec![Vec::new(); count];

        for (pos, unit) in body.units().iter().enumerate() {
            let edges = &mut succs[pos];
            if unit.stmt.falls_through() && pos + 1 < count {
                edges.push(pos + 1);
            }
            for target in unit.stmt.targets() {
                if let Some(&target_pos) = positions.get(&target) {
                    if !edges.contains(&target_pos) {
                        edges.push(target_pos);
                    }
                }
            }
        }

        for trap in body.traps() {
            let (Some(&begin), Some(&end), Some(&handler)) = (
                positions.get(&trap.begin),
                positions.get(&trap.end),
                positions.get(&trap.handler),
            ) else {
                continue;
            };
            for pos in begin..end.min(count) {
                if body.units()[pos].stmt.may_throw() && !exceptional_succs[pos].contains(&handler)
                {
                    exceptional_succs[pos].push(handler);
                }
            }
        }

        let mut preds = vec![Vec::new(); count];
        let mut exceptional_preds = vec![Vec::new(); count];
        for pos in 0..count {
            for &succ in &succs[pos] {
                preds[succ].push(pos);
            }
            for &succ in &exceptional_succs[pos] {
                exceptional_preds[succ].push(pos);
            }
        }

        Self {
            ids,
            succs,
            exceptional_succs,
            preds,
            exceptional_preds,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The unit id at a node.
    #[must_use]
    pub fn unit_id(&self, pos: usize) -> UnitId {
        self.ids[pos]
    }

    /// Normal successors of a node.
    #[must_use]
    pub fn succs(&self, pos: usize) -> &[usize] {
        &self.succs[pos]
    }

    /// Exceptional successors (trap handlers) of a node.
    #[must_use]
    pub fn exceptional_succs(&self, pos: usize) -> &[usize] {
        &self.exceptional_succs[pos]
    }

    /// Normal predecessors of a node.
    #[must_use]
    pub fn preds(&self, pos: usize) -> &[usize] {
        &self.preds[pos]
    }

    /// Exceptional predecessors of a handler node.
    #[must_use]
    pub fn exceptional_preds(&self, pos: usize) -> &[usize] {
        &self.exceptional_preds[pos]
    }

    /// Nodes reachable from the entry through normal and exceptional edges.
    #[must_use]
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        if self.is_empty() {
            return seen;
        }
        let mut worklist = VecDeque::from([0]);
        seen[0] = true;
        while let Some(pos) = worklist.pop_front() {
            for &succ in self.succs[pos].iter().chain(&self.exceptional_succs[pos]) {
                if !seen[succ] {
                    seen[succ] = true;
                    worklist.push_back(succ);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{
        IdentitySource, InvokeExpr, InvokeKind, LocalGenerator, MethodRef, RelationalExpr,
        RelationalOp, Stmt, TacType, Trap, Value,
    };

    #[test]
    fn test_branch_edges() {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Int);
        let xid = x.id;
        let mut body = Body::new();
        body.add_local(x);
        let u0 = body.push(Stmt::Identity {
            local: xid,
            source: IdentitySource::Parameter(0),
        });
        let u1 = body.push(Stmt::Nop);
        let _u2 = body.push(Stmt::Return(None));
        let u3 = body.push(Stmt::Return(Some(Value::Local(xid))));
        *body.stmt_mut(u1).unwrap() = Stmt::If {
            condition: RelationalExpr::new(RelationalOp::Eq, xid, Value::int(0)),
            target: u3,
        };
        let graph = UnitGraph::from_body(&body);
        assert_eq!(graph.unit_id(0), u0);
        assert_eq!(graph.succs(1), &[2, 3]);
        assert!(graph.succs(2).is_empty());
        assert_eq!(graph.preds(3), &[1]);
        assert!(graph.reachable().iter().all(|r| *r));
    }

    #[test]
    fn test_exceptional_edges_only_for_throwing_units() {
        let mut generator = LocalGenerator::new();
        let e = generator.named("e", TacType::class("System.Exception"));
        let eid = e.id;
        let mut body = Body::new();
        body.add_local(e);
        let begin = body.push(Stmt::Nop);
        body.push(Stmt::Invoke(InvokeExpr {
            kind: InvokeKind::Static,
            method: MethodRef::new("A", "f", vec![], TacType::Void),
            base: None,
            args: vec![],
        }));
        let end = body.push(Stmt::Return(None));
        let handler = body.push(Stmt::Identity {
            local: eid,
            source: IdentitySource::CaughtException,
        });
        body.push(Stmt::Throw(Value::Local(eid)));
        body.add_trap(Trap::new(begin, end, handler, TacType::class("System.Exception")));

        let graph = UnitGraph::from_body(&body);
        assert!(graph.exceptional_succs(0).is_empty());
        assert_eq!(graph.exceptional_succs(1), &[3]);
        assert_eq!(graph.exceptional_preds(3), &[1]);
        assert!(graph.reachable()[3]);
    }

    #[test]
    fn test_unreachable_after_return() {
        let mut body = Body::new();
        body.push(Stmt::Return(None));
        body.push(Stmt::Nop);
        let graph = UnitGraph::from_body(&body);
        assert_eq!(graph.reachable(), vec![true, false]);
    }
}
