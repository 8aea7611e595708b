//! Local packing.
//!
//! Front ends tend to introduce one temporary per stack slot per
//! instruction. Two locals of the same type whose live ranges never overlap
//! can share a single local; this pass rewrites every reference of the
//! second to the first, leaving the orphaned local for
//! [`UnusedLocalPass`](super::UnusedLocalPass) to drop.
//!
//! Two locals interfere when one is defined at a point where the other is
//! live afterwards, or when both may be live on entry. Locals bound by an
//! identity statement (receiver, parameters, caught exception) are never
//! packed, so bindings keep their own names.

use std::collections::{HashMap, HashSet};

use crate::{
    analysis::Liveness,
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, LocalId, Stmt, TacType},
    Result,
};

/// Coalesces non-interfering locals of the same type.
pub struct LocalPackingPass;

impl Default for LocalPackingPass {
    fn default() -> Self {
        Self::new()
    }
}

/// Locals sharing one representative.
struct Group {
    representative: LocalId,
    ty: TacType,
    members: Vec<LocalId>,
}

impl LocalPackingPass {
    /// Creates a new local packing pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn interference(body: &Body) -> HashMap<LocalId, HashSet<LocalId>> {
        let liveness = Liveness::compute(body);
        let mut edges: HashMap<LocalId, HashSet<LocalId>> = HashMap::new();
        let mut connect = |a: LocalId, b: LocalId| {
            if a != b {
                edges.entry(a).or_default().insert(b);
                edges.entry(b).or_default().insert(a);
            }
        };

        for (pos, stmt) in body.stmts().enumerate() {
            if let Some(def) = stmt.def() {
                for &live in liveness.live_out(pos) {
                    connect(def, live);
                }
            }
        }

        if !liveness.is_empty() {
            let entry: Vec<LocalId> = liveness.live_in(0).iter().copied().collect();
            for (i, &a) in entry.iter().enumerate() {
                for &b in &entry[i + 1..] {
                    connect(a, b);
                }
            }
        }

        edges
    }

    /// Chooses a representative for every packable local.
    fn assign_groups(body: &Body) -> HashMap<LocalId, LocalId> {
        let bound: HashSet<LocalId> = body
            .stmts()
            .filter_map(|stmt| match stmt {
                Stmt::Identity { local, .. } => Some(*local),
                _ => None,
            })
            .collect();
        let mentioned: HashSet<LocalId> = body.stmts().flat_map(Stmt::locals).collect();
        let edges = Self::interference(body);
        let no_edges = HashSet::new();

        let mut groups: Vec<Group> = Vec::new();
        let mut mapping = HashMap::new();

        for local in body.locals() {
            if bound.contains(&local.id) || !mentioned.contains(&local.id) {
                continue;
            }
            let conflicts = edges.get(&local.id).unwrap_or(&no_edges);
            let joinable = groups.iter_mut().find(|group| {
                group.ty == local.ty
                    && group.members.iter().all(|member| !conflicts.contains(member))
            });
            match joinable {
                Some(group) => {
                    group.members.push(local.id);
                    mapping.insert(local.id, group.representative);
                }
                None => groups.push(Group {
                    representative: local.id,
                    ty: local.ty.clone(),
                    members: vec![local.id],
                }),
            }
        }

        mapping
    }
}

impl BodyPass for LocalPackingPass {
    fn name(&self) -> &'static str {
        "local-packing"
    }

    fn description(&self) -> &'static str {
        "Shares one local between same-typed locals with disjoint live ranges"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mapping = Self::assign_groups(body);
        if mapping.is_empty() {
            return Ok(false);
        }

        for pos in 0..body.len() {
            if let Some(stmt) = body.stmt_at_mut(pos) {
                stmt.map_locals(|id| mapping.get(&id).copied().unwrap_or(id));
            }
        }

        let mut packed: Vec<(&LocalId, &LocalId)> = mapping.iter().collect();
        packed.sort();
        for (from, into) in packed {
            ctx.record(EventKind::LocalsPacked)
                .message(format!("{from} packed into {into}"));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{IdentitySource, LocalGenerator, Value},
        test::run_pass,
    };

    #[test]
    fn test_disjoint_temporaries_share_a_local() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let t0 = generator.temp(TacType::Int);
        let t1 = generator.temp(TacType::Int);
        let (a, b) = (t0.id, t1.id);
        let mut body = Body::new();
        body.add_local(t0);
        body.add_local(t1);
        body.push(Stmt::assign(a, Value::int(1)));
        body.push(Stmt::Invoke(crate::test::call_with(vec![Value::Local(a)])));
        body.push(Stmt::assign(b, Value::int(2)));
        body.push(Stmt::Return(Some(Value::Local(b))));

        assert!(run_pass(&LocalPackingPass::new(), &mut body)?);
        assert_eq!(
            body.unit_at(3).map(|unit| &unit.stmt),
            Some(&Stmt::Return(Some(Value::Local(a))))
        );
        body.validate()
    }

    #[test]
    fn test_overlapping_or_differently_typed_locals_stay_apart() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Int);
        let y = generator.named("y", TacType::Int);
        let z = generator.named("z", TacType::Long);
        let (xid, yid, zid) = (x.id, y.id, z.id);
        let mut body = Body::new();
        body.add_local(x);
        body.add_local(y);
        body.add_local(z);
        body.push(Stmt::assign(xid, Value::int(1)));
        body.push(Stmt::assign(yid, Value::int(2)));
        body.push(Stmt::Invoke(crate::test::call_with(vec![
            Value::Local(xid),
            Value::Local(yid),
        ])));
        body.push(Stmt::assign(zid, Value::Const(crate::ir::Constant::Long(3))));
        body.push(Stmt::Return(Some(Value::Local(zid))));

        assert!(!run_pass(&LocalPackingPass::new(), &mut body)?);
        Ok(())
    }

    #[test]
    fn test_identity_bound_locals_are_never_packed() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let p = generator.named("p", TacType::Int);
        let t = generator.temp(TacType::Int);
        let (pid, tid) = (p.id, t.id);
        let mut body = Body::new();
        body.add_local(p);
        body.add_local(t);
        body.push(Stmt::Identity {
            local: pid,
            source: IdentitySource::Parameter(0),
        });
        body.push(Stmt::Invoke(crate::test::call_with(vec![Value::Local(pid)])));
        body.push(Stmt::assign(tid, Value::int(2)));
        body.push(Stmt::Return(Some(Value::Local(tid))));

        assert!(!run_pass(&LocalPackingPass::new(), &mut body)?);
        Ok(())
    }
}
