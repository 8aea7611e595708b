//! Copy and constant propagation.
//!
//! ```text
//! x = 5                x = 5
//! y = x + 1      →     y = 5 + 1
//! z = y                z = y
//! return z             return y
//! ```
//!
//! A use of `x` is rewritten when exactly one definition of `x` reaches it,
//! that definition is a plain copy `x = v`, and no path reaches the use with
//! `x` still unassigned. For a local source `v = y`, `y` must also carry the
//! same definitions at the use as at the copy, so the value has not changed
//! in between.
//!
//! Constants are never substituted into a receiver or a field/array base.
//! All replacements of one run come from the same def-use snapshot; the copy
//! itself is left for dead assignment elimination.

use crate::{
    analysis::DefUseIndex,
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, Expr, LocalId, Place, Stmt, Value},
    Result,
};

/// Replaces uses of copies and constant loads by their source.
pub struct CopyPropagationPass;

impl Default for CopyPropagationPass {
    fn default() -> Self {
        Self::new()
    }
}

/// A single planned rewrite: at `pos`, read `source` instead of `local`.
#[derive(Debug)]
struct Replacement {
    pos: usize,
    local: LocalId,
    source: Value,
}

impl CopyPropagationPass {
    /// Creates a new copy propagation pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Locals the statement dereferences (receivers, field and array bases).
    fn bases(stmt: &Stmt) -> Vec<LocalId> {
        let mut bases = Vec::new();
        let mut add = |value: Option<&Value>| {
            if let Some(Value::Local(id)) = value {
                bases.push(*id);
            }
        };
        match stmt {
            Stmt::Assign { place, expr } => {
                match place {
                    Place::Field { base, .. } => add(base.as_ref()),
                    Place::ArrayElement { base, .. } => add(Some(base)),
                    Place::Local(_) => {}
                }
                match expr {
                    Expr::Field { base, .. } => add(base.as_ref()),
                    Expr::ArrayElement { base, .. } => add(Some(base)),
                    Expr::Length { array } => add(Some(array)),
                    Expr::Invoke(invoke) => add(invoke.base.as_ref()),
                    _ => {}
                }
            }
            Stmt::Invoke(invoke) => add(invoke.base.as_ref()),
            _ => {}
        }
        bases
    }

    /// The value a use of `local` at `pos` can be replaced by, if any.
    fn source_for(
        body: &Body,
        index: &DefUseIndex,
        local: LocalId,
        pos: usize,
    ) -> Option<Value> {
        if index.may_be_undefined(local, pos) {
            return None;
        }
        let defs = index.reaching_defs(local, pos);
        let &[def] = defs.as_slice() else {
            return None;
        };
        let Some(Stmt::Assign {
            expr: Expr::Value(source),
            ..
        }) = body.unit_at(def).map(|unit| &unit.stmt)
        else {
            return None;
        };

        match source {
            Value::Const(_) => Some(source.clone()),
            Value::Local(origin) if *origin != local => {
                let stable = !index.may_be_undefined(*origin, pos)
                    && index.reaching_defs(*origin, pos) == index.reaching_defs(*origin, def);
                stable.then(|| source.clone())
            }
            Value::Local(_) => None,
        }
    }

    fn plan(body: &Body) -> Vec<Replacement> {
        let index = DefUseIndex::build(body);
        let mut plan = Vec::new();

        for (pos, stmt) in body.stmts().enumerate() {
            let mut used = stmt.uses();
            used.sort_unstable();
            used.dedup();
            let bases = Self::bases(stmt);

            for local in used {
                let Some(source) = Self::source_for(body, &index, local, pos) else {
                    continue;
                };
                if matches!(source, Value::Const(_)) && bases.contains(&local) {
                    continue;
                }
                plan.push(Replacement { pos, local, source });
            }
        }

        plan
    }
}

impl BodyPass for CopyPropagationPass {
    fn name(&self) -> &'static str {
        "copy-propagation"
    }

    fn description(&self) -> &'static str {
        "Replaces uses of copies and constant loads by their source value"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let plan = Self::plan(body);

        for replacement in &plan {
            let Some(stmt) = body.stmt_at_mut(replacement.pos) else {
                return Err(invariant_error!(
                    "copy propagation lost unit at {}",
                    replacement.pos
                ));
            };
            for value in stmt.values_mut() {
                if *value == Value::Local(replacement.local) {
                    *value = replacement.source.clone();
                }
            }
            ctx.record(EventKind::CopyPropagated)
                .location(replacement.pos)
                .message(format!("use of {} replaced by its source", replacement.local));
        }

        Ok(!plan.is_empty())
    }
}
