//! Trap region cleanup.
//!
//! Trap order matters: for a unit covered by several traps catching
//! compatible exceptions, the earlier trap wins. Merging two traps is
//! therefore only allowed when no trap listed between them covers any unit
//! of the merged range.

use std::collections::HashMap;

use crate::{
    compiler::{passes::prune_traps, BodyPass, EventKind, PassContext},
    ir::{Body, Trap, UnitId},
    Result,
};

/// Shrinks every trap to the span between its first and last throwing unit.
pub struct TrapTighteningPass;

impl Default for TrapTighteningPass {
    fn default() -> Self {
        Self::new()
    }
}

impl TrapTighteningPass {
    /// Creates a new trap tightening pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for TrapTighteningPass {
    fn name(&self) -> &'static str {
        "trap-tightening"
    }

    fn description(&self) -> &'static str {
        "Shrinks trap ranges to the units that may actually throw"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = false;
        let mut tightened = Vec::with_capacity(body.traps().len());

        for trap in body.traps() {
            let (begin, end) = body.trap_range(trap).ok_or_else(|| {
                invariant_error!("trap [{}, {}) refers to a missing unit", trap.begin, trap.end)
            })?;

            let throwing: Vec<usize> = (begin..end)
                .filter(|&pos| body.unit_at(pos).is_some_and(|unit| unit.stmt.may_throw()))
                .collect();

            let (Some(&first), Some(&last)) = (throwing.first(), throwing.last()) else {
                ctx.record(EventKind::TrapRemoved)
                    .location(begin)
                    .message(format!("trap for {} protects nothing that throws", trap.exception));
                changed = true;
                continue;
            };

            let new_begin = body.unit_at(first).map_or(trap.begin, |unit| unit.id);
            let new_end = body.unit_at(last + 1).map_or(trap.end, |unit| unit.id);
            if new_begin != trap.begin || new_end != trap.end {
                ctx.record(EventKind::TrapTightened)
                    .location(first)
                    .message(format!(
                        "trap for {} narrowed from [{}, {}) to [{new_begin}, {new_end})",
                        trap.exception, trap.begin, trap.end
                    ));
                changed = true;
            }
            tightened.push(Trap {
                begin: new_begin,
                end: new_end,
                ..trap.clone()
            });
        }

        *body.traps_mut() = tightened;
        Ok(changed)
    }
}

/// Drops empty and duplicate traps and merges adjacent traps sharing a
/// handler.
pub struct TrapMinimizationPass;

impl Default for TrapMinimizationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl TrapMinimizationPass {
    /// Creates a new trap minimization pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn range(positions: &HashMap<UnitId, usize>, trap: &Trap) -> Option<(usize, usize)> {
        Some((*positions.get(&trap.begin)?, *positions.get(&trap.end)?))
    }

    fn remove_duplicates(body: &mut Body, ctx: &PassContext<'_>) -> bool {
        let mut unique: Vec<Trap> = Vec::with_capacity(body.traps().len());
        let mut changed = false;
        for trap in body.traps_mut().drain(..) {
            if unique.contains(&trap) {
                ctx.record(EventKind::TrapRemoved)
                    .message(format!("duplicate trap for {} dropped", trap.exception));
                changed = true;
            } else {
                unique.push(trap);
            }
        }
        *body.traps_mut() = unique;
        changed
    }

    /// Finds one pair of traps that can be merged and the merged range.
    fn find_merge(body: &Body) -> Option<(usize, usize, UnitId, UnitId)> {
        let positions = body.positions();
        let traps = body.traps();

        for (i, first) in traps.iter().enumerate() {
            let Some((b1, e1)) = Self::range(&positions, first) else {
                continue;
            };
            for (j, second) in traps.iter().enumerate().skip(i + 1) {
                if first.handler != second.handler || first.exception != second.exception {
                    continue;
                }
                let Some((b2, e2)) = Self::range(&positions, second) else {
                    continue;
                };
                if b1 > e2 || b2 > e1 {
                    continue;
                }

                let (begin, end) = (b1.min(b2), e1.max(e2));
                let shadowed = traps[i + 1..j].iter().any(|between| {
                    Self::range(&positions, between).map_or(true, |(b, e)| b < end && begin < e)
                });
                if shadowed {
                    continue;
                }

                let begin_id = if b1 <= b2 { first.begin } else { second.begin };
                let end_id = if e1 >= e2 { first.end } else { second.end };
                return Some((i, j, begin_id, end_id));
            }
        }
        None
    }
}

impl BodyPass for TrapMinimizationPass {
    fn name(&self) -> &'static str {
        "trap-minimization"
    }

    fn description(&self) -> &'static str {
        "Removes empty and duplicate traps and merges overlapping ones"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut changed = prune_traps(body, ctx);
        changed |= Self::remove_duplicates(body, ctx);

        while let Some((i, j, begin, end)) = Self::find_merge(body) {
            let traps = body.traps_mut();
            let merged = traps.remove(j);
            if let Some(kept) = traps.get_mut(i) {
                kept.begin = begin;
                kept.end = end;
            }
            ctx.record(EventKind::TrapRemoved)
                .message(format!("trap for {} merged into a neighbour", merged.exception));
            changed = true;
        }

        Ok(changed)
    }
}
