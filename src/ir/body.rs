//! Method bodies: the unit sequence, the local table and trap regions.
//!
//! [`Body`] owns its units exclusively. Mutation goes through methods that keep
//! references consistent: removing a unit redirects every jump and trap
//! boundary that pointed at it to its successor, and replacing a unit hands
//! those references to the first replacement. This mirrors a patching chain;
//! passes never have to fix up targets by hand.

use std::collections::{HashMap, HashSet};

use crate::{
    ir::{Local, LocalId, Stmt, TacType, Unit, UnitId},
    Result,
};

/// An exception-protection region.
///
/// Units from `begin` (inclusive) up to `end` (exclusive) are protected;
/// exceptions of type `exception` raised there transfer control to `handler`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trap {
    /// First protected unit.
    pub begin: UnitId,
    /// First unit after the protected range.
    pub end: UnitId,
    /// First unit of the handler.
    pub handler: UnitId,
    /// Exception type caught.
    pub exception: TacType,
}

impl Trap {
    /// Creates a new trap.
    #[must_use]
    pub fn new(begin: UnitId, end: UnitId, handler: UnitId, exception: TacType) -> Self {
        Self {
            begin,
            end,
            handler,
            exception,
        }
    }

    fn unit_refs_mut(&mut self) -> [&mut UnitId; 3] {
        [&mut self.begin, &mut self.end, &mut self.handler]
    }
}

/// A TAC method body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    locals: Vec<Local>,
    units: Vec<Unit>,
    traps: Vec<Trap>,
    next_unit: u32,
}

impl Body {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Locals
    // ------------------------------------------------------------------

    /// The local table, in declaration order.
    #[must_use]
    pub fn locals(&self) -> &[Local] {
        &self.locals
    }

    /// Mutable access to the local table.
    pub fn locals_mut(&mut self) -> &mut Vec<Local> {
        &mut self.locals
    }

    /// Looks a local up by identity.
    #[must_use]
    pub fn local(&self, id: LocalId) -> Option<&Local> {
        self.locals.iter().find(|local| local.id == id)
    }

    /// The static type of a local.
    #[must_use]
    pub fn local_type(&self, id: LocalId) -> Option<&TacType> {
        self.local(id).map(|local| &local.ty)
    }

    /// Whether a local with this identity is declared.
    #[must_use]
    pub fn has_local(&self, id: LocalId) -> bool {
        self.locals.iter().any(|local| local.id == id)
    }

    /// Declares a local unless one with the same identity already exists.
    ///
    /// Returns `true` if the local was added.
    pub fn add_local(&mut self, local: Local) -> bool {
        if self.has_local(local.id) {
            return false;
        }
        self.locals.push(local);
        true
    }

    /// Lookup table from local id to type, for passes that query many types.
    #[must_use]
    pub fn local_types(&self) -> HashMap<LocalId, TacType> {
        self.locals
            .iter()
            .map(|local| (local.id, local.ty.clone()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------

    /// The unit sequence.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the body has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterates over the statements in order.
    pub fn stmts(&self) -> impl Iterator<Item = &Stmt> {
        self.units.iter().map(|unit| &unit.stmt)
    }

    /// Exclusive upper bound of the unit ids handed out so far.
    #[must_use]
    pub fn unit_id_bound(&self) -> u32 {
        self.next_unit
    }

    fn fresh_unit_id(&mut self) -> UnitId {
        let id = UnitId::new(self.next_unit);
        self.next_unit += 1;
        id
    }

    /// Appends a statement and returns its unit id.
    pub fn push(&mut self, stmt: Stmt) -> UnitId {
        let id = self.fresh_unit_id();
        self.units.push(Unit { id, stmt });
        id
    }

    /// Appends already-identified units (used when merging fragments).
    ///
    /// # Errors
    ///
    /// Returns an invariant error if a unit id is already present.
    pub fn append_units(&mut self, units: impl IntoIterator<Item = Unit>) -> Result<()> {
        let mut present: HashSet<UnitId> = self.units.iter().map(|unit| unit.id).collect();
        for unit in units {
            if !present.insert(unit.id) {
                return Err(invariant_error!("unit {} appended twice", unit.id));
            }
            self.next_unit = self.next_unit.max(unit.id.index() + 1);
            self.units.push(unit);
        }
        Ok(())
    }

    /// Position of a unit in the sequence.
    #[must_use]
    pub fn position(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id == id)
    }

    /// Lookup table from unit id to position.
    #[must_use]
    pub fn positions(&self) -> HashMap<UnitId, usize> {
        self.units
            .iter()
            .enumerate()
            .map(|(pos, unit)| (unit.id, pos))
            .collect()
    }

    /// The statement of a unit.
    #[must_use]
    pub fn stmt(&self, id: UnitId) -> Option<&Stmt> {
        self.units
            .iter()
            .find(|unit| unit.id == id)
            .map(|unit| &unit.stmt)
    }

    /// The statement of a unit, mutably.
    pub fn stmt_mut(&mut self, id: UnitId) -> Option<&mut Stmt> {
        self.units
            .iter_mut()
            .find(|unit| unit.id == id)
            .map(|unit| &mut unit.stmt)
    }

    /// The unit at a position.
    #[must_use]
    pub fn unit_at(&self, pos: usize) -> Option<&Unit> {
        self.units.get(pos)
    }

    /// The statement at a position, mutably.
    pub fn stmt_at_mut(&mut self, pos: usize) -> Option<&mut Stmt> {
        self.units.get_mut(pos).map(|unit| &mut unit.stmt)
    }

    /// The unit following `id` in sequence.
    #[must_use]
    pub fn successor(&self, id: UnitId) -> Option<UnitId> {
        let pos = self.position(id)?;
        self.units.get(pos + 1).map(|unit| unit.id)
    }

    /// The first unit.
    #[must_use]
    pub fn first(&self) -> Option<UnitId> {
        self.units.first().map(|unit| unit.id)
    }

    // ------------------------------------------------------------------
    // Traps
    // ------------------------------------------------------------------

    /// The trap list.
    #[must_use]
    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    /// Mutable access to the trap list.
    pub fn traps_mut(&mut self) -> &mut Vec<Trap> {
        &mut self.traps
    }

    /// Adds a trap region.
    pub fn add_trap(&mut self, trap: Trap) {
        self.traps.push(trap);
    }

    /// Positions `[begin, end)` covered by a trap, if both boundaries exist.
    #[must_use]
    pub fn trap_range(&self, trap: &Trap) -> Option<(usize, usize)> {
        Some((self.position(trap.begin)?, self.position(trap.end)?))
    }

    /// Drops traps whose range became empty after units were removed and
    /// returns them.
    pub fn prune_empty_traps(&mut self) -> Vec<Trap> {
        let positions = self.positions();
        let is_empty = |trap: &Trap| match (positions.get(&trap.begin), positions.get(&trap.end)) {
            (Some(begin), Some(end)) => begin >= end,
            _ => false,
        };
        let (empty, kept): (Vec<Trap>, Vec<Trap>) = self.traps.drain(..).partition(is_empty);
        self.traps = kept;
        empty
    }

    // ------------------------------------------------------------------
    // Reference-preserving mutation
    // ------------------------------------------------------------------

    /// Whether any branch target or trap boundary refers to `id`.
    #[must_use]
    pub fn is_referenced(&self, id: UnitId) -> bool {
        self.is_branch_target(id)
            || self
                .traps
                .iter()
                .any(|trap| trap.begin == id || trap.end == id || trap.handler == id)
    }

    /// Whether any branch jumps to `id`.
    #[must_use]
    pub fn is_branch_target(&self, id: UnitId) -> bool {
        self.stmts().any(|stmt| stmt.targets().contains(&id))
    }

    /// Whether `id` starts a trap handler.
    #[must_use]
    pub fn is_handler(&self, id: UnitId) -> bool {
        self.traps.iter().any(|trap| trap.handler == id)
    }

    /// Points every branch target and trap boundary referring to `from` at `to`.
    pub fn redirect(&mut self, from: UnitId, to: UnitId) {
        if from == to {
            return;
        }
        for unit in &mut self.units {
            for target in unit.stmt.targets_mut() {
                if *target == from {
                    *target = to;
                }
            }
        }
        for trap in &mut self.traps {
            for boundary in trap.unit_refs_mut() {
                if *boundary == from {
                    *boundary = to;
                }
            }
        }
    }

    /// Whether [`remove`](Self::remove) would succeed for this unit.
    #[must_use]
    pub fn can_remove(&self, id: UnitId) -> bool {
        self.successor(id).is_some() || !self.is_referenced(id)
    }

    /// Removes a unit, redirecting references to its successor.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the unit does not exist, or if it is the
    /// last unit and something still refers to it.
    pub fn remove(&mut self, id: UnitId) -> Result<Stmt> {
        let pos = self
            .position(id)
            .ok_or_else(|| invariant_error!("cannot remove missing unit {}", id))?;
        match self.units.get(pos + 1).map(|unit| unit.id) {
            Some(next) => self.redirect(id, next),
            None if self.is_referenced(id) => {
                return Err(invariant_error!(
                    "cannot remove trailing unit {} while it is referenced",
                    id
                ));
            }
            None => {}
        }
        Ok(self.units.remove(pos).stmt)
    }

    /// Replaces a unit by a sequence of statements.
    ///
    /// Every reference to the old unit is handed to the first replacement.
    /// Branch targets *inside* `stmts` may refer to each other through the
    /// returned ids only after insertion, so callers needing intra-sequence
    /// jumps patch them via [`stmt_mut`](Self::stmt_mut).
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the unit does not exist or `stmts` is
    /// empty.
    pub fn replace(&mut self, id: UnitId, stmts: Vec<Stmt>) -> Result<Vec<UnitId>> {
        if stmts.is_empty() {
            return Err(invariant_error!("unit {} replaced by nothing", id));
        }
        let pos = self
            .position(id)
            .ok_or_else(|| invariant_error!("cannot replace missing unit {}", id))?;

        let new_units: Vec<Unit> = stmts
            .into_iter()
            .map(|stmt| Unit {
                id: self.fresh_unit_id(),
                stmt,
            })
            .collect();
        let ids: Vec<UnitId> = new_units.iter().map(|unit| unit.id).collect();

        self.units.splice(pos..=pos, new_units);
        self.redirect(id, ids[0]);
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    /// Checks the structural invariants of the body.
    ///
    /// - the body has at least one unit and unit ids are unique
    /// - every branch target, trap boundary and handler exists
    /// - every trap begins before it ends
    /// - every local a unit mentions is declared
    ///
    /// # Errors
    ///
    /// Returns an invariant error describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.units.is_empty() {
            return Err(invariant_error!("body has no units"));
        }

        let positions = self.positions();
        if positions.len() != self.units.len() {
            return Err(invariant_error!("duplicate unit ids in body"));
        }

        let declared: HashSet<LocalId> = self.locals.iter().map(|local| local.id).collect();
        for unit in &self.units {
            for target in unit.stmt.targets() {
                if !positions.contains_key(&target) {
                    return Err(invariant_error!(
                        "unit {} jumps to missing unit {}",
                        unit.id,
                        target
                    ));
                }
            }
            for local in unit.stmt.locals() {
                if !declared.contains(&local) {
                    return Err(invariant_error!(
                        "unit {} uses undeclared local {}",
                        unit.id,
                        local
                    ));
                }
            }
        }

        for trap in &self.traps {
            let boundary = |id: UnitId| {
                positions.get(&id).copied().ok_or_else(|| {
                    invariant_error!("trap refers to missing unit {}", id)
                })
            };
            let begin = boundary(trap.begin)?;
            let end = boundary(trap.end)?;
            boundary(trap.handler)?;
            if begin >= end {
                return Err(invariant_error!(
                    "trap [{}, {}) is empty or inverted",
                    trap.begin,
                    trap.end
                ));
            }
        }

        Ok(())
    }
}
