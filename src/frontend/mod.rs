//! Boundary to the block-structured front end.
//!
//! The decoder that turns a foreign block/instruction tree into TAC lives
//! outside this crate. It is plugged in through the [`FrontEnd`] trait and
//! hands back a [`Fragment`]: raw units numbered from zero, the locals it
//! generated, its trap regions, and jumps whose targets are only known by
//! block label. The lowering driver merges the fragment into the method body
//! and resolves those labels afterwards.
//!
//! Names are resolved through a [`VariableScope`] that already holds the
//! receiver, the parameters and the declared variables, so the front end and
//! the bindings agree on identity.

use std::collections::HashMap;

use crate::{
    ir::{Local, LocalGenerator, LocalId, RelationalExpr, Stmt, TacType, Trap, Unit, UnitId},
    Result,
};

/// A variable declared by the method input, before any local exists for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    /// Source-level name.
    pub name: String,
    /// Static type.
    pub ty: TacType,
}

impl VariableDecl {
    /// Creates a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TacType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Local identities shared by the bindings and the front end of one method.
///
/// All locals of a method, declared or generated, come from the one
/// [`LocalGenerator`] inside the scope.
#[derive(Debug, Default)]
pub struct VariableScope {
    generator: LocalGenerator,
    declared: Vec<Local>,
    by_name: HashMap<String, LocalId>,
}

impl VariableScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a named local that the front end can later look up.
    ///
    /// A later declaration with the same name shadows the earlier one for
    /// lookups; both locals stay distinct.
    pub fn declare(&mut self, name: impl Into<String>, ty: TacType) -> Local {
        let local = self.generator.named(name, ty);
        self.by_name.insert(local.name.clone(), local.id);
        self.declared.push(local.clone());
        local
    }

    /// Creates a local private to the caller's fragment.
    pub fn fresh(&mut self, name: impl Into<String>, ty: TacType) -> Local {
        self.generator.named(name, ty)
    }

    /// Creates a compiler temporary private to the caller's fragment.
    pub fn temp(&mut self, ty: TacType) -> Local {
        self.generator.temp(ty)
    }

    /// Resolves a declared name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<LocalId> {
        self.by_name.get(name).copied()
    }

    /// Locals declared so far, in declaration order.
    #[must_use]
    pub fn declared(&self) -> &[Local] {
        &self.declared
    }
}

/// A jump whose target is a block label rather than a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpFixup {
    /// The `goto` or `if` unit to patch.
    pub unit: UnitId,
    /// Label of the block the unit jumps to.
    pub label: String,
}

/// Raw output of one front-end translation.
///
/// Unit ids are local to the fragment; merging rebases them.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// Locals the front end generated.
    pub locals: Vec<Local>,
    /// Units in emission order.
    pub units: Vec<Unit>,
    /// Trap regions over fragment units.
    pub traps: Vec<Trap>,
    /// First unit of every labelled block.
    pub labels: HashMap<String, UnitId>,
    /// Jumps resolved after the merge.
    pub jump_fixups: Vec<JumpFixup>,
}

impl Fragment {
    /// Whether the fragment emitted no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Incremental construction of a [`Fragment`].
///
/// # Examples
///
/// ```rust
/// use tacnorm::{frontend::FragmentBuilder, ir::{Stmt, Value}};
///
/// let mut builder = FragmentBuilder::new();
/// builder.goto_label("exit");
/// builder.label("exit");
/// builder.push(Stmt::Return(Some(Value::int(0))));
/// let fragment = builder.build()?;
/// assert_eq!(fragment.units.len(), 2);
/// assert_eq!(fragment.jump_fixups.len(), 1);
/// # Ok::<(), tacnorm::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct FragmentBuilder {
    fragment: Fragment,
    pending_labels: Vec<String>,
    next_unit: u32,
}

impl FragmentBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a generated local and returns its id.
    pub fn local(&mut self, local: Local) -> LocalId {
        let id = local.id;
        self.fragment.locals.push(local);
        id
    }

    /// Id the next pushed unit will receive.
    #[must_use]
    pub fn next_id(&self) -> UnitId {
        UnitId::new(self.next_unit)
    }

    /// Appends a statement.
    pub fn push(&mut self, stmt: Stmt) -> UnitId {
        let id = self.next_id();
        self.next_unit += 1;
        for label in self.pending_labels.drain(..) {
            self.fragment.labels.insert(label, id);
        }
        self.fragment.units.push(Unit { id, stmt });
        id
    }

    /// Labels the next pushed unit.
    pub fn label(&mut self, name: impl Into<String>) {
        self.pending_labels.push(name.into());
    }

    /// Appends a `goto` to a labelled block.
    pub fn goto_label(&mut self, label: impl Into<String>) -> UnitId {
        let placeholder = self.next_id();
        let id = self.push(Stmt::Goto {
            target: placeholder,
        });
        self.defer(id, label);
        id
    }

    /// Appends a conditional jump to a labelled block.
    pub fn if_label(&mut self, condition: RelationalExpr, label: impl Into<String>) -> UnitId {
        let placeholder = self.next_id();
        let id = self.push(Stmt::If {
            condition,
            target: placeholder,
        });
        self.defer(id, label);
        id
    }

    fn defer(&mut self, unit: UnitId, label: impl Into<String>) {
        self.fragment.jump_fixups.push(JumpFixup {
            unit,
            label: label.into(),
        });
    }

    /// Adds a trap region over units of this fragment.
    pub fn trap(&mut self, trap: Trap) {
        self.fragment.traps.push(trap);
    }

    /// Finishes the fragment.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if a label was never followed by a unit.
    pub fn build(self) -> Result<Fragment> {
        if let Some(label) = self.pending_labels.first() {
            return Err(invariant_error!("label '{}' marks no unit", label));
        }
        Ok(self.fragment)
    }
}

/// A decoder turning one method's foreign code into a TAC [`Fragment`].
///
/// Implementations must be shareable across threads; batch lowering calls
/// `translate` for different methods concurrently.
pub trait FrontEnd: Send + Sync {
    /// The foreign representation of one method body.
    type Input: Sync;

    /// Translates `input`, resolving declared names through `scope` and
    /// drawing new locals from it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unsupported`] for constructs the decoder has no
    /// rule for. The driver may then substitute a stub body.
    fn translate(&self, input: &Self::Input, scope: &mut VariableScope) -> Result<Fragment>;
}
