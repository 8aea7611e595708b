//! Local variables and their identifiers.
//!
//! A local's identity is its [`LocalId`], not its name. Front-end sub-units
//! generate locals independently and may pick the same base name for different
//! locals, so names are only made unique at the very end of the pipeline. All
//! statements refer to locals by id; the name lives only in the body's local
//! table.

use std::fmt;

use crate::ir::TacType;

/// Unique identifier of a local within one method translation.
///
/// Ids are handed out by a single [`LocalGenerator`] per method, so the
/// receiver/parameter bindings and every fragment produced by the front end
/// draw from the same id space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u32);

impl LocalId {
    /// Creates a local id from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index of this id.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// A declared local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    /// Identity of the local.
    pub id: LocalId,
    /// Textual name. Not unique until name disambiguation has run.
    pub name: String,
    /// Static type.
    pub ty: TacType,
}

impl Local {
    /// Creates a new local.
    #[must_use]
    pub fn new(id: LocalId, name: impl Into<String>, ty: TacType) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

/// Hands out fresh [`LocalId`]s for one method translation.
#[derive(Debug, Default)]
pub struct LocalGenerator {
    next_id: u32,
    next_temp: u32,
}

impl LocalGenerator {
    /// Creates a generator starting at id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a local with a caller-chosen name.
    pub fn named(&mut self, name: impl Into<String>, ty: TacType) -> Local {
        let id = LocalId(self.next_id);
        self.next_id += 1;
        Local::new(id, name, ty)
    }

    /// Creates a compiler temporary named after its type (`$i0`, `$r1`, ...).
    pub fn temp(&mut self, ty: TacType) -> Local {
        let name = format!("${}{}", ty.name_prefix(), self.next_temp);
        self.next_temp += 1;
        self.named(name, ty)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next_id
    }
}
