//! Local name disambiguation.
//!
//! Locals are identified by [`LocalId`](crate::ir::LocalId), so independently
//! translated fragments may leave several locals with the same name. This
//! terminal pass walks the local table once in declaration order and renames
//! every local whose name was already taken to `<name>_<n>`, with one counter
//! shared by the whole body.

use std::collections::HashSet;

use crate::{
    compiler::{BodyPass, EventKind, PassContext},
    ir::Body,
    Result,
};

/// Makes the names of all locals pairwise distinct.
pub struct NameDisambiguationPass;

impl Default for NameDisambiguationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl NameDisambiguationPass {
    /// Creates a new name disambiguation pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for NameDisambiguationPass {
    fn name(&self) -> &'static str {
        "name-disambiguation"
    }

    fn description(&self) -> &'static str {
        "Renames locals so that no two share a name"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut counter = 0usize;
        let mut changed = false;

        for local in body.locals_mut() {
            if seen.insert(local.name.clone()) {
                continue;
            }
            let renamed = loop {
                let candidate = format!("{}_{counter}", local.name);
                counter += 1;
                if !seen.contains(&candidate) {
                    break candidate;
                }
            };
            ctx.record(EventKind::LocalRenamed)
                .message(format!("{} {} renamed to {renamed}", local.id, local.name));
            seen.insert(renamed.clone());
            local.name = renamed;
            changed = true;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{LocalGenerator, TacType},
        test::run_pass,
    };

    fn names(body: &Body) -> Vec<&str> {
        body.locals().iter().map(|local| local.name.as_str()).collect()
    }

    #[test]
    fn test_collisions_get_a_shared_counter() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let mut body = Body::new();
        for name in ["x", "y", "x", "y", "x"] {
            body.add_local(generator.named(name, TacType::Int));
        }

        assert!(run_pass(&NameDisambiguationPass::new(), &mut body)?);
        assert_eq!(names(&body), ["x", "y", "x_0", "y_1", "x_2"]);
        assert!(!run_pass(&NameDisambiguationPass::new(), &mut body)?);
        Ok(())
    }

    #[test]
    fn test_generated_name_never_reuses_a_taken_one() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let mut body = Body::new();
        for name in ["x_0", "x", "x"] {
            body.add_local(generator.named(name, TacType::Int));
        }

        run_pass(&NameDisambiguationPass::new(), &mut body)?;
        assert_eq!(names(&body), ["x_0", "x", "x_1"]);
        Ok(())
    }

    #[test]
    fn test_identity_is_kept_when_renaming() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let first = generator.named("t", TacType::Int);
        let second = generator.named("t", TacType::Long);
        let ids = (first.id, second.id);
        let mut body = Body::new();
        body.add_local(first);
        body.add_local(second);

        run_pass(&NameDisambiguationPass::new(), &mut body)?;
        assert_eq!(body.local(ids.0).map(|local| local.name.as_str()), Some("t"));
        assert_eq!(body.local(ids.1).map(|local| local.name.as_str()), Some("t_0"));
        Ok(())
    }
}
