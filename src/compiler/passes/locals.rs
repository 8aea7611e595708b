//! Unused local elimination.

use std::collections::HashSet;

use crate::{
    compiler::{BodyPass, EventKind, PassContext},
    ir::{Body, LocalId},
    Result,
};

/// Drops every local that no unit mentions.
pub struct UnusedLocalPass;

impl Default for UnusedLocalPass {
    fn default() -> Self {
        Self::new()
    }
}

impl UnusedLocalPass {
    /// Creates a new unused local pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyPass for UnusedLocalPass {
    fn name(&self) -> &'static str {
        "unused-local-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes locals that are neither read nor written"
    }

    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool> {
        let mentioned: HashSet<LocalId> = body.stmts().flat_map(|stmt| stmt.locals()).collect();

        let before = body.locals().len();
        let mut removed = Vec::new();
        body.locals_mut().retain(|local| {
            let keep = mentioned.contains(&local.id);
            if !keep {
                removed.push(local.to_string());
            }
            keep
        });

        for local in &removed {
            ctx.record(EventKind::LocalRemoved)
                .message(format!("unused local {local} removed"));
        }
        Ok(body.locals().len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{LocalGenerator, Stmt, TacType, Value},
        test::run_pass,
    };

    #[test]
    fn test_unmentioned_locals_dropped() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let kept = generator.named("kept", TacType::Int);
        let dropped = generator.named("dropped", TacType::Int);
        let kept_id = kept.id;
        let mut body = Body::new();
        body.add_local(kept);
        body.add_local(dropped);
        body.push(Stmt::assign(kept_id, Value::int(3)));
        body.push(Stmt::Return(Some(Value::Local(kept_id))));

        assert!(run_pass(&UnusedLocalPass::new(), &mut body)?);
        assert_eq!(body.locals().len(), 1);
        assert_eq!(body.locals()[0].name, "kept");
        assert!(!run_pass(&UnusedLocalPass::new(), &mut body)?);
        Ok(())
    }

    #[test]
    fn test_write_only_local_is_kept() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let x = generator.named("x", TacType::Int);
        let xid = x.id;
        let mut body = Body::new();
        body.add_local(x);
        body.push(Stmt::assign(xid, Value::int(3)));
        body.push(Stmt::Return(None));

        assert!(!run_pass(&UnusedLocalPass::new(), &mut body)?);
        assert_eq!(body.locals().len(), 1);
        Ok(())
    }
}
