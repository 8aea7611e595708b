//! Merging a front-end fragment into the method body.
//!
//! Locals are merged by identity: a fragment local whose [`LocalId`] the body
//! already declares is skipped, while two different ids never merge even if
//! their names and types agree. Units and traps are appended in order with
//! their ids shifted past the body's, then deferred jumps are patched.
//!
//! [`LocalId`]: crate::ir::LocalId

use crate::{
    frontend::Fragment,
    ir::{Body, Stmt},
    Error, Result,
};

/// Appends `fragment` to `body` and resolves its deferred jumps.
///
/// # Errors
///
/// Returns [`Error::UnresolvedLabel`] for a jump to a label the fragment
/// never defined, and an invariant error for a fixup that names a missing
/// unit or a unit that is not a jump.
pub(crate) fn unify(body: &mut Body, fragment: Fragment) -> Result<()> {
    let Fragment {
        locals,
        mut units,
        traps,
        labels,
        jump_fixups,
    } = fragment;

    for local in locals {
        body.add_local(local);
    }

    let offset = body.unit_id_bound();
    for unit in &mut units {
        unit.id = unit.id.rebased(offset);
        for target in unit.stmt.targets_mut() {
            *target = target.rebased(offset);
        }
    }
    body.append_units(units)?;

    for mut trap in traps {
        trap.begin = trap.begin.rebased(offset);
        trap.end = trap.end.rebased(offset);
        trap.handler = trap.handler.rebased(offset);
        body.add_trap(trap);
    }

    for fixup in jump_fixups {
        let resolved = labels
            .get(&fixup.label)
            .map(|id| id.rebased(offset))
            .ok_or_else(|| Error::UnresolvedLabel(fixup.label.clone()))?;
        let unit = fixup.unit.rebased(offset);
        match body.stmt_mut(unit) {
            Some(Stmt::Goto { target } | Stmt::If { target, .. }) => *target = resolved,
            Some(_) => {
                return Err(invariant_error!(
                    "jump fixup for '{}' names non-jump unit {}",
                    fixup.label,
                    unit
                ))
            }
            None => {
                return Err(invariant_error!(
                    "jump fixup for '{}' names missing unit {}",
                    fixup.label,
                    unit
                ))
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frontend::{FragmentBuilder, JumpFixup},
        ir::{LocalGenerator, TacType, Trap, UnitId, Value},
    };

    #[test]
    fn test_units_rebased_and_labels_resolved() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let mut body = Body::new();
        body.push(Stmt::Nop);
        body.push(Stmt::Nop);

        let mut builder = FragmentBuilder::new();
        let x = builder.local(generator.named("x", TacType::Int));
        builder.goto_label("exit");
        let begin = builder.push(Stmt::assign(x, Value::int(1)));
        let end = builder.next_id();
        builder.label("exit");
        builder.push(Stmt::Return(Some(Value::Local(x))));
        builder.trap(Trap::new(begin, end, end, TacType::class("E")));

        unify(&mut body, builder.build()?)?;

        assert_eq!(body.len(), 5);
        let ids: Vec<UnitId> = body.units().iter().map(|unit| unit.id).collect();
        assert_eq!(body.stmt(ids[2]), Some(&Stmt::Goto { target: ids[4] }));
        assert_eq!(body.traps()[0].begin, ids[3]);
        assert_eq!(body.traps()[0].end, ids[4]);
        body.validate()
    }

    #[test]
    fn test_locals_merged_by_identity() -> Result<()> {
        let mut generator = LocalGenerator::new();
        let shared = generator.named("x", TacType::Int);
        let twin = generator.named("x", TacType::Int);
        let mut body = Body::new();
        body.add_local(shared.clone());

        let mut builder = FragmentBuilder::new();
        builder.local(shared);
        builder.local(twin);
        builder.push(Stmt::Return(None));
        unify(&mut body, builder.build()?)?;

        assert_eq!(body.locals().len(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_label_rejected() -> Result<()> {
        let mut body = Body::new();
        let mut builder = FragmentBuilder::new();
        builder.goto_label("nowhere");
        builder.push(Stmt::Return(None));

        let err = unify(&mut body, builder.build()?).unwrap_err();
        assert!(matches!(err, Error::UnresolvedLabel(label) if label == "nowhere"));
        Ok(())
    }

    #[test]
    fn test_fixup_on_non_jump_rejected() -> Result<()> {
        let mut body = Body::new();
        let mut builder = FragmentBuilder::new();
        builder.label("l");
        let unit = builder.push(Stmt::Return(None));
        let mut fragment = builder.build()?;
        fragment.jump_fixups.push(JumpFixup {
            unit,
            label: "l".to_string(),
        });

        assert!(matches!(
            unify(&mut body, fragment),
            Err(Error::Invariant { .. })
        ));
        Ok(())
    }
}
