//! Receiver, parameter and declared-variable bindings.
//!
//! The body starts with `this := @this` (instance methods only) followed by
//! one `argN := @parameterN` per formal parameter. Declared variables get a
//! local each but no statement.

use crate::{
    frontend::{VariableDecl, VariableScope},
    ir::{Body, IdentitySource, MethodSignature, Stmt},
    Result,
};

/// Name of the receiver local.
pub(crate) const RECEIVER_NAME: &str = "this";

/// Emits the identity bindings of `signature` into `body` and declares their
/// locals in `scope`.
///
/// # Errors
///
/// Returns an unsupported error if the method has more parameters than an
/// identity statement can index.
pub(crate) fn bind_parameters(
    signature: &MethodSignature,
    scope: &mut VariableScope,
    body: &mut Body,
) -> Result<()> {
    if !signature.is_static() {
        let receiver = scope.declare(RECEIVER_NAME, signature.receiver_type());
        let id = receiver.id;
        body.add_local(receiver);
        body.push(Stmt::Identity {
            local: id,
            source: IdentitySource::This,
        });
    }

    for (i, param) in signature.parameters.iter().enumerate() {
        let index = u16::try_from(i)
            .map_err(|_| unsupported_error!("{} has more than {} parameters", signature, u16::MAX))?;
        let name = param.name.clone().unwrap_or_else(|| format!("arg{i}"));
        let local = scope.declare(name, param.ty.clone());
        let id = local.id;
        body.add_local(local);
        body.push(Stmt::Identity {
            local: id,
            source: IdentitySource::Parameter(index),
        });
    }

    Ok(())
}

/// Declares one local per input variable, in order.
pub(crate) fn declare_variables(
    variables: &[VariableDecl],
    scope: &mut VariableScope,
    body: &mut Body,
) {
    for variable in variables {
        body.add_local(scope.declare(variable.name.clone(), variable.ty.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Parameter, TacType};

    #[test]
    fn test_instance_method_binds_receiver_first() -> Result<()> {
        let signature = MethodSignature::instance(
            "Calc",
            "cmp",
            vec![
                Parameter::named("a", TacType::Int),
                Parameter::unnamed(TacType::Long),
            ],
            TacType::Boolean,
        );
        let mut scope = VariableScope::new();
        let mut body = Body::new();
        bind_parameters(&signature, &mut scope, &mut body)?;

        let names: Vec<&str> = body.locals().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["this", "a", "arg1"]);
        assert_eq!(body.locals()[0].ty, TacType::class("Calc"));
        assert_eq!(body.locals()[2].ty, TacType::Long);

        let sources: Vec<IdentitySource> = body
            .stmts()
            .filter_map(|stmt| match stmt {
                Stmt::Identity { source, .. } => Some(*source),
                _ => None,
            })
            .collect();
        assert_eq!(
            sources,
            [
                IdentitySource::This,
                IdentitySource::Parameter(0),
                IdentitySource::Parameter(1)
            ]
        );
        assert_eq!(scope.lookup("a"), Some(body.locals()[1].id));
        Ok(())
    }

    #[test]
    fn test_static_method_has_no_receiver() -> Result<()> {
        let signature = MethodSignature::static_method(
            "Calc",
            "id",
            vec![Parameter::named("x", TacType::Int)],
            TacType::Int,
        );
        let mut scope = VariableScope::new();
        let mut body = Body::new();
        bind_parameters(&signature, &mut scope, &mut body)?;
        declare_variables(
            &[VariableDecl::new("tmp", TacType::Int)],
            &mut scope,
            &mut body,
        );

        assert_eq!(body.len(), 1);
        assert_eq!(body.locals().len(), 2);
        assert_eq!(scope.lookup("this"), None);
        assert_eq!(scope.lookup("tmp"), Some(body.locals()[1].id));
        Ok(())
    }
}
