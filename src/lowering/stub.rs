//! Throwing stub bodies for methods that cannot be lowered.

use crate::{
    frontend::VariableScope,
    ir::{Body, MethodSignature, Stmt, TacType, Value},
    lowering::binding::bind_parameters,
    Result,
};

/// Builds `bindings; throw $ex; return <default>` for `signature`.
///
/// `$ex` is a fresh local of `exception_type` that is declared but never
/// assigned. The return statement is unreachable but keeps the body well
/// typed for consumers that expect one per exit: `return` for void, the zero
/// value for primitives and `null` otherwise.
///
/// # Errors
///
/// Propagates binding failures.
pub(crate) fn stub_body(signature: &MethodSignature, exception_type: &str) -> Result<Body> {
    let mut scope = VariableScope::new();
    let mut body = Body::new();
    bind_parameters(signature, &mut scope, &mut body)?;

    let exception = scope.temp(TacType::class(exception_type));
    let thrown = exception.id;
    body.add_local(exception);
    body.push(Stmt::Throw(Value::Local(thrown)));

    let returned = match &signature.return_type {
        TacType::Void => None,
        ty => Some(Value::Const(ty.default_value().ok_or_else(|| {
            invariant_error!("return type {} has no default value", ty)
        })?)),
    };
    body.push(Stmt::Return(returned));

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Constant, IdentitySource, Parameter};

    #[test]
    fn test_static_int_stub() -> Result<()> {
        let signature = MethodSignature::static_method(
            "A",
            "f",
            vec![Parameter::named("x", TacType::Int)],
            TacType::Int,
        );
        let body = stub_body(&signature, "System.Exception")?;
        let stmts: Vec<&Stmt> = body.stmts().collect();

        assert_eq!(stmts.len(), 3);
        assert!(matches!(
            stmts[0],
            Stmt::Identity {
                source: IdentitySource::Parameter(0),
                ..
            }
        ));
        assert!(matches!(stmts[1], Stmt::Throw(Value::Local(_))));
        assert_eq!(stmts[2], &Stmt::Return(Some(Value::Const(Constant::Int(0)))));
        body.validate()
    }

    #[test]
    fn test_returns_follow_return_type() -> Result<()> {
        let cases = [
            (TacType::Void, None),
            (TacType::Boolean, Some(Value::Const(Constant::Bool(false)))),
            (TacType::class("S"), Some(Value::Const(Constant::Null))),
        ];
        for (ty, expected) in cases {
            let signature = MethodSignature::instance("A", "g", Vec::new(), ty);
            let body = stub_body(&signature, "E")?;
            assert_eq!(body.len(), 3);
            assert_eq!(body.stmts().last(), Some(&Stmt::Return(expected)));
        }
        Ok(())
    }

    #[test]
    fn test_thrown_local_has_configured_type() -> Result<()> {
        let signature = MethodSignature::static_method("A", "h", Vec::new(), TacType::Void);
        let body = stub_body(&signature, "System.NotSupportedException")?;
        assert_eq!(
            body.locals().last().map(|local| &local.ty),
            Some(&TacType::class("System.NotSupportedException"))
        );
        Ok(())
    }
}
