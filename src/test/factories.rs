//! Raw bodies built the way the lowering driver builds them.

use crate::{
    compiler::{EventLog, PassPipeline},
    frontend::{Fragment, FragmentBuilder, FrontEnd, VariableScope},
    ir::{Body, MethodSignature, Parameter, RelationalExpr, RelationalOp, Stmt, TacType, Value},
    lowering::{LoweringConfig, MethodInput, MethodLowering},
    Result,
};

/// Front end replaying a closure against a fresh [`FragmentBuilder`].
pub(crate) struct ScriptFrontEnd<F>(pub F);

impl<F> FrontEnd for ScriptFrontEnd<F>
where
    F: Fn(&mut FragmentBuilder, &mut VariableScope) -> Result<()> + Send + Sync,
{
    type Input = ();

    fn translate(&self, _input: &(), scope: &mut VariableScope) -> Result<Fragment> {
        let mut builder = FragmentBuilder::new();
        (self.0)(&mut builder, scope)?;
        builder.build()
    }
}

// Bindings plus the merged fragment, before any normalization pass
pub(crate) fn raw_body<F>(signature: &MethodSignature, script: F) -> Result<Body>
where
    F: Fn(&mut FragmentBuilder, &mut VariableScope) -> Result<()> + Send + Sync,
{
    let driver = MethodLowering::new(ScriptFrontEnd(script), LoweringConfig::default())
        .with_pipeline(PassPipeline::new());
    driver.lower(&MethodInput::new(signature.clone(), ()), &EventLog::new())
}

// `bool Calc::cmp(int a, int b)`
pub(crate) fn cmp_signature() -> MethodSignature {
    MethodSignature::instance(
        "Calc",
        "cmp",
        vec![
            Parameter::named("a", TacType::Int),
            Parameter::named("b", TacType::Int),
        ],
        TacType::Boolean,
    )
}

// `t0 = a > b; return t0` after the cmp bindings
pub(crate) fn cmp_body() -> Result<Body> {
    raw_body(&cmp_signature(), |builder, scope| {
        let (Some(a), Some(b)) = (scope.lookup("a"), scope.lookup("b")) else {
            return Err(invariant_error!("parameters not in scope"));
        };
        let t0 = builder.local(scope.fresh("t0", TacType::Boolean));
        builder.push(Stmt::assign(
            t0,
            RelationalExpr::new(RelationalOp::Gt, Value::Local(a), Value::Local(b)),
        ));
        builder.push(Stmt::Return(Some(Value::Local(t0))));
        Ok(())
    })
}
