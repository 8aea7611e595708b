//! Shared helpers for unit tests.

mod factories;

pub(crate) use factories::*;
pub(crate) use interpreter::interpret;

use crate::{
    compiler::{BodyPass, EventLog, PassContext},
    ir::{Body, InvokeExpr, InvokeKind, MethodRef, MethodSignature, TacType, Value},
    Result,
};

// Runs one pass on a body of a static `int A::m()`, without validation
pub(crate) fn run_pass(pass: &dyn BodyPass, body: &mut Body) -> Result<bool> {
    let signature = MethodSignature::static_method("A", "m", Vec::new(), TacType::Int);
    run_pass_for(pass, body, &signature)
}

// Runs one pass on a body of the given method, without validation
pub(crate) fn run_pass_for(
    pass: &dyn BodyPass,
    body: &mut Body,
    signature: &MethodSignature,
) -> Result<bool> {
    let events = EventLog::new();
    let ctx = PassContext::new(signature, &events, pass.name());
    pass.run_on_body(body, &ctx)
}

// A static call `A::call(args...)` returning int
pub(crate) fn call_with(args: Vec<Value>) -> InvokeExpr {
    InvokeExpr {
        kind: InvokeKind::Static,
        method: MethodRef::new("A", "call", vec![TacType::Int; args.len()], TacType::Int),
        base: None,
        args,
    }
}
