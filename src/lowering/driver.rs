//! The lowering driver.
//!
//! For one method: bind receiver and parameters, declare the input's
//! variables, let the front end translate the code, merge the fragment,
//! then run the normalization pipeline. Recoverable failures fall back to a
//! stub body when configured to.

use rayon::prelude::*;

use crate::{
    compiler::{EventKind, EventLog, PassPipeline},
    frontend::{FrontEnd, VariableDecl, VariableScope},
    ir::{Body, MethodSignature},
    lowering::{
        binding::{bind_parameters, declare_variables},
        stub::stub_body,
        unify::unify,
        LoweringConfig, LoweringContext,
    },
    Result,
};

/// Everything needed to lower one method.
#[derive(Debug, Clone)]
pub struct MethodInput<I> {
    /// Resolved signature.
    pub signature: MethodSignature,
    /// Variables the method declares, in order.
    pub variables: Vec<VariableDecl>,
    /// Foreign code handed to the front end.
    pub code: I,
}

impl<I> MethodInput<I> {
    /// Creates an input without declared variables.
    #[must_use]
    pub fn new(signature: MethodSignature, code: I) -> Self {
        Self {
            signature,
            variables: Vec::new(),
            code,
        }
    }

    /// Sets the declared variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Vec<VariableDecl>) -> Self {
        self.variables = variables;
        self
    }
}

/// A lowered body and how it was obtained.
#[derive(Debug, Clone)]
pub struct LoweredMethod {
    /// The body.
    pub body: Body,
    /// Whether the body is a stub substituted after a failure.
    pub stubbed: bool,
}

/// Lowers methods through a front end and the normalization pipeline.
pub struct MethodLowering<F: FrontEnd> {
    front_end: F,
    pipeline: PassPipeline,
    config: LoweringConfig,
}

impl<F: FrontEnd> MethodLowering<F> {
    /// Creates a driver using the standard pipeline.
    #[must_use]
    pub fn new(front_end: F, config: LoweringConfig) -> Self {
        let pipeline = PassPipeline::standard().with_validation(config.validate_between_passes);
        Self {
            front_end,
            pipeline,
            config,
        }
    }

    /// Replaces the pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: PassPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    /// Lowers one method, returning any failure.
    ///
    /// # Errors
    ///
    /// Returns the front end's error, a fixup resolution error, or the first
    /// pipeline failure.
    pub fn lower(&self, input: &MethodInput<F::Input>, events: &EventLog) -> Result<Body> {
        let signature = &input.signature;
        let mut scope = VariableScope::new();
        let mut body = Body::new();

        bind_parameters(signature, &mut scope, &mut body)?;
        declare_variables(&input.variables, &mut scope, &mut body);

        let fragment = self.front_end.translate(&input.code, &mut scope)?;
        unify(&mut body, fragment)?;

        self.pipeline.run(&mut body, signature, events)?;

        events
            .record(EventKind::MethodLowered)
            .method(signature.unique_name())
            .message(format!(
                "{} units, {} locals",
                body.len(),
                body.locals().len()
            ));
        Ok(body)
    }

    /// Lowers one method, substituting a stub for recoverable failures when
    /// the configuration allows it.
    ///
    /// # Errors
    ///
    /// Returns invariant violations always, and recoverable errors when
    /// stubbing is disabled.
    pub fn lower_or_stub(
        &self,
        input: &MethodInput<F::Input>,
        events: &EventLog,
    ) -> Result<LoweredMethod> {
        let err = match self.lower(input, events) {
            Ok(body) => {
                return Ok(LoweredMethod {
                    body,
                    stubbed: false,
                })
            }
            Err(err) => err,
        };

        let method = input.signature.unique_name();
        if !(self.config.stub_on_unsupported && err.is_recoverable()) {
            events
                .record(EventKind::Error)
                .method(method)
                .message(err.to_string());
            return Err(err);
        }

        let body = stub_body(&input.signature, &self.config.stub_exception_type)?;
        events
            .record(EventKind::StubSubstituted)
            .method(method)
            .message(err.to_string());
        Ok(LoweredMethod {
            body,
            stubbed: true,
        })
    }

    /// Lowers a batch of methods into a fresh context.
    ///
    /// Methods are independent; with [`LoweringConfig::parallel`] they are
    /// lowered on the rayon pool. Abstract methods have no body to lower and
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first error [`lower_or_stub`](Self::lower_or_stub) does
    /// not recover from.
    pub fn lower_all(&self, inputs: &[MethodInput<F::Input>]) -> Result<LoweringContext> {
        let context = LoweringContext::new();
        let lower_into = |input: &MethodInput<F::Input>| -> Result<()> {
            let lowered = self.lower_or_stub(input, &context.events)?;
            context.insert(input.signature.unique_name(), lowered.body, lowered.stubbed);
            Ok(())
        };

        let has_body = |input: &&MethodInput<F::Input>| !input.signature.is_abstract();
        if self.config.parallel {
            inputs.par_iter().filter(has_body).try_for_each(lower_into)?;
        } else {
            inputs.iter().filter(has_body).try_for_each(lower_into)?;
        }

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frontend::{Fragment, FragmentBuilder},
        ir::{Constant, MethodFlags, Parameter, Stmt, TacType, Value},
        Error,
    };

    /// Returns its input's value, or fails the way the input says.
    struct ConstFrontEnd;

    enum Code {
        Return(i32),
        Unsupported,
        DanglingJump,
        Broken,
    }

    impl FrontEnd for ConstFrontEnd {
        type Input = Code;

        fn translate(&self, input: &Code, _scope: &mut VariableScope) -> Result<Fragment> {
            let mut builder = FragmentBuilder::new();
            match input {
                Code::Return(v) => {
                    builder.push(Stmt::Return(Some(Value::int(*v))));
                }
                Code::Unsupported => return Err(unsupported_error!("opcode 0xfe")),
                Code::DanglingJump => {
                    builder.goto_label("missing");
                    builder.push(Stmt::Return(Some(Value::int(0))));
                }
                Code::Broken => return Err(invariant_error!("decoder state corrupted")),
            }
            builder.build()
        }
    }

    fn input(name: &str, code: Code) -> MethodInput<Code> {
        MethodInput::new(
            MethodSignature::static_method(
                "A",
                name,
                vec![Parameter::named("x", TacType::Int)],
                TacType::Int,
            ),
            code,
        )
    }

    #[test]
    fn test_lower_runs_pipeline() -> Result<()> {
        let driver = MethodLowering::new(ConstFrontEnd, LoweringConfig::default());
        let events = EventLog::new();
        let body = driver.lower(&input("f", Code::Return(7)), &events)?;

        assert_eq!(body.len(), 2);
        assert_eq!(
            body.stmts().last(),
            Some(&Stmt::Return(Some(Value::Const(Constant::Int(7)))))
        );
        assert_eq!(events.count_kind(EventKind::MethodLowered), 1);
        Ok(())
    }

    #[test]
    fn test_recoverable_failures_are_stubbed() -> Result<()> {
        let driver = MethodLowering::new(ConstFrontEnd, LoweringConfig::default());
        let events = EventLog::new();
        for code in [Code::Unsupported, Code::DanglingJump] {
            let lowered = driver.lower_or_stub(&input("g", code), &events)?;
            assert!(lowered.stubbed);
            assert_eq!(lowered.body.len(), 3);
        }
        assert_eq!(events.count_kind(EventKind::StubSubstituted), 2);
        Ok(())
    }

    #[test]
    fn test_invariant_violations_surface() {
        let driver = MethodLowering::new(ConstFrontEnd, LoweringConfig::default());
        let events = EventLog::new();
        let result = driver.lower_or_stub(&input("h", Code::Broken), &events);
        assert!(matches!(result, Err(Error::Invariant { .. })));
        assert_eq!(events.count_kind(EventKind::Error), 1);
    }

    #[test]
    fn test_stubbing_can_be_disabled() {
        let config = LoweringConfig::default().with_stub_on_unsupported(false);
        let driver = MethodLowering::new(ConstFrontEnd, config);
        let result = driver.lower_or_stub(&input("k", Code::Unsupported), &EventLog::new());
        assert!(matches!(result, Err(Error::Unsupported { .. })));
    }

    #[test]
    fn test_lower_all_sequential_and_parallel() -> Result<()> {
        for parallel in [false, true] {
            let config = LoweringConfig::default().with_parallel(parallel);
            let driver = MethodLowering::new(ConstFrontEnd, config);
            let inputs = vec![
                input("one", Code::Return(1)),
                input("two", Code::Unsupported),
                input("three", Code::Return(3)),
            ];
            let context = driver.lower_all(&inputs)?;

            assert_eq!(context.len(), 3);
            assert!(context.is_stubbed("static int A::two(int)"));
            assert!(!context.is_stubbed("static int A::one(int)"));
            assert_eq!(
                context.with_body("static int A::three(int)", Body::len),
                Some(2)
            );
            let stats = context.stats();
            assert_eq!(stats.methods_lowered, 2);
            assert_eq!(stats.stubs, 1);
        }
        Ok(())
    }

    #[test]
    fn test_lower_all_skips_abstract_methods() -> Result<()> {
        let driver = MethodLowering::new(ConstFrontEnd, LoweringConfig::default());
        let mut declared = input("declared", Code::Unsupported);
        declared.signature = declared.signature.with_flags(MethodFlags::ABSTRACT);
        let inputs = vec![declared, input("concrete", Code::Return(5))];

        let context = driver.lower_all(&inputs)?;
        assert_eq!(context.len(), 1);
        assert!(context
            .with_body("static int A::declared(int)", Body::len)
            .is_none());
        assert_eq!(context.stats().stubs, 0);
        Ok(())
    }
}
