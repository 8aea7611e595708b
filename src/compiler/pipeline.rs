//! The normalization pipeline.
//!
//! [`PassPipeline`] runs an explicit, ordered list of passes over one body.
//! The order is the contract: later stages rely on the shapes earlier stages
//! leave behind, and several stages run twice because an intervening stage
//! exposes new opportunities for them.

use crate::{
    compiler::{
        pass::{BodyPass, PassContext},
        passes::{
            AggregationPass, BooleanNormalizationPass, ConditionRewritePass,
            ConditionalBranchFoldingPass, ConstantCastPass, CopyPropagationPass,
            DeadAllocationPass, DeadAssignmentPass, IdentityCastPass, IdentityOperationPass,
            LocalPackingPass, NameDisambiguationPass, NopEliminationPass, TrapMinimizationPass,
            TrapTighteningPass, UnconditionalBranchFoldingPass, UnreachableCodePass,
            UnusedLocalPass,
        },
        EventKind, EventLog,
    },
    ir::{Body, MethodSignature},
    Result,
};

/// An ordered list of passes applied to a body one after another.
pub struct PassPipeline {
    passes: Vec<Box<dyn BodyPass>>,
    validate: bool,
}

impl Default for PassPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl PassPipeline {
    /// Creates an empty pipeline that validates the body after every pass.
    #[must_use]
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            validate: true,
        }
    }

    /// The standard 23-stage normalization order.
    #[must_use]
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add(UnconditionalBranchFoldingPass::new())
            .add(LocalPackingPass::new())
            .add(UnusedLocalPass::new())
            .add(TrapTighteningPass::new())
            .add(TrapMinimizationPass::new())
            .add(AggregationPass::new())
            .add(ConditionalBranchFoldingPass::new())
            .add(ConstantCastPass::new())
            .add(IdentityCastPass::new())
            .add(IdentityOperationPass::new())
            .add(UnreachableCodePass::new())
            .add(BooleanNormalizationPass::new())
            .add(CopyPropagationPass::new())
            .add(BooleanNormalizationPass::new())
            .add(CopyPropagationPass::new())
            .add(ConditionRewritePass::new())
            .add(DeadAllocationPass::new())
            .add(DeadAssignmentPass::new())
            .add(UnusedLocalPass::new())
            .add(ConditionalBranchFoldingPass::new())
            .add(UnconditionalBranchFoldingPass::new())
            .add(NopEliminationPass::new())
            .add(NameDisambiguationPass::new());
        pipeline
    }

    /// Appends a pass to the end of the pipeline.
    pub fn add(&mut self, pass: impl BodyPass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Enables or disables body validation after every pass.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Names of the passes in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every stage in order over `body`.
    ///
    /// Returns `true` if any stage changed the body.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a stage, wrapped in
    /// [`crate::Error::PassFailed`] with the stage name. With validation
    /// enabled, a stage that leaves a malformed body fails the same way.
    pub fn run(
        &self,
        body: &mut Body,
        signature: &MethodSignature,
        events: &EventLog,
    ) -> Result<bool> {
        let mut any_changed = false;

        for pass in &self.passes {
            let name = pass.name();
            let ctx = PassContext::new(signature, events, name);
            ctx.record(EventKind::PassStarted);

            let changed = pass
                .run_on_body(body, &ctx)
                .map_err(|err| err.in_pass(name))?;
            if self.validate {
                body.validate().map_err(|err| err.in_pass(name))?;
            }

            ctx.record(EventKind::PassCompleted)
                .message(if changed { "changed" } else { "unchanged" });
            any_changed |= changed;
        }

        Ok(any_changed)
    }
}
