//! The pass trait every normalization stage implements.

use crate::{
    compiler::{EventBuilder, EventKind, EventLog},
    ir::{Body, MethodSignature},
    Result,
};

/// Per-run state handed to a pass: the method being normalized and the log
/// events go to.
pub struct PassContext<'a> {
    /// Signature of the method whose body is being normalized.
    pub signature: &'a MethodSignature,
    /// Log receiving one event per change.
    pub events: &'a EventLog,
    method: String,
    pass: &'static str,
}

impl<'a> PassContext<'a> {
    /// Creates a context for running `pass` on the body of `signature`.
    #[must_use]
    pub fn new(signature: &'a MethodSignature, events: &'a EventLog, pass: &'static str) -> Self {
        Self {
            signature,
            events,
            method: signature.unique_name(),
            pass,
        }
    }

    /// Unique name of the method being normalized.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Starts an event already tagged with the method and the pass.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'a> {
        self.events
            .record(kind)
            .method(self.method.clone())
            .pass(self.pass)
    }
}

/// A normalization pass over one method body.
///
/// Passes are stateless; all per-run data comes in through `body` and
/// `ctx`, so one instance may run on many bodies concurrently.
///
/// A pass either succeeds, leaving a body that satisfies
/// [`Body::validate`], or fails with an error. It never leaves a half-rewritten
/// body behind on success.
pub trait BodyPass: Send + Sync {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Runs the pass on one body.
    ///
    /// Returns `true` if the body changed. Changes are recorded through
    /// [`PassContext::record`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unsupported`] for IR the pass has no rule for,
    /// and [`crate::Error::Invariant`] if the body turns out to be malformed.
    fn run_on_body(&self, body: &mut Body, ctx: &PassContext<'_>) -> Result<bool>;
}
