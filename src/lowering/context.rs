//! Shared state of a batch lowering run.

use std::time::{Duration, Instant};

use dashmap::{DashMap, DashSet};

use crate::{
    compiler::{DerivedStats, EventLog},
    ir::Body,
};

/// Results of lowering many methods.
///
/// Collections are thread-safe so methods can be lowered in parallel and
/// publish their bodies as they finish. Bodies are keyed by
/// [`MethodSignature::unique_name`](crate::ir::MethodSignature::unique_name),
/// so overloads never overwrite each other.
pub struct LoweringContext {
    /// Normalized (or stub) body of every method.
    pub bodies: DashMap<String, Body>,

    /// Methods whose body is a stub.
    pub stubbed: DashSet<String>,

    /// Events from every pass and driver step.
    pub events: EventLog,

    start_time: Instant,
}

impl Default for LoweringContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LoweringContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: DashMap::new(),
            stubbed: DashSet::new(),
            events: EventLog::new(),
            start_time: Instant::now(),
        }
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Number of methods with a body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no method has been lowered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Stores the body of a method.
    pub fn insert(&self, method: String, body: Body, stubbed: bool) {
        if stubbed {
            self.stubbed.insert(method.clone());
        }
        self.bodies.insert(method, body);
    }

    /// Whether a method's body is a stub.
    #[must_use]
    pub fn is_stubbed(&self, method: &str) -> bool {
        self.stubbed.contains(method)
    }

    /// Executes a closure with a reference to a method's body.
    pub fn with_body<R, F>(&self, method: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Body) -> R,
    {
        self.bodies.get(method).map(|r| f(&r))
    }

    /// Removes and returns a method's body.
    pub fn take_body(&self, method: &str) -> Option<Body> {
        self.bodies.remove(method).map(|(_, body)| body)
    }

    /// Statistics derived from the event log.
    #[must_use]
    pub fn stats(&self) -> DerivedStats {
        DerivedStats::from_log(&self.events).with_time(self.elapsed())
    }
}
