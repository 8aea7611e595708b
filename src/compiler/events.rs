//! Event logging for the normalization pipeline.
//!
//! Every pass records what it changed; the pipeline and the lowering driver
//! record their own progress. Events can be inspected for debugging, rendered
//! as a summary or ignored.
//!
//! # Architecture
//!
//! - [`Event`] - a single recorded event
//! - [`EventLog`] - an append-only, thread-safe collection of events
//! - [`EventBuilder`] - fluent construction; the event is appended on drop
//! - [`DerivedStats`] - counters computed from a log instead of tracked by hand
//!
//! # Example
//!
//! ```rust
//! use tacnorm::compiler::{EventKind, EventLog};
//!
//! let log = EventLog::new();
//! log.record(EventKind::BranchFolded)
//!     .method("Demo.Cmp::cmp")
//!     .location(3)
//!     .message("goto chain collapsed");
//! log.record(EventKind::LocalRemoved).method("Demo.Cmp::cmp");
//!
//! assert_eq!(log.len(), 2);
//! assert_eq!(log.summary(), "1 branch folded, 1 local removed");
//! ```

use std::{
    collections::{HashMap, HashSet},
    fmt,
    time::Duration,
};

/// Categories of events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A goto chain was collapsed or a goto to the next unit removed.
    BranchFolded,
    /// Two locals were packed into one.
    LocalsPacked,
    /// An unreferenced local was dropped from the local table.
    LocalRemoved,
    /// A trap range was shrunk.
    TrapTightened,
    /// A trap was dropped or merged into another.
    TrapRemoved,
    /// A definition was folded into its single use.
    StatementAggregated,
    /// A redundant cast was removed.
    CastRemoved,
    /// A constant branch or an identity operation was folded.
    ConstantFolded,
    /// A unit was removed (unreachable code, no-ops).
    UnitRemoved,
    /// An integer constant was retyped as a boolean.
    BooleanNormalized,
    /// A copy or constant was propagated into a use.
    CopyPropagated,
    /// A relational assignment was rewritten into branches.
    ConditionRewritten,
    /// An unused object allocation was removed.
    AllocationRemoved,
    /// A dead assignment was removed.
    AssignmentRemoved,
    /// A local was renamed to make names unique.
    LocalRenamed,

    /// A pipeline pass started.
    PassStarted,
    /// A pipeline pass completed.
    PassCompleted,
    /// A method body was lowered and normalized.
    MethodLowered,
    /// A method body was replaced by a throwing stub.
    StubSubstituted,
    /// Lowering a method failed without a stub taking its place.
    Error,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            // Transformations
            Self::BranchFolded => "branch folded",
            Self::LocalsPacked => "locals packed",
            Self::LocalRemoved => "local removed",
            Self::TrapTightened => "trap tightened",
            Self::TrapRemoved => "trap removed",
            Self::StatementAggregated => "statement aggregated",
            Self::CastRemoved => "cast removed",
            Self::ConstantFolded => "constant folded",
            Self::UnitRemoved => "unit removed",
            Self::BooleanNormalized => "boolean normalized",
            Self::CopyPropagated => "copy propagated",
            Self::ConditionRewritten => "condition rewritten",
            Self::AllocationRemoved => "allocation removed",
            Self::AssignmentRemoved => "assignment removed",
            Self::LocalRenamed => "local renamed",
            // Engine
            Self::PassStarted => "pass started",
            Self::PassCompleted => "pass completed",
            Self::MethodLowered => "method lowered",
            Self::StubSubstituted => "stub substituted",
            Self::Error => "error",
        }
    }

    /// Returns true if this event represents a change to a body.
    #[must_use]
    pub fn is_transformation(&self) -> bool {
        matches!(
            self,
            Self::BranchFolded
                | Self::LocalsPacked
                | Self::LocalRemoved
                | Self::TrapTightened
                | Self::TrapRemoved
                | Self::StatementAggregated
                | Self::CastRemoved
                | Self::ConstantFolded
                | Self::UnitRemoved
                | Self::BooleanNormalized
                | Self::CopyPropagated
                | Self::ConditionRewritten
                | Self::AllocationRemoved
                | Self::AssignmentRemoved
                | Self::LocalRenamed
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single logged event.
#[derive(Debug, Clone)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// Unique name of the method the event belongs to.
    pub method: Option<String>,
    /// Unit position within the body.
    pub location: Option<usize>,
    /// Human-readable description.
    pub message: String,
    /// Associated pass name (if from a pass).
    pub pass: Option<String>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "[{}] {}: {}", self.kind, method, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Builder for creating events with a fluent API.
///
/// Created by [`EventLog::record`]. The event is added to the log when the
/// builder is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    kind: EventKind,
    method: Option<String>,
    location: Option<usize>,
    message: Option<String>,
    pass: Option<String>,
}

impl<'a> EventBuilder<'a> {
    fn new(log: &'a EventLog, kind: EventKind) -> Self {
        Self {
            log,
            kind,
            method: None,
            location: None,
            message: None,
            pass: None,
        }
    }

    /// Sets only the method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the unit position.
    pub fn location(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets a custom message describing the event.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Associates this event with a specific pass.
    pub fn pass(mut self, pass_name: impl Into<String>) -> Self {
        self.pass = Some(pass_name.into());
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let message = self
            .message
            .take()
            .unwrap_or_else(|| self.kind.description().to_string());

        let event = Event {
            kind: self.kind,
            method: self.method.take(),
            location: self.location.take(),
            message,
            pass: self.pass.take(),
        };

        self.log.events.push(event);
    }
}

/// Collection of events from lowering and normalization.
///
/// Events can be appended concurrently through shared references, so one log
/// may be handed to every worker of a parallel batch.
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Starts building a new event of the given kind.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder::new(self, kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|(_, e)| e.kind == kind).count()
    }

    /// Returns an iterator over all events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, e)| e)
    }

    /// Returns an iterator over the events of one method.
    pub fn filter_method<'a>(&'a self, method: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.iter().filter(move |e| e.method.as_deref() == Some(method))
    }

    /// Returns an iterator over the events raised by one pass.
    pub fn filter_pass<'a>(&'a self, pass: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.iter().filter(move |e| e.pass.as_deref() == Some(pass))
    }

    /// Returns an iterator over transformation events only.
    pub fn transformations(&self) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(|e| e.kind.is_transformation())
    }

    /// Counts events grouped by kind.
    #[must_use]
    pub fn count_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::new();
        for (_, event) in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Returns the number of distinct methods with transformation events.
    #[must_use]
    pub fn methods_affected(&self) -> usize {
        self.transformations()
            .filter_map(|e| e.method.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Generates a human-readable summary of the transformations logged.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no events".to_string();
        }

        let mut parts: Vec<String> = self
            .count_by_kind()
            .iter()
            .filter(|(k, _)| k.is_transformation())
            .map(|(kind, count)| format!("{} {}", count, kind.description()))
            .collect();

        if parts.is_empty() {
            return format!("{} events", self.len());
        }

        parts.sort();
        parts.join(", ")
    }
}

/// Statistics derived from an [`EventLog`].
#[derive(Debug, Clone, Default)]
pub struct DerivedStats {
    /// Number of methods that had any transformations.
    pub methods_transformed: usize,
    /// Number of methods lowered successfully.
    pub methods_lowered: usize,
    /// Number of methods replaced by stubs.
    pub stubs: usize,
    /// Units removed by any pass.
    pub units_removed: usize,
    /// Locals removed or packed away.
    pub locals_removed: usize,
    /// Branches folded (goto chains and constant conditions).
    pub branches_folded: usize,
    /// Copies and constants propagated.
    pub copies_propagated: usize,
    /// Relational assignments rewritten into branches.
    pub conditions_rewritten: usize,
    /// Locals renamed for uniqueness.
    pub locals_renamed: usize,
    /// Number of errors.
    pub errors: usize,
    /// Processing time.
    pub total_time: Duration,
}

impl DerivedStats {
    /// Computes statistics from an event log.
    #[must_use]
    pub fn from_log(log: &EventLog) -> Self {
        let counts = log.count_by_kind();
        let get = |kind: EventKind| counts.get(&kind).copied().unwrap_or(0);

        Self {
            methods_transformed: log.methods_affected(),
            methods_lowered: get(EventKind::MethodLowered),
            stubs: get(EventKind::StubSubstituted),
            units_removed: get(EventKind::UnitRemoved)
                + get(EventKind::AllocationRemoved)
                + get(EventKind::AssignmentRemoved),
            locals_removed: get(EventKind::LocalRemoved),
            branches_folded: get(EventKind::BranchFolded),
            copies_propagated: get(EventKind::CopyPropagated),
            conditions_rewritten: get(EventKind::ConditionRewritten),
            locals_renamed: get(EventKind::LocalRenamed),
            errors: get(EventKind::Error),
            total_time: Duration::ZERO,
        }
    }

    /// Sets the total processing time.
    #[must_use]
    pub fn with_time(mut self, time: Duration) -> Self {
        self.total_time = time;
        self
    }

    /// Generates a human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if self.methods_lowered > 0 {
            parts.push(format!("{} methods lowered", self.methods_lowered));
        }
        if self.stubs > 0 {
            parts.push(format!("{} stubbed", self.stubs));
        }
        if self.units_removed > 0 {
            parts.push(format!("{} units removed", self.units_removed));
        }
        if self.locals_removed > 0 {
            parts.push(format!("{} locals removed", self.locals_removed));
        }
        if self.branches_folded > 0 {
            parts.push(format!("{} branches folded", self.branches_folded));
        }
        if self.conditions_rewritten > 0 {
            parts.push(format!("{} conditions rewritten", self.conditions_rewritten));
        }
        if self.errors > 0 {
            parts.push(format!("{} errors", self.errors));
        }
        if !self.total_time.is_zero() {
            parts.push(format!("{:.2?}", self.total_time));
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for DerivedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
