use thiserror::Error;

macro_rules! unsupported_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Unsupported {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Unsupported {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Invariant {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Invariant {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Input Errors (recoverable per method)
/// - [`Error::Unsupported`] - The front end or a pass met a construct it has no rule for
/// - [`Error::UnresolvedLabel`] - A deferred jump names a block that was never emitted
///
/// ## Pipeline Defects (never recovered)
/// - [`Error::Invariant`] - A structural invariant of the body does not hold
///
/// ## Wrapping
/// - [`Error::PassFailed`] - Any of the above, raised inside a named pipeline pass
///
/// Input errors are recoverable at method granularity: the lowering driver substitutes a
/// throwing stub body so the surrounding program stays structurally complete. Invariant
/// violations point at a defect in the pipeline and always surface to the caller.
///
/// # Examples
///
/// ```rust
/// use tacnorm::{Error, ir::{RelationalExpr, RelationalOp, LocalId, Value}};
///
/// let cmp = RelationalExpr::new(RelationalOp::Eq, LocalId::new(0), Value::int(1));
/// match cmp.to_stack_opcode() {
///     Err(Error::Unsupported { message, .. }) => println!("unsupported: {message}"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An IR shape or front-end construct without a handling rule.
    ///
    /// Fatal for the method being lowered; the driver may substitute a stub body.
    ///
    /// # Fields
    ///
    /// * `message` - What was not supported
    /// * `file` - Source file where the error was raised
    /// * `line` - Source line where the error was raised
    #[error("Unsupported - {file}:{line}: {message}")]
    Unsupported {
        /// The message to be printed for the Unsupported error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A structural invariant of the body was violated.
    ///
    /// Raised for dangling branch targets, trap boundaries outside the unit
    /// sequence, undeclared locals and similar defects. Never recovered.
    #[error("Invariant violated - {file}:{line}: {message}")]
    Invariant {
        /// The message to be printed for the Invariant error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A deferred jump refers to a block label the fragment never defined.
    #[error("Jump to unknown block label '{0}'")]
    UnresolvedLabel(String),

    /// An error raised while running a named pipeline pass.
    #[error("Pass '{pass}' failed: {source}")]
    PassFailed {
        /// Name of the failing pass
        pass: &'static str,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether the lowering driver may replace the method body by a stub.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Unsupported { .. } | Error::UnresolvedLabel(_) => true,
            Error::Invariant { .. } => false,
            Error::PassFailed { source, .. } => source.is_recoverable(),
        }
    }

    /// Attaches the name of the pass that raised this error.
    #[must_use]
    pub fn in_pass(self, pass: &'static str) -> Self {
        Error::PassFailed {
            pass,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(unsupported_error!("x").is_recoverable());
        assert!(Error::UnresolvedLabel("b1".into()).is_recoverable());
        assert!(!invariant_error!("dangling {}", 3).is_recoverable());
        assert!(unsupported_error!("x").in_pass("p").is_recoverable());
        assert!(!invariant_error!("x").in_pass("p").is_recoverable());
    }

    #[test]
    fn test_messages_carry_location() {
        let err = invariant_error!("unit {} missing", 4);
        let text = err.to_string();
        assert!(text.contains("unit 4 missing"));
        assert!(text.contains("error.rs"));
    }
}
