//! Configuration of the lowering driver.

/// Default type of the value thrown by stub bodies.
pub const DEFAULT_STUB_EXCEPTION: &str = "System.Exception";

/// Knobs for [`MethodLowering`](crate::lowering::MethodLowering).
///
/// # Examples
///
/// ```rust
/// use tacnorm::lowering::LoweringConfig;
///
/// let config = LoweringConfig::default()
///     .with_parallel(false)
///     .with_stub_exception_type("System.InvalidProgramException");
/// assert!(config.stub_on_unsupported);
/// assert!(!config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringConfig {
    /// Substitute a throwing stub for methods that fail with a recoverable
    /// error instead of returning the error.
    pub stub_on_unsupported: bool,
    /// Verify the body after every pipeline pass.
    pub validate_between_passes: bool,
    /// Type of the value stub bodies throw.
    pub stub_exception_type: String,
    /// Lower batches on the rayon thread pool.
    pub parallel: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            stub_on_unsupported: true,
            validate_between_passes: true,
            stub_exception_type: DEFAULT_STUB_EXCEPTION.to_string(),
            parallel: true,
        }
    }
}

impl LoweringConfig {
    /// Sets whether recoverable failures produce stub bodies.
    #[must_use]
    pub fn with_stub_on_unsupported(mut self, enabled: bool) -> Self {
        self.stub_on_unsupported = enabled;
        self
    }

    /// Sets whether the body is verified after every pass.
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_between_passes = enabled;
        self
    }

    /// Sets the exception type thrown by stub bodies.
    #[must_use]
    pub fn with_stub_exception_type(mut self, ty: impl Into<String>) -> Self {
        self.stub_exception_type = ty.into();
        self
    }

    /// Sets whether batches are lowered in parallel.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
