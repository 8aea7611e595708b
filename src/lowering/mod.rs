//! Method lowering: from front-end input to a normalized body.
//!
//! ```text
//! MethodInput ──► bind receiver/parameters ──► declare variables
//!                                                   │
//!             FrontEnd::translate ◄─────────────────┘
//!                     │
//!                     ▼
//!             unify fragment ──► resolve jump fixups ──► PassPipeline
//!                     │                                      │
//!                     └──── recoverable error ──► stub body ◄┘
//! ```
//!
//! [`MethodLowering`] drives one method at a time or a whole batch; batch
//! results land in a [`LoweringContext`].

mod binding;
mod config;
mod context;
mod driver;
mod stub;
mod unify;

pub use config::{LoweringConfig, DEFAULT_STUB_EXCEPTION};
pub use context::LoweringContext;
pub use driver::{LoweredMethod, MethodInput, MethodLowering};
