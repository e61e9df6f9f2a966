//! Stage objects and the error type every stage reports.
//!
//! A [`Stage`] is a fully constructed object that can sit in a pipeline, either
//! handed over directly ([`Pipe::Instance`](crate::pipe::Pipe::Instance)) or
//! produced by a [`Resolver`](crate::resolver::Resolver) from a string
//! identifier.  Rust has no runtime method lookup, so the dispatch method name
//! configured with [`Pipeline::via`](crate::pipeline::Pipeline::via) is matched
//! through [`Stage::responds_to`] instead:
//!
//! * the stage answers to the configured name → [`Stage::call`]
//! * otherwise, the stage is itself invocable → [`Stage::invoke`]
//! * otherwise the pipeline fails with [`StageError::InvalidStage`].

use crate::{pipe::Next, resolver::ResolveError};
use thiserror::Error;

/// Dispatch method used when [`Pipeline::via`](crate::pipeline::Pipeline::via)
/// was never called.
pub const DEFAULT_METHOD: &str = "handle";

/// Error type stage authors box their own failures into.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Public error type for every stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage could not be resolved: {0}")]
    Resolution(#[from] ResolveError),

    #[error("stage `{stage}` exposes neither `{method}` nor a bare invocation")]
    InvalidStage { stage: String, method: String },

    #[error("stage failed: {0}")]
    Fault(#[source] BoxError),
}

impl StageError {
    /// Wrap any error (or message) raised by a stage or destination.
    pub fn fault(err: impl Into<BoxError>) -> Self {
        Self::Fault(err.into())
    }
}

/// A pre-built pipeline stage.
pub trait Stage<T>: Send + Sync {
    /// Human-readable name – used in error messages and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this stage exposes the dispatch method `method`.
    fn responds_to(&self, method: &str) -> bool {
        method == DEFAULT_METHOD
    }

    /// Run the method named `method`.  Only called when
    /// [`responds_to`](Self::responds_to) returned `true` for it.
    ///
    /// `args` holds the raw strings that followed `:` in the identifier the
    /// stage was resolved from; it is empty for stages handed over directly.
    /// Call `next` to forward a value, or return without calling it to stop the
    /// pipeline here.
    fn call(
        &self,
        method: &str,
        value: T,
        next: Next<'_, T>,
        args: &[String],
    ) -> Result<T, StageError>;

    /// Whether the stage can be invoked without naming a method.
    #[inline]
    fn is_invocable(&self) -> bool {
        false
    }

    /// Bare invocation, used when the configured method is not exposed.
    fn invoke(&self, _value: T, _next: Next<'_, T>, _args: &[String]) -> Result<T, StageError> {
        Err(StageError::InvalidStage {
            stage: self.name().to_owned(),
            method: "<invoke>".to_owned(),
        })
    }
}
