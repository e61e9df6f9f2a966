//! Late-bound sequential stage pipeline.
//!
//! A value is sent through an ordered list of stages.  Each stage receives the
//! value together with [`Next`], the rest of the chain: calling it forwards a
//! (possibly transformed) value, returning without calling it stops the
//! pipeline and makes the stage's return value the result.
//!
//! Stages are described by [`Pipe`]: plain functions, two-argument closures,
//! string identifiers looked up through a [`Resolver`] when reached, or
//! pre-built [`Stage`] objects.

mod chain;
pub mod pipe;
pub mod pipeline;
pub mod resolver;
pub mod stage;

#[cfg(test)]
pub(crate) mod testing;

pub use pipe::{Next, Pipe, parse_identifier};
pub use pipeline::{Pipeline, PipelineError};
pub use resolver::{ResolveError, Resolver, StageRegistry};
pub use stage::{DEFAULT_METHOD, Stage, StageError};
