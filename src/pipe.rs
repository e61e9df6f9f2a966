//! Stage descriptors and the continuation handed to every stage.

use crate::stage::{Stage, StageError};
use memchr::memchr;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Name-only function: transforms the value, forwarding is automatic.
pub type MapFn<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Two-argument function: receives the value and the rest of the chain.
pub type ClosureFn<T> = Arc<dyn Fn(T, Next<'_, T>) -> Result<T, StageError> + Send + Sync>;

/// Extra positional arguments parsed from an identifier.
pub type StageArgs = SmallVec<[String; 4]>;

/// "Everything after this stage", destination included.
///
/// Calling it forwards the value; dropping it without a call short-circuits
/// the pipeline and the stage's own return value becomes the result.
pub struct Next<'a, T> {
    chain: &'a dyn Fn(T) -> Result<T, StageError>,
}

impl<'a, T> Next<'a, T> {
    #[inline(always)]
    pub(crate) fn new(chain: &'a dyn Fn(T) -> Result<T, StageError>) -> Self {
        Self { chain }
    }

    /// Run the rest of the pipeline with `value`.
    #[inline(always)]
    pub fn call(&self, value: T) -> Result<T, StageError> {
        (self.chain)(value)
    }
}

impl<T> Clone for Next<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Next<'_, T> {}

/// One entry of a pipeline's stage list.
///
/// Nothing is looked up when a `Pipe` is registered: identifiers are parsed and
/// resolved only when the stage is reached during a run.
pub enum Pipe<T> {
    /// Free-function shorthand: `next(f(value))`.
    Map(MapFn<T>),
    /// Inline function deciding itself whether to call `next`.
    Closure(ClosureFn<T>),
    /// `name` or `name:arg1,arg2,...`, resolved through the pipeline's resolver.
    Identifier(String),
    /// Fully constructed stage object.
    Instance(Arc<dyn Stage<T>>),
}

impl<T> Pipe<T> {
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self::Map(Arc::new(f))
    }

    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(T, Next<'_, T>) -> Result<T, StageError> + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(f))
    }

    pub fn named(identifier: impl Into<String>) -> Self {
        Self::Identifier(identifier.into())
    }

    pub fn instance<S: Stage<T> + 'static>(stage: S) -> Self {
        Self::Instance(Arc::new(stage))
    }

    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::Closure(_) => "closure",
            Self::Identifier(_) => "identifier",
            Self::Instance(_) => "instance",
        }
    }
}

impl<T> Clone for Pipe<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Map(f) => Self::Map(Arc::clone(f)),
            Self::Closure(f) => Self::Closure(Arc::clone(f)),
            Self::Identifier(id) => Self::Identifier(id.clone()),
            Self::Instance(stage) => Self::Instance(Arc::clone(stage)),
        }
    }
}

impl<T> fmt::Debug for Pipe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(_) => f.write_str("Map"),
            Self::Closure(_) => f.write_str("Closure"),
            Self::Identifier(id) => f.debug_tuple("Identifier").field(id).finish(),
            Self::Instance(stage) => f.debug_tuple("Instance").field(&stage.name()).finish(),
        }
    }
}

impl<T> From<&str> for Pipe<T> {
    fn from(identifier: &str) -> Self {
        Self::Identifier(identifier.to_owned())
    }
}

impl<T> From<String> for Pipe<T> {
    fn from(identifier: String) -> Self {
        Self::Identifier(identifier)
    }
}

impl<T> From<Arc<dyn Stage<T>>> for Pipe<T> {
    fn from(stage: Arc<dyn Stage<T>>) -> Self {
        Self::Instance(stage)
    }
}

/// Split `name:arg1,arg2` into the lookup name and its raw arguments.
///
/// Only the first `:` separates; everything after it is split on `,` with no
/// trimming or coercion, so `"name:"` yields one empty argument.
pub fn parse_identifier(identifier: &str) -> (&str, StageArgs) {
    match memchr(b':', identifier.as_bytes()) {
        None => (identifier, StageArgs::new()),
        Some(pos) => {
            let (name, rest) = (&identifier[..pos], &identifier[pos + 1..]);
            (name, rest.split(',').map(str::to_owned).collect())
        }
    }
}
