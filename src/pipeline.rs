// src/pipeline.rs
use crate::{
    chain::Chain,
    pipe::Pipe,
    resolver::Resolver,
    stage::{DEFAULT_METHOD, StageError},
};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Receives the value a level was called with and the error it raised.
/// Return `Ok` to substitute a result, or `Err` to keep propagating.
pub type ExceptionHandler<T> = Arc<dyn Fn(T, StageError) -> Result<T, StageError> + Send + Sync>;

/// Applied to whatever a stage returned before it is handed back to the
/// previous stage.
pub type CarryHandler<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    #[error("nothing was sent through the pipeline")]
    NothingSent,
}

/// Sends a value through an ordered list of stages.
///
/// ```
/// use onion::{Pipe, Pipeline};
///
/// let shout = Pipeline::new()
///     .send(String::from("  hello  "))
///     .through([
///         Pipe::map(|s: String| s.trim().to_owned()),
///         Pipe::closure(|s: String, next| next.call(s.to_uppercase())),
///     ])
///     .then_return()
///     .unwrap();
///
/// assert_eq!(shout, "HELLO");
/// ```
pub struct Pipeline<T> {
    passable: Option<T>,
    pipes: Vec<Pipe<T>>,
    method: Cow<'static, str>,
    resolver: Option<Arc<dyn Resolver<T>>>,
    on_exception: Option<ExceptionHandler<T>>,
    on_carry: Option<CarryHandler<T>>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self {
            passable: None,
            pipes: Vec::new(),
            method: Cow::Borrowed(DEFAULT_METHOD),
            resolver: None,
            on_exception: None,
            on_carry: None,
        }
    }
}

impl<T: Clone> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            passable: self.passable.clone(),
            pipes: self.pipes.clone(),
            method: self.method.clone(),
            resolver: self.resolver.clone(),
            on_exception: self.on_exception.clone(),
            on_carry: self.on_carry.clone(),
        }
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("pipes", &self.pipes)
            .field("method", &self.method)
            .field("resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: Arc<dyn Resolver<T>>) -> Self {
        Self::new().resolver(resolver)
    }

    /// Attach the resolver used for identifier stages.
    pub fn resolver(mut self, resolver: Arc<dyn Resolver<T>>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set the value being sent through the pipeline.
    pub fn send(mut self, passable: T) -> Self {
        self.passable = Some(passable);
        self
    }

    /// Replace the stage list.
    pub fn through<I>(mut self, pipes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Pipe<T>>,
    {
        self.pipes = pipes.into_iter().map(Into::into).collect();
        self
    }

    /// Append stages after the ones already registered.
    pub fn pipe<I>(mut self, pipes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Pipe<T>>,
    {
        self.pipes.extend(pipes.into_iter().map(Into::into));
        self
    }

    pub fn pipe_one(mut self, pipe: impl Into<Pipe<T>>) -> Self {
        self.pipes.push(pipe.into());
        self
    }

    /// Method called on stage objects (`"handle"` by default).
    pub fn via(mut self, method: impl Into<Cow<'static, str>>) -> Self {
        self.method = method.into();
        self
    }

    pub fn on_exception<F>(mut self, handler: F) -> Self
    where
        F: Fn(T, StageError) -> Result<T, StageError> + Send + Sync + 'static,
    {
        self.on_exception = Some(Arc::new(handler));
        self
    }

    pub fn on_carry<F>(mut self, transform: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.on_carry = Some(Arc::new(transform));
        self
    }

    pub fn stages(&self) -> &[Pipe<T>] {
        &self.pipes
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl<T: Clone> Pipeline<T> {
    /// Run every stage, then `destination`, with a copy of the current value.
    ///
    /// The chain is rebuilt on each call, so the pipeline can be reconfigured
    /// and run again.
    pub fn then<D>(&self, destination: D) -> Result<T, PipelineError>
    where
        D: Fn(T) -> Result<T, StageError>,
    {
        let passable = self.passable.clone().ok_or(PipelineError::NothingSent)?;
        let chain = Chain {
            method: &self.method,
            resolver: self.resolver.as_deref(),
            on_exception: self.on_exception.as_ref(),
            on_carry: self.on_carry.as_ref(),
        };
        debug!(stages = self.pipes.len(), method = %self.method, "running pipeline");

        let run = chain.build(&self.pipes, &destination);
        run(passable).map_err(|err| {
            debug!(error = %err, "pipeline failed");
            PipelineError::from(err)
        })
    }

    /// Run every stage and return the resulting value.
    pub fn then_return(&self) -> Result<T, PipelineError> {
        self.then(Ok)
    }
}
