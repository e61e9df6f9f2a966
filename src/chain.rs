//! Composition of a stage list into one continuation.
//!
//! The list is folded right to left around the destination, so every stage is
//! wrapped only once the continuation it forwards to already exists:
//!
//! ```text
//! s1( s2( s3( destination ) ) )
//! ```
//!
//! Every level, destination included, runs inside the same interception frame:
//! an `Err` is handed to the exception handler together with the value that
//! level received.  Without a handler the error is returned unchanged.

use crate::{
    pipe::{Next, Pipe, parse_identifier},
    pipeline::{CarryHandler, ExceptionHandler},
    resolver::{ResolveError, Resolver},
    stage::{Stage, StageError},
};
use std::sync::Arc;
use tracing::{debug, trace};

/// A composed chain: calling it runs every remaining stage and the destination.
pub(crate) type Continuation<'a, T> = Box<dyn Fn(T) -> Result<T, StageError> + 'a>;

/// Everything a level needs besides its own stage, borrowed from the pipeline.
pub(crate) struct Chain<'a, T> {
    pub method: &'a str,
    pub resolver: Option<&'a dyn Resolver<T>>,
    pub on_exception: Option<&'a ExceptionHandler<T>>,
    pub on_carry: Option<&'a CarryHandler<T>>,
}

impl<T> Clone for Chain<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Chain<'_, T> {}

impl<'a, T: Clone + 'a> Chain<'a, T> {
    pub(crate) fn build(
        self,
        pipes: &'a [Pipe<T>],
        destination: &'a dyn Fn(T) -> Result<T, StageError>,
    ) -> Continuation<'a, T> {
        let mut chain: Continuation<'a, T> =
            Box::new(move |value| self.intercept(value, destination));

        for (index, pipe) in pipes.iter().enumerate().rev() {
            let next = chain;
            chain = Box::new(move |value| {
                self.intercept(value, |value| {
                    trace!(stage = index, kind = pipe.kind(), "dispatching stage");
                    let carry = self.dispatch(pipe, value, Next::new(&*next))?;
                    // Inline closures hand back their result as is.
                    Ok(match pipe {
                        Pipe::Closure(_) => carry,
                        _ => self.carry(carry),
                    })
                })
            });
        }

        chain
    }

    fn dispatch(&self, pipe: &Pipe<T>, value: T, next: Next<'_, T>) -> Result<T, StageError> {
        match pipe {
            Pipe::Map(f) => next.call(f(value)),
            Pipe::Closure(f) => f(value, next),
            Pipe::Identifier(identifier) => {
                let (name, args) = parse_identifier(identifier);
                let stage = self.resolve(name)?;
                trace!(name, ?args, "calling resolved stage");
                self.call_stage(&*stage, value, next, &args)
            }
            Pipe::Instance(stage) => self.call_stage(&**stage, value, next, &[]),
        }
    }

    fn resolve(&self, name: &str) -> Result<Arc<dyn Stage<T>>, StageError> {
        let resolver = self.resolver.ok_or(ResolveError::Missing)?;
        Ok(resolver.get(name)?)
    }

    fn call_stage(
        &self,
        stage: &dyn Stage<T>,
        value: T,
        next: Next<'_, T>,
        args: &[String],
    ) -> Result<T, StageError> {
        if stage.responds_to(self.method) {
            stage.call(self.method, value, next, args)
        } else if stage.is_invocable() {
            stage.invoke(value, next, args)
        } else {
            Err(StageError::InvalidStage {
                stage: stage.name().to_owned(),
                method: self.method.to_owned(),
            })
        }
    }

    #[inline(always)]
    fn carry(&self, carry: T) -> T {
        match self.on_carry {
            Some(transform) => transform(carry),
            None => carry,
        }
    }

    fn intercept<F>(&self, value: T, level: F) -> Result<T, StageError>
    where
        F: FnOnce(T) -> Result<T, StageError>,
    {
        // The value is only kept around when someone can use it.
        let Some(handler) = self.on_exception else {
            return level(value);
        };
        let passable = value.clone();
        level(value).or_else(|err| {
            debug!(error = %err, "handling stage error");
            handler(passable, err)
        })
    }
}
