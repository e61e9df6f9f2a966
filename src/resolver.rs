//! Turning string identifiers into stage objects.

use crate::{
    pipe::{MapFn, Next},
    stage::{Stage, StageError},
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("a resolver has not been attached to the pipeline")]
    Missing,

    #[error("no stage is bound to `{0}`")]
    NotFound(String),
}

/// Maps a name to an instance that can act as a stage.
pub trait Resolver<T>: Send + Sync {
    fn get(&self, name: &str) -> Result<Arc<dyn Stage<T>>, ResolveError>;
}

type Factory<T> = Arc<dyn Fn() -> Arc<dyn Stage<T>> + Send + Sync>;

/// In-memory [`Resolver`] keyed by name.
///
/// Bindings may be added after a pipeline referencing them was configured;
/// lookups happen when the stage is reached.
pub struct StageRegistry<T> {
    bindings: RwLock<HashMap<String, Factory<T>>>,
}

impl<T> Default for StageRegistry<T> {
    fn default() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: 'static> StageRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh stage from `factory` on every lookup of `name`.
    pub fn bind<S, F>(&self, name: impl Into<String>, factory: F) -> &Self
    where
        S: Stage<T> + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let factory: Factory<T> = Arc::new(move || Arc::new(factory()) as Arc<dyn Stage<T>>);
        self.insert(name.into(), factory)
    }

    /// Hand out the same shared stage on every lookup of `name`.
    pub fn instance(&self, name: impl Into<String>, stage: Arc<dyn Stage<T>>) -> &Self {
        self.insert(name.into(), Arc::new(move || Arc::clone(&stage)))
    }

    /// Bind a plain function: its result is always forwarded, whatever
    /// dispatch method the pipeline uses.
    pub fn function<F>(&self, name: impl Into<String>, f: F) -> &Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let name = name.into();
        let stage = Arc::new(FunctionStage {
            name: name.clone(),
            f: Arc::new(f),
        });
        self.instance(name, stage)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    fn insert(&self, name: String, factory: Factory<T>) -> &Self {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, factory);
        self
    }
}

/// Named free function acting as a stage.
struct FunctionStage<T> {
    name: String,
    f: MapFn<T>,
}

impl<T> Stage<T> for FunctionStage<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn responds_to(&self, _method: &str) -> bool {
        false
    }

    fn call(
        &self,
        _method: &str,
        value: T,
        next: Next<'_, T>,
        _args: &[String],
    ) -> Result<T, StageError> {
        next.call((self.f)(value))
    }

    fn is_invocable(&self) -> bool {
        true
    }

    fn invoke(&self, value: T, next: Next<'_, T>, _args: &[String]) -> Result<T, StageError> {
        next.call((self.f)(value))
    }
}

impl<T: 'static> Resolver<T> for StageRegistry<T> {
    fn get(&self, name: &str) -> Result<Arc<dyn Stage<T>>, ResolveError> {
        let factory = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(name.to_owned()))?;
        trace!(name, "resolved stage");
        Ok(factory())
    }
}
