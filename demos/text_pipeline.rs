// demos/text_pipeline.rs
//! Example: a text clean-up pipeline mixing every kind of stage.
//!
//! This demonstrates:
//! • plain functions that always forward
//! • closures that decide whether to forward
//! • named stages resolved (with arguments) when they are reached
//! • stage objects dispatched through a custom method name
//!
//! Run with `RUST_LOG=onion=trace cargo run --example text_pipeline` to watch
//! the chain unfold.

use std::error::Error;
use std::sync::Arc;

use onion::{Next, Pipe, Pipeline, Stage, StageError, StageRegistry};
use tracing_subscriber::EnvFilter;

/// Rejects input that is empty once trimmed, without running later stages.
fn reject_blank(text: String, next: Next<'_, String>) -> Result<String, StageError> {
    if text.is_empty() {
        return Ok("<blank>".to_owned());
    }
    next.call(text)
}

/// Truncates to the number of characters given as its first argument.
struct Truncate;

impl Stage<String> for Truncate {
    fn responds_to(&self, method: &str) -> bool {
        method == "process"
    }

    fn call(
        &self,
        _method: &str,
        text: String,
        next: Next<'_, String>,
        args: &[String],
    ) -> Result<String, StageError> {
        let limit: usize = match args.first() {
            Some(raw) => raw.parse().map_err(StageError::fault)?,
            None => usize::MAX,
        };
        next.call(text.chars().take(limit).collect())
    }
}

/// Capitalises every word.
struct Titlecase;

impl Stage<String> for Titlecase {
    fn responds_to(&self, method: &str) -> bool {
        method == "process"
    }

    fn call(
        &self,
        _method: &str,
        text: String,
        next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        let titled = text
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        next.call(titled)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(StageRegistry::<String>::new());
    registry.bind("truncate", || Truncate);

    let pipeline = Pipeline::<String>::with_resolver(registry)
        .via("process")
        .through([
            Pipe::map(|s: String| s.trim().to_owned()),
            Pipe::closure(reject_blank),
            Pipe::named("truncate:24"),
            Pipe::instance(Titlecase),
        ]);

    for input in ["   the quick brown fox jumps over the lazy dog   ", "     "] {
        let output = pipeline
            .clone()
            .send(input.to_owned())
            .then(|s| Ok(format!("«{s}»")))?;
        println!("{input:?} → {output}");
    }

    Ok(())
}
