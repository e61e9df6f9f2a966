//! Text helpers and stage objects shared by the test suites.

use crate::{Next, Stage, StageError};
use std::sync::Mutex;

/// Upper-case the first character of every word.
pub fn ucwords(text: String) -> String {
    let mut at_word_start = true;
    text.chars()
        .map(|c| {
            let out = if at_word_start { c.to_ascii_uppercase() } else { c };
            at_word_start = matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C');
            out
        })
        .collect()
}

pub fn trim(text: String) -> String {
    text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
        .to_owned()
}

/// ASCII case-insensitive replace of every `needle`.
pub fn ireplace(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (pos, _) in lower.match_indices(&needle) {
        out.push_str(&haystack[last..pos]);
        out.push_str(replacement);
        last = pos + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

pub fn all_the(text: String) -> String {
    ireplace(&text, "All", "All The")
}

pub const SAMPLE: &str = "a sample string that is passed through to all pipes.";
pub const SAMPLE_PADDED: &str = "a sample string that is passed through to all pipes.       ";
pub const CAPITALISED: &str = "A Sample String That Is Passed Through To All Pipes.";
pub const CAPITALISED_ALL_THE: &str = "A Sample String That Is Passed Through To All The Pipes.";

/// Capitalises words through the default `handle` method.
pub struct StageOne;

impl Stage<String> for StageOne {
    fn call(
        &self,
        _method: &str,
        value: String,
        next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        next.call(ucwords(value))
    }
}

/// Expands "All" to "All The" through the default `handle` method.
pub struct StageTwo;

impl Stage<String> for StageTwo {
    fn name(&self) -> &str {
        "stage_two"
    }

    fn call(
        &self,
        _method: &str,
        value: String,
        next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        next.call(all_the(value))
    }
}

/// Only answers to `run`.
pub struct RunOnly(pub fn(String) -> String);

impl Stage<String> for RunOnly {
    fn name(&self) -> &str {
        "run_only"
    }

    fn responds_to(&self, method: &str) -> bool {
        method == "run"
    }

    fn call(
        &self,
        _method: &str,
        value: String,
        next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        next.call((self.0)(value))
    }
}

/// Exposes no method, only a bare invocation.
pub struct Invocable;

impl Stage<String> for Invocable {
    fn responds_to(&self, _method: &str) -> bool {
        false
    }

    fn call(
        &self,
        method: &str,
        _value: String,
        _next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        Err(StageError::fault(format!("`{method}` is not exposed")))
    }

    fn is_invocable(&self) -> bool {
        true
    }

    fn invoke(
        &self,
        value: String,
        next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        next.call(format!("[{value}]"))
    }
}

/// Neither answers to any method nor is invocable.
pub struct Inert;

impl Stage<String> for Inert {
    fn name(&self) -> &str {
        "inert"
    }

    fn responds_to(&self, _method: &str) -> bool {
        false
    }

    fn call(
        &self,
        _method: &str,
        value: String,
        _next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        Ok(value)
    }
}

/// Wraps the value in its first two arguments: `wrap:<,>`.
pub struct Wrap;

impl Stage<String> for Wrap {
    fn call(
        &self,
        _method: &str,
        value: String,
        next: Next<'_, String>,
        args: &[String],
    ) -> Result<String, StageError> {
        match args {
            [open, close, ..] => next.call(format!("{open}{value}{close}")),
            _ => Err(StageError::fault("wrap needs two arguments")),
        }
    }
}

/// Remembers the arguments of every call and forwards unchanged.
#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl Stage<String> for Recorder {
    fn call(
        &self,
        _method: &str,
        value: String,
        next: Next<'_, String>,
        args: &[String],
    ) -> Result<String, StageError> {
        self.calls.lock().unwrap().push(args.to_vec());
        next.call(value)
    }
}

/// Returns the value without forwarding it.
pub struct Halt;

impl Stage<String> for Halt {
    fn call(
        &self,
        _method: &str,
        value: String,
        _next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        Ok(value)
    }
}

/// Always fails.
pub struct Explode;

impl Stage<String> for Explode {
    fn call(
        &self,
        _method: &str,
        _value: String,
        _next: Next<'_, String>,
        _args: &[String],
    ) -> Result<String, StageError> {
        Err(StageError::fault("boom"))
    }
}

/// Value type mixing text and a flag, for stages that bail out with `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum Passable {
    Text(String),
    Flag(bool),
}

impl Passable {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_owned())
    }

    pub fn map_text(self, f: fn(String) -> String) -> Self {
        match self {
            Self::Text(s) => Self::Text(f(s)),
            other => other,
        }
    }
}
