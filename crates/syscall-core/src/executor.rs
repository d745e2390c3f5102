//! Call interpreter - resolves every call in an input and runs its handler
//!
//! # Pipeline
//!
//! ```text
//! input → tokenize_all → [tokens per call] → resolve → [Call] → handler → [Output]
//! ```
//!
//! The whole input is tokenized and resolved before any handler runs. A
//! malformed call or an unknown command anywhere in the input therefore
//! yields a single `Output::Error` and no handler is invoked.
//!
//! Handlers run one at a time in input order. A handler that returns a
//! crate `Error` (usually an argument decode failure propagated with `?`)
//! stops the batch: outputs so far are kept and the error message is
//! appended. Any other outcome, including business errors expressed as
//! values, is passed through untouched.
//!
//! The async entry points await each handler to completion before the
//! next call starts. There is no cancellation; wrap the returned future if
//! a deadline is needed.

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::call::Call;
use crate::command::Command;
use crate::parser::tokenizer;
use crate::resolver;
use crate::{Error, Result};

/// Outcome of one entry in a batch
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Output {
    /// The handler's return value; `None` when no handler is bound
    Value(Option<Value>),
    /// Message of the error that stopped the batch
    Error(String),
}

impl Output {
    pub fn is_error(&self) -> bool {
        matches!(self, Output::Error(_))
    }

    /// The returned value, if this entry is a value
    pub fn value(&self) -> Option<&Value> {
        match self {
            Output::Value(value) => value.as_ref(),
            Output::Error(_) => None,
        }
    }
}

// ── Parsing ───────────────────────────────────────────────

/// Resolve every call in the input
///
/// # Errors
/// `CallSyntax` for malformed input, `CommandNotFound` for the first call
/// that no command fully matches.
pub fn parse_all<'c, N: fmt::Debug>(
    input: &str,
    commands: &'c [Command<N>],
) -> Result<Vec<Call<'c, N>>> {
    let token_lists = tokenizer::tokenize_all(input)?;
    tracing::debug!(calls = token_lists.len(), "tokenized input");

    token_lists
        .iter()
        .map(|tokens| {
            resolver::resolve(tokens, commands).ok_or_else(|| {
                Error::CommandNotFound(format!("No matching command: `{}`", tokens.join(" ")))
            })
        })
        .collect()
}

/// Resolve an input that must contain exactly one call
pub fn parse_single<'c, N: fmt::Debug>(
    input: &str,
    commands: &'c [Command<N>],
) -> Result<Call<'c, N>> {
    let mut calls = parse_all(input, commands)?;
    if calls.len() != 1 {
        return Err(Error::CallSyntax(format!(
            "Expected single command: `{}`",
            input
        )));
    }
    Ok(calls.remove(0))
}

/// Every command that fully matches a single-call input, in declaration order
pub fn find_matches<'c, N: fmt::Debug>(
    input: &str,
    commands: &'c [Command<N>],
) -> Result<Vec<Call<'c, N>>> {
    let tokens = tokenizer::tokenize_single(input)?;
    Ok(resolver::find_matches(&tokens, commands))
}

// ── Synchronous execution ─────────────────────────────────

/// Run each call's own handler
pub fn execute<N: fmt::Debug>(input: &str, commands: &[Command<N>]) -> Vec<Output> {
    execute_with(input, commands, |call| match &call.command.handler {
        Some(handler) => handler(call),
        None => Ok(None),
    })
}

/// Run one handler for every call
pub fn execute_with<'c, N, F>(
    input: &str,
    commands: &'c [Command<N>],
    mut handler: F,
) -> Vec<Output>
where
    N: fmt::Debug,
    F: FnMut(&Call<'c, N>) -> Result<Option<Value>>,
{
    let calls = match parse_all(input, commands) {
        Ok(calls) => calls,
        Err(e) => return vec![abort(e)],
    };

    let mut outputs = Vec::with_capacity(calls.len());
    for call in &calls {
        match handler(call) {
            Ok(value) => outputs.push(Output::Value(value)),
            Err(e) => {
                outputs.push(abort(e));
                break;
            }
        }
    }
    outputs
}

// ── Asynchronous execution ────────────────────────────────

/// Run each call's own handler, preferring the async handler when bound
pub async fn execute_async<N: fmt::Debug>(input: &str, commands: &[Command<N>]) -> Vec<Output> {
    execute_async_with(input, commands, |call| async move {
        let command = call.command;
        match (&command.async_handler, &command.handler) {
            (Some(handler), _) => handler(call).await,
            (None, Some(handler)) => handler(&call),
            (None, None) => Ok(None),
        }
    })
    .await
}

/// Run one async handler for every call, strictly one after another
pub async fn execute_async_with<'c, N, F, Fut>(
    input: &str,
    commands: &'c [Command<N>],
    mut handler: F,
) -> Vec<Output>
where
    N: fmt::Debug,
    F: FnMut(Call<'c, N>) -> Fut,
    Fut: Future<Output = Result<Option<Value>>>,
{
    let calls = match parse_all(input, commands) {
        Ok(calls) => calls,
        Err(e) => return vec![abort(e)],
    };

    let mut outputs = Vec::with_capacity(calls.len());
    for call in calls {
        match handler(call).await {
            Ok(value) => outputs.push(Output::Value(value)),
            Err(e) => {
                outputs.push(abort(e));
                break;
            }
        }
    }
    outputs
}

fn abort(error: Error) -> Output {
    tracing::warn!(kind = error.kind(), "batch aborted: {}", error);
    Output::Error(error.to_string())
}

// ── Tests ─────────────────────────────────────────────────
