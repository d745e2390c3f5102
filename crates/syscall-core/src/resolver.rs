//! Command resolver - picks the command a call's tokens invoke
//!
//! Every command is matched in declaration order. Only full matches count:
//! a match that leaves trailing tokens is never selected. Among the full
//! matches, the one consuming the most tokens wins and ties keep the
//! earliest declared command.
//!
//! Since every full match consumes the whole token list, ties are the
//! usual case and declaration order decides. Declare the more specific of
//! two overlapping commands first:
//!
//! ```text
//! kill_me  "kill me"       declared first, wins for `kill me`
//! kill     "kill {name}"   wins for `kill "me"`
//! ```

use std::fmt;

use crate::call::Call;
use crate::command::Command;

/// Every command whose grammar consumes all of `tokens`, in declaration order
pub fn find_matches<'c, N: fmt::Debug>(
    tokens: &[String],
    commands: &'c [Command<N>],
) -> Vec<Call<'c, N>> {
    commands
        .iter()
        .filter_map(|command| full_match(tokens, command))
        .collect()
}

/// The command invoked by `tokens`, if any
pub fn resolve<'c, N: fmt::Debug>(
    tokens: &[String],
    commands: &'c [Command<N>],
) -> Option<Call<'c, N>> {
    let mut best: Option<Call<'c, N>> = None;

    for command in commands {
        let Some(candidate) = full_match(tokens, command) else {
            continue;
        };
        tracing::debug!(command = ?command.name, tokens = candidate.token_count, "candidate");

        // Strictly greater replaces; a tie keeps the earlier command
        let better = best
            .as_ref()
            .map_or(true, |current| candidate.token_count > current.token_count);
        if better {
            best = Some(candidate);
        }
    }

    if let Some(call) = &best {
        tracing::debug!(command = ?call.command.name, "resolved call");
    }
    best
}

fn full_match<'c, N: fmt::Debug>(
    tokens: &[String],
    command: &'c Command<N>,
) -> Option<Call<'c, N>> {
    let matched = command.matches(tokens);
    tracing::trace!(
        command = ?command.name,
        consumed = ?matched.as_ref().map(|m| m.token_count),
        available = tokens.len(),
        "match attempt"
    );
    let matched = matched?;
    if matched.token_count < tokens.len() {
        return None;
    }
    Some(Call::new(command, matched))
}
