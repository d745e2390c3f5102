//! Resolved calls and lazy argument decoding
//!
//! Arguments stay as the raw token text until asked for. Decoding goes
//! through the structured-value reader, so `'no reason'`, `"no reason"`,
//! `3.2` and `{reason: 'none'}` all decode to the value they spell.
//!
//! Access comes in three flavours:
//! - `try_*` returns `None` when the argument is absent or undecodable
//! - `argument*` returns an `ArgumentDecode` error instead
//! - `*_or*` substitutes a caller-supplied default

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::command::Command;
use crate::matcher::Match;
use crate::value;
use crate::{Error, Result};

/// A resolved call of a command, with its raw argument tokens
#[derive(Debug)]
pub struct Call<'c, N = String> {
    /// The command that has been called
    pub command: &'c Command<N>,
    /// Raw argument tokens by name
    pub arguments: BTreeMap<String, String>,
    /// Number of tokens used by the call
    pub token_count: usize,
}

impl<N> Clone for Call<'_, N> {
    fn clone(&self) -> Self {
        Call {
            command: self.command,
            arguments: self.arguments.clone(),
            token_count: self.token_count,
        }
    }
}

impl<'c, N> Call<'c, N> {
    pub fn new(command: &'c Command<N>, matched: Match) -> Self {
        Call {
            command,
            arguments: matched.arguments,
            token_count: matched.token_count,
        }
    }

    /// Identifier of the called command
    pub fn name(&self) -> &'c N {
        &self.command.name
    }

    /// Whether the argument was passed to the call
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Raw token text bound to the argument
    pub fn raw_argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    // ── Non-failing access ─────────────────────────────────

    pub fn try_argument(&self, name: &str) -> Option<Value> {
        self.argument(name).ok()
    }

    pub fn try_argument_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.argument_as(name).ok()
    }

    // ── Failing access ─────────────────────────────────────

    /// Decode the argument as a generic value
    ///
    /// # Errors
    /// `ArgumentDecode` when the argument is absent or malformed.
    pub fn argument(&self, name: &str) -> Result<Value> {
        let raw = self.require(name)?;
        decode(raw).map_err(|e| {
            Error::ArgumentDecode(format!("Invalid argument: '{}': {}", name, e))
        })
    }

    /// Decode the argument into `T`
    ///
    /// # Errors
    /// `ArgumentDecode` when the argument is absent, malformed, or has a
    /// shape `T` cannot be built from.
    pub fn argument_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let raw = self.require(name)?;
        decode_as(raw).map_err(|e| {
            Error::ArgumentDecode(format!(
                "Invalid argument: '{}' ({}): {}",
                name,
                std::any::type_name::<T>(),
                e
            ))
        })
    }

    fn require(&self, name: &str) -> Result<&str> {
        self.raw_argument(name)
            .ok_or_else(|| Error::ArgumentDecode(format!("Missing argument: '{}'", name)))
    }

    // ── Defaults ───────────────────────────────────────────

    pub fn argument_or(&self, name: &str, default: Value) -> Value {
        self.try_argument(name).unwrap_or(default)
    }

    pub fn argument_as_or<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        self.try_argument_as(name).unwrap_or(default)
    }

    pub fn argument_as_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        self.try_argument_as(name).unwrap_or_default()
    }
}

/// Decode raw argument text into a generic value
pub fn decode(raw: &str) -> Result<Value> {
    value::parse(raw)
        .map_err(|e| Error::ArgumentDecode(format!("Malformed value `{}`: {}", raw, e)))
}

/// Decode raw argument text into `T`
pub fn decode_as<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value = decode(raw)?;
    serde_json::from_value(value)
        .map_err(|e| Error::ArgumentDecode(format!("Unexpected shape `{}`: {}", raw, e)))
}
