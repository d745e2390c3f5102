//! Command definitions - a named grammar with optional handlers

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::call::Call;
use crate::matcher::{self, Match};
use crate::parser::{self, CommandComponent};
use crate::Result;

/// Synchronous command handler
pub type Handler<N = String> = Arc<dyn Fn(&Call<'_, N>) -> Result<Option<Value>> + Send + Sync>;

/// Asynchronous command handler
pub type AsyncHandler<N = String> =
    Arc<dyn for<'a> Fn(Call<'a, N>) -> BoxFuture<'a, Result<Option<Value>>> + Send + Sync>;

/// A command definition that may be called
///
/// The identifier `N` is opaque to this crate. It defaults to `String`;
/// an application enum lets handlers `match` on `call.name()`.
///
/// Fields are public: the owning application may rename a command, swap
/// its grammar or rebind its handlers at any time. Nothing in this crate
/// mutates a command.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(bound(
    serialize = "N: serde::Serialize",
    deserialize = "N: serde::Deserialize<'de>"
))]
pub struct Command<N = String> {
    /// Identifier for the command
    pub name: N,
    /// Grammar the call tokens must match
    pub components: Vec<CommandComponent>,
    #[serde(skip)]
    pub handler: Option<Handler<N>>,
    #[serde(skip)]
    pub async_handler: Option<AsyncHandler<N>>,
}

impl Command {
    /// Create a string-named command from pre-built components
    pub fn new(name: impl Into<String>, components: Vec<CommandComponent>) -> Self {
        Command::from_components(name.into(), components)
    }

    /// Create a string-named command by compiling a format string
    ///
    /// # Errors
    /// Returns `GrammarSyntax` when the format string is malformed.
    ///
    /// # Example
    /// ```
    /// use syscall_core::Command;
    ///
    /// let command = Command::parse("kill_user", "kill {user} for {reason}").unwrap();
    /// assert_eq!(command.components.len(), 4);
    /// ```
    pub fn parse(name: impl Into<String>, format: &str) -> Result<Self> {
        Command::define(name.into(), format)
    }
}

impl<N> Command<N> {
    /// Create a command with any identifier from pre-built components
    pub fn from_components(name: N, components: Vec<CommandComponent>) -> Self {
        Command {
            name,
            components,
            handler: None,
            async_handler: None,
        }
    }

    /// Create a command with any identifier by compiling a format string
    ///
    /// ```
    /// use syscall_core::Command;
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum Action {
    ///     Explode,
    /// }
    ///
    /// let command = Command::define(Action::Explode, "[explode, blow up]").unwrap();
    /// assert_eq!(command.name, Action::Explode);
    /// ```
    pub fn define(name: N, format: &str) -> Result<Self> {
        Ok(Command::from_components(name, parser::compile(format)?))
    }

    /// Bind a synchronous handler
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Call<'_, N>) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Bind an asynchronous handler
    ///
    /// ```
    /// use syscall_core::Command;
    ///
    /// let command = Command::parse("greet", "greet {name}")
    ///     .unwrap()
    ///     .with_async_handler(|call| {
    ///         Box::pin(async move {
    ///             let name = call.argument("name")?;
    ///             Ok::<_, syscall_core::Error>(Some(name))
    ///         })
    ///     });
    /// assert!(command.async_handler.is_some());
    /// ```
    pub fn with_async_handler<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(Call<'a, N>) -> BoxFuture<'a, Result<Option<Value>>> + Send + Sync + 'static,
    {
        self.async_handler = Some(Arc::new(handler));
        self
    }

    /// Match this command's grammar against the start of `tokens`
    pub fn matches(&self, tokens: &[String]) -> Option<Match> {
        matcher::match_components(tokens, &self.components)
    }

    /// Format string equivalent to this command's grammar
    pub fn format(&self) -> String {
        parser::format_components(&self.components)
    }
}

impl<N: fmt::Debug> fmt::Debug for Command<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("components", &self.components)
            .field("handler", &self.handler.is_some())
            .field("async_handler", &self.async_handler.is_some())
            .finish()
    }
}
