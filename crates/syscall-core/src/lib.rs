//! System Call Core - natural-language command grammars for applications
//!
//! An application declares commands with a small format string, then hands
//! free text to the executor. Each call in the text is matched to exactly
//! one command and that command's handler runs with the decoded arguments.
//!
//! # Architecture
//!
//! ```text
//! Format String → Parser → [CommandComponent] ─┐
//!                                               ↓
//! Call Text → Tokenizer → [tokens] → Matcher → Resolver → Call
//!                                                          ↓
//!                                                       Executor → [Output]
//! ```
//!
//! # Format strings
//!
//! | Syntax           | Component   | Matches                                |
//! |------------------|-------------|----------------------------------------|
//! | `kill me`        | Literal     | the same words, case-insensitively     |
//! | `{user}`         | Argument    | any one token, bound to `user`         |
//! | `(the)`          | Optional    | its contents, or nothing               |
//! | `[a, b c]`       | Choices     | the first alternative that matches     |
//! | `\{`             | escape      | a literal `{`                          |
//!
//! # Guarantees
//!
//! - **Deterministic**: same commands and input always give the same outputs
//! - **Whole-input validation**: no handler runs unless every call resolves
//! - **Sequential**: handlers run one at a time, in input order
//!
//! # Example
//!
//! ```
//! use syscall_core::{execute, Command, Output};
//!
//! let commands = vec![Command::parse("enhance_weapon", "enhance my {weapon}(!)")
//!     .unwrap()
//!     .with_handler(|call| {
//!         let weapon: String = call.argument_as("weapon")?;
//!         Ok(Some(format!("Weapon enhanced: {}", weapon).into()))
//!     })];
//!
//! let outputs = execute("Enhance my 'Sword'!", &commands);
//! assert_eq!(outputs, vec![Output::Value(Some("Weapon enhanced: Sword".into()))]);
//! ```

pub mod call;
pub mod command;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod parser;
pub mod resolver;
pub mod value;

pub use call::Call;
pub use command::{AsyncHandler, Command, Handler};
pub use error::{Error, Result};
pub use executor::{
    execute, execute_async, execute_async_with, execute_with, find_matches, parse_all,
    parse_single, Output,
};
pub use matcher::Match;
pub use parser::{compile, CommandComponent};
