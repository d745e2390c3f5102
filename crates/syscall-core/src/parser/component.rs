//! Command grammar components
//!
//! A command's grammar is a sequence of components forming a tree:
//! literals and arguments are leaves, optionals and choices nest further
//! sequences. The set of component kinds is closed.
//!
//! All component types derive Serialize/Deserialize so compiled grammars
//! can be inspected as JSON.

use std::fmt;

use super::tokenizer;
use crate::{Error, Result};

/// A grammar component of a command
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandComponent {
    /// Tokens that must appear verbatim
    Literal {
        tokens: Vec<String>,
        #[serde(default)]
        case_sensitive: bool,
    },
    /// A single token bound under `name`
    Argument { name: String },
    /// A sequence that matches as a whole or not at all
    Optional { components: Vec<CommandComponent> },
    /// Alternative sequences, tried in declared order
    Choices { choices: Vec<Vec<CommandComponent>> },
}

impl CommandComponent {
    /// Case-insensitive literal, tokenized with the call tokenizer
    pub fn literal(text: &str) -> Result<Self> {
        Ok(CommandComponent::Literal {
            tokens: literal_tokens(text)?,
            case_sensitive: false,
        })
    }

    /// Case-sensitive literal, tokenized with the call tokenizer
    pub fn literal_case_sensitive(text: &str) -> Result<Self> {
        Ok(CommandComponent::Literal {
            tokens: literal_tokens(text)?,
            case_sensitive: true,
        })
    }

    pub fn argument(name: impl Into<String>) -> Self {
        CommandComponent::Argument { name: name.into() }
    }

    pub fn optional(components: Vec<CommandComponent>) -> Self {
        CommandComponent::Optional { components }
    }

    pub fn choices(choices: Vec<Vec<CommandComponent>>) -> Self {
        CommandComponent::Choices { choices }
    }

    /// Names of every argument bound somewhere in this component
    pub fn argument_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_argument_names(&mut names);
        names
    }

    fn collect_argument_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            CommandComponent::Literal { .. } => {}
            CommandComponent::Argument { name } => names.push(name),
            CommandComponent::Optional { components } => {
                for component in components {
                    component.collect_argument_names(names);
                }
            }
            CommandComponent::Choices { choices } => {
                for component in choices.iter().flatten() {
                    component.collect_argument_names(names);
                }
            }
        }
    }
}

fn literal_tokens(text: &str) -> Result<Vec<String>> {
    tokenizer::tokenize_single(text).map_err(|e| {
        Error::GrammarSyntax(format!("Invalid literal `{}`: {}", text, e))
    })
}

// ── Format reconstruction ─────────────────────────────────

/// Rebuild a format string that compiles to an equivalent grammar.
///
/// Case sensitivity has no format syntax and is not represented.
pub fn format_components(components: &[CommandComponent]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_sequence(&mut out, components, false);
    out
}

impl fmt::Display for CommandComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_component(f, self, false)
    }
}

fn write_sequence(
    out: &mut impl fmt::Write,
    components: &[CommandComponent],
    in_choice: bool,
) -> fmt::Result {
    for (i, component) in components.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write_component(out, component, in_choice)?;
    }
    Ok(())
}

fn write_component(
    out: &mut impl fmt::Write,
    component: &CommandComponent,
    in_choice: bool,
) -> fmt::Result {
    match component {
        CommandComponent::Literal { tokens, .. } => {
            for (i, token) in tokens.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                if in_choice {
                    write_escaping_commas(out, token)?;
                } else {
                    out.write_str(token)?;
                }
            }
            Ok(())
        }
        CommandComponent::Argument { name } => write!(out, "{{{}}}", name),
        CommandComponent::Optional { components } => {
            out.write_char('(')?;
            write_sequence(out, components, false)?;
            out.write_char(')')
        }
        CommandComponent::Choices { choices } => {
            out.write_char('[')?;
            for (i, choice) in choices.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_sequence(out, choice, true)?;
            }
            out.write_char(']')
        }
    }
}

/// Bare commas in a choice literal were written as `\,`
fn write_escaping_commas(out: &mut impl fmt::Write, token: &str) -> fmt::Result {
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.write_char('\\')?;
                if let Some(escaped) = chars.next() {
                    out.write_char(escaped)?;
                }
            }
            ',' => out.write_str("\\,")?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_tokenized() {
        let literal = CommandComponent::literal("  blow   up ").unwrap();
        assert_eq!(
            literal,
            CommandComponent::Literal {
                tokens: vec!["blow".into(), "up".into()],
                case_sensitive: false,
            }
        );
    }

    #[test]
    fn test_literal_keeps_quoted_token() {
        let literal = CommandComponent::literal_case_sensitive("say 'hi there'").unwrap();
        assert_eq!(
            literal,
            CommandComponent::Literal {
                tokens: vec!["say".into(), "'hi there'".into()],
                case_sensitive: true,
            }
        );
    }

    #[test]
    fn test_literal_must_be_single_call() {
        assert!(matches!(
            CommandComponent::literal("a; b"),
            Err(Error::GrammarSyntax(_))
        ));
        assert!(matches!(
            CommandComponent::literal("   "),
            Err(Error::GrammarSyntax(_))
        ));
    }

    #[test]
    fn test_argument_names() {
        let component = CommandComponent::optional(vec![
            CommandComponent::argument("a"),
            CommandComponent::choices(vec![
                vec![CommandComponent::argument("b")],
                vec![CommandComponent::literal("x").unwrap()],
            ]),
        ]);
        assert_eq!(component.argument_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_display() {
        let component = CommandComponent::choices(vec![
            vec![CommandComponent::literal(r"a\,b").unwrap()],
            vec![
                CommandComponent::literal("for").unwrap(),
                CommandComponent::optional(vec![CommandComponent::argument("n")]),
            ],
        ]);
        assert_eq!(component.to_string(), r"[a\,b, for ({n})]");
    }

    #[test]
    fn test_display_escapes_bare_choice_commas() {
        let component = CommandComponent::choices(vec![
            vec![CommandComponent::Literal {
                tokens: vec!["a,b".into()],
                case_sensitive: false,
            }],
            vec![CommandComponent::literal("c").unwrap()],
        ]);
        assert_eq!(component.to_string(), r"[a\,b, c]");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(CommandComponent::argument("user")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "argument", "name": "user"}));

        let back: CommandComponent = serde_json::from_value(serde_json::json!({
            "kind": "literal",
            "tokens": ["kill"]
        }))
        .unwrap();
        assert_eq!(back, CommandComponent::literal("kill").unwrap());
    }
}
