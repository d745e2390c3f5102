//! Command parser - grammar components, call tokenizer and format compiler
//!
//! A command definition is written in a small format language:
//!
//! ```text
//! literal words     verbatim tokens (case-insensitive)
//! {name}            one argument token
//! (...)             optional sub-grammar
//! [a, b, c]         one of several alternatives
//! \c                escaped character, never reserved
//! ```
//!
//! Whitespace around literal text is trimmed, except a trailing `\ `,
//! which keeps its escaped space.
//!
//! # Example
//! ```
//! use syscall_core::parser::{compile, CommandComponent};
//!
//! let components = compile("kill {user} (now)").unwrap();
//! assert_eq!(components[1], CommandComponent::argument("user"));
//! ```

pub mod component;
pub mod tokenizer;

pub use component::{format_components, CommandComponent};

use crate::{Error, Result};

/// Compile a command format string into grammar components
///
/// # Errors
/// Returns `GrammarSyntax` for unbalanced or stray brackets, nested
/// arguments, empty bracket contents and a dangling escape.
pub fn compile(format: &str) -> Result<Vec<CommandComponent>> {
    let chars: Vec<char> = format.chars().collect();
    compile_scope(&chars)
}

fn compile_scope(chars: &[char]) -> Result<Vec<CommandComponent>> {
    let mut components = Vec::new();
    let mut literal = String::new();
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        match ch {
            '\\' => {
                let escaped = chars.get(index + 1).ok_or_else(|| {
                    Error::GrammarSyntax("Incomplete escape sequence: `\\`".into())
                })?;
                literal.push('\\');
                literal.push(*escaped);
                index += 2;
            }
            '(' => {
                flush_literal(&mut literal, &mut components)?;
                let contents = bracket_contents(chars, index, '(', ')')?;
                let inner = compile_scope(contents)?;
                if inner.is_empty() {
                    return Err(Error::GrammarSyntax(
                        "Expected components in brackets: '()'".into(),
                    ));
                }
                components.push(CommandComponent::optional(inner));
                index += contents.len() + 2;
            }
            '{' => {
                flush_literal(&mut literal, &mut components)?;
                let contents = bracket_contents(chars, index, '{', '}')?;
                if contents.contains(&'{') {
                    return Err(Error::GrammarSyntax("Invalid recursion: '{'".into()));
                }
                let name: String = contents.iter().collect();
                if name.trim().is_empty() {
                    return Err(Error::GrammarSyntax(
                        "Expected argument name in brackets: '{}'".into(),
                    ));
                }
                components.push(CommandComponent::argument(name));
                index += contents.len() + 2;
            }
            '[' => {
                flush_literal(&mut literal, &mut components)?;
                let contents = bracket_contents(chars, index, '[', ']')?;
                let mut choices = Vec::new();
                for segment in split_choices(contents) {
                    let segment: Vec<char> = trim_unescaped(&segment).chars().collect();
                    if segment.is_empty() {
                        continue;
                    }
                    choices.push(compile_scope(&segment)?);
                }
                if choices.is_empty() {
                    return Err(Error::GrammarSyntax(
                        "Expected choices in brackets: '[]'".into(),
                    ));
                }
                components.push(CommandComponent::choices(choices));
                index += contents.len() + 2;
            }
            ')' | '}' | ']' => {
                return Err(Error::GrammarSyntax(format!("Unexpected bracket: '{}'", ch)));
            }
            c => {
                literal.push(c);
                index += 1;
            }
        }
    }

    flush_literal(&mut literal, &mut components)?;
    Ok(components)
}

fn flush_literal(literal: &mut String, components: &mut Vec<CommandComponent>) -> Result<()> {
    let text = std::mem::take(literal);
    let text = trim_unescaped(&text);
    if !text.is_empty() {
        components.push(CommandComponent::literal(text)?);
    }
    Ok(())
}

/// Trim surrounding whitespace, keeping a trailing whitespace character
/// that is escaped by an odd run of backslashes
fn trim_unescaped(text: &str) -> &str {
    let text = text.trim_start();
    let trimmed = text.trim_end();
    let backslashes = trimmed.chars().rev().take_while(|&c| c == '\\').count();
    if backslashes % 2 == 0 {
        return trimmed;
    }
    let escaped = text[trimmed.len()..].chars().next().map_or(0, char::len_utf8);
    &text[..trimmed.len() + escaped]
}

/// Contents between the bracket at `open_index` and its matching close.
/// Depth counts the same bracket kind only; escaped characters are skipped.
fn bracket_contents(chars: &[char], open_index: usize, open: char, close: char) -> Result<&[char]> {
    let mut depth = 1;
    let mut index = open_index + 1;
    while index < chars.len() {
        let ch = chars[index];
        if ch == '\\' {
            index += 2;
            continue;
        }
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Ok(&chars[open_index + 1..index]);
            }
        }
        index += 1;
    }
    Err(Error::GrammarSyntax(format!("Unclosed bracket: '{}'", open)))
}

/// Split choice contents on commas outside nested brackets.
/// A top-level `\,` becomes a plain comma in its segment.
fn split_choices(contents: &[char]) -> Vec<String> {
    let mut segments = Vec::new();
    let mut segment = String::new();
    let mut depth = 0usize;
    let mut index = 0;

    while index < contents.len() {
        let ch = contents[index];
        match ch {
            '\\' => {
                match contents.get(index + 1) {
                    Some(',') if depth == 0 => segment.push(','),
                    Some(escaped) => {
                        segment.push('\\');
                        segment.push(*escaped);
                    }
                    None => segment.push('\\'),
                }
                index += 2;
                continue;
            }
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(std::mem::take(&mut segment));
                index += 1;
                continue;
            }
            _ => {}
        }
        segment.push(ch);
        index += 1;
    }

    segments.push(segment);
    segments
}
