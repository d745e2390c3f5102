//! Grammar matcher - matches call tokens against a component sequence
//!
//! Matching is pure and recursive. Each component is matched against the
//! tokens left over by the components before it:
//!
//! - `Literal` consumes its tokens when they compare equal positionally
//! - `Argument` consumes and binds exactly one token
//! - `Optional` folds in its inner match, or contributes nothing
//! - `Choices` takes the first alternative that matches
//!
//! There is no backtracking into an `Optional` once it has matched. A
//! grammar such as `eat ({object}) please` therefore rejects `eat please`:
//! the optional argument binds `please` and the trailing literal then has
//! nothing left to match. Choosing between commands is left to the resolver.

use std::collections::BTreeMap;

use crate::parser::CommandComponent;

/// Tokens consumed and arguments bound by a successful match
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Match {
    pub token_count: usize,
    /// Raw, undecoded argument tokens by name
    pub arguments: BTreeMap<String, String>,
}

/// Match a component sequence against the start of `tokens`
pub fn match_components(tokens: &[String], components: &[CommandComponent]) -> Option<Match> {
    let mut result = Match::default();
    for component in components {
        let matched = match_component(&tokens[result.token_count..], component)?;
        result.token_count += matched.token_count;
        // Later bindings win
        result.arguments.extend(matched.arguments);
    }
    Some(result)
}

/// Match a single component against the start of `tokens`
pub fn match_component(tokens: &[String], component: &CommandComponent) -> Option<Match> {
    match component {
        CommandComponent::Literal {
            tokens: literal,
            case_sensitive,
        } => {
            if tokens.len() < literal.len() {
                return None;
            }
            let equal = literal
                .iter()
                .zip(tokens)
                .all(|(expected, token)| tokens_equal(expected, token, *case_sensitive));
            equal.then(|| Match {
                token_count: literal.len(),
                arguments: BTreeMap::new(),
            })
        }
        CommandComponent::Argument { name } => tokens.first().map(|token| Match {
            token_count: 1,
            arguments: BTreeMap::from([(name.clone(), token.clone())]),
        }),
        CommandComponent::Optional { components } => {
            Some(match_components(tokens, components).unwrap_or_default())
        }
        CommandComponent::Choices { choices } => choices
            .iter()
            .find_map(|choice| match_components(tokens, choice)),
    }
}

fn tokens_equal(expected: &str, token: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        expected == token
    } else {
        expected
            .chars()
            .flat_map(char::to_lowercase)
            .eq(token.chars().flat_map(char::to_lowercase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{compile, tokenizer::tokenize_single};
    use proptest::prelude::*;

    fn run(format: &str, input: &str) -> Option<Match> {
        let components = compile(format).unwrap();
        let tokens = tokenize_single(input).unwrap();
        match_components(&tokens, &components)
    }

    fn bound(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ── Literals ───────────────────────────────────────

    #[test]
    fn test_literal_ignores_case_by_default() {
        let matched = run("enhance my", "Enhance MY").unwrap();
        assert_eq!(matched.token_count, 2);
        assert!(matched.arguments.is_empty());
    }

    #[test]
    fn test_literal_unicode_case_folding() {
        assert!(run("straße", "STRASSE").is_none());
        assert!(run("ÉCLAIR", "éclair").is_some());
    }

    #[test]
    fn test_case_sensitive_literal() {
        let components = vec![CommandComponent::literal_case_sensitive("Go").unwrap()];
        let tokens = tokenize_single("go").unwrap();
        assert!(match_components(&tokens, &components).is_none());
        let tokens = tokenize_single("Go").unwrap();
        assert!(match_components(&tokens, &components).is_some());
    }

    #[test]
    fn test_literal_runs_out_of_tokens() {
        assert!(run("blow up", "blow").is_none());
    }

    #[test]
    fn test_quoted_token_is_not_a_literal() {
        assert!(run("kill me", "kill \"me\"").is_none());
    }

    // ── Arguments ──────────────────────────────────────

    #[test]
    fn test_arguments_bind_raw_tokens() {
        let matched = run("kill {user} for {reason}", "kill 'player' for 'no reason'").unwrap();
        assert_eq!(matched.token_count, 4);
        assert_eq!(
            matched.arguments,
            bound(&[("user", "'player'"), ("reason", "'no reason'")])
        );
    }

    #[test]
    fn test_argument_needs_a_token() {
        assert!(run("kill {user}", "kill").is_none());
    }

    #[test]
    fn test_later_binding_wins() {
        let matched = run("{x} ({x})", "first second").unwrap();
        assert_eq!(matched.arguments, bound(&[("x", "second")]));
    }

    // ── Optionals ──────────────────────────────────────

    #[test]
    fn test_optional_present_and_absent() {
        let format = "show (the) emoticon {name} (for {duration} seconds) in [color, colour] {color}";

        let matched = run(format, "show emoticon 'smile' in colour 'Red'").unwrap();
        assert_eq!(matched.token_count, 6);
        assert_eq!(
            matched.arguments,
            bound(&[("name", "'smile'"), ("color", "'Red'")])
        );

        let matched =
            run(format, "show the emoticon 'smile' for 3.2 seconds in color 'Red'").unwrap();
        assert_eq!(matched.token_count, 10);
        assert_eq!(matched.arguments["duration"], "3.2");
    }

    #[test]
    fn test_optional_never_matches_partially() {
        assert!(run("a (b c) d", "a b d").is_none());
        let matched = run("a (b c) b d", "a b d").unwrap();
        assert_eq!(matched.token_count, 3);
    }

    #[test]
    fn test_optional_argument_is_greedy() {
        assert!(run("eat ({object}) please", "eat \"me\" please").is_some());
        assert!(run("eat ({object}) please", "eat please").is_none());
    }

    // ── Choices ────────────────────────────────────────

    #[test]
    fn test_first_matching_choice_wins() {
        let matched = run("[{a}, {b} {c}]", "x y").unwrap();
        assert_eq!(matched.token_count, 1);
        assert_eq!(matched.arguments, bound(&[("a", "x")]));
    }

    #[test]
    fn test_no_choice_matches() {
        assert!(run("[explode, blow up]", "self destruct").is_none());
    }

    #[test]
    fn test_consumes_prefix_only() {
        let matched = run("kill {user}", "kill 'player' now").unwrap();
        assert_eq!(matched.token_count, 2);
    }

    // ── Properties ─────────────────────────────────────

    proptest! {
        #[test]
        fn test_optional_always_matches(
            tokens in prop::collection::vec("[a-z]{1,4}", 0..6),
            inner in prop::collection::vec("[a-z]{1,4}", 1..4),
        ) {
            let literal = CommandComponent::literal(&inner.join(" ")).unwrap();
            let optional = CommandComponent::optional(vec![literal, CommandComponent::argument("x")]);
            let matched = match_component(&tokens, &optional);
            prop_assert!(matched.is_some());
        }
    }
}
