//! Call tokenizer - splits free-text input into one token list per call
//!
//! Handles: bare words, `\` escapes, structured values (quoted strings,
//! inline objects/arrays, comments) and call separators (`;` and line
//! breaks). Command literals are tokenized with the same rules, so a
//! literal matches with exactly the granularity of call input.
//!
//! `#` and `//` start a structured value, so a comment is read together
//! with the value after it. That value may sit past a line break: in
//! `explode # boom\nexplode` the second line joins the first call as the
//! token `# boom\nexplode`.
//!
//! Guarantees:
//! - Deterministic: same input always produces the same token lists
//! - Tokens keep their raw text; escapes and quotes are decoded later, on
//!   argument access

use crate::value;
use crate::{Error, Result};

/// Characters that start a structured value
const STRUCTURED_STARTS: [char; 9] = ['"', '\'', '{', '}', '[', ']', ':', '/', '#'];

/// Position in source text for error reporting
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Tokenizer for call input
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    token: String,
    tokens: Vec<String>,
    calls: Vec<Vec<String>>,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            token: String::new(),
            tokens: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Tokenize the entire input into token lists, one per call
    pub fn tokenize(mut self) -> Result<Vec<Vec<String>>> {
        while let Some(ch) = self.peek() {
            match ch {
                '\\' => self.read_escape()?,
                c if STRUCTURED_STARTS.contains(&c) => self.read_structured()?,
                c if value::is_line_break(c) || c == ';' => {
                    self.advance();
                    self.submit_call();
                }
                c if c.is_whitespace() => {
                    self.advance();
                    self.submit_token();
                }
                c => {
                    self.advance();
                    self.token.push(c);
                }
            }
        }

        self.submit_call();
        Ok(self.calls)
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    // ── Token & call boundaries ────────────────────────────

    fn submit_token(&mut self) {
        if !self.token.is_empty() {
            self.tokens.push(std::mem::take(&mut self.token));
        }
    }

    fn submit_call(&mut self) {
        self.submit_token();
        if !self.tokens.is_empty() {
            self.calls.push(std::mem::take(&mut self.tokens));
        }
    }

    // ── Escapes ────────────────────────────────────────────

    fn read_escape(&mut self) -> Result<()> {
        let span = self.current_span();
        self.advance(); // consume backslash
        match self.advance() {
            Some(escaped) => {
                self.token.push('\\');
                self.token.push(escaped);
                Ok(())
            }
            None => Err(Error::CallSyntax(format!(
                "Incomplete escape sequence: `\\` at {}",
                span
            ))),
        }
    }

    // ── Structured values ──────────────────────────────────

    fn read_structured(&mut self) -> Result<()> {
        self.submit_token();

        let span = self.current_span();
        let length = value::measure(&self.input[self.position..])
            .map_err(|e| Error::CallSyntax(format!("{} at {}", e, span)))?;

        let mut raw = String::new();
        for _ in 0..length {
            if let Some(c) = self.advance() {
                raw.push(c);
            }
        }
        self.token = raw;
        self.submit_token();
        Ok(())
    }
}

/// Tokenize input into one token list per call
pub fn tokenize_all(input: &str) -> Result<Vec<Vec<String>>> {
    let calls = Tokenizer::new(input).tokenize()?;
    tracing::trace!(calls = calls.len(), "tokenized input");
    Ok(calls)
}

/// Tokenize input that must contain exactly one call
pub fn tokenize_single(input: &str) -> Result<Vec<String>> {
    let mut calls = tokenize_all(input)?;
    if calls.len() != 1 {
        return Err(Error::CallSyntax(format!(
            "Expected single command: `{}`",
            input
        )));
    }
    Ok(calls.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(input: &str) -> Vec<Vec<String>> {
        tokenize_all(input).unwrap()
    }

    fn tokenize_err(input: &str) -> String {
        tokenize_all(input).unwrap_err().to_string()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── Words & whitespace ─────────────────────────────

    #[test]
    fn test_tokenize_words() {
        assert_eq!(tokens("kill me now"), vec![words(&["kill", "me", "now"])]);
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(
            tokens("  kill \t\t me  "),
            vec![words(&["kill", "me"])]
        );
    }

    #[test]
    fn test_tokenize_keeps_punctuation_in_words() {
        assert_eq!(tokens("3.2 seconds!"), vec![words(&["3.2", "seconds!"])]);
    }

    // ── Call separators ────────────────────────────────

    #[test]
    fn test_tokenize_multiple_calls() {
        assert_eq!(
            tokens("explode\n    explode   ;explode"),
            vec![words(&["explode"]), words(&["explode"]), words(&["explode"])]
        );
    }

    #[test]
    fn test_tokenize_unicode_line_separators() {
        assert_eq!(
            tokens("a\u{2028}b\u{2029}c\r\nd"),
            vec![words(&["a"]), words(&["b"]), words(&["c"]), words(&["d"])]
        );
    }

    #[test]
    fn test_empty_calls_are_dropped() {
        assert_eq!(tokens(";;\n\n a ;; b ;"), vec![words(&["a"]), words(&["b"])]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("").is_empty());
        assert!(tokens("   \n\t ").is_empty());
    }

    // ── Structured values ──────────────────────────────

    #[test]
    fn test_quoted_argument_is_one_token() {
        assert_eq!(
            tokens("kill 'player' for 'no reason'"),
            vec![words(&["kill", "'player'", "for", "'no reason'"])]
        );
    }

    #[test]
    fn test_quotes_split_adjacent_words() {
        assert_eq!(
            tokens("kill   \t  'player'for'no reason'"),
            vec![words(&["kill", "'player'", "for", "'no reason'"])]
        );
    }

    #[test]
    fn test_inline_object_is_one_token() {
        assert_eq!(
            tokens(r"kill 0 for {reason: 'none \{\}'}"),
            vec![words(&["kill", "0", "for", r"{reason: 'none \{\}'}"])]
        );
    }

    #[test]
    fn test_structured_value_hides_separators() {
        assert_eq!(
            tokens("say 'a; b\nc' ; next"),
            vec![words(&["say", "'a; b\nc'"]), words(&["next"])]
        );
    }

    #[test]
    fn test_comment_absorbs_following_line() {
        assert_eq!(
            tokens("explode # boom\nexplode"),
            vec![words(&["explode", "# boom\nexplode"])]
        );
        assert_eq!(
            tokens("say // hi\n'there'; next"),
            vec![words(&["say", "// hi\n'there'"]), words(&["next"])]
        );
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize_err("kill 'player");
        assert!(err.contains("Unterminated string"));
        assert!(err.contains("1:6"));
    }

    #[test]
    fn test_stray_closing_bracket() {
        assert!(tokenize_all("kill ]").is_err());
    }

    // ── Escapes ────────────────────────────────────────

    #[test]
    fn test_escape_kept_raw() {
        assert_eq!(tokens(r"esc\{ a\ b"), vec![words(&[r"esc\{", r"a\ b"])]);
    }

    #[test]
    fn test_escaped_separator_does_not_split() {
        assert_eq!(tokens(r"a\;b"), vec![words(&[r"a\;b"])]);
    }

    #[test]
    fn test_trailing_escape() {
        let err = tokenize_err("abc\\");
        assert!(err.contains("Incomplete escape sequence"));
    }

    // ── Single call ────────────────────────────────────

    #[test]
    fn test_tokenize_single() {
        assert_eq!(tokenize_single("blow up").unwrap(), words(&["blow", "up"]));
        assert!(matches!(
            tokenize_single("a; b"),
            Err(Error::CallSyntax(_))
        ));
        assert!(matches!(tokenize_single(""), Err(Error::CallSyntax(_))));
    }

    // ── Determinism proof ──────────────────────────────

    #[test]
    fn test_tokenize_determinism_100_iterations() {
        let input = "show emoticon 'smile' for 3.2 seconds in colour {name: 'Red'}; explode";
        let first = tokens(input);
        for i in 0..100 {
            assert_eq!(first, tokens(input), "Determinism failure at iteration {}", i);
        }
    }

    // ── Properties ─────────────────────────────────────

    fn plain_calls() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(
            prop::collection::vec("[a-zA-Z0-9_.,!?=+-]{1,8}", 1..6),
            1..5,
        )
    }

    proptest! {
        #[test]
        fn test_plain_input_is_whitespace_split(
            calls in plain_calls(),
            gap in "[ \t]{1,3}",
            separator in prop::sample::select(vec![";", "\n", " ; ", "\r\n"]),
        ) {
            let input = calls
                .iter()
                .map(|call| call.join(gap.as_str()))
                .collect::<Vec<_>>()
                .join(separator);
            prop_assert_eq!(tokens(&input), calls);
        }

        #[test]
        fn test_retokenizing_joined_call_is_idempotent(calls in plain_calls()) {
            for call in &calls {
                let once = tokenize_single(&call.join(" ")).unwrap();
                let twice = tokenize_single(&once.join(" ")).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
