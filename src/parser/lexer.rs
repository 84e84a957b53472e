//! Token definitions for raw template field values

use logos::Logos;

/// Tokens of a raw template field.
///
/// A field is a run of literal text with `$name$` references embedded in it.
/// A doubled delimiter `$$` is an escaped literal dollar sign; a `$` with no
/// closing partner is malformed input.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// An escaped dollar sign, absorbed into the surrounding literal.
    #[token("$$")]
    EscapedDollar,

    /// A `$name$` variable reference, delimiters included in the slice.
    #[regex(r"\$[^$]+\$")]
    Reference,

    /// A run of literal text between references.
    #[regex(r"[^$]+")]
    Literal,

    /// A `$` that was opened and never closed.
    #[token("$")]
    UnclosedDollar,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<(Token, &str)> {
        let mut lexer = Token::lexer(input);
        let mut out = Vec::new();
        while let Some(token) = lexer.next() {
            out.push((token.expect("Should lex"), lexer.slice()));
        }
        out
    }

    #[test]
    fn test_lex_plain_literal() {
        assert_eq!(lex("hello"), vec![(Token::Literal, "hello")]);
    }

    #[test]
    fn test_lex_reference() {
        assert_eq!(
            lex("a$name$b"),
            vec![
                (Token::Literal, "a"),
                (Token::Reference, "$name$"),
                (Token::Literal, "b"),
            ]
        );
    }

    #[test]
    fn test_lex_escaped_dollar() {
        assert_eq!(
            lex("a$$b"),
            vec![
                (Token::Literal, "a"),
                (Token::EscapedDollar, "$$"),
                (Token::Literal, "b"),
            ]
        );
    }

    #[test]
    fn test_lex_adjacent_references() {
        assert_eq!(
            lex("$x$$y$"),
            vec![(Token::Reference, "$x$"), (Token::Reference, "$y$")]
        );
    }

    #[test]
    fn test_lex_unclosed_dollar() {
        assert_eq!(
            lex("abc$"),
            vec![(Token::Literal, "abc"), (Token::UnclosedDollar, "$")]
        );
    }
}
