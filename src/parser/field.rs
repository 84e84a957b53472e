//! Deconstruction of raw template fields into literal and variable segments

use logos::Logos;
use thiserror::Error;

use super::lexer::Token;

/// Errors that can occur while deconstructing a raw field value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The raw field was the empty string
    #[error("could not parse empty property")]
    EmptyProperty,

    /// A `$` was opened and never closed
    #[error("unclosed variable reference in '{raw}'")]
    UnclosedReference { raw: String },
}

/// A raw field split into alternating literal and variable segments.
///
/// Reconstruction always starts and ends with a literal: there is exactly one
/// more literal than there are variables, with empty strings filling the gaps
/// around and between adjacent references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeconstructedField {
    /// Literal segments in order; `variables.len() + 1` entries.
    pub literals: Vec<String>,
    /// Referenced variable names in order.
    pub variables: Vec<String>,
}

impl DeconstructedField {
    /// True when the field references at least one variable.
    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// True when the whole field is a single bare reference with no
    /// surrounding literal text.
    pub fn is_single_variable(&self) -> bool {
        self.variables.len() == 1
            && self.literals.len() == 2
            && self.literals[0].is_empty()
            && self.literals[1].is_empty()
    }

    /// Rebuild the raw text this field was deconstructed from.
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        for (index, literal) in self.literals.iter().enumerate() {
            out.push_str(&literal.replace('$', "$$"));
            if let Some(variable) = self.variables.get(index) {
                out.push('$');
                out.push_str(variable);
                out.push('$');
            }
        }
        out
    }
}

/// Split a raw field into its literal and variable segments.
///
/// `$` opens a reference and the text up to the next `$` is the variable
/// name; `$$` is an escaped literal dollar sign. Empty input and unclosed
/// references are errors.
pub fn parse_field(raw: &str) -> Result<DeconstructedField, FieldError> {
    if raw.is_empty() {
        return Err(FieldError::EmptyProperty);
    }
    let mut literals = Vec::new();
    let mut variables = Vec::new();
    let mut current = String::new();
    let mut lexer = Token::lexer(raw);
    while let Some(token) = lexer.next() {
        match token {
            Ok(Token::Literal) => current.push_str(lexer.slice()),
            Ok(Token::EscapedDollar) => current.push('$'),
            Ok(Token::Reference) => {
                let slice = lexer.slice();
                variables.push(slice[1..slice.len() - 1].to_string());
                literals.push(std::mem::take(&mut current));
            }
            Ok(Token::UnclosedDollar) | Err(()) => {
                return Err(FieldError::UnclosedReference {
                    raw: raw.to_string(),
                });
            }
        }
    }
    literals.push(current);
    Ok(DeconstructedField { literals, variables })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_plain_literal() {
        let field = parse_field("plain text").expect("Should parse");
        assert!(!field.has_variables());
        assert_eq!(field.literals, vec!["plain text".to_string()]);
        assert_eq!(field.variables, Vec::<String>::new());
    }

    #[test]
    fn test_parse_single_variable() {
        let field = parse_field("$username$").expect("Should parse");
        assert!(field.has_variables());
        assert!(field.is_single_variable());
        assert_eq!(field.variables, vec!["username".to_string()]);
        assert_eq!(field.literals, vec![String::new(), String::new()]);
    }

    #[test]
    fn test_parse_mixed_segments() {
        let field = parse_field("Hello $first$ $last$!").expect("Should parse");
        assert_eq!(
            field.variables,
            vec!["first".to_string(), "last".to_string()]
        );
        assert_eq!(
            field.literals,
            vec!["Hello ".to_string(), " ".to_string(), "!".to_string()]
        );
        assert!(!field.is_single_variable());
    }

    #[test]
    fn test_parse_adjacent_variables() {
        let field = parse_field("$a$$b$").expect("Should parse");
        assert_eq!(field.variables, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            field.literals,
            vec![String::new(), String::new(), String::new()]
        );
    }

    #[test]
    fn test_parse_escaped_dollar() {
        let field = parse_field("$$").expect("Should parse");
        assert!(!field.has_variables());
        assert_eq!(field.literals, vec!["$".to_string()]);

        let field = parse_field("cost: 5$$").expect("Should parse");
        assert_eq!(field.literals, vec!["cost: 5$".to_string()]);
    }

    #[test]
    fn test_parse_empty_input_errors() {
        assert_eq!(parse_field(""), Err(FieldError::EmptyProperty));
    }

    #[test]
    fn test_parse_unclosed_reference_errors() {
        let err = parse_field("price: $amount").expect_err("Should fail");
        assert_eq!(
            err,
            FieldError::UnclosedReference {
                raw: "price: $amount".to_string()
            }
        );
        assert!(parse_field("$").is_err());
        assert!(parse_field("$$$").is_err());
    }

    #[test]
    fn test_literal_count_invariant() {
        for raw in ["x", "$a$", "x$a$y", "$a$$b$", "one $two$ three $four$"] {
            let field = parse_field(raw).expect("Should parse");
            assert_eq!(field.literals.len(), field.variables.len() + 1, "{raw}");
        }
    }

    #[test]
    fn test_reconstruct_round_trip() {
        for raw in ["plain", "$a$", "x$a$y", "$a$$b$", "a$$b", "$$"] {
            let field = parse_field(raw).expect("Should parse");
            assert_eq!(field.reconstruct(), raw);
        }
    }
}
