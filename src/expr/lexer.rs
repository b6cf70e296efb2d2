//! Tokenizer for rule expressions
//!
//! Produces a flat token stream with byte offsets so parse errors can
//! point back into the source text. Keywords are case-insensitive;
//! strings accept single or double quotes, without escape sequences.

use crate::core::error::ParseError;
use crate::expr::ast::CompareOp;

/// One lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Field name or other bare identifier
    Ident(String),
    /// Quoted string literal
    Str(String),
    /// Integer or decimal literal
    Number(f64),
    /// Symbolic comparison operator
    Op(CompareOp),
    And,
    Or,
    Not,
    Contains,
    In,
    True,
    False,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl Token {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Number(n) => format!("number {}", n),
            Token::Op(op) => format!("operator '{}'", op.symbol()),
            Token::And => "'AND'".to_string(),
            Token::Or => "'OR'".to_string(),
            Token::Not => "'NOT'".to_string(),
            Token::Contains => "'contains'".to_string(),
            Token::In => "'in'".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

/// A token together with its byte offset in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Tokenize an expression, or fail with an offset-carrying error
pub fn tokenize(text: &str) -> Result<Vec<Spanned>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let ch = bytes[pos] as char;

        match ch {
            c if c.is_ascii_whitespace() => {
                pos += 1;
            }
            '(' => {
                tokens.push(Spanned { token: Token::LParen, offset: start });
                pos += 1;
            }
            ')' => {
                tokens.push(Spanned { token: Token::RParen, offset: start });
                pos += 1;
            }
            '[' => {
                tokens.push(Spanned { token: Token::LBracket, offset: start });
                pos += 1;
            }
            ']' => {
                tokens.push(Spanned { token: Token::RBracket, offset: start });
                pos += 1;
            }
            ',' => {
                tokens.push(Spanned { token: Token::Comma, offset: start });
                pos += 1;
            }
            '"' | '\'' => {
                pos += 1;
                let content_start = pos;
                while pos < bytes.len() && bytes[pos] as char != ch {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(ParseError::at("unterminated string literal", start));
                }
                let content = text[content_start..pos].to_string();
                tokens.push(Spanned { token: Token::Str(content), offset: start });
                pos += 1;
            }
            '=' | '!' | '<' | '>' => {
                let mut end = pos + 1;
                if end < bytes.len() && bytes[end] as char == '=' {
                    end += 1;
                }
                let symbol = &text[pos..end];
                match CompareOp::from_symbol(symbol) {
                    Some(op) => tokens.push(Spanned { token: Token::Op(op), offset: start }),
                    None => {
                        return Err(ParseError::at(
                            format!("unknown operator '{}'", symbol),
                            start,
                        ));
                    }
                }
                pos = end;
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut end = pos + 1;
                let mut seen_dot = false;
                while end < bytes.len() {
                    let d = bytes[end] as char;
                    if d.is_ascii_digit() {
                        end += 1;
                    } else if d == '.' && !seen_dot {
                        seen_dot = true;
                        end += 1;
                    } else {
                        break;
                    }
                }
                let slice = &text[pos..end];
                let value: f64 = slice
                    .parse()
                    .map_err(|_| ParseError::at(format!("invalid number '{}'", slice), start))?;
                tokens.push(Spanned { token: Token::Number(value), offset: start });
                pos = end;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = pos + 1;
                while end < bytes.len() {
                    let d = bytes[end] as char;
                    if d.is_ascii_alphanumeric() || d == '_' {
                        end += 1;
                    } else {
                        break;
                    }
                }
                let word = &text[pos..end];
                let token = match word.to_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "contains" => Token::Contains,
                    "in" => Token::In,
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word.to_string()),
                };
                tokens.push(Spanned { token, offset: start });
                pos = end;
            }
            other => {
                return Err(ParseError::at(
                    format!("unexpected character '{}'", other),
                    start,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(
            kinds("rarity == \"mythic\""),
            vec![
                Token::Ident("rarity".to_string()),
                Token::Op(CompareOp::Eq),
                Token::Str("mythic".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("NOT a AND b or c"),
            vec![
                Token::Not,
                Token::Ident("a".to_string()),
                Token::And,
                Token::Ident("b".to_string()),
                Token::Or,
                Token::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("price >= 10.5"),
            vec![
                Token::Ident("price".to_string()),
                Token::Op(CompareOp::Ge),
                Token::Number(10.5),
            ]
        );
        assert_eq!(kinds("-3"), vec![Token::Number(-3.0)]);
    }

    #[test]
    fn test_list_literal() {
        assert_eq!(
            kinds("rarity in [\"rare\", 'mythic']"),
            vec![
                Token::Ident("rarity".to_string()),
                Token::In,
                Token::LBracket,
                Token::Str("rare".to_string()),
                Token::Comma,
                Token::Str("mythic".to_string()),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("a == 1").unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 2);
        assert_eq!(tokens[2].offset, 5);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("name == \"oops").unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.offset, Some(8));
    }

    #[test]
    fn test_unknown_operator() {
        let err = tokenize("a ! b").unwrap_err();
        assert!(err.message.contains("unknown operator"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a == 1 # comment").unwrap_err();
        assert!(err.message.contains("unexpected character"));
    }
}
