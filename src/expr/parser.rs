//! Recursive-descent parser for rule expressions
//!
//! Grammar (precedence highest to lowest: NOT, AND, OR):
//!
//! ```text
//! expr       := or
//! or         := and (OR and)*
//! and        := unary (AND unary)*
//! unary      := NOT unary | primary
//! primary    := '(' expr ')' | 'true' | 'false' | comparison
//! comparison := field ('==' | '!=' | '>' | '>=' | '<' | '<=') scalar
//!             | field 'contains' scalar
//!             | field 'in' list
//! scalar     := string | number
//! list       := '[' (scalar (',' scalar)*)? ']'
//! ```
//!
//! Parsing is purely syntactic: field names are kept as written and
//! checked against the schema by [`crate::expr::validate`].

use crate::core::error::ParseError;
use crate::expr::ast::{CompareOp, Expr, Literal};
use crate::expr::lexer::{Spanned, Token, tokenize};

/// Parse expression text into an AST, or fail with a positioned error
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ParseError::new("empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some(trailing) = parser.peek() {
        return Err(ParseError::at(
            format!("unexpected {} after expression", trailing.token.describe()),
            trailing.offset,
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().map(|s| &s.token) == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(spanned) if spanned.token == expected => Ok(()),
            Some(spanned) => Err(ParseError::at(
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    spanned.token.describe()
                ),
                spanned.offset,
            )),
            None => Err(ParseError::new(format!(
                "expected {}, found end of expression",
                expected.describe()
            ))),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_and()?;
        let mut children = vec![first];
        while self.eat(&Token::Or) {
            children.push(self.parse_and()?);
        }
        if children.len() == 1 {
            Ok(children.pop().unwrap())
        } else {
            Ok(Expr::Or(children))
        }
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_unary()?;
        let mut children = vec![first];
        while self.eat(&Token::And) {
            children.push(self.parse_unary()?);
        }
        if children.len() == 1 {
            Ok(children.pop().unwrap())
        } else {
            Ok(Expr::And(children))
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Not) {
            let child = self.parse_unary()?;
            Ok(Expr::Not(Box::new(child)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(spanned) = self.advance() else {
            return Err(ParseError::new("unexpected end of expression"));
        };

        match spanned.token {
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::True => Ok(Expr::Literal(true)),
            Token::False => Ok(Expr::Literal(false)),
            Token::Ident(field) => self.parse_comparison(field),
            other => Err(ParseError::at(
                format!("unexpected {}", other.describe()),
                spanned.offset,
            )),
        }
    }

    fn parse_comparison(&mut self, field: String) -> Result<Expr, ParseError> {
        let Some(spanned) = self.advance() else {
            return Err(ParseError::new(format!(
                "expected an operator after field '{}', found end of expression",
                field
            )));
        };

        let (op, value) = match spanned.token {
            Token::Op(op) => (op, self.parse_scalar()?),
            Token::Contains => (CompareOp::Contains, self.parse_scalar()?),
            Token::In => (CompareOp::In, self.parse_list()?),
            other => {
                return Err(ParseError::at(
                    format!(
                        "expected an operator after field '{}', found {}",
                        field,
                        other.describe()
                    ),
                    spanned.offset,
                ));
            }
        };

        Ok(Expr::Comparison { field, op, value })
    }

    fn parse_scalar(&mut self) -> Result<Literal, ParseError> {
        match self.advance() {
            Some(Spanned {
                token: Token::Str(s),
                ..
            }) => Ok(Literal::Text(s)),
            Some(Spanned {
                token: Token::Number(n),
                ..
            }) => Ok(Literal::Number(n)),
            Some(spanned) => Err(ParseError::at(
                format!(
                    "expected a string or number literal, found {}",
                    spanned.token.describe()
                ),
                spanned.offset,
            )),
            None => Err(ParseError::new(
                "expected a string or number literal, found end of expression",
            )),
        }
    }

    fn parse_list(&mut self) -> Result<Literal, ParseError> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();
        if self.eat(&Token::RBracket) {
            return Ok(Literal::List(items));
        }
        loop {
            items.push(self.parse_scalar()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::RBracket)?;
            break;
        }
        Ok(Literal::List(items))
    }
}
