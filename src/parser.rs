//! Recursive descent (precedence climbing) parser from tokens to [`Ast`].
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := ("+" | "-") unary | power
//! power   := primary (("**" | "^") unary)?
//! primary := NUMBER | "x" | CONSTANT | FUNCTION "(" expr ")" | "(" expr ")"
//! ```
//!
//! Identifiers are resolved against the [`Registry`] as soon as they are
//! read. Nothing else can be named, so there is no way for an expression to
//! reach anything outside the registry.

use crate::ast::Ast;
use crate::error::Error;
use crate::lexer::Lexer;
use crate::registry::{Binding, Registry, VARIABLE};
use crate::token::{Op, Token, TokenKind, UNARY_PRECEDENCE};
use std::iter::Peekable;

/// Maximum nesting of sub-expressions
const MAX_DEPTH: usize = 200;

/// Parse `input` into an optimized [`Ast`], resolving names in `registry`.
pub fn parse(input: &str, registry: &Registry) -> Result<Ast, Error> {
    let mut parser = Parser {
        tokens: Lexer::new(input).peekable(),
        registry,
        depth: 0,
        end: input.len(),
    };
    let ast = parser.expression(0)?;
    if let Some(token) = parser.next_token()? {
        return Err(unexpected(&token));
    }
    ast.optimize()
}

struct Parser<'a, 'r> {
    tokens: Peekable<Lexer<'a>>,
    registry: &'r Registry,
    depth: usize,
    end: usize,
}

impl<'a, 'r> Parser<'a, 'r> {
    fn peek(&mut self) -> Result<Option<&Token>, Error> {
        match self.tokens.peek() {
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(None),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.tokens.next().transpose()
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), Error> {
        match self.next_token()? {
            Some(ref token) if token.kind == expected => Ok(()),
            Some(token) => Err(Error::InvalidExpression(format!(
                "expected '{}' but found '{}' at offset {}",
                expected, token.kind, token.offset
            ))),
            None => Err(Error::InvalidExpression(format!(
                "expected '{}' at end of expression",
                expected
            ))),
        }
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Ast, Error> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::InvalidExpression(
                "expression is nested too deeply".into(),
            ));
        }

        let mut left = self.unary()?;
        loop {
            let op = match self.peek()? {
                Some(Token {
                    kind: TokenKind::Op(op),
                    ..
                }) if op.precedence() >= min_precedence => *op,
                _ => break,
            };
            self.next_token()?;
            let next_precedence = if op.is_left_associative() {
                op.precedence() + 1
            } else {
                op.precedence()
            };
            let right = self.expression(next_precedence)?;
            left = Ast::binary(op, left, right);
        }

        self.depth -= 1;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Ast, Error> {
        let op = match self.peek()? {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) if matches!(op, Op::Minus | Op::Plus) => *op,
            _ => return self.primary(),
        };
        self.next_token()?;
        let operand = self.expression(UNARY_PRECEDENCE)?;
        if op == Op::Minus {
            Ok(Ast::Neg(Box::new(operand)))
        } else {
            Ok(operand)
        }
    }

    fn primary(&mut self) -> Result<Ast, Error> {
        let token = match self.next_token()? {
            Some(token) => token,
            None => {
                return Err(Error::InvalidExpression(format!(
                    "unexpected end of expression at offset {}",
                    self.end
                )))
            }
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Ast::Value(value)),
            TokenKind::LParen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(ref name) if name == VARIABLE => Ok(Ast::Variable),
            TokenKind::Ident(ref name) => match self.registry.lookup(name) {
                Some(Binding::Constant(value)) => Ok(Ast::Value(value)),
                Some(Binding::Function(func)) => {
                    match self.peek()? {
                        Some(Token {
                            kind: TokenKind::LParen,
                            ..
                        }) => {}
                        _ => {
                            return Err(Error::InvalidExpression(format!(
                                "function '{}' at offset {} must be called with parentheses",
                                name, token.offset
                            )))
                        }
                    }
                    self.expect(TokenKind::LParen)?;
                    let arg = self.expression(0)?;
                    self.expect(TokenKind::RParen)?;
                    Ok(Ast::Function(func, Box::new(arg)))
                }
                None => Err(Error::InvalidExpression(format!(
                    "unknown name '{}' at offset {} (allowed names: {})",
                    name,
                    token.offset,
                    self.registry.names().join(", ")
                ))),
            },
            TokenKind::Op(_) | TokenKind::RParen => Err(unexpected(&token)),
        }
    }
}

fn unexpected(token: &Token) -> Error {
    Error::InvalidExpression(format!(
        "unexpected token '{}' at offset {}",
        token.kind, token.offset
    ))
}
