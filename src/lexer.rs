use crate::error::Error;
use crate::token::{Op, Token, TokenKind};

#[must_use]
/// Check if `ident` is a valid identifier
///
/// # Examples
///
/// ```
/// # use calcplot::is_identifier;
///
/// assert_eq!(is_identifier("log10"), true);
/// assert_eq!(is_identifier("34zb"), false);
/// assert_eq!(is_identifier("x.real"), false);
/// ```
pub fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    // Check first char
    if !chars.next().map_or(false, is_identifier_start) {
        return false;
    }
    // Check all others
    chars.all(is_identifier_part)
}

/// An helper struct for lexing the input.
///
/// Tokens are produced lazily, so that a parser consuming them can reject an
/// unknown name before the lexer ever reaches later, unrelated input.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer { input, position: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().map_or(false, &predicate) {
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.eat_while(char::is_whitespace);
        let offset = self.position;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };

        let kind = match c {
            c if c.is_ascii_digit() || c == '.' => self.number(offset)?,
            c if is_identifier_start(c) => {
                self.eat_while(is_identifier_part);
                TokenKind::Ident(self.input[offset..self.position].to_owned())
            }
            '+' => TokenKind::Op(Op::Plus),
            '-' => TokenKind::Op(Op::Minus),
            '*' if self.peek_char() == Some('*') => {
                self.bump();
                TokenKind::Op(Op::Pow)
            }
            '*' => TokenKind::Op(Op::Mul),
            '/' => TokenKind::Op(Op::Div),
            '^' => TokenKind::Op(Op::Pow),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            other => {
                return Err(Error::InvalidExpression(format!(
                    "unexpected character '{}' at offset {}",
                    other, offset
                )));
            }
        };
        Ok(Some(Token { kind, offset }))
    }

    /// Lex the rest of a float literal whose first character was already
    /// consumed.
    fn number(&mut self, offset: usize) -> Result<TokenKind, Error> {
        self.eat_while(|c| c.is_ascii_digit());
        if self.input[offset..self.position].starts_with('.') {
            // leading dot: ".5", the fraction is already consumed
        } else if self.peek_char() == Some('.') {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }

        if let Some('e') | Some('E') = self.peek_char() {
            let exponent_follows = match self.peek_second() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self.input[self.position..]
                    .chars()
                    .nth(2)
                    .map_or(false, |c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                self.bump();
                if let Some('+') | Some('-') = self.peek_char() {
                    self.bump();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }

        let literal = &self.input[offset..self.position];
        let value: f64 = literal.parse().map_err(|_| {
            Error::InvalidExpression(format!(
                "invalid number '{}' at offset {}",
                literal, offset
            ))
        })?;
        if value.is_infinite() {
            return Err(Error::Overflow(format!(
                "number '{}' at offset {} is too large",
                literal, offset
            )));
        }
        Ok(TokenKind::Number(value))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Check if `c` can appear at the first character of an identifier
fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Check if `c` can appear inside an identifier
fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kinds(input: &str) -> Result<Vec<TokenKind>, Error> {
        Lexer::new(input)
            .map(|token| token.map(|t| t.kind))
            .collect()
    }

    #[test_case("2 + 2" => Ok(vec![TokenKind::Number(2.0), TokenKind::Op(Op::Plus), TokenKind::Number(2.0)]) ; "addition is lexed properly")]
    #[test_case("2+2" => Ok(vec![TokenKind::Number(2.0), TokenKind::Op(Op::Plus), TokenKind::Number(2.0)]) ; "spaces are optional")]
    #[test_case("x**2" => Ok(vec![TokenKind::Ident("x".into()), TokenKind::Op(Op::Pow), TokenKind::Number(2.0)]) ; "double star is power")]
    #[test_case("x^2" => Ok(vec![TokenKind::Ident("x".into()), TokenKind::Op(Op::Pow), TokenKind::Number(2.0)]) ; "caret is power")]
    #[test_case("1.5e-3" => Ok(vec![TokenKind::Number(1.5e-3)]) ; "scientific notation")]
    #[test_case(".5" => Ok(vec![TokenKind::Number(0.5)]) ; "leading dot")]
    #[test_case("2e" => Ok(vec![TokenKind::Number(2.0), TokenKind::Ident("e".into())]) ; "dangling exponent is a name")]
    fn lex(input: &str) -> Result<Vec<TokenKind>, Error> {
        kinds(input)
    }

    #[test]
    fn offsets() {
        let tokens: Vec<Token> = Lexer::new("sin( x)").collect::<Result<_, _>>().unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 3, 5, 6]);
    }

    #[test]
    fn rejects_unknown_characters() {
        for input in &["'os'", "x[0]", "a = 1", "f(x, y)", "x @ 2", "é"] {
            let result = kinds(input);
            assert!(
                matches!(result, Err(Error::InvalidExpression(_))),
                "{} lexed as {:?}",
                input,
                result
            );
        }
    }

    #[test]
    fn oversized_literals_overflow() {
        assert!(matches!(kinds("1e400"), Err(Error::Overflow(_))));
        assert!(matches!(kinds("2 * 1e309"), Err(Error::Overflow(_))));
        assert_eq!(kinds("1e308"), Ok(vec![TokenKind::Number(1e308)]));
    }

    #[test]
    fn lone_dot_is_invalid() {
        assert!(matches!(kinds("."), Err(Error::InvalidExpression(_))));
    }

    #[test]
    fn idents() {
        let identifiers = ["_______", "abc", "log10", "a__45__bc", "__import__"];
        for i in &identifiers {
            assert!(is_identifier(i));
        }

        let non_identifiers = ["a-bc", "@bc", "6bc", "ab.c", "abc[0]", ""];
        for ni in &non_identifiers {
            assert!(!is_identifier(ni));
        }
    }
}
