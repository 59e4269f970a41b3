use std::fmt::{self, Display, Formatter};

/// A token together with the byte offset where it starts in the input
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Possible tokens to find in the input string
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Float literal
    Number(f64),
    /// Any name: the variable, a constant or a function
    Ident(String),
    /// A binary (or unary, for `+` and `-`) operator
    Op(Op),
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
}

impl Display for TokenKind {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Number(value) => write!(fmt, "{}", value),
            Self::Ident(name) => write!(fmt, "{}", name),
            Self::Op(op) => write!(fmt, "{}", op),
            Self::LParen => write!(fmt, "("),
            Self::RParen => write!(fmt, ")"),
        }
    }
}

/// Allowed operators in the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `**` or `^`
    Pow,
}

/// Binding power of a prefix `+` or `-`. Only `**` binds tighter, so that
/// `-x**2` reads as `-(x**2)`.
pub const UNARY_PRECEDENCE: u8 = 3;

impl Op {
    /// Get the operator precedence. Operators with higher precedence should be
    /// evaluated first.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 3,
        }
    }

    /// Check if the operator is left associative
    pub fn is_left_associative(self) -> bool {
        match self {
            Self::Plus | Self::Minus | Self::Mul | Self::Div => true,
            Self::Pow => false,
        }
    }
}

impl Display for Op {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        let symbol = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        };
        fmt.write_str(symbol)
    }
}
