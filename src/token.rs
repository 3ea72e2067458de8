use std::fmt::Display;

use crate::value::Vector;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start..span.end).into()
    }
}

/// A token as produced by the lexer, together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
}

/// The flat token stream the evaluator rewrites. Equality is structural.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Vector),
    Bracket(Delimiter),
    Array(Delimiter),
    Operation(Operation),
    Variable(String),
    Function(String),
    Separator,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delimiter {
    Open,
    Close,
}

impl Delimiter {
    /// How this delimiter changes the nesting depth.
    pub fn depth_change(self) -> i32 {
        match self {
            Delimiter::Open => 1,
            Delimiter::Close => -1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Factorial,
}

impl Operation {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '%' => Some(Self::Mod),
            '^' => Some(Self::Pow),
            '!' => Some(Self::Factorial),
            _ => None,
        }
    }
}

impl Token {
    pub const OPEN_PAREN: Token = Token::Bracket(Delimiter::Open);
    pub const CLOSE_PAREN: Token = Token::Bracket(Delimiter::Close);

    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Token::Operation(_))
    }

    pub fn scalar(value: f64) -> Self {
        Token::Number(Vector::scalar(value))
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
            Operation::Mod => "%",
            Operation::Pow => "^",
            Operation::Factorial => "!",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(values) => write!(f, "{}", values),
            Token::Bracket(Delimiter::Open) => write!(f, "("),
            Token::Bracket(Delimiter::Close) => write!(f, ")"),
            Token::Array(Delimiter::Open) => write!(f, "["),
            Token::Array(Delimiter::Close) => write!(f, "]"),
            Token::Operation(op) => write!(f, "{}", op),
            Token::Variable(name) | Token::Function(name) => write!(f, "{}", name),
            Token::Separator => write!(f, ","),
        }
    }
}
