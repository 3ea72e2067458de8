use std::{iter::Peekable, str::CharIndices};

use tracing::trace;

use crate::{
    error::EvalError,
    token::{Delimiter, Lexeme, Operation, Span, Token},
};

/// Splits input text into a flat stream of tokens.
///
/// Operators and brackets are always tokens of their own. Digits, separators
/// and everything else (names) run on until the character class changes or
/// whitespace is hit. A name immediately followed by `(` is a function name.
pub struct Lexer<'source> {
    source: &'source str,
    chars: Peekable<CharIndices<'source>>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Class {
    Number,
    Whitespace,
    Bracket(Delimiter),
    Array(Delimiter),
    Operation(Operation),
    Separator,
    Name,
}

fn classify(c: char) -> Class {
    match c {
        '0'..='9' | '.' => Class::Number,
        c if c.is_whitespace() => Class::Whitespace,
        '(' => Class::Bracket(Delimiter::Open),
        ')' => Class::Bracket(Delimiter::Close),
        '[' => Class::Array(Delimiter::Open),
        ']' => Class::Array(Delimiter::Close),
        ',' | ';' => Class::Separator,
        c => match Operation::from_char(c) {
            Some(op) => Class::Operation(op),
            None => Class::Name,
        },
    }
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Consumes the rest of a run of `class` characters and returns its end.
    fn eat_run(&mut self, class: Class, mut end: usize) -> usize {
        while let Some(&(i, c)) = self.chars.peek() {
            if classify(c) != class {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        end
    }
}

impl Iterator for Lexer<'_> {
    type Item = crate::Result<Lexeme>;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, c) = loop {
            let (start, c) = self.chars.next()?;
            if classify(c) != Class::Whitespace {
                break (start, c);
            }
        };
        let class = classify(c);
        let mut end = start + c.len_utf8();

        let token = match class {
            Class::Bracket(d) => Token::Bracket(d),
            Class::Array(d) => Token::Array(d),
            Class::Operation(Operation::Mul) if self.peek_char() == Some('*') => {
                // `**` is another way to write `^`
                self.chars.next();
                end += 1;
                Token::Operation(Operation::Pow)
            }
            Class::Operation(op) => Token::Operation(op),
            Class::Separator => {
                end = self.eat_run(class, end);
                Token::Separator
            }
            Class::Number => {
                end = self.eat_run(class, end);
                let literal = &self.source[start..end];
                match literal.parse::<f64>() {
                    Ok(value) => Token::scalar(value),
                    Err(_) => {
                        return Some(Err(EvalError::MalformedLiteral {
                            literal: literal.to_string(),
                            span: Span { start, end }.into(),
                        }))
                    }
                }
            }
            Class::Name => {
                end = self.eat_run(class, end);
                let name = self.source[start..end].to_string();
                if self.peek_char() == Some('(') {
                    Token::Function(name)
                } else {
                    Token::Variable(name)
                }
            }
            Class::Whitespace => unreachable!("whitespace is skipped above"),
        };

        Some(Ok(Lexeme {
            token,
            span: Span { start, end },
        }))
    }
}

/// Tokenizes `source`, dropping position information.
pub fn tokenize(source: &str) -> crate::Result<Vec<Token>> {
    let tokens = Lexer::new(source)
        .map(|lexeme| lexeme.map(|l| l.token))
        .collect::<crate::Result<Vec<_>>>()?;
    trace!(count = tokens.len(), "tokenized {:?}", source);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(op: Operation) -> Token {
        Token::Operation(op)
    }

    fn var(name: &str) -> Token {
        Token::Variable(name.to_string())
    }

    #[test]
    fn numbers_and_operators() {
        assert_eq!(
            tokenize("2 + 3.5*4").unwrap(),
            vec![
                Token::scalar(2.0),
                op(Operation::Add),
                Token::scalar(3.5),
                op(Operation::Mul),
                Token::scalar(4.0),
            ]
        );
        assert_eq!(tokenize(".5").unwrap(), vec![Token::scalar(0.5)]);
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \t\n").unwrap().is_empty());
    }

    #[test]
    fn double_star_is_power() {
        assert_eq!(
            tokenize("2**3").unwrap(),
            vec![Token::scalar(2.0), op(Operation::Pow), Token::scalar(3.0)]
        );
        assert_eq!(
            tokenize("2***3").unwrap(),
            vec![
                Token::scalar(2.0),
                op(Operation::Pow),
                op(Operation::Mul),
                Token::scalar(3.0)
            ]
        );
    }

    #[test]
    fn operators_never_merge() {
        assert_eq!(
            tokenize("5!!--").unwrap(),
            vec![
                Token::scalar(5.0),
                op(Operation::Factorial),
                op(Operation::Factorial),
                op(Operation::Sub),
                op(Operation::Sub),
            ]
        );
        assert_eq!(
            tokenize("(([]))").unwrap(),
            vec![
                Token::OPEN_PAREN,
                Token::OPEN_PAREN,
                Token::Array(Delimiter::Open),
                Token::Array(Delimiter::Close),
                Token::CLOSE_PAREN,
                Token::CLOSE_PAREN,
            ]
        );
    }

    #[test]
    fn names_and_functions() {
        assert_eq!(
            tokenize("sin(x) + sin (x)").unwrap(),
            vec![
                Token::Function("sin".to_string()),
                Token::OPEN_PAREN,
                var("x"),
                Token::CLOSE_PAREN,
                op(Operation::Add),
                var("sin"),
                Token::OPEN_PAREN,
                var("x"),
                Token::CLOSE_PAREN,
            ]
        );
        // Digits end a name.
        assert_eq!(tokenize("x2").unwrap(), vec![var("x"), Token::scalar(2.0)]);
        assert_eq!(tokenize("αβ").unwrap(), vec![var("αβ")]);
    }

    #[test]
    fn separators() {
        assert_eq!(
            tokenize("[1, 2; 3]").unwrap(),
            vec![
                Token::Array(Delimiter::Open),
                Token::scalar(1.0),
                Token::Separator,
                Token::scalar(2.0),
                Token::Separator,
                Token::scalar(3.0),
                Token::Array(Delimiter::Close),
            ]
        );
        // Adjacent separators are a single token.
        assert_eq!(
            tokenize("1,,2").unwrap(),
            vec![Token::scalar(1.0), Token::Separator, Token::scalar(2.0)]
        );
    }

    #[test]
    fn malformed_literals() {
        for input in ["1.2.3", ".", "2 + 3..4"] {
            let result = tokenize(input);
            assert!(
                matches!(result, Err(EvalError::MalformedLiteral { .. })),
                "when lexing '{input}'"
            );
        }

        let Err(EvalError::MalformedLiteral { literal, span }) = tokenize("1 + 2.2.2") else {
            panic!("expected a malformed literal");
        };
        assert_eq!(literal, "2.2.2");
        assert_eq!(span, miette::SourceSpan::from(4..9));
    }

    #[test]
    fn spans() {
        let spans = Lexer::new("ab ** 12")
            .map(|l| l.unwrap().span)
            .collect::<Vec<_>>();
        assert_eq!(
            spans,
            vec![
                Span { start: 0, end: 2 },
                Span { start: 3, end: 5 },
                Span { start: 6, end: 8 },
            ]
        );
    }
}
