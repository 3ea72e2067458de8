//! Operator reduction passes. Each one is a single left-to-right scan that
//! combines the operands of one operator class and copies everything else
//! through. They always run in the same order: factorial, power,
//! multiplication/division/modulo, unary negation, addition/subtraction.
//! Power therefore groups from the left (`2^3^2 == 64`), and a minus
//! directly after `^` or `*` is only negated once those have been reduced.

use tracing::trace;

use crate::{
    error::EvalError,
    token::{Operation, Token},
};

/// Postfix `!` on the number before it.
pub(crate) fn apply_factorial(tokens: Vec<Token>) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token == Token::Operation(Operation::Factorial) {
            if let Some(Token::Number(value)) = result.last_mut() {
                *value = value.factorial();
                continue;
            }
        }
        result.push(token);
    }
    result
}

pub(crate) fn apply_pow(tokens: Vec<Token>) -> crate::Result<Vec<Token>> {
    reduce_binary(tokens, &[Operation::Pow])
}

pub(crate) fn apply_mul_div(tokens: Vec<Token>) -> crate::Result<Vec<Token>> {
    reduce_binary(tokens, &[Operation::Mul, Operation::Div, Operation::Mod])
}

pub(crate) fn apply_add_sub(tokens: Vec<Token>) -> crate::Result<Vec<Token>> {
    reduce_binary(tokens, &[Operation::Add, Operation::Sub])
}

/// Negates a number preceded by a `-` which itself follows another operator
/// or starts the expression.
pub(crate) fn apply_negation(tokens: Vec<Token>) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
    // The start of the expression counts as an operator.
    let mut previous_is_operation = true;
    let mut before_previous_is_operation = true;
    let mut previous_is_minus = false;

    for token in tokens {
        let is_operation = token.is_operation();
        let is_minus = token == Token::Operation(Operation::Sub);

        match token {
            Token::Number(value) if previous_is_minus && before_previous_is_operation => {
                result.pop();
                result.push(Token::Number(-&value));
            }
            token => result.push(token),
        }

        before_previous_is_operation = previous_is_operation;
        previous_is_operation = is_operation;
        previous_is_minus = is_minus;
    }

    result
}

/// Folds `number op number` for every `op` in `ops`, left to right. An
/// operator whose neighbours aren't both numbers is copied through.
fn reduce_binary(tokens: Vec<Token>, ops: &[Operation]) -> crate::Result<Vec<Token>> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();
    let mut previous_is_number = false;

    while let Some(token) = tokens.next() {
        match token {
            Token::Operation(op) if previous_is_number && ops.contains(&op) => {
                if tokens.peek().is_none() {
                    return Err(EvalError::malformed(format!("missing operand after '{op}'")));
                }
                if let Some(Token::Number(rhs)) = tokens.next_if(Token::is_number) {
                    let Some(Token::Number(lhs)) = result.pop() else {
                        return Err(EvalError::malformed(format!("missing operand before '{op}'")));
                    };
                    result.push(Token::Number(lhs.apply(op, &rhs)?));
                } else {
                    result.push(Token::Operation(op));
                    previous_is_number = false;
                }
            }
            token => {
                previous_is_number = token.is_number();
                result.push(token);
            }
        }
    }

    trace!(?ops, remaining = result.len(), "reduced");
    Ok(result)
}
