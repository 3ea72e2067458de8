//! The evaluator rewrites a flat token stream until a single number is left.
//!
//! There is no syntax tree. Arrays and parenthesised groups are evaluated
//! recursively on their slice of the stream and replaced by one number
//! token; then names are resolved, functions applied, and the operator
//! classes reduced one linear pass at a time (see [`reduce`]).

pub(crate) mod reduce;

use std::mem;

use tracing::trace;

use crate::{
    error::EvalError,
    lexer::tokenize,
    scope::Scope,
    token::{Delimiter, Token},
    value::Vector,
};

/// Tokenizes and evaluates `text`.
pub fn evaluate(scope: &dyn Scope, text: &str) -> crate::Result<Vector> {
    let tokens = tokenize(text)?;
    evaluate_tokens(scope, &tokens)
}

/// Evaluates a token sequence. Sub-expressions recurse back into here.
pub fn evaluate_tokens(scope: &dyn Scope, tokens: &[Token]) -> crate::Result<Vector> {
    if tokens.is_empty() {
        return Err(EvalError::malformed("empty expression"));
    }
    trace!(depth = scope.depth(), count = tokens.len(), "evaluating");

    let tokens = coalesce_arrays(scope, tokens)?;
    let tokens = flatten_brackets(scope, &tokens)?;
    let tokens = insert_variable_values(scope, tokens);
    let tokens = apply_functions(scope, tokens)?;

    let tokens = reduce::apply_factorial(tokens);
    let tokens = reduce::apply_pow(tokens)?;
    let tokens = reduce::apply_mul_div(tokens)?;
    let tokens = reduce::apply_negation(tokens);
    let tokens = reduce::apply_add_sub(tokens)?;

    if let Some(Token::Variable(name)) = tokens.iter().find(|t| matches!(t, Token::Variable(_))) {
        return Err(EvalError::malformed(format!("unknown variable '{name}'")));
    }

    match <[Token; 1]>::try_from(tokens) {
        Ok([Token::Number(result)]) => Ok(result),
        Ok([other]) => Err(EvalError::malformed(format!(
            "expected a number, found '{other}'"
        ))),
        Err(rest) => Err(EvalError::malformed(format!(
            "{} terms left over after evaluation",
            rest.len()
        ))),
    }
}

/// Replaces every top-level `[...]` with a single number token holding one
/// element per comma-separated entry. An entry that doesn't evaluate to a
/// scalar becomes an absent element.
fn coalesce_arrays(scope: &dyn Scope, tokens: &[Token]) -> crate::Result<Vec<Token>> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut array_depth = 0usize;
    let mut paren_depth = 0i32;
    let mut element_start = 0;
    let mut elements = Vec::new();

    let push_element = |slice: &[Token], elements: &mut Vec<Option<f64>>| -> crate::Result<()> {
        let value = evaluate_tokens(scope, slice)?;
        elements.push(value.as_scalar().flatten());
        Ok(())
    };

    for (k, token) in tokens.iter().enumerate() {
        match token {
            Token::Array(Delimiter::Open) => {
                if array_depth == 0 {
                    element_start = k + 1;
                    paren_depth = 0;
                }
                array_depth += 1;
            }
            Token::Array(Delimiter::Close) => {
                if array_depth == 0 {
                    return Err(EvalError::unbalanced("unexpected ']'"));
                }
                array_depth -= 1;
                if array_depth == 0 {
                    push_element(&tokens[element_start..k], &mut elements)?;
                    result.push(Token::Number(Vector::new(mem::take(&mut elements))));
                }
            }
            Token::Bracket(d) if array_depth > 0 => paren_depth += d.depth_change(),
            Token::Separator if array_depth == 1 && paren_depth == 0 => {
                push_element(&tokens[element_start..k], &mut elements)?;
                element_start = k + 1;
            }
            _ if array_depth > 0 => {}
            token => result.push(token.clone()),
        }
    }

    if array_depth != 0 {
        return Err(EvalError::unbalanced("missing ']'"));
    }

    Ok(result)
}

/// Evaluates every top-level parenthesised group, keeping its delimiters
/// around the resulting number. A separator directly inside a group splits
/// it into separately evaluated arguments. Afterwards `( x )` collapses to
/// `x`, so a lone parenthesised value is the same as a bare one.
fn flatten_brackets(scope: &dyn Scope, tokens: &[Token]) -> crate::Result<Vec<Token>> {
    let mut flat = Vec::with_capacity(tokens.len());
    let mut depth = 0i32;
    let mut group_start = 0;

    for (k, token) in tokens.iter().enumerate() {
        match token {
            Token::Bracket(d) => {
                if depth == 0 {
                    group_start = k;
                    flat.push(token.clone());
                }
                depth += d.depth_change();
                if depth < 0 {
                    return Err(EvalError::unbalanced("unexpected ')'"));
                }
                if depth == 0 {
                    let inner = &tokens[group_start + 1..k];
                    let is_empty_call = inner.is_empty()
                        && group_start > 0
                        && matches!(tokens[group_start - 1], Token::Function(_));
                    if !is_empty_call {
                        flat.push(Token::Number(evaluate_tokens(scope, inner)?));
                    }
                    flat.push(token.clone());
                }
            }
            Token::Separator if depth == 1 => {
                flat.push(Token::Number(evaluate_tokens(
                    scope,
                    &tokens[group_start + 1..k],
                )?));
                flat.push(Token::Separator);
                group_start = k;
            }
            _ if depth == 0 => flat.push(token.clone()),
            _ => {}
        }
    }

    if depth != 0 {
        return Err(EvalError::unbalanced("missing ')'"));
    }

    let mut result: Vec<Token> = Vec::with_capacity(flat.len());
    for token in flat {
        let n = result.len();
        if token == Token::CLOSE_PAREN
            && n >= 2
            && result[n - 2] == Token::OPEN_PAREN
            && result[n - 1].is_number()
        {
            result.remove(n - 2);
            continue;
        }
        result.push(token);
    }

    Ok(result)
}

/// Substitutes known variables. Unknown names stay as they are and are
/// reported once nothing else can consume them.
fn insert_variable_values(scope: &dyn Scope, tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Variable(name) => match scope.variable(&name) {
                Some(value) => Token::Number(value.clone()),
                None => Token::Variable(name),
            },
            token => token,
        })
        .collect()
}

/// Calls every function token on the argument(s) following it: either a
/// parenthesised, separated list of numbers or a single bare number.
fn apply_functions(scope: &dyn Scope, tokens: Vec<Token>) -> crate::Result<Vec<Token>> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        let Token::Function(name) = token else {
            result.push(token);
            continue;
        };

        let args = match tokens.next() {
            Some(Token::Number(value)) => vec![value],
            Some(Token::Bracket(Delimiter::Open)) => collect_arguments(&name, &mut tokens)?,
            Some(other) => {
                return Err(EvalError::invalid_call(
                    &name,
                    format!("expected arguments, found '{other}'"),
                ))
            }
            None => return Err(EvalError::invalid_call(&name, "missing arguments")),
        };

        let function = scope
            .function(&name)
            .ok_or_else(|| EvalError::invalid_call(&name, "unknown function"))?;
        result.push(Token::Number(function.call(&name, scope, &args)?));
    }

    Ok(result)
}

fn collect_arguments(
    name: &str,
    tokens: &mut std::iter::Peekable<std::vec::IntoIter<Token>>,
) -> crate::Result<Vec<Vector>> {
    let mut args = Vec::new();
    if tokens.next_if_eq(&Token::CLOSE_PAREN).is_some() {
        return Ok(args);
    }

    loop {
        match tokens.next() {
            Some(Token::Number(value)) => args.push(value),
            Some(other) => {
                return Err(EvalError::invalid_call(
                    name,
                    format!("argument {} is not a number: '{other}'", args.len() + 1),
                ))
            }
            None => return Err(EvalError::invalid_call(name, "missing ')'")),
        }

        match tokens.next() {
            Some(Token::Separator) => continue,
            Some(Token::Bracket(Delimiter::Close)) => return Ok(args),
            Some(other) => {
                return Err(EvalError::invalid_call(
                    name,
                    format!("expected ',' or ')', found '{other}'"),
                ))
            }
            None => return Err(EvalError::invalid_call(name, "missing ')'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SymbolTable;

    fn eval(text: &str) -> crate::Result<Vector> {
        evaluate(&SymbolTable::new(), text)
    }

    fn scalar(text: &str) -> f64 {
        match eval(text) {
            Ok(v) => v.as_scalar().flatten().expect("expected a defined scalar"),
            Err(e) => panic!("evaluating '{text}' failed: {e}"),
        }
    }

    #[test]
    fn operator_order() {
        assert_eq!(scalar("2 + 3 * 4"), 14.0);
        assert_eq!(scalar("(2 + 3) * 4"), 20.0);
        assert_eq!(scalar("10 - 4 - 3"), 3.0);
        assert_eq!(scalar("2 * 3!"), 12.0);
        assert_eq!(scalar("-2 ^ 2"), -4.0);
        assert_eq!(scalar("7 % 4 * 2"), 6.0);
    }

    #[test]
    fn power_reduces_left_to_right() {
        assert_eq!(scalar("2 ^ 3 ^ 2"), 64.0);
        assert_eq!(scalar("2 ^ (3 ^ 2)"), 512.0);
    }

    #[test]
    fn unary_minus_after_an_operator() {
        assert_eq!(scalar("-3"), -3.0);
        assert_eq!(scalar("1 + -3"), -2.0);
        assert_eq!(scalar("2 ^ (-2)"), 0.25);
        // Negation runs after power and multiplication, so these are left
        // with an operator and a negative number nobody combines.
        assert!(matches!(eval("2 ^ -2"), Err(EvalError::MalformedExpression(_))));
        assert!(matches!(eval("2 * -3"), Err(EvalError::MalformedExpression(_))));
    }

    #[test]
    fn nested_groups() {
        assert_eq!(scalar("((1 + 2) * (3 + 4))"), 21.0);
        assert_eq!(scalar("(((5)))"), 5.0);
    }

    #[test]
    fn unbalanced_groups() {
        for input in ["(1 + 2", "1 + 2)", ")(", "[1, 2", "1]", "[(1, 2]"] {
            assert!(
                matches!(eval(input), Err(EvalError::UnbalancedGrouping(_))),
                "when evaluating '{input}'"
            );
        }
    }

    #[test]
    fn arrays() {
        assert_eq!(
            eval("[1, 2 + 3, (4)]").unwrap(),
            Vector::from_reals([1.0, 5.0, 4.0])
        );
        assert_eq!(
            eval("[log(8, 2), 2]").unwrap(),
            Vector::from_reals([3.0, 2.0])
        );
        assert_eq!(
            eval("[sqrt(4), sqrt(-4)]").unwrap(),
            Vector::new(vec![Some(2.0), None])
        );
        // A nested vector is not a valid element.
        assert_eq!(
            eval("[[1, 2], [3]]").unwrap(),
            Vector::new(vec![None, Some(3.0)])
        );
        assert_eq!(
            eval("([1, 2] + 1) * 2").unwrap(),
            Vector::from_reals([4.0, 6.0])
        );
        assert!(matches!(eval("[]"), Err(EvalError::MalformedExpression(_))));
    }

    #[test]
    fn variables() {
        assert!((scalar("2 * pi") - std::f64::consts::TAU).abs() < 1e-12);
        assert_eq!(
            eval("y + 1"),
            Err(EvalError::MalformedExpression(
                "unknown variable 'y'".to_string()
            ))
        );
        // Unknown names inside a call are reported the same way.
        assert!(matches!(eval("exp(y)"), Err(EvalError::MalformedExpression(_))));
    }

    #[test]
    fn function_calls() {
        assert_eq!(scalar("exp(0)"), 1.0);
        assert!((scalar("log(100, 10) + 1") - 3.0).abs() < 1e-12);
        assert_eq!(scalar("cos(sin(0))"), 1.0);
        assert_eq!(scalar("-exp(0)"), -1.0);
        assert_eq!(scalar("exp(0)^2 * 3"), 3.0);
    }

    #[test]
    fn invalid_function_calls() {
        for input in ["nope(1)", "sin(1, 2)", "log(1, 2, 3)", "sin()", "log()"] {
            assert!(
                matches!(eval(input), Err(EvalError::InvalidFunctionCall { .. })),
                "when evaluating '{input}': {:?}",
                eval(input)
            );
        }
    }

    #[test]
    fn leftover_terms() {
        for input in ["", "1 2", "2 +", "* 3", "(1, 2)", "1, 2"] {
            assert!(
                matches!(eval(input), Err(EvalError::MalformedExpression(_))),
                "when evaluating '{input}'"
            );
        }
    }
}
