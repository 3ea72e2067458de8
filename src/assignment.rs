use tracing::debug;

use crate::{
    env::SymbolTable,
    error::EvalError,
    evaluator,
    lexer::tokenize,
    token::Token,
    value::{Closure, MathFunction},
};

/// Handles `name = expr` and `name(a, b, ...) = expr`.
///
/// Only input containing a newline is committed to the symbol table; without
/// one the user is still typing and the right-hand side is merely returned
/// for previewing. Variables are evaluated immediately, function bodies are
/// stored unevaluated. Nothing is stored unless everything succeeds.
pub fn perform_assignment(symbols: &mut SymbolTable, input: &str) -> crate::Result<Vec<Token>> {
    let commit = input.contains('\n');
    let line = input.replace('\n', "");
    let line = line.trim();

    let (target, expression) = line
        .split_once('=')
        .ok_or_else(|| EvalError::malformed("expected an assignment"))?;
    let name = target.split('(').next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(EvalError::malformed("missing name before '='"));
    }

    let tokens = tokenize(expression)?;
    if !commit {
        debug!(name, "previewing assignment");
        return Ok(tokens);
    }

    if let Some(parameters) = parse_parameters(target)? {
        debug!(name, ?parameters, "defining function");
        let closure = Closure::new(parameters, tokens.clone());
        symbols.set_function(name, MathFunction::closure(line, closure));
    } else {
        let value = evaluator::evaluate_tokens(&*symbols, &tokens)?;
        debug!(name, %value, "assigning variable");
        symbols.set_variable(name, value);
    }

    Ok(tokens)
}

/// The formal parameters of `name(a, b)`, or `None` for a plain name.
fn parse_parameters(target: &str) -> crate::Result<Option<Vec<String>>> {
    let Some((_, rest)) = target.split_once('(') else {
        return Ok(None);
    };
    let (list, _) = rest
        .split_once(')')
        .ok_or_else(|| EvalError::unbalanced("missing ')' in parameter list"))?;

    Ok(Some(
        list.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scope::Scope, value::Vector};

    #[test]
    fn variable_assignment() {
        let mut symbols = SymbolTable::new();
        let tokens = perform_assignment(&mut symbols, "x = 2 * 3\n").unwrap();
        assert_eq!(tokens, tokenize("2 * 3").unwrap());
        assert_eq!(symbols.variable("x"), Some(&Vector::scalar(6.0)));

        perform_assignment(&mut symbols, "v = [1, 2] + x\n").unwrap();
        assert_eq!(symbols.evaluate("v").unwrap(), Vector::from_reals([7.0, 8.0]));
    }

    #[test]
    fn preview_does_not_commit() {
        let mut symbols = SymbolTable::new();
        let tokens = perform_assignment(&mut symbols, "f(x) = x^2 + 1").unwrap();
        assert_eq!(tokens, tokenize("x^2 + 1").unwrap());
        assert!(symbols.function("f").is_none());

        perform_assignment(&mut symbols, "y = 3").unwrap();
        assert!(symbols.variable("y").is_none());
    }

    #[test]
    fn function_definition() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "  f(x) = x^2 + 1\n").unwrap();

        let f = symbols.function("f").unwrap();
        assert_eq!(f.description(), "f(x) = x^2 + 1");
        assert_eq!(symbols.evaluate("f(3)").unwrap(), Vector::scalar(10.0));
        assert_eq!(
            symbols.evaluate("f([1, 2, 3])").unwrap(),
            Vector::from_reals([2.0, 5.0, 10.0])
        );
    }

    #[test]
    fn parameters_shadow_variables() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "x = 100\n").unwrap();
        perform_assignment(&mut symbols, "a = 5\n").unwrap();
        perform_assignment(&mut symbols, "g(x, y) = x * y + a\n").unwrap();

        assert_eq!(symbols.evaluate("g(2, 3)").unwrap(), Vector::scalar(11.0));
        // The global is untouched by the call.
        assert_eq!(symbols.evaluate("x").unwrap(), Vector::scalar(100.0));

        // Free names are looked up when called, not when defined.
        perform_assignment(&mut symbols, "a = 0\n").unwrap();
        assert_eq!(symbols.evaluate("g(2, 3)").unwrap(), Vector::scalar(6.0));
    }

    #[test]
    fn arity_mismatch() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "g(x, y) = x + y\n").unwrap();
        assert!(matches!(
            symbols.evaluate("g(1)"),
            Err(EvalError::InvalidFunctionCall { .. })
        ));
    }

    #[test]
    fn functions_calling_functions() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "sq(x) = x * x\n").unwrap();
        perform_assignment(&mut symbols, "h(t) = sq(t) + sq(t + 1)\n").unwrap();
        assert_eq!(symbols.evaluate("h(2)").unwrap(), Vector::scalar(13.0));

        perform_assignment(&mut symbols, "one() = 1\n").unwrap();
        assert_eq!(symbols.evaluate("one() + 1").unwrap(), Vector::scalar(2.0));
    }

    #[test]
    fn bodies_do_not_see_caller_parameters() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "y = 100\n").unwrap();
        perform_assignment(&mut symbols, "f(x) = x + y\n").unwrap();
        perform_assignment(&mut symbols, "g(y) = f(1)\n").unwrap();

        assert_eq!(symbols.evaluate("f(1)").unwrap(), Vector::scalar(101.0));
        assert_eq!(symbols.evaluate("g(5)").unwrap(), Vector::scalar(101.0));
    }

    #[test]
    fn runaway_recursion_is_an_error() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "r(x) = r(x)\n").unwrap();
        assert!(matches!(
            symbols.evaluate("r(1)"),
            Err(EvalError::InvalidFunctionCall { .. })
        ));
    }

    #[test]
    fn failures_leave_the_table_untouched() {
        let mut symbols = SymbolTable::new();
        perform_assignment(&mut symbols, "x = 1\n").unwrap();

        assert!(perform_assignment(&mut symbols, "x = 1 +\n").is_err());
        assert!(perform_assignment(&mut symbols, "x = 1.2.3\n").is_err());
        assert!(perform_assignment(&mut symbols, "x = [1, 2] + [1, 2, 3]\n").is_err());
        assert!(perform_assignment(&mut symbols, "f(x = x\n").is_err());
        assert_eq!(symbols.variable("x"), Some(&Vector::scalar(1.0)));
        assert!(symbols.function("f").is_none());
    }

    #[test]
    fn malformed_targets() {
        let mut symbols = SymbolTable::new();
        assert!(perform_assignment(&mut symbols, "1 + 1\n").is_err());
        assert!(perform_assignment(&mut symbols, " = 4\n").is_err());
    }
}
