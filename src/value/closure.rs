use crate::{
    error::EvalError,
    evaluator,
    scope::{Bindings, Scope},
    token::Token,
};

use super::Vector;

/// Nested user-defined calls allowed before giving up.
pub(crate) const MAX_CALL_DEPTH: usize = 64;

/// A user-defined function: its frozen body and formal parameter names.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    parameters: Vec<String>,
    body: Vec<Token>,
}

impl Closure {
    pub fn new(parameters: Vec<String>, body: Vec<Token>) -> Self {
        Self { parameters, body }
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Evaluates the body with the parameters bound over the globals of
    /// `caller`. The caller's own parameters are not visible.
    pub(crate) fn call(&self, name: &str, caller: &dyn Scope, args: &[Vector]) -> crate::Result<Vector> {
        if caller.depth() >= MAX_CALL_DEPTH {
            return Err(EvalError::invalid_call(name, "call depth exceeded"));
        }

        let bindings = Bindings::new(
            caller,
            self.parameters.iter().map(String::as_str).zip(args.iter().cloned()),
        );
        evaluator::evaluate_tokens(&bindings, &self.body)
    }
}
