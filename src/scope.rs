use std::collections::HashMap;

use crate::value::{MathFunction, Vector};

/// Read-only name lookup used during evaluation.
pub trait Scope {
    fn variable(&self, name: &str) -> Option<&Vector>;

    fn function(&self, name: &str) -> Option<&MathFunction>;

    /// The persistent table underneath any call bindings. Function bodies
    /// resolve their free names here, never in their caller's parameters.
    fn globals(&self) -> &dyn Scope;

    /// How many user-defined calls deep this scope is.
    fn depth(&self) -> usize {
        0
    }
}

/// Parameter bindings for one call of a user-defined function, layered
/// over (and shadowing) the global table.
pub struct Bindings<'a> {
    globals: &'a dyn Scope,
    locals: HashMap<&'a str, Vector>,
    depth: usize,
}

impl<'a> Bindings<'a> {
    /// Binds `locals` for a call made from `caller`. Only the caller's
    /// globals and call depth carry over.
    pub fn new(caller: &'a dyn Scope, locals: impl IntoIterator<Item = (&'a str, Vector)>) -> Self {
        Self {
            globals: caller.globals(),
            locals: locals.into_iter().collect(),
            depth: caller.depth() + 1,
        }
    }
}

impl Scope for Bindings<'_> {
    fn variable(&self, name: &str) -> Option<&Vector> {
        self.locals
            .get(name)
            .or_else(|| self.globals.variable(name))
    }

    fn function(&self, name: &str) -> Option<&MathFunction> {
        self.globals.function(name)
    }

    fn globals(&self) -> &dyn Scope {
        self.globals
    }

    fn depth(&self) -> usize {
        self.depth
    }
}
