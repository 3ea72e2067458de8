use std::{collections::BTreeMap, f64::consts};

use crate::{
    evaluator,
    scope::Scope,
    stdlib,
    value::{MathFunction, Vector},
};

/// The named variables and functions expressions can refer to. Entries are
/// only ever added or overwritten, never removed.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    variables: BTreeMap<String, Vector>,
    functions: BTreeMap<String, MathFunction>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table holding the constants `pi` and `e` and the built-in functions.
    pub fn new() -> Self {
        let mut table = Self::empty();

        // Constants
        table.set_variable("pi", Vector::scalar(consts::PI));
        table.set_variable("e", Vector::scalar(consts::E));

        // Built-in functions
        for (name, f) in stdlib::BUILTINS {
            table.set_function(name, MathFunction::native(name, *f));
        }

        table
    }

    pub fn empty() -> Self {
        Self {
            variables: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }

    pub fn set_variable(&mut self, name: &str, value: Vector) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn set_function(&mut self, name: &str, function: MathFunction) {
        self.functions.insert(name.to_string(), function);
    }

    /// Variables ordered by name.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Functions ordered by name.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &MathFunction)> {
        self.functions.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn evaluate(&self, text: &str) -> crate::Result<Vector> {
        evaluator::evaluate(self, text)
    }
}

impl Scope for SymbolTable {
    fn variable(&self, name: &str) -> Option<&Vector> {
        self.variables.get(name)
    }

    fn function(&self, name: &str) -> Option<&MathFunction> {
        self.functions.get(name)
    }

    fn globals(&self) -> &dyn Scope {
        self
    }
}
