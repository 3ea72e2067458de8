use std::fmt::Debug;

use crate::{error::EvalError, scope::Scope};

use super::{Closure, Vector};

pub type NativeFunction = fn(&str, &[Vector]) -> crate::Result<Vector>;

/// An entry of the function table: what to show for it, and how to call it.
#[derive(Debug, Clone)]
pub struct MathFunction {
    description: String,
    method: Method,
}

#[derive(Clone)]
pub enum Method {
    Native(NativeFunction),
    Closure(Closure),
}

impl Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Native(_) => write!(f, "<native>"),
            Method::Closure(closure) => write!(f, "{:?}", closure),
        }
    }
}

impl MathFunction {
    pub fn native(name: &str, f: NativeFunction) -> Self {
        Self {
            description: name.to_string(),
            method: Method::Native(f),
        }
    }

    pub fn closure(description: impl Into<String>, closure: Closure) -> Self {
        Self {
            description: description.into(),
            method: Method::Closure(closure),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Calls the function with one vector per positional argument. Free
    /// names in a user-defined body are looked up in `scope` at call time.
    pub fn call(&self, name: &str, scope: &dyn Scope, args: &[Vector]) -> crate::Result<Vector> {
        match &self.method {
            Method::Native(f) => f(name, args),
            Method::Closure(closure) => {
                if closure.parameters().len() != args.len() {
                    return Err(EvalError::invalid_call(
                        name,
                        format!(
                            "expected {} argument(s), got {}",
                            closure.parameters().len(),
                            args.len()
                        ),
                    ));
                }
                closure.call(name, scope, args)
            }
        }
    }
}
