pub mod assignment;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod math;
pub mod plot;
pub mod scope;
mod stdlib;
pub mod token;
pub mod value;

pub use assignment::perform_assignment;
pub use env::SymbolTable;
pub use error::{EvalError, Result};
pub use evaluator::{evaluate, evaluate_tokens};
pub use value::Vector;
