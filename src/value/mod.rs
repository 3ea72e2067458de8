pub(crate) mod callable;
mod closure;

pub use callable::{MathFunction, Method, NativeFunction};
pub use closure::Closure;

use std::{
    fmt::{Debug, Display},
    ops::Deref,
};

/// An ordered sequence of optional reals. Length one is a scalar; `None`
/// marks an undefined element which propagates instead of failing.
#[derive(Clone, PartialEq, Default)]
pub struct Vector(Vec<Option<f64>>);

impl Vector {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    pub fn scalar(value: f64) -> Self {
        Self(vec![Some(value)])
    }

    pub fn absent() -> Self {
        Self(vec![None])
    }

    pub fn from_reals(values: impl IntoIterator<Item = f64>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    pub fn is_scalar(&self) -> bool {
        self.0.len() == 1
    }

    /// The single element of a length-one vector, if that's what this is.
    pub fn as_scalar(&self) -> Option<Option<f64>> {
        match self.0.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Applies `f` to every defined element, keeping absent ones absent.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.iter().map(|v| v.map(&f)).collect())
    }
}

impl Deref for Vector {
    type Target = [Option<f64>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Option<f64>> for Vector {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn write_element(f: &mut std::fmt::Formatter<'_>, value: Option<f64>) -> std::fmt::Result {
    match value {
        Some(v) => write!(f, "{}", v),
        None => write!(f, "null"),
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(value) = self.as_scalar() {
            return write_element(f, value);
        }

        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write_element(f, *value)?;
        }
        write!(f, "]")
    }
}

impl Debug for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vector({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Vector::scalar(3.0).to_string(), "3");
        assert_eq!(Vector::scalar(0.5).to_string(), "0.5");
        assert_eq!(Vector::absent().to_string(), "null");
        assert_eq!(
            Vector::new(vec![Some(1.0), None, Some(-2.5)]).to_string(),
            "[1, null, -2.5]"
        );
        assert_eq!(Vector::new(vec![]).to_string(), "[]");
    }

    #[test]
    fn map_keeps_absent_elements() {
        let v = Vector::new(vec![Some(1.0), None]).map(|x| x * 10.0);
        assert_eq!(v, Vector::new(vec![Some(10.0), None]));
    }
}
