use std::{f64::consts, ops};

use crate::{error::EvalError, token::Operation, value::Vector};

/// Below this the factorial argument is shifted up before the asymptotic
/// series is applied.
const STIRLING_THRESHOLD: f64 = 35.0;

/// Elementwise combination of two vectors. Equal lengths pair up, a
/// length-one side is repeated against the other, anything else is a shape
/// mismatch. An absent element on either side gives an absent result.
pub fn broadcast(lhs: &Vector, rhs: &Vector, f: impl Fn(f64, f64) -> f64) -> crate::Result<Vector> {
    let combine = |a: &Option<f64>, b: &Option<f64>| match (a, b) {
        (Some(a), Some(b)) => Some(f(*a, *b)),
        _ => None,
    };

    Ok(match (lhs.len(), rhs.len()) {
        (m, n) if m == n => lhs.iter().zip(rhs.iter()).map(|(a, b)| combine(a, b)).collect(),
        (1, _) => rhs.iter().map(|b| combine(&lhs[0], b)).collect(),
        (_, 1) => lhs.iter().map(|a| combine(a, &rhs[0])).collect(),
        (left, right) => return Err(EvalError::ShapeMismatch { left, right }),
    })
}

/// Modulo with the sign of the divisor, e.g. `-7 % 3 == 2`.
pub fn floored_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

impl ops::Add for &Vector {
    type Output = crate::Result<Vector>;

    fn add(self, other: Self) -> Self::Output {
        broadcast(self, other, |a, b| a + b)
    }
}

impl ops::Sub for &Vector {
    type Output = crate::Result<Vector>;

    fn sub(self, other: Self) -> Self::Output {
        broadcast(self, other, |a, b| a - b)
    }
}

impl ops::Mul for &Vector {
    type Output = crate::Result<Vector>;

    fn mul(self, other: Self) -> Self::Output {
        broadcast(self, other, |a, b| a * b)
    }
}

impl ops::Div for &Vector {
    type Output = crate::Result<Vector>;

    fn div(self, other: Self) -> Self::Output {
        broadcast(self, other, |a, b| a / b)
    }
}

impl ops::Rem for &Vector {
    type Output = crate::Result<Vector>;

    fn rem(self, other: Self) -> Self::Output {
        broadcast(self, other, floored_mod)
    }
}

impl ops::Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.map(|a| -a)
    }
}

impl Vector {
    pub fn pow(&self, other: &Vector) -> crate::Result<Vector> {
        broadcast(self, other, f64::powf)
    }

    /// Elementwise factorial. Non-integers get the gamma-like extension
    /// `x! = Γ(x + 1)`; negative integers have none and come out absent.
    pub fn factorial(&self) -> Vector {
        self.iter().map(|v| v.and_then(factorial)).collect()
    }

    /// Applies a binary operation. Factorial is unary and never reaches here.
    pub(crate) fn apply(&self, op: Operation, other: &Vector) -> crate::Result<Vector> {
        match op {
            Operation::Add => self + other,
            Operation::Sub => self - other,
            Operation::Mul => self * other,
            Operation::Div => self / other,
            Operation::Mod => self % other,
            Operation::Pow => self.pow(other),
            Operation::Factorial => Err(EvalError::malformed("'!' is not a binary operator")),
        }
    }
}

pub fn factorial(x: f64) -> Option<f64> {
    if x.is_nan() || x == f64::NEG_INFINITY {
        return None;
    }
    if x == f64::INFINITY {
        return Some(x);
    }

    if x.fract() == 0.0 {
        if x < 0.0 {
            return None;
        }
        // Exact for every result an f64 can hold; past 170! it is infinite.
        let mut result: f64 = 1.0;
        let mut i = 2.0;
        while i <= x && result.is_finite() {
            result *= i;
            i += 1.0;
        }
        return Some(result);
    }

    if x < 0.0 {
        // Reflection: x! = πx / (sin(πx) · (-x)!)
        let reflected = factorial(-x)?;
        return Some(consts::PI * x / ((consts::PI * x).sin() * reflected));
    }

    // Shift small arguments up, remembering what to divide back out:
    // x! = (x + n)! / ((x + 1)(x + 2)...(x + n))
    let mut y = x;
    let mut divisor = 1.0;
    while y < STIRLING_THRESHOLD {
        y += 1.0;
        divisor *= y;
    }

    Some(stirling(y) / divisor)
}

/// Stirling's series for `y!`, accurate for `y` past the threshold.
fn stirling(y: f64) -> f64 {
    let series = 1.0 + 1.0 / (12.0 * y) + 1.0 / (288.0 * y.powi(2)) - 139.0 / (51840.0 * y.powi(3));
    (2.0 * consts::PI * y).sqrt() * (y / consts::E).powf(y) * series
}
