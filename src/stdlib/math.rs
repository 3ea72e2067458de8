use crate::{
    error::EvalError,
    math::broadcast,
    value::{NativeFunction, Vector},
};

/// The built-in function table, in registration order.
pub(crate) const BUILTINS: &[(&str, NativeFunction)] = &[
    ("sin", sin),
    ("cos", cos),
    ("tan", tan),
    ("arcsin", arcsin),
    ("arccos", arccos),
    ("arctan", arctan),
    ("sinh", sinh),
    ("cosh", cosh),
    ("tanh", tanh),
    ("asinh", asinh),
    ("acosh", acosh),
    ("atanh", atanh),
    ("exp", exp),
    ("log", log),
    ("sqrt", sqrt),
    ("abs", abs),
];

macro_rules! require_args {
    ($name:expr, $args:expr, $count:literal) => {
        if $args.len() != $count {
            return Err(EvalError::invalid_call(
                $name,
                format!("expected {} argument(s), got {}", $count, $args.len()),
            ));
        }
    };
    ($name:expr, $args:expr, $min:literal..=$max:literal) => {
        if !($min..=$max).contains(&$args.len()) {
            return Err(EvalError::invalid_call(
                $name,
                format!(
                    "expected {} to {} arguments, got {}",
                    $min,
                    $max,
                    $args.len()
                ),
            ));
        }
    };
}

/// Results outside a function's domain come out as NaN; those elements are
/// undefined rather than numbers.
fn defined(values: Vector) -> Vector {
    values
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect()
}

fn elementwise(name: &str, args: &[Vector], f: fn(f64) -> f64) -> crate::Result<Vector> {
    require_args!(name, args, 1);
    Ok(defined(args[0].map(f)))
}

fn sin(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::sin)
}

fn cos(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::cos)
}

fn tan(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::tan)
}

fn arcsin(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::asin)
}

fn arccos(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::acos)
}

fn arctan(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::atan)
}

fn sinh(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::sinh)
}

fn cosh(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::cosh)
}

fn tanh(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::tanh)
}

fn asinh(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::asinh)
}

fn acosh(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::acosh)
}

fn atanh(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::atanh)
}

fn exp(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::exp)
}

fn sqrt(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::sqrt)
}

fn abs(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    elementwise(name, args, f64::abs)
}

/// `log(x)` is the natural logarithm, `log(x, b)` the logarithm to base `b`.
fn log(name: &str, args: &[Vector]) -> crate::Result<Vector> {
    require_args!(name, args, 1..=2);

    let result = match args {
        [x, base] => broadcast(x, base, |x, base| {
            // log2/log10 are exact on powers of their base; x.log(b) isn't.
            if base == 2.0 {
                x.log2()
            } else if base == 10.0 {
                x.log10()
            } else {
                x.log(base)
            }
        })?,
        _ => args[0].map(f64::ln),
    };

    Ok(defined(result))
}
