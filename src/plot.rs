use std::ops::RangeInclusive;

use tracing::debug;

use crate::{
    scope::Scope,
    value::{MathFunction, Vector},
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub x: f64,
    /// `None` wherever the function is undefined or not finite.
    pub y: Option<f64>,
}

/// `count` evenly spaced points over `range`, both ends included.
pub fn sample_points(range: RangeInclusive<f64>, count: usize) -> Vec<f64> {
    let (start, end) = (*range.start(), *range.end());
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..count)
            .map(|i| {
                let t = i as f64 / (count - 1) as f64;
                t * end + (1.0 - t) * start
            })
            .collect(),
    }
}

/// Samples a one-parameter function. All x values are passed in a single
/// call as one vector. A failing call leaves every sample undefined.
pub fn sample(
    name: &str,
    function: &MathFunction,
    scope: &dyn Scope,
    range: RangeInclusive<f64>,
    count: usize,
) -> Vec<Sample> {
    let xs = sample_points(range, count);
    let ys = match function.call(name, scope, &[Vector::from_reals(xs.iter().copied())]) {
        Ok(ys) => ys,
        Err(e) => {
            debug!(name, error = %e, "sampling failed");
            Vector::new(vec![None; xs.len()])
        }
    };

    xs.iter()
        .enumerate()
        .map(|(i, &x)| {
            // A constant function gives back a scalar.
            let y = if ys.is_scalar() { ys[0] } else { ys.get(i).copied().flatten() };
            Sample {
                x,
                y: y.filter(|y| y.is_finite()),
            }
        })
        .collect()
}
