//! Exact-mass building blocks. Mass arrays are indexed by outcome value from 0.

/// Probability that one uniform `{1..=sides}` die shows `target` or more.
///
/// Targets at or below 1 always succeed; targets above the die never do.
pub fn die_success_probability(target: u32, sides: u32) -> f64 {
    if target <= 1 {
        return 1.0;
    }
    if target > sides {
        return 0.0;
    }
    f64::from(sides - target + 1) / f64::from(sides)
}

/// Mass array of the sum of two independent variables.
///
/// Output length is `a.len() + b.len() - 1`; an empty input yields an empty
/// output.
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &pa) in a.iter().enumerate() {
        if pa == 0.0 {
            continue;
        }
        for (j, &pb) in b.iter().enumerate() {
            out[i + j] += pa * pb;
        }
    }
    out
}

/// Point mass at `value`.
pub fn point_mass(value: usize) -> Vec<f64> {
    let mut out = vec![0.0; value + 1];
    out[value] = 1.0;
    out
}

/// Shift a mass array up by a flat `offset`.
pub fn shift(masses: &[f64], offset: usize) -> Vec<f64> {
    if offset == 0 {
        return masses.to_vec();
    }
    let mut out = vec![0.0; masses.len() + offset];
    out[offset..].copy_from_slice(masses);
    out
}

/// Mass array of the sum of `n` uniform `{1..=sides}` dice.
///
/// `n == 0` (or a zero-sided die) is a point mass at 0.
pub fn sum_of_n_dice(n: u32, sides: u32) -> Vec<f64> {
    if n == 0 || sides == 0 {
        return point_mass(0);
    }
    let face = 1.0 / f64::from(sides);
    let mut single = vec![face; sides as usize + 1];
    single[0] = 0.0;

    let mut total = vec![1.0];
    for _ in 0..n {
        total = convolve(&total, &single);
    }
    total
}
