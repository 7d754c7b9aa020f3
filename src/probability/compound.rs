use super::{convolve, point_mass, OutcomeDistribution};

/// Distribution of the sum of `N` independent copies of a unit variable,
/// where `N` itself follows `count`.
///
/// Walks `n = 0..=max_count` keeping the running n-fold convolution power of
/// `unit`, adding `P(N = n) * unit^{*n}` into the accumulator. A unit that is
/// a point mass at 0 short-circuits to a point mass at 0.
pub fn compound_distribution(count: &OutcomeDistribution, unit: &[f64]) -> Vec<f64> {
    if unit_is_point_zero(unit) || count.is_empty() {
        return point_mass(0);
    }

    let max_count = count.max_outcome();
    let max_unit = unit.len() - 1;
    let mut accumulated = vec![0.0; max_count * max_unit + 1];

    let mut power = vec![1.0];
    for n in 0..=max_count {
        let weight = count.exact(n);
        if weight > 0.0 {
            for (i, &p) in power.iter().enumerate() {
                accumulated[i] += weight * p;
            }
        }
        if n < max_count {
            power = convolve(&power, unit);
        }
    }
    accumulated
}

fn unit_is_point_zero(unit: &[f64]) -> bool {
    match unit.split_first() {
        None => true,
        Some((_, rest)) => rest.iter().all(|&p| p == 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::sum_of_n_dice;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12, "expected {b}, got {a}");
    }

    #[test]
    fn fixed_count_of_bernoulli_trials_is_binomial() {
        let count = OutcomeDistribution::point(3);
        let out = compound_distribution(&count, &[0.5, 0.5]);
        assert_eq!(out.len(), 4);
        approx_eq(out[0], 0.125);
        approx_eq(out[1], 0.375);
        approx_eq(out[2], 0.375);
        approx_eq(out[3], 0.125);
    }

    #[test]
    fn zero_unit_short_circuits() {
        let count = OutcomeDistribution::point(40);
        assert_eq!(compound_distribution(&count, &[1.0, 0.0, 0.0]), vec![1.0]);
        assert_eq!(compound_distribution(&count, &[1.0]), vec![1.0]);
    }

    #[test]
    fn random_count_mixes_powers() {
        // N is 0 or 2 with equal odds; each unit is a fair coin.
        let count = OutcomeDistribution::from_exact(&[0.5, 0.0, 0.5]);
        let out = compound_distribution(&count, &[0.5, 0.5]);
        approx_eq(out[0], 0.5 + 0.5 * 0.25);
        approx_eq(out[1], 0.5 * 0.5);
        approx_eq(out[2], 0.5 * 0.25);
    }

    #[test]
    fn d6_damage_per_unit_matches_dice_sum() {
        let count = OutcomeDistribution::point(2);
        let unit = sum_of_n_dice(1, 6);
        let out = compound_distribution(&count, &unit);
        let expected = sum_of_n_dice(2, 6);
        assert_eq!(out.len(), expected.len());
        for (a, b) in out.iter().zip(expected.iter()) {
            approx_eq(*a, *b);
        }
    }
}
