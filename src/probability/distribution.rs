use serde::{Deserialize, Serialize};

/// Exact and at-least probability for one outcome value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub roll: usize,
    pub exact: f64,
    pub or_higher: f64,
}

/// Full probability mass function over `0..=max` with its survival function.
///
/// Built once from an exact-mass array and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeDistribution {
    outcomes: Vec<Outcome>,
}

impl OutcomeDistribution {
    /// Format an exact-mass array, accumulating `or_higher` from the top down.
    ///
    /// The running total is clamped to 1.0 to absorb floating-point drift.
    pub fn from_exact(exact: &[f64]) -> Self {
        let mut outcomes = Vec::with_capacity(exact.len());
        let mut cumulative = 0.0;
        for (roll, &p) in exact.iter().enumerate().rev() {
            cumulative += p;
            if cumulative > 1.0 {
                cumulative = 1.0;
            }
            outcomes.push(Outcome {
                roll,
                exact: p,
                or_higher: cumulative,
            });
        }
        outcomes.reverse();
        Self { outcomes }
    }

    pub fn point(value: usize) -> Self {
        Self::from_exact(&super::point_mass(value))
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Largest outcome value still carried.
    pub fn max_outcome(&self) -> usize {
        self.outcomes.len().saturating_sub(1)
    }

    pub fn exact(&self, roll: usize) -> f64 {
        self.outcomes.get(roll).map_or(0.0, |o| o.exact)
    }

    pub fn or_higher(&self, roll: usize) -> f64 {
        self.outcomes.get(roll).map_or(0.0, |o| o.or_higher)
    }

    pub fn exact_masses(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.exact).collect()
    }

    pub fn total_mass(&self) -> f64 {
        self.outcomes.iter().map(|o| o.exact).sum()
    }

    pub fn mean(&self) -> f64 {
        self.outcomes
            .iter()
            .map(|o| o.roll as f64 * o.exact)
            .sum()
    }

    /// True when the whole mass sits on 0.
    pub fn is_point_zero(&self) -> bool {
        self.outcomes
            .iter()
            .skip(1)
            .all(|o| o.exact == 0.0)
    }
}

/// Drop negligible trailing outcomes.
///
/// An entry is removed only while its own mass is below `epsilon` and the
/// total removed mass stays within `epsilon`, so `or_higher(0)` stays within
/// `epsilon` of 1. Index 0 is always kept. Apply to finished stage outputs
/// only.
pub fn trim_tail(distribution: &OutcomeDistribution, epsilon: f64) -> OutcomeDistribution {
    let mut keep = distribution.outcomes.len();
    let mut dropped = 0.0;
    while keep > 1 {
        let last = distribution.outcomes[keep - 1].exact;
        if last >= epsilon || dropped + last > epsilon {
            break;
        }
        dropped += last;
        keep -= 1;
    }
    OutcomeDistribution {
        outcomes: distribution.outcomes[..keep].to_vec(),
    }
}
