use mathhammer::combat::{RerollPolicy, RollOdds};
use mathhammer::dice::{parse_dice, DiceSpec};
use mathhammer::probability::{
    compound_distribution, convolve, die_success_probability, sum_of_n_dice, trim_tail,
    OutcomeDistribution,
};
use proptest::prelude::*;

fn normalized(weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![1.0];
    }
    weights.into_iter().map(|w| w / total).collect()
}

fn mass_vector() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1.0, 1..8).prop_map(normalized)
}

fn close(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
}

fn reroll_policy() -> impl Strategy<Value = RerollPolicy> {
    prop_oneof![
        Just(RerollPolicy::None),
        Just(RerollPolicy::Ones),
        Just(RerollPolicy::Fails),
        Just(RerollPolicy::NonCrits),
    ]
}

proptest! {
    #[test]
    fn formatted_distributions_start_at_one_and_never_rise(masses in mass_vector()) {
        let dist = OutcomeDistribution::from_exact(&masses);
        prop_assert!((dist.or_higher(0) - 1.0).abs() < 1e-9);
        for pair in dist.outcomes().windows(2) {
            prop_assert!(pair[1].or_higher <= pair[0].or_higher);
        }
        prop_assert!((dist.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn convolution_is_commutative_and_associative(
        a in mass_vector(),
        b in mass_vector(),
        c in mass_vector(),
    ) {
        prop_assert!(close(&convolve(&a, &b), &convolve(&b, &a)));
        let left = convolve(&convolve(&a, &b), &c);
        let right = convolve(&a, &convolve(&b, &c));
        prop_assert!(close(&left, &right));
        prop_assert_eq!(convolve(&a, &b).len(), a.len() + b.len() - 1);
        prop_assert!((convolve(&a, &b).iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn success_probability_is_bounded(sides in 1u32..20, target in 0u32..25) {
        let p = die_success_probability(target, sides);
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert_eq!(die_success_probability(1, sides), 1.0);
        prop_assert_eq!(die_success_probability(sides + 1, sides), 0.0);
    }

    #[test]
    fn dice_sums_carry_unit_mass(n in 0u32..12, sides in 1u32..10) {
        let dist = sum_of_n_dice(n, sides);
        prop_assert_eq!(dist.len(), (n * sides) as usize + 1);
        prop_assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for below in dist.iter().take(n as usize) {
            prop_assert_eq!(*below, 0.0);
        }
    }

    #[test]
    fn compound_mass_is_conserved(count in mass_vector(), unit in mass_vector()) {
        let count = OutcomeDistribution::from_exact(&count);
        let compound = compound_distribution(&count, &unit);
        prop_assert!((compound.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn roll_odds_always_partition_the_die(
        sides in 2u32..13,
        target in 0u32..14,
        critical in 1u32..14,
        reroll in reroll_policy(),
    ) {
        let odds = RollOdds::evaluate(sides, target, Some(critical), reroll);
        for p in [odds.critical, odds.success, odds.fail] {
            prop_assert!((0.0..=1.0 + 1e-12).contains(&p));
        }
        prop_assert!((odds.critical + odds.success + odds.fail - 1.0).abs() < 1e-9);
    }

    #[test]
    fn trimming_loses_at_most_epsilon(masses in prop::collection::vec(0.0f64..1.0, 1..40)) {
        let mut masses = normalized(masses);
        // Long near-zero tail like a large compound expansion leaves behind.
        masses.extend([1e-12, 1e-13, 1e-14]);
        let dist = OutcomeDistribution::from_exact(&masses);
        let trimmed = trim_tail(&dist, 1e-9);
        prop_assert!(!trimmed.is_empty());
        prop_assert!(trimmed.len() <= dist.len());
        prop_assert!(dist.total_mass() - trimmed.total_mass() <= 1e-9 + 1e-12);
    }

    #[test]
    fn parser_never_panics(raw in ".{0,12}") {
        let _ = parse_dice(&raw);
    }
}

#[test]
fn zero_dice_is_a_point_mass_at_zero() {
    for sides in 1..=12 {
        assert_eq!(sum_of_n_dice(0, sides), vec![1.0]);
    }
}

#[test]
fn one_sided_dice_sum_to_their_count() {
    for n in 0..=8u32 {
        let dist = sum_of_n_dice(n, 1);
        assert_eq!(dist.len(), n as usize + 1);
        assert_eq!(dist[n as usize], 1.0);
        assert!(dist[..n as usize].iter().all(|&p| p == 0.0));
    }
}

#[test]
fn parses_documented_expressions() {
    assert_eq!(
        parse_dice("2D6+3"),
        DiceSpec {
            dice_count: 2,
            sides: 6,
            bonus: 3
        }
    );
    assert_eq!(
        parse_dice("D6"),
        DiceSpec {
            dice_count: 1,
            sides: 6,
            bonus: 0
        }
    );
    assert_eq!(parse_dice("d3"), parse_dice("D3"));
    assert_eq!(
        parse_dice("3"),
        DiceSpec {
            dice_count: 0,
            sides: 0,
            bonus: 3
        }
    );
    assert_eq!(parse_dice("garbage"), DiceSpec::ZERO);
    assert_eq!(parse_dice(""), DiceSpec::ZERO);
}
