//! Hit, wound and save/damage stage processors.
//!
//! Each stage turns the previous stage's count distribution into its own by
//! deriving single-trial odds and handing them to
//! [compound_distribution]. The save stage cannot read which wounds were
//! critical from the aggregate wound count, so both the wound and the save
//! stage derive their ratios from the same [TrialOdds].

use serde::Serialize;
use tracing::debug;

use crate::combat::modifiers::{ModifierSet, RerollPolicy};
use crate::combat::profile::AUTO_HIT;
use crate::dice::DiceSpec;
use crate::probability::{compound_distribution, trim_tail, OutcomeDistribution};

/// Die targets and modifiers for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageContext {
    pub sides: u32,
    /// [AUTO_HIT] skips the hit roll.
    pub hit_target: u32,
    pub wound_target: u32,
    /// `sides + 1` or more means no save.
    pub save_target: u32,
    pub modifiers: ModifierSet,
}

/// Odds of one die ending critical, successful but not critical, or failed,
/// after any reroll. The three always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollOdds {
    pub critical: f64,
    pub success: f64,
    pub fail: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Critical,
    Success,
    Fail,
}

impl RollOdds {
    pub const NEVER: Self = Self {
        critical: 0.0,
        success: 0.0,
        fail: 1.0,
    };

    /// Evaluate one roll face by face.
    ///
    /// A face at or above `critical_target` is critical (and therefore
    /// succeeds even below `target`). Rerolled faces take the odds of a fresh
    /// roll; a die is rerolled at most once.
    pub fn evaluate(
        sides: u32,
        target: u32,
        critical_target: Option<u32>,
        reroll: RerollPolicy,
    ) -> Self {
        if sides == 0 {
            return Self::NEVER;
        }
        let classify = |face: u32| {
            if critical_target.is_some_and(|crit| face >= crit) {
                Face::Critical
            } else if face >= target {
                Face::Success
            } else {
                Face::Fail
            }
        };
        let rerolled = |face: u32, class: Face| match reroll {
            RerollPolicy::None => false,
            RerollPolicy::Ones => face == 1,
            RerollPolicy::Fails => class == Face::Fail,
            RerollPolicy::NonCrits => class != Face::Critical,
        };

        let face_mass = 1.0 / f64::from(sides);
        let mut fresh = Self {
            critical: 0.0,
            success: 0.0,
            fail: 0.0,
        };
        for face in 1..=sides {
            fresh.add(classify(face), face_mass);
        }

        let mut odds = Self {
            critical: 0.0,
            success: 0.0,
            fail: 0.0,
        };
        for face in 1..=sides {
            let class = classify(face);
            if rerolled(face, class) {
                odds.critical += face_mass * fresh.critical;
                odds.success += face_mass * fresh.success;
                odds.fail += face_mass * fresh.fail;
            } else {
                odds.add(class, face_mass);
            }
        }
        odds
    }

    fn add(&mut self, face: Face, mass: f64) {
        match face {
            Face::Critical => self.critical += mass,
            Face::Success => self.success += mass,
            Face::Fail => self.fail += mass,
        }
    }

    /// Critical or not, the roll succeeded.
    pub fn passed(&self) -> f64 {
        self.critical + self.success
    }
}

/// Single-trial probabilities shared by the wound and save stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialOdds {
    pub hit: RollOdds,
    /// Share of hits that are lethal and skip the wound roll.
    pub lethal_share: f64,
    pub wound_roll: RollOdds,
    /// Chance one hit becomes a wound, lethal or rolled.
    pub wound_per_hit: f64,
    /// Chance a wound is devastating and skips the save.
    pub devastating_per_wound: f64,
    pub fail_save: f64,
}

impl TrialOdds {
    pub fn derive(ctx: &StageContext) -> Self {
        let mods = &ctx.modifiers;
        let hit = hit_odds(ctx);

        // Sustained bonus hits are ordinary hits, so only the critical itself
        // counts toward the lethal share.
        let hits_per_die = hit.success + hit.critical * (1.0 + f64::from(mods.sustained_hits));
        let lethal_share = if mods.lethal_hits && ctx.hit_target != AUTO_HIT && hits_per_die > 0.0 {
            (hit.critical / hits_per_die).min(1.0)
        } else {
            0.0
        };

        let wound_roll = RollOdds::evaluate(
            ctx.sides,
            ctx.wound_target,
            Some(mods.critical_wound_target(ctx.sides)),
            mods.reroll_wounds,
        );
        let wound_per_hit = lethal_share + (1.0 - lethal_share) * wound_roll.passed();

        let devastating = if mods.devastating_wounds {
            (1.0 - lethal_share) * wound_roll.critical
        } else {
            0.0
        };
        let devastating_per_wound = if wound_per_hit > 0.0 {
            (devastating / wound_per_hit).min(1.0)
        } else {
            0.0
        };

        let save = RollOdds::evaluate(
            ctx.sides,
            ctx.save_target,
            None,
            mods.reroll_saves.for_saves(),
        );

        Self {
            hit,
            lethal_share,
            wound_roll,
            wound_per_hit,
            devastating_per_wound,
            fail_save: save.fail,
        }
    }

    /// Chance a wound ends up as a normal failed save.
    pub fn normal_unsaved_per_wound(&self) -> f64 {
        (1.0 - self.devastating_per_wound) * self.fail_save
    }
}

fn hit_odds(ctx: &StageContext) -> RollOdds {
    let mods = &ctx.modifiers;
    RollOdds::evaluate(
        ctx.sides,
        ctx.hit_target,
        Some(mods.critical_hit_target(ctx.sides)),
        mods.reroll_hits,
    )
}

/// Hits from the attack-count distribution.
pub fn hit_stage(attacks: &OutcomeDistribution, ctx: &StageContext) -> OutcomeDistribution {
    if ctx.hit_target == AUTO_HIT {
        return attacks.clone();
    }
    let odds = hit_odds(ctx);
    let sustained = ctx.modifiers.sustained_hits as usize;

    let mut per_die = vec![0.0; sustained + 2];
    per_die[0] = odds.fail;
    per_die[1] += odds.success;
    per_die[1 + sustained] += odds.critical;

    let hits = OutcomeDistribution::from_exact(&compound_distribution(attacks, &per_die));
    debug!(
        critical = odds.critical,
        success = odds.success,
        outcomes = hits.len(),
        "hit stage resolved"
    );
    hits
}

/// Wounds from the hit-count distribution.
pub fn wound_stage(hits: &OutcomeDistribution, ctx: &StageContext) -> OutcomeDistribution {
    let odds = TrialOdds::derive(ctx);
    let p = odds.wound_per_hit;
    let wounds = OutcomeDistribution::from_exact(&compound_distribution(hits, &[1.0 - p, p]));
    debug!(
        lethal_share = odds.lethal_share,
        wound_per_hit = p,
        outcomes = wounds.len(),
        "wound stage resolved"
    );
    wounds
}

/// Everything the save/damage stage produces, already trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveDamageOutput {
    pub devastating_wounds: OutcomeDistribution,
    pub normal_unsaved: OutcomeDistribution,
    pub total_unsaved: OutcomeDistribution,
    pub mortal_damage: OutcomeDistribution,
    pub normal_damage: OutcomeDistribution,
    pub total_damage: OutcomeDistribution,
}

/// Split wounds into devastating, unsaved and saved, then roll damage for each
/// unsaved channel.
pub fn save_and_damage_stage(
    wounds: &OutcomeDistribution,
    ctx: &StageContext,
    damage: &DiceSpec,
    trim_epsilon: f64,
) -> SaveDamageOutput {
    let odds = TrialOdds::derive(ctx);
    let p_devastating = odds.devastating_per_wound;
    let p_normal = odds.normal_unsaved_per_wound();
    let p_total = (p_devastating + p_normal).min(1.0);

    let devastating = OutcomeDistribution::from_exact(&compound_distribution(
        wounds,
        &[1.0 - p_devastating, p_devastating],
    ));
    let normal_unsaved = OutcomeDistribution::from_exact(&compound_distribution(
        wounds,
        &[1.0 - p_normal, p_normal],
    ));
    let total_unsaved = OutcomeDistribution::from_exact(&compound_distribution(
        wounds,
        &[1.0 - p_total, p_total],
    ));

    let per_wound_damage = damage.roll_distribution();
    let damage_for = |count: &OutcomeDistribution| {
        OutcomeDistribution::from_exact(&compound_distribution(count, &per_wound_damage))
    };
    let mortal_damage = damage_for(&devastating);
    let normal_damage = damage_for(&normal_unsaved);
    let total_damage = damage_for(&total_unsaved);

    debug!(
        devastating = p_devastating,
        normal_unsaved = p_normal,
        damage = %damage,
        outcomes = total_damage.len(),
        "save and damage stage resolved"
    );

    SaveDamageOutput {
        devastating_wounds: trim_tail(&devastating, trim_epsilon),
        normal_unsaved: trim_tail(&normal_unsaved, trim_epsilon),
        total_unsaved: trim_tail(&total_unsaved, trim_epsilon),
        mortal_damage: trim_tail(&mortal_damage, trim_epsilon),
        normal_damage: trim_tail(&normal_damage, trim_epsilon),
        total_damage: trim_tail(&total_damage, trim_epsilon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12, "expected {b}, got {a}");
    }

    fn ctx(
        hit_target: u32,
        wound_target: u32,
        save_target: u32,
        modifiers: ModifierSet,
    ) -> StageContext {
        StageContext {
            sides: 6,
            hit_target,
            wound_target,
            save_target,
            modifiers,
        }
    }

    #[test]
    fn plain_roll_splits_top_face_as_critical() {
        let odds = RollOdds::evaluate(6, 3, Some(6), RerollPolicy::None);
        approx_eq(odds.critical, 1.0 / 6.0);
        approx_eq(odds.success, 3.0 / 6.0);
        approx_eq(odds.fail, 2.0 / 6.0);
    }

    #[test]
    fn loose_critical_threshold_never_goes_negative() {
        let odds = RollOdds::evaluate(6, 5, Some(4), RerollPolicy::None);
        approx_eq(odds.critical, 0.5);
        approx_eq(odds.success, 0.0);
        approx_eq(odds.fail, 0.5);
    }

    #[test]
    fn reroll_fails_matches_closed_form() {
        let odds = RollOdds::evaluate(6, 4, None, RerollPolicy::Fails);
        approx_eq(odds.passed(), 0.5 + 0.5 * 0.5);
    }

    #[test]
    fn reroll_ones_rerolls_a_single_face() {
        let odds = RollOdds::evaluate(6, 3, Some(6), RerollPolicy::Ones);
        let base = 4.0 / 6.0;
        approx_eq(odds.passed(), base + base / 6.0);
        approx_eq(odds.critical + odds.success + odds.fail, 1.0);
    }

    #[test]
    fn reroll_non_crits_fishes_for_criticals() {
        let odds = RollOdds::evaluate(6, 3, Some(6), RerollPolicy::NonCrits);
        let c = 1.0 / 6.0;
        approx_eq(odds.critical, c + (1.0 - c) * c);
        approx_eq(odds.success, (1.0 - c) * 3.0 / 6.0);
        approx_eq(odds.critical + odds.success + odds.fail, 1.0);
    }

    #[test]
    fn unrollable_target_never_passes() {
        let odds = RollOdds::evaluate(6, 7, None, RerollPolicy::Fails);
        approx_eq(odds.fail, 1.0);
    }

    #[test]
    fn auto_hit_passes_attacks_through() {
        let attacks = OutcomeDistribution::point(5);
        let hits = hit_stage(&attacks, &ctx(AUTO_HIT, 4, 4, ModifierSet::default()));
        assert_eq!(hits, attacks);
    }

    #[test]
    fn sustained_hits_land_on_the_bonus_cell() {
        let mods = ModifierSet {
            sustained_hits: 2,
            ..ModifierSet::default()
        };
        let hits = hit_stage(&OutcomeDistribution::point(1), &ctx(4, 4, 4, mods));
        assert_eq!(hits.len(), 4);
        approx_eq(hits.exact(0), 0.5);
        approx_eq(hits.exact(1), 2.0 / 6.0);
        approx_eq(hits.exact(2), 0.0);
        approx_eq(hits.exact(3), 1.0 / 6.0);
    }

    #[test]
    fn lethal_share_is_critical_fraction_of_hits() {
        let mods = ModifierSet {
            lethal_hits: true,
            ..ModifierSet::default()
        };
        let odds = TrialOdds::derive(&ctx(4, 4, 7, mods));
        approx_eq(odds.lethal_share, 1.0 / 3.0);
        approx_eq(odds.wound_per_hit, 1.0 / 3.0 + 2.0 / 3.0 * 0.5);
    }

    #[test]
    fn sustained_bonus_hits_dilute_the_lethal_share() {
        let mods = ModifierSet {
            lethal_hits: true,
            sustained_hits: 2,
            ..ModifierSet::default()
        };
        let odds = TrialOdds::derive(&ctx(4, 4, 7, mods));
        // One critical in 1/6 of rolls yields three hits, only one of them lethal.
        let hits_per_die = 2.0 / 6.0 + 3.0 * (1.0 / 6.0);
        approx_eq(odds.lethal_share, (1.0 / 6.0) / hits_per_die);
        approx_eq(odds.lethal_share, 0.2);
        approx_eq(odds.wound_per_hit, 0.2 + 0.8 * 0.5);
    }

    #[test]
    fn huge_sustained_values_do_not_overflow() {
        let mods = ModifierSet {
            lethal_hits: true,
            sustained_hits: u32::MAX,
            ..ModifierSet::default()
        };
        let odds = TrialOdds::derive(&ctx(4, 4, 7, mods));
        assert!(odds.lethal_share > 0.0 && odds.lethal_share < 1e-9);
    }

    #[test]
    fn auto_hits_are_never_lethal() {
        let mods = ModifierSet {
            lethal_hits: true,
            ..ModifierSet::default()
        };
        let odds = TrialOdds::derive(&ctx(AUTO_HIT, 4, 7, mods));
        approx_eq(odds.lethal_share, 0.0);
    }

    #[test]
    fn devastating_wounds_bypass_saves() {
        let mods = ModifierSet {
            devastating_wounds: true,
            ..ModifierSet::default()
        };
        let context = ctx(AUTO_HIT, 4, 2, mods);
        let odds = TrialOdds::derive(&context);
        approx_eq(odds.devastating_per_wound, (1.0 / 6.0) / 0.5);
        approx_eq(odds.fail_save, 1.0 / 6.0);

        let wounds = OutcomeDistribution::point(1);
        let out = save_and_damage_stage(&wounds, &context, &DiceSpec::flat(2), 0.0);
        approx_eq(out.devastating_wounds.exact(1), 1.0 / 3.0);
        approx_eq(out.total_unsaved.exact(1), 1.0 / 3.0 + (2.0 / 3.0) * (1.0 / 6.0));
        approx_eq(out.mortal_damage.exact(2), 1.0 / 3.0);
        assert_eq!(out.total_damage.len(), 3);
    }

    #[test]
    fn save_rerolls_apply_to_saves_only() {
        let mods = ModifierSet {
            reroll_saves: RerollPolicy::Fails,
            ..ModifierSet::default()
        };
        let odds = TrialOdds::derive(&ctx(AUTO_HIT, 4, 4, mods));
        approx_eq(odds.fail_save, 0.25);
        approx_eq(odds.wound_per_hit, 0.5);
    }
}
