//! Attack sequence orchestration: attacks → hits → wounds → saves/damage.
//!
//! The stage order is fixed; each stage consumes the previous stage's untrimmed
//! output as its count distribution. Trimming is applied only to the channels
//! handed back, so no channel loses more than one epsilon of mass.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::combat::modifiers::ModifierSet;
use crate::combat::profile::{save_target, wound_target, Attacker, Defender, WeaponProfile};
use crate::combat::stages::{hit_stage, save_and_damage_stage, wound_stage, StageContext};
use crate::config::EngineConfig;
use crate::dice::{try_parse_dice, DiceSpec};
use crate::error::{MathhammerError, Result};
use crate::probability::{shift, sum_of_n_dice, trim_tail, OutcomeDistribution};

/// Fully resolved inputs of one attack sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttackSequence {
    pub models: u32,
    pub attacks: DiceSpec,
    pub damage: DiceSpec,
    pub context: StageContext,
}

/// One distribution per stage of the sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageChannels {
    pub attacks: OutcomeDistribution,
    pub hits: OutcomeDistribution,
    pub wounds: OutcomeDistribution,
    pub devastating_wounds: OutcomeDistribution,
    pub normal_unsaved: OutcomeDistribution,
    pub total_unsaved: OutcomeDistribution,
    pub mortal_damage: OutcomeDistribution,
    pub normal_damage: OutcomeDistribution,
    pub total_damage: OutcomeDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub expected_attacks: f64,
    pub expected_hits: f64,
    pub expected_wounds: f64,
    pub expected_unsaved: f64,
    pub expected_mortal_damage: f64,
    pub expected_normal_damage: f64,
    pub expected_total_damage: f64,
}

impl StageChannels {
    pub fn summary(&self) -> ResolutionSummary {
        ResolutionSummary {
            expected_attacks: self.attacks.mean(),
            expected_hits: self.hits.mean(),
            expected_wounds: self.wounds.mean(),
            expected_unsaved: self.total_unsaved.mean(),
            expected_mortal_damage: self.mortal_damage.mean(),
            expected_normal_damage: self.normal_damage.mean(),
            expected_total_damage: self.total_damage.mean(),
        }
    }
}

/// Result for one attacker × weapon × defender combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub attacker: String,
    pub weapon: String,
    pub defender: String,
    pub is_variable_attacks: bool,
    #[serde(flatten)]
    pub channels: StageChannels,
    pub summary: ResolutionSummary,
}

/// Attack-count distribution for `models` models each rolling `attacks`.
pub fn attack_distribution(attacks: &DiceSpec, models: u32) -> OutcomeDistribution {
    if attacks.is_flat() {
        let total = attacks.bonus as usize * models as usize;
        return OutcomeDistribution::point(total);
    }
    let dice = models.saturating_mul(attacks.dice_count);
    let bonus = models as usize * attacks.bonus as usize;
    OutcomeDistribution::from_exact(&shift(&sum_of_n_dice(dice, attacks.sides), bonus))
}

/// Run the four stages in order.
pub fn resolve_attack_sequence(sequence: &AttackSequence, trim_epsilon: f64) -> StageChannels {
    let ctx = &sequence.context;
    let attacks = attack_distribution(&sequence.attacks, sequence.models);
    let hits = hit_stage(&attacks, ctx);
    let wounds = wound_stage(&hits, ctx);
    let saved = save_and_damage_stage(&wounds, ctx, &sequence.damage, trim_epsilon);

    StageChannels {
        attacks: trim_tail(&attacks, trim_epsilon),
        hits: trim_tail(&hits, trim_epsilon),
        wounds: trim_tail(&wounds, trim_epsilon),
        devastating_wounds: saved.devastating_wounds,
        normal_unsaved: saved.normal_unsaved,
        total_unsaved: saved.total_unsaved,
        mortal_damage: saved.mortal_damage,
        normal_damage: saved.normal_damage,
        total_damage: saved.total_damage,
    }
}

/// Parse a profile's expressions and derive its die targets against `defender`.
pub fn build_sequence(
    attacker: &Attacker,
    weapon: &WeaponProfile,
    defender: &Defender,
    modifiers: &ModifierSet,
    sides: u32,
) -> AttackSequence {
    let modifiers = modifiers.merged_with(&weapon.modifiers);
    let attacks = parse_expression(&weapon.attacks, "attacks", &weapon.name);
    let damage = parse_expression(&weapon.damage, "damage", &weapon.name);

    AttackSequence {
        models: attacker.models,
        attacks,
        damage,
        context: StageContext {
            sides,
            hit_target: weapon.skill,
            wound_target: wound_target(
                weapon.strength,
                defender.toughness,
                modifiers.wound_modifier,
                sides,
            ),
            save_target: save_target(
                defender.save,
                weapon.armor_penetration,
                defender.invulnerable_save,
                sides,
            ),
            modifiers,
        },
    }
}

fn parse_expression(raw: &str, field: &str, weapon: &str) -> DiceSpec {
    try_parse_dice(raw).unwrap_or_else(|| {
        warn!(weapon, field, raw, "unrecognised dice expression, treating as 0");
        DiceSpec::ZERO
    })
}

/// One attacker weapon aimed at one defender.
#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub attacker: &'a Attacker,
    pub weapon: &'a WeaponProfile,
    pub defender: &'a Defender,
}

impl Matchup<'_> {
    pub fn resolve(&self, modifiers: &ModifierSet, config: &EngineConfig) -> ResolutionResult {
        resolve_matchup(self.attacker, self.weapon, self.defender, modifiers, config)
    }
}

pub fn resolve_matchup(
    attacker: &Attacker,
    weapon: &WeaponProfile,
    defender: &Defender,
    modifiers: &ModifierSet,
    config: &EngineConfig,
) -> ResolutionResult {
    let sequence = build_sequence(attacker, weapon, defender, modifiers, config.sides);
    debug!(
        attacker = %attacker.name,
        weapon = %weapon.name,
        defender = %defender.name,
        hit = sequence.context.hit_target,
        wound = sequence.context.wound_target,
        save = sequence.context.save_target,
        "resolving matchup"
    );
    let channels = resolve_attack_sequence(&sequence, config.trim_epsilon);
    ResolutionResult {
        attacker: attacker.name.clone(),
        weapon: weapon.name.clone(),
        defender: defender.name.clone(),
        is_variable_attacks: !sequence.attacks.is_flat(),
        summary: channels.summary(),
        channels,
    }
}

/// Every attacker weapon against every defender, in input order.
///
/// Refuses to plan anything without at least one attacker and one defender.
pub fn plan_matchups<'a>(
    attackers: &'a [Attacker],
    defenders: &'a [Defender],
) -> Result<Vec<Matchup<'a>>> {
    if attackers.is_empty() {
        return Err(MathhammerError::MissingParticipant("attacker"));
    }
    if defenders.is_empty() {
        return Err(MathhammerError::MissingParticipant("defender"));
    }
    let mut matchups = Vec::new();
    for attacker in attackers {
        for weapon in &attacker.weapons {
            for defender in defenders {
                matchups.push(Matchup {
                    attacker,
                    weapon,
                    defender,
                });
            }
        }
    }
    Ok(matchups)
}

pub fn resolve_matchups(
    attackers: &[Attacker],
    defenders: &[Defender],
    modifiers: &ModifierSet,
    config: &EngineConfig,
) -> Result<Vec<ResolutionResult>> {
    let matchups = plan_matchups(attackers, defenders)?;
    info!(count = matchups.len(), "resolving matchups");
    Ok(matchups
        .iter()
        .map(|matchup| matchup.resolve(modifiers, config))
        .collect())
}
