pub mod engine;
pub mod modifiers;
pub mod profile;
pub mod stages;

pub use engine::{
    attack_distribution, build_sequence, plan_matchups, resolve_attack_sequence, resolve_matchup,
    resolve_matchups, AttackSequence, Matchup, ResolutionResult, ResolutionSummary, StageChannels,
};
pub use modifiers::{ModifierSet, RerollPolicy, WeaponModifiers};
pub use profile::{save_target, wound_target, Attacker, Defender, WeaponProfile, AUTO_HIT};
pub use stages::{
    hit_stage, save_and_damage_stage, wound_stage, RollOdds, SaveDamageOutput, StageContext,
    TrialOdds,
};
