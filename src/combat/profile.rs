//! Attacker, weapon and defender records plus the threshold rules that turn
//! them into die targets.

use serde::{Deserialize, Serialize};

use crate::combat::modifiers::WeaponModifiers;

/// Hit target meaning "hits automatically".
pub const AUTO_HIT: u32 = 0;

const MIN_WOUND_TARGET: i64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    /// Attacks per model, e.g. `"2"` or `"D6+1"`.
    pub attacks: String,
    /// Hit target (weapon or ballistic skill). [AUTO_HIT] for torrent weapons.
    pub skill: u32,
    pub strength: u32,
    /// Armour penetration as a positive magnitude.
    #[serde(default)]
    pub armor_penetration: u32,
    pub damage: String,
    #[serde(default)]
    pub modifiers: WeaponModifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attacker {
    pub name: String,
    pub models: u32,
    #[serde(default)]
    pub weapons: Vec<WeaponProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defender {
    pub name: String,
    pub toughness: u32,
    /// Armour save target. 0 means no armour save.
    pub save: u32,
    #[serde(default)]
    pub invulnerable_save: Option<u32>,
}

/// Wound target from Strength against Toughness, adjusted and clamped to
/// `2..=sides`.
pub fn wound_target(strength: u32, toughness: u32, wound_modifier: i32, sides: u32) -> u32 {
    let s = i64::from(strength);
    let t = i64::from(toughness);
    let base = if s >= 2 * t {
        2
    } else if s > t {
        3
    } else if s == t {
        4
    } else if s * 2 <= t {
        6
    } else {
        5
    };
    let highest = i64::from(sides).max(MIN_WOUND_TARGET);
    (base - i64::from(wound_modifier)).clamp(MIN_WOUND_TARGET, highest) as u32
}

/// Save target after armour penetration, falling back to a better invulnerable save.
///
/// The result is clamped to `2..=sides + 1`; `sides + 1` cannot be rolled and
/// stands for "no save".
pub fn save_target(
    save: u32,
    armor_penetration: u32,
    invulnerable: Option<u32>,
    sides: u32,
) -> u32 {
    let no_save = sides.saturating_add(1);
    let armour = if save == 0 {
        no_save
    } else {
        save.saturating_add(armor_penetration).clamp(2, no_save)
    };
    match invulnerable {
        Some(invuln) if invuln > 0 => armour.min(invuln.clamp(2, no_save)),
        _ => armour,
    }
}
