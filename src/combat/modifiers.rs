use serde::{Deserialize, Serialize};

/// Which results of a roll are picked up and rolled again.
///
/// Ordered from weakest to strongest so the more generous of two sources wins
/// when modifiers are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RerollPolicy {
    #[default]
    None,
    /// Reroll results of exactly 1.
    Ones,
    /// Reroll every failed result.
    Fails,
    /// Reroll everything that is not a critical result.
    NonCrits,
}

impl RerollPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ones => "ones",
            Self::Fails => "fails",
            Self::NonCrits => "non-crits",
        }
    }

    /// Saves have no critical results, so `NonCrits` does nothing there.
    pub const fn for_saves(self) -> Self {
        match self {
            Self::NonCrits => Self::None,
            other => other,
        }
    }
}

/// Per-resolution modifiers shared by every stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierSet {
    pub reroll_hits: RerollPolicy,
    pub reroll_wounds: RerollPolicy,
    pub reroll_saves: RerollPolicy,
    /// Added to the wound roll; a +1 lowers the wound target by one.
    pub wound_modifier: i32,
    /// Face at or above which a hit roll is critical. 0 means the die's top face.
    pub critical_hits: u32,
    /// Face at or above which a wound roll is critical. 0 means the die's top face.
    pub critical_wounds: u32,
    pub lethal_hits: bool,
    pub devastating_wounds: bool,
    /// Extra hits generated by each critical hit.
    pub sustained_hits: u32,
}

/// Weapon abilities carried on a single profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponModifiers {
    /// Reroll failed wound rolls.
    pub twin_linked: bool,
    pub lethal_hits: bool,
    pub devastating_wounds: bool,
    pub sustained_hits: u32,
    pub critical_wounds: u32,
}

impl ModifierSet {
    /// Combine global modifiers with a weapon's own abilities.
    pub fn merged_with(&self, weapon: &WeaponModifiers) -> Self {
        let reroll_wounds = if weapon.twin_linked {
            self.reroll_wounds.max(RerollPolicy::Fails)
        } else {
            self.reroll_wounds
        };
        Self {
            reroll_wounds,
            lethal_hits: self.lethal_hits || weapon.lethal_hits,
            devastating_wounds: self.devastating_wounds || weapon.devastating_wounds,
            sustained_hits: self.sustained_hits.max(weapon.sustained_hits),
            critical_wounds: if weapon.critical_wounds > 0 {
                weapon.critical_wounds
            } else {
                self.critical_wounds
            },
            ..*self
        }
    }

    /// Critical hit face on a die with `sides` faces.
    pub fn critical_hit_target(&self, sides: u32) -> u32 {
        if self.critical_hits > 0 {
            self.critical_hits
        } else {
            sides
        }
    }

    /// Critical wound face on a die with `sides` faces.
    pub fn critical_wound_target(&self, sides: u32) -> u32 {
        if self.critical_wounds > 0 {
            self.critical_wounds
        } else {
            sides
        }
    }
}
