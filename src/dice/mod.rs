//! Dice expressions used for attack counts and damage.
//!
//! Accepts `[N]D<sides>[+B]` (for example `D6`, `2D6`, `D3+1`) and bare
//! integers. Anything else degrades to the zero expression rather than
//! failing, so a malformed form entry never aborts a resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::probability::{point_mass, shift, sum_of_n_dice};

/// Parsed `{dice_count, sides, bonus}` triple.
///
/// `dice_count == 0` is a flat value equal to `bonus`. When `dice_count > 0`
/// the die has at least two sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceSpec {
    pub dice_count: u32,
    pub sides: u32,
    pub bonus: u32,
}

impl DiceSpec {
    pub const ZERO: Self = Self {
        dice_count: 0,
        sides: 0,
        bonus: 0,
    };

    pub const fn flat(value: u32) -> Self {
        Self {
            dice_count: 0,
            sides: 0,
            bonus: value,
        }
    }

    pub const fn is_flat(&self) -> bool {
        self.dice_count == 0
    }

    /// Exact-mass array of one roll of this expression.
    pub fn roll_distribution(&self) -> Vec<f64> {
        if self.is_flat() {
            return point_mass(self.bonus as usize);
        }
        shift(&sum_of_n_dice(self.dice_count, self.sides), self.bonus as usize)
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_flat() {
            return write!(f, "{}", self.bonus);
        }
        if self.dice_count > 1 {
            write!(f, "{}", self.dice_count)?;
        }
        write!(f, "D{}", self.sides)?;
        if self.bonus > 0 {
            write!(f, "+{}", self.bonus)?;
        }
        Ok(())
    }
}

/// Parse a dice expression. Never fails; unrecognised input is [DiceSpec::ZERO].
pub fn parse_dice(raw: &str) -> DiceSpec {
    try_parse_dice(raw).unwrap_or(DiceSpec::ZERO)
}

/// Like [parse_dice], but `None` for input that is not a dice expression.
pub fn try_parse_dice(raw: &str) -> Option<DiceSpec> {
    let clean = raw.trim().to_uppercase();
    parse_dice_form(&clean).or_else(|| parse_digits(&clean).map(DiceSpec::flat))
}

fn parse_dice_form(clean: &str) -> Option<DiceSpec> {
    let (count, rest) = clean.split_once('D')?;
    let dice_count = if count.is_empty() {
        1
    } else {
        parse_digits(count)?
    };
    let (sides, bonus) = match rest.split_once('+') {
        Some((sides, bonus)) => (parse_digits(sides)?, parse_digits(bonus)?),
        None => (parse_digits(rest)?, 0),
    };

    match (dice_count, sides) {
        (0, _) => Some(DiceSpec::flat(bonus)),
        (_, 0) => None,
        // A one-sided die always shows 1.
        (n, 1) => Some(DiceSpec::flat(n.checked_add(bonus)?)),
        (n, s) => Some(DiceSpec {
            dice_count: n,
            sides: s,
            bonus,
        }),
    }
}

fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok()
}
