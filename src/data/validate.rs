use std::fmt;

use serde::Serialize;

use crate::combat::{Attacker, Defender, ModifierSet, WeaponProfile};
use crate::config::{is_usable_epsilon, MAX_TRIM_EPSILON};
use crate::data::scenario::Scenario;
use crate::dice::{try_parse_dice, DiceSpec};

/// Largest die the engine will roll hits, wounds and saves on.
pub const MAX_SIDES: u32 = 100;
/// Largest number of extra hits one critical may generate.
pub const MAX_SUSTAINED_HITS: u32 = 10;
/// Largest attack count one weapon may roll across all of its models.
pub const MAX_ATTACKS: u64 = 1_000;
/// Largest damage one unsaved wound may inflict.
pub const MAX_DAMAGE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }
}

/// Check a scenario before resolving it. The engine itself tolerates all of
/// these; the report tells the user where their input degrades silently.
pub fn validate_scenario(scenario: &Scenario, sides: u32) -> ValidationReport {
    let mut report = ValidationReport::default();

    if scenario.attackers.is_empty() {
        report.push(ValidationSeverity::Error, "attackers", "no attacker selected");
    }
    if scenario.defenders.is_empty() {
        report.push(ValidationSeverity::Error, "defenders", "no defender selected");
    }

    validate_engine(&mut report, scenario, sides);
    validate_modifiers(&mut report, &scenario.modifiers, sides);
    for (index, attacker) in scenario.attackers.iter().enumerate() {
        validate_attacker(&mut report, attacker, index, sides);
    }
    for (index, defender) in scenario.defenders.iter().enumerate() {
        validate_defender(&mut report, defender, index);
    }

    report
}

fn validate_engine(report: &mut ValidationReport, scenario: &Scenario, sides: u32) {
    if sides > MAX_SIDES {
        report.push(
            ValidationSeverity::Error,
            "sides",
            format!("a d{sides} is larger than the supported d{MAX_SIDES}"),
        );
    }
    if let Some(epsilon) = scenario.trim_epsilon {
        if !is_usable_epsilon(epsilon) {
            report.push(
                ValidationSeverity::Error,
                "trim_epsilon",
                format!("trim epsilon {epsilon} must lie between 0 and {MAX_TRIM_EPSILON}"),
            );
        }
    }
}

fn validate_modifiers(report: &mut ValidationReport, modifiers: &ModifierSet, sides: u32) {
    check_critical_target(report, "modifiers.critical_hits", modifiers.critical_hits, sides);
    check_critical_target(
        report,
        "modifiers.critical_wounds",
        modifiers.critical_wounds,
        sides,
    );
    check_sustained_hits(report, "modifiers.sustained_hits", modifiers.sustained_hits);
}

fn check_sustained_hits(report: &mut ValidationReport, context: &str, sustained: u32) {
    if sustained > MAX_SUSTAINED_HITS {
        report.push(
            ValidationSeverity::Error,
            context,
            format!("sustained hits {sustained} exceeds the limit of {MAX_SUSTAINED_HITS}"),
        );
    }
}

/// Largest value a roll of `spec` can produce.
fn highest_roll(spec: &DiceSpec) -> u64 {
    u64::from(spec.dice_count) * u64::from(spec.sides) + u64::from(spec.bonus)
}

fn check_critical_target(report: &mut ValidationReport, context: &str, target: u32, sides: u32) {
    if target > sides {
        report.push(
            ValidationSeverity::Error,
            context,
            format!("critical threshold {target} cannot be rolled on a d{sides}"),
        );
    }
}

fn validate_attacker(report: &mut ValidationReport, attacker: &Attacker, index: usize, sides: u32) {
    let context = format!("attackers[{index}] '{}'", attacker.name);
    if attacker.models == 0 {
        report.push(ValidationSeverity::Warning, context.clone(), "has zero models");
    }
    if attacker.weapons.is_empty() {
        report.push(ValidationSeverity::Warning, context.clone(), "has no weapons");
    }
    for (weapon_index, weapon) in attacker.weapons.iter().enumerate() {
        let weapon_context = format!("{context}.weapons[{weapon_index}] '{}'", weapon.name);
        validate_weapon(report, weapon, &weapon_context, sides);
        check_attack_volume(report, weapon, attacker.models, &weapon_context);
    }
}

fn check_attack_volume(
    report: &mut ValidationReport,
    weapon: &WeaponProfile,
    models: u32,
    context: &str,
) {
    let Some(attacks) = try_parse_dice(&weapon.attacks) else {
        return;
    };
    let most = highest_roll(&attacks).saturating_mul(u64::from(models));
    if most > MAX_ATTACKS {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.attacks"),
            format!(
                "{models} model(s) can roll up to {most} attacks, above the limit of {MAX_ATTACKS}"
            ),
        );
    }
}

fn validate_weapon(
    report: &mut ValidationReport,
    weapon: &WeaponProfile,
    context: &str,
    sides: u32,
) {
    let attacks = check_expression(report, context, "attacks", &weapon.attacks);
    if attacks == Some(DiceSpec::ZERO) {
        report.push(
            ValidationSeverity::Warning,
            format!("{context}.attacks"),
            "weapon makes no attacks",
        );
    }
    let damage = check_expression(report, context, "damage", &weapon.damage);
    if let Some(most) = damage.as_ref().map(highest_roll).filter(|&most| most > MAX_DAMAGE) {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.damage"),
            format!("damage can reach {most}, above the limit of {MAX_DAMAGE}"),
        );
    }

    if weapon.skill > sides {
        report.push(
            ValidationSeverity::Warning,
            format!("{context}.skill"),
            format!("hit target {} cannot be rolled on a d{sides}", weapon.skill),
        );
    }
    check_critical_target(
        report,
        &format!("{context}.modifiers.critical_wounds"),
        weapon.modifiers.critical_wounds,
        sides,
    );
    check_sustained_hits(
        report,
        &format!("{context}.modifiers.sustained_hits"),
        weapon.modifiers.sustained_hits,
    );
}

/// Returns the parsed expression, or `None` when it is not one.
fn check_expression(
    report: &mut ValidationReport,
    context: &str,
    field: &str,
    raw: &str,
) -> Option<DiceSpec> {
    let spec = try_parse_dice(raw);
    if spec.is_none() {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.{field}"),
            format!("unrecognised dice expression '{raw}'"),
        );
    }
    spec
}

fn validate_defender(report: &mut ValidationReport, defender: &Defender, index: usize) {
    let context = format!("defenders[{index}] '{}'", defender.name);
    if defender.toughness == 0 {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.toughness"),
            "toughness must be at least 1",
        );
    }
}
