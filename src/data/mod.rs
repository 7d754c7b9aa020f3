pub mod scenario;
pub mod validate;

pub use scenario::{load_scenario, Scenario};
pub use validate::{
    validate_scenario, ValidationDiagnostic, ValidationReport, ValidationSeverity, MAX_ATTACKS,
    MAX_DAMAGE, MAX_SIDES, MAX_SUSTAINED_HITS,
};
