use std::fmt;

use serde::Serialize;

use crate::combat::{resolve_matchups, ResolutionResult};
use crate::config::EngineConfig;
use crate::data::{
    validate_scenario, Scenario, ValidationDiagnostic, ValidationReport, ValidationSeverity,
};

const ENGINE_NAME: &str = "mathhammer_v1";

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub status: &'static str,
    pub engine: &'static str,
    pub sides: u32,
    pub trim_epsilon: f64,
    pub results: Vec<ResolutionResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: String,
    pub errors: Vec<ValidationDiagnostic>,
}

impl From<ValidationReport> for ValidationErrorResponse {
    fn from(report: ValidationReport) -> Self {
        Self {
            status: "error",
            message: format!(
                "scenario failed validation with {} error(s)",
                report.error_count()
            ),
            errors: report.diagnostics,
        }
    }
}

#[derive(Debug)]
pub enum ResolveError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(payload) => write!(f, "{}", payload.message),
        }
    }
}

impl std::error::Error for ResolveError {}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "mathhammer-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Resolve every matchup of the scenario in `body` (JSON).
pub fn resolve_payload(body: &str, base: &EngineConfig) -> Result<String, ResolveError> {
    let scenario: Scenario = serde_json::from_str(body).map_err(ResolveError::Parse)?;
    let config = scenario.engine_config(base);

    let report = validate_scenario(&scenario, config.sides);
    if report.has_errors() {
        return Err(ResolveError::Validation(report.into()));
    }

    let results = resolve_matchups(
        &scenario.attackers,
        &scenario.defenders,
        &scenario.modifiers,
        &config,
    )
    .map_err(|err| {
        let mut report = ValidationReport::default();
        report.push(ValidationSeverity::Error, "scenario", err.to_string());
        ResolveError::Validation(report.into())
    })?;

    let response = ResolveResponse {
        status: "ok",
        engine: ENGINE_NAME,
        sides: config.sides,
        trim_epsilon: config.trim_epsilon,
        results,
    };
    serde_json::to_string_pretty(&response).map_err(ResolveError::Parse)
}
