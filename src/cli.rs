use tracing::{info, warn};

use crate::combat::{plan_matchups, resolve_matchups, ResolutionResult};
use crate::config::EngineConfig;
use crate::data::{load_scenario, validate_scenario, Scenario, ValidationReport};
use crate::error::{MathhammerError, Result};
use crate::parallel::{resolve_batch_with_progress, WorkerPool};
use crate::server;

/// Chunks a `batch` run is split into for progress logging.
const PROGRESS_BATCHES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Resolve,
    Batch,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("resolve") => Some(Command::Resolve),
        Some("batch") => Some(Command::Batch),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Resolve) => handle_resolve(args),
        Some(Command::Batch) => handle_batch(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: mathhammer <resolve|batch|validate|serve>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let config = EngineConfig::from_env();
    match server::run_server(&config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_resolve(args: &[String]) -> i32 {
    let Some(path) = scenario_path(args) else {
        eprintln!("usage: mathhammer resolve <scenario.yaml|scenario.json> [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let outcome = load_checked(path).and_then(|(scenario, config)| {
        resolve_matchups(
            &scenario.attackers,
            &scenario.defenders,
            &scenario.modifiers,
            &config,
        )
    });
    match outcome {
        Ok(results) if as_table => {
            print!("{}", summary_table(&results));
            0
        }
        Ok(results) => print_json(&results),
        Err(err) => report_failure("resolve", &err),
    }
}

fn handle_batch(args: &[String]) -> i32 {
    let Some(path) = scenario_path(args) else {
        eprintln!("usage: mathhammer batch <scenario.yaml|scenario.json> [workers]");
        return 2;
    };

    let outcome = load_checked(path).and_then(|(scenario, config)| {
        let workers = parse_usize_arg(args.get(3), "workers", config.workers);
        let matchups = plan_matchups(&scenario.attackers, &scenario.defenders)?;
        resolve_batch_with_progress(
            &matchups,
            &scenario.modifiers,
            &config,
            &WorkerPool::with_workers(workers),
            PROGRESS_BATCHES,
            |done, total| info!(done, total, "batch progress"),
        )
    });
    match outcome {
        Ok(results) => print_json(&results),
        Err(err) => report_failure("batch", &err),
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = scenario_path(args) else {
        eprintln!("usage: mathhammer validate <scenario.yaml|scenario.json>");
        return 2;
    };

    let scenario = match load_scenario(path) {
        Ok(scenario) => scenario,
        Err(err) => return report_failure("validate", &err),
    };
    let config = scenario.engine_config(&EngineConfig::from_env());
    let report = validate_scenario(&scenario, config.sides);
    print_diagnostics(&report);
    if report.has_errors() {
        eprintln!("validation failed: {} error(s)", report.error_count());
        1
    } else {
        println!("validation passed: {path}");
        0
    }
}

/// Load a scenario and refuse it when validation reports errors.
fn load_checked(path: &str) -> Result<(Scenario, EngineConfig)> {
    let scenario = load_scenario(path)?;
    let config = scenario.engine_config(&EngineConfig::from_env());
    let report = validate_scenario(&scenario, config.sides);
    for diagnostic in &report.diagnostics {
        warn!(%diagnostic, "scenario diagnostic");
    }
    if report.has_errors() {
        return Err(MathhammerError::Validation(report));
    }
    info!(
        path,
        attackers = scenario.attackers.len(),
        defenders = scenario.defenders.len(),
        sides = config.sides,
        "scenario loaded"
    );
    Ok((scenario, config))
}

/// Tab-separated per-matchup means, one row per result.
pub fn summary_table(results: &[ResolutionResult]) -> String {
    let mut table = String::from(
        "attacker\tweapon\tdefender\tattacks\thits\twounds\tunsaved\tmortal_damage\tnormal_damage\ttotal_damage\n",
    );
    for result in results {
        let s = &result.summary;
        table.push_str(&format!(
            "{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\n",
            result.attacker,
            result.weapon,
            result.defender,
            s.expected_attacks,
            s.expected_hits,
            s.expected_wounds,
            s.expected_unsaved,
            s.expected_mortal_damage,
            s.expected_normal_damage,
            s.expected_total_damage,
        ));
    }
    table
}

fn scenario_path(args: &[String]) -> Option<&str> {
    args.get(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
}

fn print_json(results: &[ResolutionResult]) -> i32 {
    match serde_json::to_string_pretty(results) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize resolution results: {err}");
            1
        }
    }
}

fn print_diagnostics(report: &ValidationReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
}

fn report_failure(command: &str, err: &MathhammerError) -> i32 {
    eprintln!("{command} failed: {err}");
    if let MathhammerError::Validation(report) = err {
        print_diagnostics(report);
    }
    1
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["mathhammer", "resolve"])), Some(Command::Resolve));
        assert_eq!(parse_command(&args(&["mathhammer", "batch"])), Some(Command::Batch));
        assert_eq!(parse_command(&args(&["mathhammer", "validate"])), Some(Command::Validate));
        assert_eq!(parse_command(&args(&["mathhammer", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&args(&["mathhammer", "simulate"])), None);
        assert_eq!(parse_command(&args(&["mathhammer"])), None);
    }

    #[test]
    fn missing_scenario_path_is_a_usage_error() {
        assert_eq!(run_with_args(&args(&["mathhammer", "resolve"])), 2);
        assert_eq!(run_with_args(&args(&["mathhammer", "resolve", "--table"])), 2);
        assert_eq!(run_with_args(&args(&["mathhammer", "validate"])), 2);
    }

    #[test]
    fn invalid_worker_count_falls_back() {
        assert_eq!(parse_usize_arg(Some(&"four".to_string()), "workers", 3), 3);
        assert_eq!(parse_usize_arg(Some(&"4".to_string()), "workers", 3), 4);
        assert_eq!(parse_usize_arg(None, "workers", 0), 0);
    }
}
