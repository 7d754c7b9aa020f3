use thiserror::Error;

use crate::data::validate::ValidationReport;

#[derive(Error, Debug)]
pub enum MathhammerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("scenario failed validation with {} error(s)", .0.error_count())]
    Validation(ValidationReport),

    /// Resolution needs at least one attacker and one defender.
    #[error("no {0} selected")]
    MissingParticipant(&'static str),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, MathhammerError>;
