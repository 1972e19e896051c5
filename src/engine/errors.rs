use crate::domain::HorseId;

use thiserror::Error;

/// Ошибки движка скачек.
///
/// Сюда попадают только ошибки конфигурации и нарушения контракта
/// (битый порядок финиша). Ошибки ставок идут отдельным списком,
/// см. `validation::BetValidationError`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("temperature must be a finite number > 0, got {0}")]
    InvalidTemperature(f64),

    #[error("margin must be a finite number >= 0, got {0}")]
    InvalidMargin(f64),

    #[error("horse count must be > 0, got {0}")]
    InvalidHorseCount(usize),

    #[error("config expects {expected} horses, got {actual}")]
    HorseCountMismatch { expected: usize, actual: usize },

    #[error("malformed seed: {0}")]
    InvalidSeed(String),

    #[error("horse {id} is invalid: {reason}")]
    InvalidHorse { id: HorseId, reason: String },

    #[error("horse {0} appears more than once in the field")]
    DuplicateHorse(HorseId),

    #[error("expected {expected} weights (one per horse), got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("trial count must be > 0")]
    InvalidTrialCount,

    #[error("finish order has {actual} entries, expected {expected}")]
    FinishOrderLength { expected: usize, actual: usize },

    #[error("finish order lists horse {0} more than once")]
    FinishOrderDuplicate(HorseId),

    #[error("finish order contains unknown horse {0}")]
    FinishOrderUnknownHorse(HorseId),

    #[error("config error: {0}")]
    Config(String),
}
