use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::validation::ValidationReport;
use crate::engine::EngineError;

/// Ошибки внешнего API (то, что отдаём хосту / UI).
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq)]
pub enum ApiError {
    /// Неправильные входные данные (например, битый JSON или ключ "a-b").
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Ошибка конфигурации забега (τ, N, seed, поле лошадей).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Порядок финиша не является перестановкой лошадей.
    #[error("finish order integrity violation: {0}")]
    IntegrityViolation(String),

    /// Ставки не прошли проверку; забег запускать нельзя.
    #[error("bets rejected: {}", .0.messages().join("; "))]
    BetsRejected(ValidationReport),

    /// Внутренняя ошибка.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::FinishOrderLength { .. }
            | EngineError::FinishOrderDuplicate(_)
            | EngineError::FinishOrderUnknownHorse(_) => ApiError::IntegrityViolation(err.to_string()),
            _ => ApiError::InvalidConfig(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
