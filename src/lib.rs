//! Движок скачек: симуляция забегов и расчёт ставок (win / place / quinella / trifecta).
//!
//! Слои:
//! - `domain` — лошади, конфиг забега, порядок финиша, ставки, коэффициенты;
//! - `engine` — веса Plackett-Luce, симуляция, Монте-Карло, коэффициенты, расчёт;
//! - `infra` — детерминированный RNG, seed'ы, фоновый прогон;
//! - `api` — команды и DTO для хоста;
//! - `predictor` — простой советчик поверх коэффициентов.

pub mod api;
pub mod domain;
pub mod engine;
pub mod infra;
pub mod predictor;

pub use domain::{Bet, BetType, FinishOrder, Horse, HorseId, OddsTable, Payout, Points, RaceConfig, RaceResult, RaceSeed};
pub use engine::{estimate, prepare_odds, resolve, simulate, validate_bets, EngineError};
