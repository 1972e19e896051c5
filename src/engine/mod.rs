//! Движок скачек: веса, симуляция забега, Монте-Карло, коэффициенты, расчёт ставок.
//!
//! Основные операции:
//!   - `simulate` – один «настоящий» забег по seed'у конфига
//!   - `estimate` – пачками гоняет много забегов и считает частоты
//!   - `prepare_odds` – частоты + аналитика победы → `OddsTable`
//!   - `validate_bets` / `resolve` – проверка и расчёт ставок

pub mod errors;
pub mod field;
pub mod monte_carlo;
pub mod odds;
pub mod payout;
pub mod simulator;
pub mod validation;
pub mod weights;

pub use errors::EngineError;
pub use field::generate_field;
pub use monte_carlo::{estimate, Estimate, EstimateEvent, EstimateProgress, EstimateRun, MonteCarloEstimator};
pub use odds::{prepare_odds, OddsCalculator, DEFAULT_ODDS_FLOOR};
pub use payout::resolve;
pub use simulator::{simulate, simulate_with_weights};
pub use validation::{validate_bet, validate_bets, BetError, BetValidationError, BettingRules, ValidationReport};
pub use weights::WeightModel;

/// RNG интерфейс для engine.
///
/// Реализации лежат в infra: детерминированный `DeterministicRng`
/// и `SystemRng` поверх `rand`. Всё остальное выражено через `next_f64`,
/// поэтому количество вызовов на операцию фиксировано.
pub trait RandomSource {
    /// Следующее число в [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Число в [min, max).
    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Целое в [min, max] включительно.
    fn int(&mut self, min: i64, max: i64) -> i64 {
        self.range(min as f64, max as f64 + 1.0).floor() as i64
    }

    /// Случайный элемент; `None` для пустого среза. Один вызов `next_f64`.
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_f64() * items.len() as f64).floor() as usize;
        items.get(idx.min(items.len() - 1))
    }

    /// Fisher–Yates на месте: от последнего индекса до 1,
    /// ровно один `next_f64` на каждую позицию.
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64).floor() as usize;
            slice.swap(i, j.min(i));
        }
    }
}
