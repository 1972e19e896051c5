use std::collections::BTreeMap;

use crate::domain::horse::Horse;
use crate::domain::odds::OddsTable;
use crate::domain::race::RaceConfig;
use crate::engine::errors::EngineError;
use crate::engine::monte_carlo::Estimate;
use crate::engine::weights::WeightModel;

/// Минимальный коэффициент по умолчанию.
pub const DEFAULT_ODDS_FLOOR: f64 = 1.05;

/// Перевод вероятностей в десятичные коэффициенты с маржой.
///
/// Победа: `p * (1 + m) / Σp` (рынок взаимоисключающий, нормируем).
/// Остальные рынки: `p * (1 + m)` без нормировки.
/// Коэффициент = `max(floor, 1 / inflated)`; нулевая вероятность даёт 0
/// («вероятность не наблюдалась»).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OddsCalculator {
    margin: f64,
    floor: f64,
}

impl OddsCalculator {
    pub fn new(margin: f64) -> Result<Self, EngineError> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(EngineError::InvalidMargin(margin));
        }
        Ok(Self {
            margin,
            floor: DEFAULT_ODDS_FLOOR,
        })
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    fn to_decimal(&self, inflated: f64) -> f64 {
        if !inflated.is_finite() || inflated <= 0.0 {
            return 0.0;
        }
        (1.0 / inflated).max(self.floor)
    }

    /// Коэффициенты на победу из аналитических вероятностей.
    pub fn win_odds(&self, probabilities: &[f64]) -> Vec<f64> {
        let total: f64 = probabilities.iter().sum();
        if total <= 0.0 {
            return vec![0.0; probabilities.len()];
        }
        probabilities
            .iter()
            .map(|p| self.to_decimal(p * (1.0 + self.margin) / total))
            .collect()
    }

    /// Коэффициент для одного исхода не-взаимоисключающего рынка.
    pub fn market_odds(&self, probability: f64) -> f64 {
        self.to_decimal(probability * (1.0 + self.margin))
    }

    pub fn place_odds(&self, probabilities: &[f64]) -> Vec<f64> {
        probabilities.iter().map(|&p| self.market_odds(p)).collect()
    }

    /// Квинелла / трифекта: ключи переносятся как есть, без досчёта отсутствующих.
    pub fn combination_odds<K: Ord + Copy>(&self, probabilities: &BTreeMap<K, f64>) -> BTreeMap<K, f64> {
        probabilities
            .iter()
            .map(|(&key, &p)| (key, self.market_odds(p)))
            .collect()
    }

    pub fn build_table(&self, win_probabilities: &[f64], estimate: &Estimate) -> OddsTable {
        OddsTable::new(
            self.win_odds(win_probabilities),
            self.place_odds(&estimate.place_probabilities),
            self.combination_odds(&estimate.quinella_probabilities),
            self.combination_odds(&estimate.trifecta_probabilities),
        )
    }
}

/// Собрать таблицу коэффициентов на забег: победа аналитически из весов,
/// остальное из оценки Монте-Карло.
pub fn prepare_odds(
    horses: &[Horse],
    config: &RaceConfig,
    estimate: &Estimate,
) -> Result<OddsTable, EngineError> {
    config.validate_field(horses)?;

    let win_probabilities = WeightModel::new(config.temperature)?.win_probabilities(horses);
    let table = OddsCalculator::new(config.margin)?.build_table(&win_probabilities, estimate);

    log::debug!(
        "odds prepared: margin={} win overround={:.4}",
        config.margin,
        overround(table.win())
    );
    Ok(table)
}

/// Σ 1/odds по ненулевым коэффициентам.
pub fn overround(odds: &[f64]) -> f64 {
    odds.iter().filter(|&&o| o > 0.0).map(|o| 1.0 / o).sum()
}
