use crate::domain::horse::Horse;
use crate::engine::errors::EngineError;

/// Веса Plackett-Luce: `exp(rating / τ)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightModel {
    temperature: f64,
}

impl WeightModel {
    /// τ должна быть конечной и > 0, иначе это ошибка конфигурации.
    pub fn new(temperature: f64) -> Result<Self, EngineError> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(EngineError::InvalidTemperature(temperature));
        }
        Ok(Self { temperature })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn weight(&self, horse: &Horse) -> f64 {
        (horse.rating / self.temperature).exp()
    }

    /// Веса в порядке лошадей в срезе.
    pub fn weights(&self, horses: &[Horse]) -> Vec<f64> {
        horses.iter().map(|h| self.weight(h)).collect()
    }

    /// Аналитические вероятности победы: weight_i / Σweights.
    pub fn win_probabilities(&self, horses: &[Horse]) -> Vec<f64> {
        let weights = self.weights(horses);
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return vec![0.0; weights.len()];
        }
        weights.into_iter().map(|w| w / total).collect()
    }
}
