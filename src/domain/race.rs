use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::horse::Horse;
use crate::domain::HorseId;
use crate::engine::errors::EngineError;

/// Seed забега: число или строка (например, название забега).
///
/// В JSON принимается и `42`, и `"derby-2024"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RaceSeed {
    Int(u64),
    Text(String),
}

impl fmt::Display for RaceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceSeed::Int(v) => write!(f, "{}", v),
            RaceSeed::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<u64> for RaceSeed {
    fn from(v: u64) -> Self {
        RaceSeed::Int(v)
    }
}

impl From<&str> for RaceSeed {
    fn from(s: &str) -> Self {
        RaceSeed::Text(s.to_string())
    }
}

/// Уровень сложности. Движок его не читает: к моменту вызова он уже
/// развёрнут в количество лошадей, температуру и маржу.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

/// Параметры, в которые разворачивается уровень сложности.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyPreset {
    pub horse_count: usize,
    pub temperature: f64,
    pub margin: f64,
}

impl Difficulty {
    pub fn preset(self) -> DifficultyPreset {
        match self {
            Difficulty::Easy => DifficultyPreset {
                horse_count: 6,
                temperature: 8.0,
                margin: 0.10,
            },
            Difficulty::Normal => DifficultyPreset {
                horse_count: 8,
                temperature: 10.0,
                margin: 0.15,
            },
            Difficulty::Hard => DifficultyPreset {
                horse_count: 12,
                temperature: 14.0,
                margin: 0.18,
            },
            Difficulty::Expert => DifficultyPreset {
                horse_count: 16,
                temperature: 18.0,
                margin: 0.22,
            },
        }
    }
}

/// Конфиг забега.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RaceConfig {
    /// Количество лошадей N.
    pub horse_count: usize,
    /// Температура τ > 0: чем меньше, тем увереннее побеждают фавориты.
    pub temperature: f64,
    /// Маржа букмекера m >= 0 (доля overround).
    pub margin: f64,
    pub seed: RaceSeed,
    /// Только для информации.
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl RaceConfig {
    /// Конфиг из пресета сложности.
    pub fn from_difficulty(difficulty: Difficulty, seed: impl Into<RaceSeed>) -> Self {
        let preset = difficulty.preset();
        Self {
            horse_count: preset.horse_count,
            temperature: preset.temperature,
            margin: preset.margin,
            seed: seed.into(),
            difficulty,
        }
    }

    /// Проверка конфига. Ошибка здесь = ошибка вызывающего кода,
    /// никаких подстановок значений по умолчанию.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.horse_count == 0 {
            return Err(EngineError::InvalidHorseCount(self.horse_count));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(EngineError::InvalidTemperature(self.temperature));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(EngineError::InvalidMargin(self.margin));
        }
        if let RaceSeed::Text(s) = &self.seed {
            if s.is_empty() {
                return Err(EngineError::InvalidSeed("empty text seed".into()));
            }
        }
        Ok(())
    }

    /// Проверка конфига вместе с полем лошадей:
    /// количество совпадает, id = 1..N по порядку, рейтинги конечные.
    pub fn validate_field(&self, horses: &[Horse]) -> Result<(), EngineError> {
        self.validate()?;

        if horses.len() != self.horse_count {
            return Err(EngineError::HorseCountMismatch {
                expected: self.horse_count,
                actual: horses.len(),
            });
        }

        let mut seen = HashSet::with_capacity(horses.len());
        for (idx, horse) in horses.iter().enumerate() {
            if horse.id as usize != idx + 1 {
                return Err(EngineError::InvalidHorse {
                    id: horse.id,
                    reason: format!("expected id {} at position {}", idx + 1, idx),
                });
            }
            if !horse.rating.is_finite() {
                return Err(EngineError::InvalidHorse {
                    id: horse.id,
                    reason: "rating must be finite".into(),
                });
            }
            if !seen.insert(horse.id) {
                return Err(EngineError::DuplicateHorse(horse.id));
            }
        }

        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        let config: RaceConfig =
            serde_json::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Загрузить конфиг из JSON-файла.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }
}

/// Итоговый порядок финиша: перестановка всех id лошадей.
/// Позиция i (с нуля) = (i+1)-е место.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FinishOrder(Vec<HorseId>);

impl FinishOrder {
    /// Собрать порядок финиша с проверкой целостности:
    /// длина = N, все id из 1..=N, без повторов.
    pub fn checked(order: Vec<HorseId>, horse_count: usize) -> Result<Self, EngineError> {
        if order.len() != horse_count {
            return Err(EngineError::FinishOrderLength {
                expected: horse_count,
                actual: order.len(),
            });
        }

        let mut seen = vec![false; horse_count];
        for &id in &order {
            if id == 0 || id as usize > horse_count {
                return Err(EngineError::FinishOrderUnknownHorse(id));
            }
            let slot = &mut seen[id as usize - 1];
            if *slot {
                return Err(EngineError::FinishOrderDuplicate(id));
            }
            *slot = true;
        }

        Ok(FinishOrder(order))
    }

    /// Без проверки: только для симулятора, который строит перестановку сам.
    pub(crate) fn from_draw(order: Vec<HorseId>) -> Self {
        FinishOrder(order)
    }

    pub fn as_slice(&self) -> &[HorseId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn winner(&self) -> Option<HorseId> {
        self.0.first().copied()
    }

    /// Первые k финишировавших (или меньше, если лошадей меньше k).
    pub fn top(&self, k: usize) -> &[HorseId] {
        &self.0[..k.min(self.0.len())]
    }

    /// Место лошади (с нуля).
    pub fn position_of(&self, id: HorseId) -> Option<usize> {
        self.0.iter().position(|&h| h == id)
    }

    pub fn into_inner(self) -> Vec<HorseId> {
        self.0
    }
}
