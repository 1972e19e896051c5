//! RngSeed — 32-битный seed для RNG забега.
//!
//! Позволяет:
//!   - привести seed из конфига (число или строка) к 32 битам
//!   - детерминированно получить seed для i-го прогона Монте-Карло:
//!         trial = H(domain || base || trial_index)
//!   - создавать DeterministicRng из seed
//!
//! Seed прогона зависит только от (base, trial_index), поэтому разбиение
//! на пачки не меняет итоговый результат.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::RaceSeed;
use crate::engine::EngineError;
use crate::infra::rng::DeterministicRng;

const TRIAL_DOMAIN: &[u8] = b"HORSE_RACE_TRIAL_V1";
const FIELD_DOMAIN: &[u8] = b"HORSE_RACE_FIELD_V1";

/// 32-битный seed для RNG. Ноль никогда не хранится.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RngSeed {
    pub value: u32,
}

impl RngSeed {
    pub fn from_u32(value: u32) -> Self {
        Self {
            value: if value == 0 { 1 } else { value },
        }
    }

    /// Привести seed из конфига к 32 битам.
    /// Число обрезается до младших 32 бит, строка хэшируется.
    pub fn from_race_seed(seed: &RaceSeed) -> Result<Self, EngineError> {
        match seed {
            RaceSeed::Int(v) => Ok(Self::from_u32(*v as u32)),
            RaceSeed::Text(s) if s.is_empty() => {
                Err(EngineError::InvalidSeed("empty text seed".into()))
            }
            RaceSeed::Text(s) => Ok(Self::from_u32(hash_text(s))),
        }
    }

    /// Seed для прогона Монте-Карло с номером `trial_index`.
    pub fn derive_trial(&self, trial_index: u64) -> Self {
        self.derive(TRIAL_DOMAIN, trial_index)
    }

    /// Seed для генерации поля лошадей: отдельный поток, не пересекается с забегом.
    pub fn derive_field(&self) -> Self {
        self.derive(FIELD_DOMAIN, 0)
    }

    /// Доменное хэш-расширение:
    ///     new = H(domain || base || index)
    fn derive(&self, domain: &[u8], index: u64) -> Self {
        let mut hasher = Sha256::new();

        // Доменный префикс
        hasher.update(domain);

        // Базовый seed
        hasher.update(self.value.to_le_bytes());

        // Номер потока
        hasher.update(index.to_le_bytes());

        let hash = hasher.finalize();

        let mut out = [0u8; 4];
        out.copy_from_slice(&hash[..4]);

        Self::from_u32(u32::from_le_bytes(out))
    }

    /// Создать DeterministicRng из seed.
    pub fn to_rng(&self) -> DeterministicRng {
        DeterministicRng::from_seed(self.value)
    }
}

/// Некриптографический хэш строки: h = h*31 + c по UTF-16 кодам
/// в знаковой 32-битной арифметике, затем модуль.
pub fn hash_text(text: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in text.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(unit as i32);
    }
    h.unsigned_abs()
}
