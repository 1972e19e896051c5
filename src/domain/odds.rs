use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::HorseId;

/// Неупорядоченная пара (квинелла). Всегда хранится как (меньший, больший),
/// конструктор нормализует сам.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: HorseId,
    high: HorseId,
}

impl PairKey {
    pub fn new(a: HorseId, b: HorseId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> HorseId {
        self.low
    }

    pub fn high(&self) -> HorseId {
        self.high
    }

    pub fn contains(&self, id: HorseId) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Упорядоченная тройка (трифекта): 1-е, 2-е, 3-е место. Не нормализуется.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripleKey(pub HorseId, pub HorseId, pub HorseId);

impl TripleKey {
    pub fn as_array(&self) -> [HorseId; 3] {
        [self.0, self.1, self.2]
    }
}

impl fmt::Display for TripleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0, self.1, self.2)
    }
}

/// Ошибка разбора строкового ключа ("a-b" / "a-b-c").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed odds key {0:?}")]
pub struct KeyParseError(pub String);

fn parse_ids(raw: &str, expected: usize) -> Result<Vec<HorseId>, KeyParseError> {
    let ids = raw
        .split('-')
        .map(|part| part.trim().parse::<HorseId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| KeyParseError(raw.to_string()))?;
    if ids.len() != expected {
        return Err(KeyParseError(raw.to_string()));
    }
    Ok(ids)
}

impl FromStr for PairKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = parse_ids(s, 2)?;
        Ok(PairKey::new(ids[0], ids[1]))
    }
}

impl FromStr for TripleKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = parse_ids(s, 3)?;
        Ok(TripleKey(ids[0], ids[1], ids[2]))
    }
}

// Ключи сериализуются строкой "a-b" / "a-b-c", чтобы работать ключами JSON-объектов.
macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(PairKey);
string_serde!(TripleKey);

/// Таблица десятичных коэффициентов на забег.
///
/// `win` и `place` индексируются позицией лошади (id - 1).
/// Карты квинеллы и трифекты разреженные: в них только комбинации,
/// которые реально выпадали в Монте-Карло. Нет ключа = коэффициент 0.
///
/// Строится один раз на забег, дальше только читается.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OddsTable {
    win: Vec<f64>,
    place: Vec<f64>,
    quinella: BTreeMap<PairKey, f64>,
    trifecta: BTreeMap<TripleKey, f64>,
}

impl OddsTable {
    pub fn new(
        win: Vec<f64>,
        place: Vec<f64>,
        quinella: BTreeMap<PairKey, f64>,
        trifecta: BTreeMap<TripleKey, f64>,
    ) -> Self {
        Self {
            win,
            place,
            quinella,
            trifecta,
        }
    }

    pub fn win(&self) -> &[f64] {
        &self.win
    }

    pub fn place(&self) -> &[f64] {
        &self.place
    }

    pub fn quinella(&self) -> &BTreeMap<PairKey, f64> {
        &self.quinella
    }

    pub fn trifecta(&self) -> &BTreeMap<TripleKey, f64> {
        &self.trifecta
    }

    /// Коэффициент на победу; 0, если такой лошади нет.
    pub fn win_odds(&self, id: HorseId) -> f64 {
        lookup_by_id(&self.win, id)
    }

    pub fn place_odds(&self, id: HorseId) -> f64 {
        lookup_by_id(&self.place, id)
    }

    pub fn quinella_odds(&self, key: PairKey) -> f64 {
        self.quinella.get(&key).copied().unwrap_or(0.0)
    }

    pub fn trifecta_odds(&self, key: TripleKey) -> f64 {
        self.trifecta.get(&key).copied().unwrap_or(0.0)
    }
}

fn lookup_by_id(values: &[f64], id: HorseId) -> f64 {
    if id == 0 {
        return 0.0;
    }
    values.get(id as usize - 1).copied().unwrap_or(0.0)
}
