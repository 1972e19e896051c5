//! Простой «советчик» поверх таблицы коэффициентов.
//!
//! Это потребитель движка, а не его часть: он только читает `OddsTable`
//! и порядок финиша. Состояние (история, последний прогноз) живёт в самом
//! объекте, который создаёт и передаёт вызывающий код.

use serde::{Deserialize, Serialize};

use crate::domain::odds::{OddsTable, PairKey, TripleKey};
use crate::domain::race::FinishOrder;
use crate::domain::HorseId;

/// Прогноз на забег.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    /// Лошади по убыванию подразумеваемой вероятности победы.
    pub ranking: Vec<HorseId>,
    /// Подразумеваемая вероятность победы фаворита (1 / odds).
    pub confidence: f64,
}

impl Prediction {
    pub fn favorite(&self) -> Option<HorseId> {
        self.ranking.first().copied()
    }

    pub fn quinella(&self) -> Option<PairKey> {
        match self.ranking.as_slice() {
            [a, b, ..] => Some(PairKey::new(*a, *b)),
            _ => None,
        }
    }

    pub fn trifecta(&self) -> Option<TripleKey> {
        match self.ranking.as_slice() {
            [a, b, c, ..] => Some(TripleKey(*a, *b, *c)),
            _ => None,
        }
    }
}

/// Оценка прогноза после забега.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionScore {
    pub winner_hit: bool,
    pub quinella_hit: bool,
    pub trifecta_hit: bool,
    /// Где финишировал фаворит (с нуля).
    pub favorite_position: Option<usize>,
}

/// Сколько последних оценок хранит `Predictor` по умолчанию.
pub const DEFAULT_HISTORY_LIMIT: usize = 1_000;

/// История ограничена `history_limit` последними забегами: старые оценки
/// вытесняются, `win_accuracy` считается по окну.
#[derive(Clone, Debug)]
pub struct Predictor {
    last_prediction: Option<Prediction>,
    history: Vec<PredictionScore>,
    history_limit: usize,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Окно истории из `limit` забегов (не меньше одного).
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            last_prediction: None,
            history: Vec::new(),
            history_limit: limit.max(1),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Прогноз по коэффициентам на победу. `None`, если таблица пустая.
    /// Запоминается как последний – его оценит `record_outcome`.
    pub fn predict(&mut self, odds: &OddsTable) -> Option<Prediction> {
        let mut implied: Vec<(HorseId, f64)> = odds
            .win()
            .iter()
            .enumerate()
            .map(|(idx, &o)| {
                let p = if o > 0.0 { 1.0 / o } else { 0.0 };
                ((idx + 1) as HorseId, p)
            })
            .collect();

        if implied.is_empty() {
            return None;
        }

        // По убыванию вероятности, при равенстве – по номеру.
        implied.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let prediction = Prediction {
            confidence: implied[0].1,
            ranking: implied.into_iter().map(|(id, _)| id).collect(),
        };
        self.last_prediction = Some(prediction.clone());
        Some(prediction)
    }

    /// Оценить последний прогноз по итогу забега.
    /// `None`, если прогноза не было (или он уже оценён).
    pub fn record_outcome(&mut self, finish: &FinishOrder) -> Option<PredictionScore> {
        let prediction = self.last_prediction.take()?;
        let order = finish.as_slice();

        let winner_hit = prediction.favorite().is_some() && prediction.favorite() == finish.winner();
        let quinella_hit = match (prediction.quinella(), order) {
            (Some(pair), [a, b, ..]) => pair == PairKey::new(*a, *b),
            _ => false,
        };
        let trifecta_hit = match (prediction.trifecta(), order) {
            (Some(triple), [a, b, c, ..]) => triple == TripleKey(*a, *b, *c),
            _ => false,
        };
        let favorite_position = prediction.favorite().and_then(|id| finish.position_of(id));

        let score = PredictionScore {
            winner_hit,
            quinella_hit,
            trifecta_hit,
            favorite_position,
        };
        self.history.push(score);
        if self.history.len() > self.history_limit {
            let excess = self.history.len() - self.history_limit;
            self.history.drain(..excess);
        }
        Some(score)
    }

    pub fn history(&self) -> &[PredictionScore] {
        &self.history
    }

    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.last_prediction.as_ref()
    }

    /// Доля забегов, где фаворит победил.
    pub fn win_accuracy(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let hits = self.history.iter().filter(|s| s.winner_hit).count();
        hits as f64 / self.history.len() as f64
    }
}
