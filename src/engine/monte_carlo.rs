//! Монте-Карло оценка вероятностей place / quinella / trifecta.
//!
//! Оценщик гоняется пачками: `run_batch` считает следующие k прогонов и
//! возвращает прогресс. Прогон i всегда использует `base_seed.derive_trial(i)`,
//! поэтому границы пачек на итог не влияют. Вызывающий код может остановиться
//! раньше и взять менее точную оценку через `finish`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::horse::{place_slots, Horse};
use crate::domain::odds::{PairKey, TripleKey};
use crate::domain::race::RaceConfig;
use crate::engine::errors::EngineError;
use crate::engine::simulator::draw_order;
use crate::engine::weights::WeightModel;
use crate::infra::rng_seed::RngSeed;

/// Сколько пачек по умолчанию на весь прогон.
pub const DEFAULT_BATCH_COUNT: u64 = 10;

/// Прогресс: сколько прогонов уже посчитано.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateProgress {
    pub completed_trials: u64,
    pub total_trials: u64,
}

impl EstimateProgress {
    pub fn is_complete(&self) -> bool {
        self.completed_trials >= self.total_trials
    }

    /// Доля выполненного, 0.0..=1.0.
    pub fn fraction(&self) -> f64 {
        if self.total_trials == 0 {
            return 1.0;
        }
        self.completed_trials as f64 / self.total_trials as f64
    }
}

/// Итог оценки: частоты = количество / число прогонов.
///
/// Карты квинеллы и трифекты содержат только реально выпавшие комбинации.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Estimate {
    /// Сколько прогонов реально посчитано.
    pub trials: u64,
    /// Эмпирическая частота победы (по позиции лошади).
    pub win_probabilities: Vec<f64>,
    /// Частота попадания в top-K (по позиции лошади).
    pub place_probabilities: Vec<f64>,
    pub quinella_probabilities: BTreeMap<PairKey, f64>,
    pub trifecta_probabilities: BTreeMap<TripleKey, f64>,
}

/// Оценщик с накопленными счётчиками.
///
/// Владеет копией поля, чтобы прогон можно было увести в отдельный поток.
#[derive(Clone, Debug)]
pub struct MonteCarloEstimator {
    horses: Vec<Horse>,
    weights: Vec<f64>,
    base_seed: RngSeed,
    place_k: usize,
    total_trials: u64,
    completed: u64,
    win_counts: Vec<u64>,
    place_counts: Vec<u64>,
    quinella_counts: HashMap<PairKey, u64>,
    trifecta_counts: HashMap<TripleKey, u64>,
}

impl MonteCarloEstimator {
    pub fn new(horses: &[Horse], config: &RaceConfig, total_trials: u64) -> Result<Self, EngineError> {
        config.validate_field(horses)?;
        if total_trials == 0 {
            return Err(EngineError::InvalidTrialCount);
        }

        let weights = WeightModel::new(config.temperature)?.weights(horses);
        let base_seed = RngSeed::from_race_seed(&config.seed)?;
        let n = horses.len();

        Ok(Self {
            horses: horses.to_vec(),
            weights,
            base_seed,
            place_k: place_slots(n),
            total_trials,
            completed: 0,
            win_counts: vec![0; n],
            place_counts: vec![0; n],
            quinella_counts: HashMap::new(),
            trifecta_counts: HashMap::new(),
        })
    }

    pub fn progress(&self) -> EstimateProgress {
        EstimateProgress {
            completed_trials: self.completed,
            total_trials: self.total_trials,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total_trials
    }

    /// Посчитать следующие `max_trials` прогонов (или сколько осталось).
    pub fn run_batch(&mut self, max_trials: u64) -> EstimateProgress {
        let end = self.completed.saturating_add(max_trials).min(self.total_trials);

        for trial in self.completed..end {
            self.run_trial(trial);
        }
        self.completed = end;

        log::debug!(
            "monte carlo batch done: {}/{} trials",
            self.completed,
            self.total_trials
        );
        self.progress()
    }

    fn run_trial(&mut self, trial: u64) {
        // Свежий RNG на каждый прогон: прогоны не влияют друг на друга.
        let mut rng = self.base_seed.derive_trial(trial).to_rng();
        let order = draw_order(&self.horses, &self.weights, &mut rng);
        let finish = order.as_slice();

        if let Some(&winner) = finish.first() {
            self.win_counts[winner as usize - 1] += 1;
        }
        for &id in order.top(self.place_k) {
            self.place_counts[id as usize - 1] += 1;
        }
        if finish.len() >= 2 {
            *self
                .quinella_counts
                .entry(PairKey::new(finish[0], finish[1]))
                .or_insert(0) += 1;
        }
        if finish.len() >= 3 {
            *self
                .trifecta_counts
                .entry(TripleKey(finish[0], finish[1], finish[2]))
                .or_insert(0) += 1;
        }
    }

    /// Частоты по уже посчитанным прогонам. Если остановились раньше –
    /// делим на фактическое число прогонов.
    pub fn snapshot(&self) -> Estimate {
        let trials = self.completed;
        let freq = |count: u64| {
            if trials == 0 {
                0.0
            } else {
                count as f64 / trials as f64
            }
        };

        Estimate {
            trials,
            win_probabilities: self.win_counts.iter().map(|&c| freq(c)).collect(),
            place_probabilities: self.place_counts.iter().map(|&c| freq(c)).collect(),
            quinella_probabilities: self
                .quinella_counts
                .iter()
                .map(|(&k, &c)| (k, freq(c)))
                .collect(),
            trifecta_probabilities: self
                .trifecta_counts
                .iter()
                .map(|(&k, &c)| (k, freq(c)))
                .collect(),
        }
    }

    /// Итоговая оценка (с логированием).
    pub fn finish(&self) -> Estimate {
        if !self.is_complete() {
            log::warn!(
                "monte carlo stopped early at {}/{} trials",
                self.completed,
                self.total_trials
            );
        }
        let estimate = self.snapshot();
        log::info!(
            "monte carlo finished: {} trials, {} quinella pairs, {} trifecta triples observed",
            estimate.trials,
            estimate.quinella_probabilities.len(),
            estimate.trifecta_probabilities.len()
        );
        estimate
    }
}

/// Событие пошагового прогона.
#[derive(Clone, Debug, PartialEq)]
pub enum EstimateEvent {
    /// Очередная пачка посчитана.
    Progress(EstimateProgress),
    /// Всё посчитано, последнее событие.
    Finished(Estimate),
}

/// Итератор по пачкам: после каждой пачки `Progress`, в конце `Finished`.
///
/// Можно крутить синхронно в цикле или отдать в `infra::worker`.
#[derive(Clone, Debug)]
pub struct EstimateRun {
    estimator: MonteCarloEstimator,
    batch_size: u64,
    finished: bool,
}

impl EstimateRun {
    pub fn new(estimator: MonteCarloEstimator, batch_size: u64) -> Self {
        Self {
            estimator,
            batch_size: batch_size.max(1),
            finished: false,
        }
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn progress(&self) -> EstimateProgress {
        self.estimator.progress()
    }

    /// Прогнать до конца, вызывая `on_progress` после каждой пачки.
    pub fn drive(mut self, mut on_progress: impl FnMut(EstimateProgress)) -> Estimate {
        while !self.estimator.is_complete() {
            on_progress(self.estimator.run_batch(self.batch_size));
        }
        self.estimator.finish()
    }

    /// Остановиться сейчас и взять оценку по уже посчитанным прогонам.
    pub fn stop(self) -> Estimate {
        self.estimator.finish()
    }
}

impl Iterator for EstimateRun {
    type Item = EstimateEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.estimator.is_complete() {
            return Some(EstimateEvent::Progress(
                self.estimator.run_batch(self.batch_size),
            ));
        }

        self.finished = true;
        Some(EstimateEvent::Finished(self.estimator.finish()))
    }
}

/// Запустить оценку пачками. Без `batch_size` – примерно 10 пачек.
pub fn estimate(
    horses: &[Horse],
    config: &RaceConfig,
    trial_count: u64,
    batch_size: Option<u64>,
) -> Result<EstimateRun, EngineError> {
    let estimator = MonteCarloEstimator::new(horses, config, trial_count)?;
    let batch = batch_size.unwrap_or_else(|| default_batch_size(trial_count));
    log::debug!(
        "monte carlo started: seed={} trials={} batch={}",
        config.seed,
        trial_count,
        batch
    );
    Ok(EstimateRun::new(estimator, batch))
}

pub fn default_batch_size(trial_count: u64) -> u64 {
    ((trial_count + DEFAULT_BATCH_COUNT - 1) / DEFAULT_BATCH_COUNT).max(1)
}
