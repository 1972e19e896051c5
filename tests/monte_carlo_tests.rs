//! Monte Carlo tests for race-engine
//!
//! Проверяем:
//! - разбиение на пачки не меняет итог
//! - частоты нормированы (win/quinella/trifecta → 1, place → K)
//! - карты квинеллы и трифекты разреженные, ключи нормализованы
//! - последовательность событий EstimateRun
//! - ранняя остановка делит на фактическое число прогонов
//! - фоновый прогон через infra::worker

use race_engine::domain::{Difficulty, Horse, RaceConfig};
use race_engine::engine::monte_carlo::default_batch_size;
use race_engine::engine::{estimate, EngineError, EstimateEvent, MonteCarloEstimator};
use race_engine::infra::spawn_estimation;

fn make_horses(ratings: &[f64]) -> Vec<Horse> {
    ratings
        .iter()
        .enumerate()
        .map(|(idx, &r)| Horse::new(idx as u32 + 1, format!("Horse {}", idx + 1), r, "#000000"))
        .collect()
}

fn eight_horses() -> (Vec<Horse>, RaceConfig) {
    let horses = make_horses(&[92.0, 88.0, 85.0, 80.0, 76.0, 71.0, 66.0, 61.0]);
    let config = RaceConfig::from_difficulty(Difficulty::Normal, 4242u64);
    (horses, config)
}

//
// TEST 1 — итог не зависит от размера пачки
//
#[test]
fn estimate_is_batch_invariant() {
    let (horses, config) = eight_horses();

    let small = estimate(&horses, &config, 1_000, Some(7))
        .expect("estimate ok")
        .drive(|_| {});
    let large = estimate(&horses, &config, 1_000, Some(1_000))
        .expect("estimate ok")
        .drive(|_| {});
    let default = estimate(&horses, &config, 1_000, None)
        .expect("estimate ok")
        .drive(|_| {});

    assert_eq!(small, large);
    assert_eq!(small, default);
}

//
// TEST 2 — нормировка частот
//
#[test]
fn frequencies_are_normalized() {
    let (horses, config) = eight_horses();
    let est = estimate(&horses, &config, 2_000, None)
        .expect("estimate ok")
        .drive(|_| {});

    assert_eq!(est.trials, 2_000);

    let win: f64 = est.win_probabilities.iter().sum();
    let place: f64 = est.place_probabilities.iter().sum();
    let quinella: f64 = est.quinella_probabilities.values().sum();
    let trifecta: f64 = est.trifecta_probabilities.values().sum();

    assert!((win - 1.0).abs() < 1e-9, "win sum = {win}");
    // 8 лошадей → 3 призовых места
    assert!((place - 3.0).abs() < 1e-9, "place sum = {place}");
    assert!((quinella - 1.0).abs() < 1e-9, "quinella sum = {quinella}");
    assert!((trifecta - 1.0).abs() < 1e-9, "trifecta sum = {trifecta}");

    for p in &est.place_probabilities {
        assert!((0.0..=1.0).contains(p));
    }
}

//
// TEST 3 — место засчитывается в top-2 при N < 8
//
#[test]
fn small_field_uses_two_place_slots() {
    let horses = make_horses(&[90.0, 80.0, 70.0, 60.0]);
    let config = RaceConfig::from_difficulty(Difficulty::Normal, 1u64);
    let config = RaceConfig {
        horse_count: 4,
        ..config
    };

    let est = estimate(&horses, &config, 500, None)
        .expect("estimate ok")
        .drive(|_| {});
    let place: f64 = est.place_probabilities.iter().sum();
    assert!((place - 2.0).abs() < 1e-9, "place sum = {place}");
}

//
// TEST 4 — разреженность и нормализация ключей
//
#[test]
fn combination_maps_are_sparse_and_normalized() {
    let (horses, config) = eight_horses();
    let est = estimate(&horses, &config, 200, None)
        .expect("estimate ok")
        .drive(|_| {});

    // 8 * 7 * 6 = 336 возможных троек, за 200 прогонов все выпасть не могут.
    assert!(est.trifecta_probabilities.len() <= 200);
    assert!(est.quinella_probabilities.len() <= 28);

    for (key, p) in &est.quinella_probabilities {
        assert!(key.low() < key.high(), "pair key must be normalized: {key}");
        assert!(*p > 0.0, "only observed pairs are stored");
    }
    for (key, p) in &est.trifecta_probabilities {
        let [a, b, c] = key.as_array();
        assert!(a != b && b != c && a != c);
        assert!(*p > 0.0);
    }
}

//
// TEST 5 — фаворит чаще любой другой лошади первый и в призах
//
#[test]
fn favorite_leads_empirical_frequencies() {
    let (horses, config) = eight_horses();
    let est = estimate(&horses, &config, 5_000, None)
        .expect("estimate ok")
        .drive(|_| {});

    let win = &est.win_probabilities;
    let place = &est.place_probabilities;
    for i in 1..horses.len() {
        assert!(win[0] > win[i], "win: favorite vs horse {}: {:?}", i + 1, win);
        assert!(place[0] > place[i], "place: favorite vs horse {}: {:?}", i + 1, place);
    }
    assert!(est.win_probabilities[0] > 0.2, "favorite win share = {}", est.win_probabilities[0]);
}

//
// TEST 6 — события: Progress на каждую пачку, затем Finished, затем None
//
#[test]
fn estimate_run_emits_progress_then_finished() {
    let (horses, config) = eight_horses();
    let mut run = estimate(&horses, &config, 25, Some(10)).expect("estimate ok");
    assert_eq!(run.batch_size(), 10);

    let mut completed = Vec::new();
    let mut finished = None;
    for event in run.by_ref() {
        match event {
            EstimateEvent::Progress(p) => {
                assert_eq!(p.total_trials, 25);
                completed.push(p.completed_trials);
            }
            EstimateEvent::Finished(est) => finished = Some(est),
        }
    }

    assert_eq!(completed, vec![10, 20, 25]);
    let est = finished.expect("run must end with Finished");
    assert_eq!(est.trials, 25);
    assert!(run.next().is_none(), "No events after Finished");
}

//
// TEST 7 — drive() сообщает прогресс монотонно
//
#[test]
fn drive_reports_monotone_progress() {
    let (horses, config) = eight_horses();
    let run = estimate(&horses, &config, 1_000, None).expect("estimate ok");

    let mut seen = Vec::new();
    let est = run.drive(|p| seen.push(p));

    assert_eq!(seen.len(), 10, "default run is split into ten batches");
    assert!(seen.windows(2).all(|w| w[0].completed_trials < w[1].completed_trials));
    assert!(seen.last().map(|p| p.is_complete()).unwrap_or(false));
    assert_eq!(est.trials, 1_000);
}

//
// TEST 8 — ранняя остановка
//
#[test]
fn early_stop_divides_by_completed_trials() {
    let (horses, config) = eight_horses();
    let mut estimator = MonteCarloEstimator::new(&horses, &config, 1_000).expect("estimator ok");

    let progress = estimator.run_batch(300);
    assert_eq!(progress.completed_trials, 300);
    assert!(!progress.is_complete());
    assert!((progress.fraction() - 0.3).abs() < 1e-12);

    let est = estimator.finish();
    assert_eq!(est.trials, 300);
    let win: f64 = est.win_probabilities.iter().sum();
    assert!((win - 1.0).abs() < 1e-9);

    // Первые 300 прогонов совпадают с полным прогоном на 300.
    let full = estimate(&horses, &config, 300, None)
        .expect("estimate ok")
        .drive(|_| {});
    assert_eq!(est, full);
}

//
// TEST 9 — stop() у EstimateRun
//
#[test]
fn estimate_run_stop_returns_partial_estimate() {
    let (horses, config) = eight_horses();
    let mut run = estimate(&horses, &config, 100, Some(40)).expect("estimate ok");

    assert!(matches!(run.next(), Some(EstimateEvent::Progress(_))));
    assert_eq!(run.progress().completed_trials, 40);

    let est = run.stop();
    assert_eq!(est.trials, 40);
}

//
// TEST 10 — ошибки
//
#[test]
fn zero_trials_and_bad_config_are_errors() {
    let (horses, config) = eight_horses();

    let err = estimate(&horses, &config, 0, None).unwrap_err();
    assert_eq!(err, EngineError::InvalidTrialCount);

    let err = estimate(&horses[..5], &config, 100, None).unwrap_err();
    assert!(matches!(err, EngineError::HorseCountMismatch { .. }));
}

//
// TEST 11 — размер пачки по умолчанию
//
#[test]
fn default_batch_size_is_tenth_rounded_up() {
    assert_eq!(default_batch_size(50_000), 5_000);
    assert_eq!(default_batch_size(25), 3);
    assert_eq!(default_batch_size(1), 1);
}

//
// TEST 12 — фоновый поток даёт тот же итог, что и синхронный прогон
//
#[test]
fn worker_matches_synchronous_run() {
    // RUST_LOG=debug покажет пачки воркера.
    let _ = env_logger::builder().is_test(true).try_init();
    let (horses, config) = eight_horses();

    let sync = estimate(&horses, &config, 800, None)
        .expect("estimate ok")
        .drive(|_| {});

    let handle = spawn_estimation(estimate(&horses, &config, 800, None).expect("estimate ok"));
    let mut batches = 0;
    let background = handle.wait(|_| batches += 1).expect("worker must finish");

    assert_eq!(batches, 10);
    assert_eq!(background, sync);
}
