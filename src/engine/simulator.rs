use crate::domain::horse::Horse;
use crate::domain::race::{FinishOrder, RaceConfig};
use crate::domain::HorseId;
use crate::engine::errors::EngineError;
use crate::engine::weights::WeightModel;
use crate::engine::RandomSource;
use crate::infra::rng_seed::RngSeed;

/// Один «настоящий» забег по seed'у из конфига.
pub fn simulate(horses: &[Horse], config: &RaceConfig) -> Result<FinishOrder, EngineError> {
    config.validate_field(horses)?;

    let model = WeightModel::new(config.temperature)?;
    let weights = model.weights(horses);
    let mut rng = RngSeed::from_race_seed(&config.seed)?.to_rng();

    let order = draw_order(horses, &weights, &mut rng);
    log::debug!(
        "race simulated: seed={} winner={:?}",
        config.seed,
        order.winner()
    );
    Ok(order)
}

/// Последовательный выбор Plackett-Luce без возвращения.
///
/// На каждом шаге: `u = next() * остаток_весов`, идём по оставшимся лошадям
/// в исходном порядке и вычитаем веса, пока `u` не станет <= 0.
/// Ровно один `next_f64` на шаг, N шагов на забег.
///
/// `weights[i]` относится к `horses[i]`; при разной длине срезов –
/// `EngineError::WeightCountMismatch`.
pub fn simulate_with_weights<R: RandomSource>(
    horses: &[Horse],
    weights: &[f64],
    rng: &mut R,
) -> Result<FinishOrder, EngineError> {
    if horses.len() != weights.len() {
        return Err(EngineError::WeightCountMismatch {
            expected: horses.len(),
            actual: weights.len(),
        });
    }
    Ok(draw_order(horses, weights, rng))
}

/// Сам розыгрыш без проверки длин: веса уже построены по тому же полю.
pub(crate) fn draw_order<R: RandomSource>(
    horses: &[Horse],
    weights: &[f64],
    rng: &mut R,
) -> FinishOrder {
    // Индексы оставшихся лошадей, всегда по возрастанию.
    let mut remaining: Vec<usize> = (0..horses.len()).collect();
    let mut order: Vec<HorseId> = Vec::with_capacity(horses.len());

    while !remaining.is_empty() {
        let remaining_total: f64 = remaining.iter().map(|&idx| weights[idx]).sum();
        let mut u = rng.next_f64() * remaining_total;

        // Если из-за округления цикл не сработал – берём последнего.
        let mut picked = remaining.len() - 1;
        for (pos, &idx) in remaining.iter().enumerate() {
            u -= weights[idx];
            if u <= 0.0 {
                picked = pos;
                break;
            }
        }

        let idx = remaining.remove(picked);
        order.push(horses[idx].id);
    }

    FinishOrder::from_draw(order)
}
