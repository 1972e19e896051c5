use crate::domain::horse::Horse;
use crate::domain::race::RaceConfig;
use crate::domain::HorseId;
use crate::engine::errors::EngineError;
use crate::engine::RandomSource;
use crate::infra::rng_seed::RngSeed;

/// Границы рейтинга при генерации.
pub const MIN_RATING: f64 = 60.0;
pub const MAX_RATING: f64 = 100.0;

const NAMES: [&str; 20] = [
    "Thunder Road",
    "Silver Comet",
    "Midnight Echo",
    "Golden Arrow",
    "Storm Chaser",
    "Lucky Clover",
    "Iron Duke",
    "Desert Wind",
    "Crimson Tide",
    "Northern Star",
    "Blue Velvet",
    "Wild Card",
    "Morning Glory",
    "Red Baron",
    "Shadow Dancer",
    "Quiet Riot",
    "Ocean Breeze",
    "Copper Kettle",
    "Velvet Fury",
    "Last Chance",
];

const COLORS: [&str; 8] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
];

/// Сгенерировать поле из `count` лошадей с id 1..=count.
///
/// Имена без повторов, пока хватает списка; дальше с номером.
/// Рейтинг в [60, 100) с одним знаком после запятой.
pub fn generate_field<R: RandomSource>(count: usize, rng: &mut R) -> Vec<Horse> {
    let mut names: Vec<&str> = NAMES.to_vec();
    rng.shuffle(&mut names);

    (0..count)
        .map(|idx| {
            let id = (idx + 1) as HorseId;
            let name = match names.get(idx) {
                Some(n) => n.to_string(),
                None => format!("Runner {}", id),
            };
            let rating = (rng.range(MIN_RATING, MAX_RATING) * 10.0).round() / 10.0;
            let color = rng.choice(&COLORS).copied().unwrap_or("#888888");
            Horse::new(id, name, rating.min(MAX_RATING), color)
        })
        .collect()
}

/// Поле для конфига: детерминированно из seed'а забега,
/// отдельным потоком RNG (сам забег от этого не сдвигается).
pub fn field_for_config(config: &RaceConfig) -> Result<Vec<Horse>, EngineError> {
    config.validate()?;
    let mut rng = RngSeed::from_race_seed(&config.seed)?.derive_field().to_rng();
    Ok(generate_field(config.horse_count, &mut rng))
}
