//! Инфраструктурный слой вокруг движка скачек:
//! - RNG-реализации для движка;
//! - seed'ы и их детерминированное расширение;
//! - фоновый прогон Монте-Карло.

pub mod rng;
pub mod rng_seed;
pub mod worker;

pub use rng::*;
pub use rng_seed::RngSeed;
pub use worker::{spawn_estimation, EstimationHandle};
