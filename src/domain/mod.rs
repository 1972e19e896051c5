//! Доменная модель скачек: лошади, конфиг забега, порядок финиша,
//! ставки, коэффициенты, очки.

pub mod bet;
pub mod horse;
pub mod odds;
pub mod points;
pub mod race;

/// Номер лошади в забеге (1..N).
pub type HorseId = u32;

// Удобные реэкспорты, чтобы в других модулях писать crate::domain::Horse и т.п.
pub use bet::*;
pub use horse::*;
pub use odds::*;
pub use points::*;
pub use race::*;
