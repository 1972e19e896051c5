//! Внешний API движка скачек.
//!
//! Здесь описываются:
//! - команды (commands.rs) — JSON-вход для хоста и полный цикл забега;
//! - DTO (dto.rs) — «проводные» формы: прогресс и таблица коэффициентов со строковыми ключами;
//! - ошибки (errors.rs) — то, что видит клиент.

pub mod commands;
pub mod dto;
pub mod errors;

pub use commands::*;
pub use dto::*;
pub use errors::*;
