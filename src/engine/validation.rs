use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::bet::{Bet, BetType};
use crate::domain::points::Points;
use crate::domain::HorseId;

/// Правила приёма ставок.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BettingRules {
    /// Сколько очков у игрока.
    pub bankroll: Points,
    /// Максимальная суммарная ставка как доля банкролла (0.0..=1.0).
    pub max_bet_percentage: f64,
    /// Минимальная ставка.
    pub min_stake: Points,
}

impl Default for BettingRules {
    fn default() -> Self {
        Self {
            bankroll: Points(1_000),
            max_bet_percentage: 0.5,
            min_stake: Points(10),
        }
    }
}

impl BettingRules {
    /// Потолок суммарной ставки: floor(bankroll * max_bet_percentage).
    pub fn max_total_stake(&self) -> Points {
        let cap = (self.bankroll.0 as f64 * self.max_bet_percentage).floor();
        if cap <= 0.0 {
            Points::ZERO
        } else {
            Points(cap as u64)
        }
    }
}

/// Почему ставку нельзя принять. Это ожидаемые ошибки для игрока,
/// а не ошибки движка.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetValidationError {
    #[error("stake must be a positive number of points")]
    NonPositiveStake,

    #[error("stake {stake} is below the minimum of {minimum}")]
    BelowMinimum { stake: Points, minimum: Points },

    #[error("total stake {total} exceeds bankroll {bankroll}")]
    ExceedsBankroll { total: Points, bankroll: Points },

    #[error("total stake {total} exceeds the maximum bet of {cap}")]
    ExceedsMaxBet { total: Points, cap: Points },

    #[error("{bet_type} bet needs {expected} horse(s), got {actual}")]
    WrongHorseCount {
        bet_type: BetType,
        expected: usize,
        actual: usize,
    },

    #[error("horse {0} is selected more than once")]
    DuplicateHorse(HorseId),
}

/// Ошибка конкретной ставки в пачке.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetError {
    /// Индекс ставки в пачке (с нуля).
    pub bet_index: usize,
    pub error: BetValidationError,
}

impl std::fmt::Display for BetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bet #{}: {}", self.bet_index + 1, self.error)
    }
}

/// Итог проверки пачки ставок: все найденные ошибки, а не только первая.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<BetError>,
}

impl ValidationReport {
    /// Сообщения для показа игроку.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Проверка одной ставки.
///
/// `already_staked` – сколько уже поставлено принятыми ставками этой пачки.
/// Возвращает все нарушения сразу.
pub fn validate_bet(
    bet: &Bet,
    rules: &BettingRules,
    already_staked: Points,
) -> Result<(), Vec<BetValidationError>> {
    let mut errors = Vec::new();

    if bet.stake.is_zero() {
        errors.push(BetValidationError::NonPositiveStake);
    } else if bet.stake < rules.min_stake {
        errors.push(BetValidationError::BelowMinimum {
            stake: bet.stake,
            minimum: rules.min_stake,
        });
    }

    let total = already_staked + bet.stake;
    if total > rules.bankroll {
        errors.push(BetValidationError::ExceedsBankroll {
            total,
            bankroll: rules.bankroll,
        });
    }
    let cap = rules.max_total_stake();
    if total > cap {
        errors.push(BetValidationError::ExceedsMaxBet { total, cap });
    }

    let expected = bet.bet_type.required_horses();
    if bet.horses.len() != expected {
        errors.push(BetValidationError::WrongHorseCount {
            bet_type: bet.bet_type,
            expected,
            actual: bet.horses.len(),
        });
    }

    let mut seen = HashSet::with_capacity(bet.horses.len());
    for &id in &bet.horses {
        if !seen.insert(id) {
            errors.push(BetValidationError::DuplicateHorse(id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Проверка пачки ставок по порядку с накоплением суммы.
///
/// Ставка невалидной ставки в сумму не идёт, чтобы одна плохая ставка
/// не тянула за собой ложные «превышен банкролл» у остальных.
pub fn validate_bets(bets: &[Bet], rules: &BettingRules) -> ValidationReport {
    let mut staked = Points::ZERO;
    let mut errors = Vec::new();

    for (bet_index, bet) in bets.iter().enumerate() {
        match validate_bet(bet, rules, staked) {
            Ok(()) => staked += bet.stake,
            Err(found) => {
                errors.extend(found.into_iter().map(|error| BetError { bet_index, error }));
            }
        }
    }

    if !errors.is_empty() {
        log::debug!("bet validation rejected {} issue(s)", errors.len());
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
