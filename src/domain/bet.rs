use serde::{Deserialize, Serialize};

use crate::domain::points::Points;
use crate::domain::race::FinishOrder;
use crate::domain::HorseId;

/// Тип ставки.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    /// Лошадь приходит первой.
    Win,
    /// Лошадь в призовых (top-2 или top-3, см. `place_slots`).
    Place,
    /// Две лошади на 1-м и 2-м местах в любом порядке.
    Quinella,
    /// Три лошади на 1-3 местах в точном порядке.
    Trifecta,
}

impl BetType {
    /// Сколько лошадей нужно указать для этого типа ставки.
    pub fn required_horses(self) -> usize {
        match self {
            BetType::Win | BetType::Place => 1,
            BetType::Quinella => 2,
            BetType::Trifecta => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BetType::Win => "win",
            BetType::Place => "place",
            BetType::Quinella => "quinella",
            BetType::Trifecta => "trifecta",
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Ставка игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bet {
    pub bet_type: BetType,
    pub horses: Vec<HorseId>,
    pub stake: Points,
}

impl Bet {
    pub fn new(bet_type: BetType, horses: Vec<HorseId>, stake: u64) -> Self {
        Self {
            bet_type,
            horses,
            stake: Points(stake),
        }
    }

    pub fn win(horse: HorseId, stake: u64) -> Self {
        Self::new(BetType::Win, vec![horse], stake)
    }

    pub fn place(horse: HorseId, stake: u64) -> Self {
        Self::new(BetType::Place, vec![horse], stake)
    }

    pub fn quinella(a: HorseId, b: HorseId, stake: u64) -> Self {
        Self::new(BetType::Quinella, vec![a, b], stake)
    }

    pub fn trifecta(first: HorseId, second: HorseId, third: HorseId, stake: u64) -> Self {
        Self::new(BetType::Trifecta, vec![first, second, third], stake)
    }
}

/// Результат расчёта одной ставки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payout {
    pub bet: Bet,
    pub won: bool,
    /// Выплата (0 для проигравших ставок).
    pub amount: Points,
    /// Коэффициент, который использовался при расчёте.
    pub odds: f64,
}

/// Итог забега для пачки ставок.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RaceResult {
    pub finish_order: FinishOrder,
    pub payouts: Vec<Payout>,
    pub total_stake: Points,
    pub total_payout: Points,
    /// Выплата минус ставки; может быть отрицательной.
    pub net_profit: i64,
}

impl RaceResult {
    pub fn winning_payouts(&self) -> impl Iterator<Item = &Payout> {
        self.payouts.iter().filter(|p| p.won)
    }
}
