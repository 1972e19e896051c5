//! Расчёт ставок по итогу забега.
//!
//! Чистая функция: одинаковые входы дают одинаковый `RaceResult`.

use crate::domain::bet::{Bet, BetType, Payout, RaceResult};
use crate::domain::horse::place_slots;
use crate::domain::odds::{OddsTable, PairKey, TripleKey};
use crate::domain::points::Points;
use crate::domain::race::FinishOrder;
use crate::domain::HorseId;
use crate::engine::errors::EngineError;

/// Рассчитать пачку ставок.
///
/// Сначала проверяется целостность порядка финиша (перестановка 1..=N);
/// битый порядок – ошибка контракта, считать по нему выплаты нельзя.
pub fn resolve(
    bets: &[Bet],
    finish: &[HorseId],
    odds: &OddsTable,
    horse_count: usize,
) -> Result<RaceResult, EngineError> {
    let order = FinishOrder::checked(finish.to_vec(), horse_count)?;
    let place_k = place_slots(horse_count);

    let payouts: Vec<Payout> = bets
        .iter()
        .map(|bet| settle_bet(bet, &order, odds, place_k))
        .collect();

    let total_stake: Points = bets.iter().map(|b| b.stake).sum();
    let total_payout: Points = payouts.iter().map(|p| p.amount).sum();
    let net_profit = total_payout.signed_diff(total_stake);

    log::info!(
        "race resolved: winner={:?} bets={} stake={} payout={} net={}",
        order.winner(),
        bets.len(),
        total_stake,
        total_payout,
        net_profit
    );

    Ok(RaceResult {
        finish_order: order,
        payouts,
        total_stake,
        total_payout,
        net_profit,
    })
}

/// Расчёт одной ставки. Если коэффициента нет (0), ставка считается
/// проигранной даже при совпавшем исходе.
pub fn settle_bet(bet: &Bet, order: &FinishOrder, odds: &OddsTable, place_k: usize) -> Payout {
    let odds_value = lookup_odds(bet, odds);
    let won = is_winning(bet, order, place_k) && odds_value > 0.0;
    let amount = if won {
        payout_amount(bet.stake, odds_value)
    } else {
        Points::ZERO
    };

    Payout {
        bet: bet.clone(),
        won,
        amount,
        odds: odds_value,
    }
}

/// Сыграла ли ставка при данном порядке финиша.
pub fn is_winning(bet: &Bet, order: &FinishOrder, place_k: usize) -> bool {
    let finish = order.as_slice();

    match (bet.bet_type, bet.horses.as_slice()) {
        (BetType::Win, [horse]) => finish.first() == Some(horse),
        (BetType::Place, [horse]) => order.top(place_k).contains(horse),
        (BetType::Quinella, [a, b]) => match finish {
            [first, second, ..] => PairKey::new(*a, *b) == PairKey::new(*first, *second),
            _ => false,
        },
        (BetType::Trifecta, [a, b, c]) => finish.len() >= 3 && finish[..3] == [*a, *b, *c],
        _ => false,
    }
}

/// Коэффициент из таблицы; отсутствующий ключ = 0.
pub fn lookup_odds(bet: &Bet, odds: &OddsTable) -> f64 {
    match (bet.bet_type, bet.horses.as_slice()) {
        (BetType::Win, [horse]) => odds.win_odds(*horse),
        (BetType::Place, [horse]) => odds.place_odds(*horse),
        (BetType::Quinella, [a, b]) => odds.quinella_odds(PairKey::new(*a, *b)),
        (BetType::Trifecta, [a, b, c]) => odds.trifecta_odds(TripleKey(*a, *b, *c)),
        _ => 0.0,
    }
}

/// floor(stake * odds), без поправок: 100 * 1.15 = 114.99999999999999 даёт 114.
/// Результат за пределами u64 насыщается.
pub fn payout_amount(stake: Points, odds: f64) -> Points {
    if !odds.is_finite() || odds <= 0.0 {
        return Points::ZERO;
    }
    let amount = (stake.0 as f64 * odds).floor();
    if amount <= 0.0 {
        Points::ZERO
    } else {
        Points(amount as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_amount_is_plain_floor() {
        assert_eq!(payout_amount(Points(100), 1.15), Points(114));
        assert_eq!(payout_amount(Points(100), 1.0999999999999), Points(109));
        assert_eq!(payout_amount(Points(10_000_000_000_000), 2.0), Points(20_000_000_000_000));
        assert_eq!(payout_amount(Points(200), 1.8), Points(360));
        assert_eq!(payout_amount(Points(3), 1.5), Points(4));
    }

    #[test]
    fn payout_amount_zero_odds_pays_nothing() {
        assert_eq!(payout_amount(Points(100), 0.0), Points::ZERO);
        assert_eq!(payout_amount(Points(100), f64::INFINITY), Points::ZERO);
    }
}
