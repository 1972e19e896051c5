//! race_cli: консольный прогон одного забега.
//!
//! Usage:
//!   race_cli --seed 12345 --difficulty hard --trials 50000 --bet win:3:100 --bet quinella:1-2:50
//!   race_cli --config race.json --bankroll 2000
//!   race_cli --json < command.json

use std::env;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use race_engine::api::{self, ProgressMessage, RunRaceCommand};
use race_engine::domain::{Bet, BetType, Difficulty, HorseId, Points, RaceConfig, RaceSeed};
use race_engine::engine::BettingRules;
use race_engine::infra::SystemRng;
use race_engine::predictor::Predictor;
use race_engine::OddsTable;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--json") {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        let response = api::execute_json(&raw)?;
        println!("{response}");
        return Ok(());
    }

    let config = match arg_value(&args, "--config") {
        Some(path) => RaceConfig::load(path)?,
        None => {
            let difficulty = parse_difficulty(arg_value(&args, "--difficulty").unwrap_or("normal"))?;
            let seed = match arg_value(&args, "--seed") {
                Some(raw) => match raw.parse::<u64>() {
                    Ok(v) => RaceSeed::Int(v),
                    Err(_) => RaceSeed::Text(raw.to_string()),
                },
                None => RaceSeed::Int(SystemRng.fresh_seed()),
            };
            RaceConfig::from_difficulty(difficulty, seed)
        }
    };

    let trial_count = parse_arg(&args, "--trials", api::DEFAULT_TRIAL_COUNT);
    let bankroll = parse_arg(&args, "--bankroll", 1_000u64);
    let bets = args
        .windows(2)
        .filter(|w| w[0] == "--bet")
        .map(|w| parse_bet(&w[1]))
        .collect::<Result<Vec<_>>>()?;

    println!("race_cli: horse race simulation");
    println!("  seed:        {}", config.seed);
    println!("  difficulty:  {:?}", config.difficulty);
    println!("  horses:      {}", config.horse_count);
    println!("  temperature: {}", config.temperature);
    println!("  margin:      {}", config.margin);
    println!("  trials:      {trial_count}");
    println!();

    let cmd = RunRaceCommand {
        config,
        horses: None,
        bets,
        rules: BettingRules {
            bankroll: Points(bankroll),
            ..BettingRules::default()
        },
        trial_count,
        batch_size: None,
    };

    let report = api::run_race(&cmd, |p: ProgressMessage| {
        eprintln!("  [monte carlo] {}/{}", p.completed_trials, p.total_trials);
    })?;

    let odds = OddsTable::try_from(report.odds.clone())?;
    let mut predictor = Predictor::new();
    let prediction = predictor.predict(&odds);

    println!();
    println!("=========== FIELD ===========");
    for horse in &report.horses {
        println!(
            "  #{:<2} {:<16} rating {:>5.1}  win {:>6.2}  place {:>6.2}",
            horse.id,
            horse.name,
            horse.rating,
            odds.win_odds(horse.id),
            odds.place_odds(horse.id)
        );
    }
    if let Some(favorite) = prediction.as_ref().and_then(|p| p.favorite()) {
        let confidence = prediction.as_ref().map(|p| p.confidence).unwrap_or(0.0);
        println!("  favorite: #{} ({:.1}%)", favorite, confidence * 100.0);
    }

    println!();
    println!("=========== RESULT ===========");
    println!("  finish order: {:?}", report.result.finish_order.as_slice());
    for payout in &report.result.payouts {
        println!(
            "  {:<8} {:?} stake {:>6} odds {:>8.2} -> {} {}",
            payout.bet.bet_type,
            payout.bet.horses,
            payout.bet.stake,
            payout.odds,
            if payout.won { "WON " } else { "lost" },
            payout.amount
        );
    }
    println!("  total stake:  {}", report.result.total_stake);
    println!("  total payout: {}", report.result.total_payout);
    println!("  net profit:   {}", report.result.net_profit);

    if let Some(score) = predictor.record_outcome(&report.result.finish_order) {
        println!(
            "  favorite finished at position {:?}",
            score.favorite_position.map(|p| p + 1)
        );
    }

    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    arg_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_difficulty(raw: &str) -> Result<Difficulty> {
    match raw.to_ascii_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "normal" => Ok(Difficulty::Normal),
        "hard" => Ok(Difficulty::Hard),
        "expert" => Ok(Difficulty::Expert),
        other => bail!("unknown difficulty {other:?}"),
    }
}

/// Формат: `type:horses:stake`, лошади через дефис, например `trifecta:3-1-5:20`.
fn parse_bet(raw: &str) -> Result<Bet> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [kind, horses, stake] = parts.as_slice() else {
        bail!("bet must look like type:horses:stake, got {raw:?}");
    };

    let bet_type = match *kind {
        "win" => BetType::Win,
        "place" => BetType::Place,
        "quinella" => BetType::Quinella,
        "trifecta" => BetType::Trifecta,
        other => bail!("unknown bet type {other:?}"),
    };
    let horses = horses
        .split('-')
        .map(|h| h.parse::<HorseId>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad horse list in {raw:?}"))?;
    let stake = stake
        .parse::<u64>()
        .with_context(|| format!("bad stake in {raw:?}"))?;

    Ok(Bet::new(bet_type, horses, stake))
}
