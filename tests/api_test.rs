use race_engine::{
    api::{
        commands::{execute, execute_json, run_race, Command, CommandResponse, RunRaceCommand},
        dto::{OddsTableDto, WorkerMessage},
        errors::ApiError,
    },
    domain::{Bet, Difficulty, Horse, Points, RaceConfig},
    engine::BettingRules,
    OddsTable,
};

/// Утилита: поле из N лошадей с убывающим рейтингом.
fn make_horses(n: usize) -> Vec<Horse> {
    (0..n)
        .map(|idx| {
            Horse::new(
                idx as u32 + 1,
                format!("Horse {}", idx + 1),
                95.0 - idx as f64 * 4.0,
                "#abcdef",
            )
        })
        .collect()
}

/// Утилита: конфиг normal-уровня с числовым seed'ом.
fn make_config(seed: u64) -> RaceConfig {
    RaceConfig::from_difficulty(Difficulty::Normal, seed)
}

/// Утилита: полный цикл с небольшим числом прогонов.
fn make_run(bets: Vec<Bet>) -> RunRaceCommand {
    RunRaceCommand {
        config: make_config(2024),
        horses: None,
        bets,
        rules: BettingRules::default(),
        trial_count: 2_000,
        batch_size: None,
    }
}

/// Simulate через execute: порядок финиша – перестановка.
#[test]
fn execute_simulate_returns_finish_order() {
    let response = execute(Command::Simulate {
        horses: make_horses(8),
        config: make_config(1),
    })
    .expect("simulate ok");

    match response {
        CommandResponse::FinishOrder { finish_order } => {
            let mut ids = finish_order.into_inner();
            ids.sort_unstable();
            assert_eq!(ids, (1..=8).collect::<Vec<u32>>());
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

/// Estimate: сообщения Progress, последнее – Complete с таблицей.
#[test]
fn execute_estimate_streams_progress_then_complete() {
    let response = execute(Command::Estimate {
        horses: make_horses(8),
        config: make_config(9),
        trial_count: 1_000,
        batch_size: Some(250),
    })
    .expect("estimate ok");

    let CommandResponse::Odds { messages } = response else {
        panic!("expected odds response");
    };

    assert_eq!(messages.len(), 5);
    let progress: Vec<u64> = messages
        .iter()
        .filter_map(|m| match m {
            WorkerMessage::Progress(p) => Some(p.completed_trials),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![250, 500, 750, 1_000]);

    match messages.last() {
        Some(WorkerMessage::Complete(table)) => {
            assert_eq!(table.win.len(), 8);
            assert!(!table.quinella.is_empty());
        }
        other => panic!("last message must be Complete, got {other:?}"),
    }
}

/// Форма JSON сообщений воркера.
#[test]
fn worker_message_json_shape() {
    let msg = WorkerMessage::Progress(race_engine::api::dto::ProgressMessage {
        completed_trials: 10,
        total_trials: 100,
    });
    let json = serde_json::to_value(&msg).unwrap();

    assert_eq!(json["type"], "progress");
    assert_eq!(json["completedTrials"], 10);
    assert_eq!(json["totalTrials"], 100);
}

/// Resolve по JSON-таблице со строковыми ключами.
#[test]
fn execute_resolve_with_wire_odds() {
    let odds = OddsTableDto {
        win: vec![5.0, 4.0, 6.0, 8.0],
        place: vec![1.4, 1.8, 1.5, 2.2],
        quinella: vec![("1-2".into(), 8.0)],
        trifecta: vec![("1-2-3".into(), 20.0)],
    };

    let response = execute(Command::Resolve {
        bets: vec![Bet::win(1, 100), Bet::place(2, 200)],
        finish_order: vec![1, 2, 3, 4],
        odds,
    })
    .expect("resolve ok");

    let CommandResponse::Resolved { result } = response else {
        panic!("expected resolved response");
    };
    assert_eq!(result.total_stake, Points(300));
    assert_eq!(result.total_payout, Points(860));
    assert_eq!(result.net_profit, 560);
}

/// Resolve с битым порядком финиша → IntegrityViolation.
#[test]
fn execute_resolve_broken_order_is_integrity_violation() {
    let odds = OddsTableDto {
        win: vec![2.0, 3.0, 4.0],
        ..OddsTableDto::default()
    };

    let err = execute(Command::Resolve {
        bets: vec![Bet::win(1, 100)],
        finish_order: vec![1, 1, 2],
        odds,
    })
    .unwrap_err();

    assert!(matches!(err, ApiError::IntegrityViolation(_)), "{err:?}");
}

/// Битый ключ в таблице → BadRequest.
#[test]
fn malformed_odds_key_is_bad_request() {
    let dto = OddsTableDto {
        quinella: vec![("1+2".into(), 3.0)],
        ..OddsTableDto::default()
    };
    let err = OddsTable::try_from(dto).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

/// Таблица переживает поездку через DTO.
#[test]
fn odds_dto_conversion_preserves_table() {
    let horses = make_horses(6);
    let mut config = make_config(5);
    config.horse_count = 6;

    let CommandResponse::Odds { messages } = execute(Command::Estimate {
        horses,
        config,
        trial_count: 500,
        batch_size: None,
    })
    .unwrap() else {
        panic!("expected odds response");
    };
    let Some(WorkerMessage::Complete(dto)) = messages.last().cloned() else {
        panic!("missing Complete message");
    };

    let table = OddsTable::try_from(dto.clone()).unwrap();
    assert_eq!(OddsTableDto::from(&table), dto);
}

/// ValidateBets через execute.
#[test]
fn execute_validate_bets_reports_errors() {
    let response = execute(Command::ValidateBets {
        bets: vec![Bet::win(1, 5), Bet::quinella(2, 2, 50)],
        rules: BettingRules::default(),
    })
    .unwrap();

    let CommandResponse::Validation { report } = response else {
        panic!("expected validation response");
    };
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].bet_index, 0);
    assert_eq!(report.errors[1].bet_index, 1);
}

/// Полный цикл: поле генерируется, ставки рассчитываются, результат детерминирован.
#[test]
fn run_race_full_cycle_is_deterministic() {
    let cmd = make_run(vec![Bet::win(1, 100), Bet::place(2, 100), Bet::quinella(1, 2, 50)]);

    let mut progress_calls = 0;
    let first = run_race(&cmd, |_| progress_calls += 1).expect("run ok");
    let second = run_race(&cmd, |_| {}).expect("run ok");

    assert_eq!(progress_calls, 10);
    assert_eq!(first, second);
    assert_eq!(first.horses.len(), 8);
    assert_eq!(first.result.payouts.len(), 3);
    assert_eq!(first.result.total_stake, Points(250));
    assert_eq!(
        first.result.net_profit,
        first.result.total_payout.signed_diff(first.result.total_stake)
    );
}

/// Невалидные ставки блокируют забег.
#[test]
fn run_race_rejects_invalid_bets() {
    let cmd = make_run(vec![Bet::win(1, 600)]);
    let err = run_race(&cmd, |_| {}).unwrap_err();

    match err {
        ApiError::BetsRejected(report) => {
            assert!(!report.valid);
            assert!(err_messages_mention(&report.messages(), "maximum bet"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

fn err_messages_mention(messages: &[String], needle: &str) -> bool {
    messages.iter().any(|m| m.contains(needle))
}

/// Ошибка конфига → InvalidConfig.
#[test]
fn run_race_invalid_config() {
    let mut cmd = make_run(vec![]);
    cmd.config.temperature = 0.0;

    let err = run_race(&cmd, |_| {}).unwrap_err();
    assert!(matches!(err, ApiError::InvalidConfig(_)));
}

/// JSON-вход: команда → JSON-ответ.
#[test]
fn execute_json_round_trip() {
    let raw = r#"{
        "command": "validate_bets",
        "bets": [ { "bet_type": "win", "horses": [1], "stake": 100 } ],
        "rules": { "bankroll": 1000, "max_bet_percentage": 0.5, "min_stake": 10 }
    }"#;

    let out = execute_json(raw).expect("json ok");
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["response"], "validation");
    assert_eq!(value["report"]["valid"], true);
}

/// Битый JSON → BadRequest.
#[test]
fn execute_json_garbage_is_bad_request() {
    let err = execute_json("{ \"command\": \"fly\" }").unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = execute_json("not json at all").unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

/// run_race из JSON: значения по умолчанию для необязательных полей.
#[test]
fn run_race_command_defaults() {
    let raw = r#"{ "command": "run_race", "config": { "horse_count": 6, "temperature": 8.0, "margin": 0.1, "seed": "cup" } }"#;
    let command: Command = serde_json::from_str(raw).unwrap();

    let Command::RunRace(cmd) = command else {
        panic!("expected run_race");
    };
    assert_eq!(cmd.trial_count, race_engine::api::DEFAULT_TRIAL_COUNT);
    assert!(cmd.bets.is_empty());
    assert!(cmd.horses.is_none());
    assert_eq!(cmd.rules, BettingRules::default());
}
