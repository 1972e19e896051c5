use serde::{Deserialize, Serialize};

use crate::api::dto::{OddsTableDto, ProgressMessage, WorkerMessage};
use crate::api::errors::ApiError;
use crate::domain::bet::{Bet, RaceResult};
use crate::domain::horse::Horse;
use crate::domain::odds::OddsTable;
use crate::domain::race::{FinishOrder, RaceConfig};
use crate::domain::HorseId;
use crate::engine::field::field_for_config;
use crate::engine::validation::{BettingRules, ValidationReport};
use crate::engine::{self, EstimateProgress};

/// Число прогонов Монте-Карло по умолчанию.
pub const DEFAULT_TRIAL_COUNT: u64 = 50_000;

fn default_trial_count() -> u64 {
    DEFAULT_TRIAL_COUNT
}

/// Команда верхнего уровня (JSON-вход для хоста).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Один «настоящий» забег.
    Simulate { horses: Vec<Horse>, config: RaceConfig },

    /// Монте-Карло + таблица коэффициентов.
    Estimate {
        horses: Vec<Horse>,
        config: RaceConfig,
        #[serde(default = "default_trial_count")]
        trial_count: u64,
        #[serde(default)]
        batch_size: Option<u64>,
    },

    /// Расчёт ставок по готовому порядку финиша.
    /// Количество лошадей берётся из длины `odds.win`.
    Resolve {
        bets: Vec<Bet>,
        finish_order: Vec<HorseId>,
        odds: OddsTableDto,
    },

    /// Только проверка ставок.
    ValidateBets { bets: Vec<Bet>, rules: BettingRules },

    /// Полный цикл забега: проверка ставок → коэффициенты → забег → расчёт.
    RunRace(RunRaceCommand),
}

/// Полный цикл забега.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRaceCommand {
    pub config: RaceConfig,
    /// Если поля нет – генерируется из seed'а конфига.
    #[serde(default)]
    pub horses: Option<Vec<Horse>>,
    #[serde(default)]
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub rules: BettingRules,
    #[serde(default = "default_trial_count")]
    pub trial_count: u64,
    #[serde(default)]
    pub batch_size: Option<u64>,
}

/// Итог полного цикла.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RaceReport {
    pub horses: Vec<Horse>,
    pub odds: OddsTableDto,
    pub result: RaceResult,
}

/// Ответ API на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum CommandResponse {
    FinishOrder { finish_order: FinishOrder },

    /// Все сообщения прогона по порядку; последнее – `Complete`.
    Odds { messages: Vec<WorkerMessage> },

    Resolved { result: RaceResult },

    Validation { report: ValidationReport },

    Race { report: RaceReport },
}

/// Выполнить команду.
pub fn execute(command: Command) -> Result<CommandResponse, ApiError> {
    match command {
        Command::Simulate { horses, config } => {
            let finish_order = engine::simulate(&horses, &config)?;
            Ok(CommandResponse::FinishOrder { finish_order })
        }

        Command::Estimate {
            horses,
            config,
            trial_count,
            batch_size,
        } => {
            let mut messages = Vec::new();
            let odds = estimate_odds(&horses, &config, trial_count, batch_size, |p| {
                messages.push(WorkerMessage::Progress(p));
            })?;
            messages.push(WorkerMessage::Complete(OddsTableDto::from(&odds)));
            Ok(CommandResponse::Odds { messages })
        }

        Command::Resolve {
            bets,
            finish_order,
            odds,
        } => {
            let horse_count = odds.win.len();
            let table = OddsTable::try_from(odds)?;
            let result = engine::resolve(&bets, &finish_order, &table, horse_count)?;
            Ok(CommandResponse::Resolved { result })
        }

        Command::ValidateBets { bets, rules } => Ok(CommandResponse::Validation {
            report: engine::validate_bets(&bets, &rules),
        }),

        Command::RunRace(cmd) => {
            let report = run_race(&cmd, |_| {})?;
            Ok(CommandResponse::Race { report })
        }
    }
}

/// Разобрать JSON-команду, выполнить и вернуть JSON-ответ.
pub fn execute_json(raw: &str) -> Result<String, ApiError> {
    let command: Command = serde_json::from_str(raw)?;
    let response = execute(command)?;
    Ok(serde_json::to_string(&response)?)
}

/// Монте-Карло пачками + сборка таблицы коэффициентов.
pub fn estimate_odds(
    horses: &[Horse],
    config: &RaceConfig,
    trial_count: u64,
    batch_size: Option<u64>,
    mut on_progress: impl FnMut(ProgressMessage),
) -> Result<OddsTable, ApiError> {
    let run = engine::estimate(horses, config, trial_count, batch_size)?;
    let estimate = run.drive(|p: EstimateProgress| on_progress(p.into()));
    Ok(engine::prepare_odds(horses, config, &estimate)?)
}

/// Полный цикл забега.
///
/// Ставки проверяются до любых вычислений: невалидная пачка блокирует забег.
pub fn run_race(
    cmd: &RunRaceCommand,
    on_progress: impl FnMut(ProgressMessage),
) -> Result<RaceReport, ApiError> {
    cmd.config.validate()?;

    let report = engine::validate_bets(&cmd.bets, &cmd.rules);
    if !report.valid {
        return Err(ApiError::BetsRejected(report));
    }

    let horses = match &cmd.horses {
        Some(h) => h.clone(),
        None => field_for_config(&cmd.config)?,
    };

    let odds = estimate_odds(&horses, &cmd.config, cmd.trial_count, cmd.batch_size, on_progress)?;
    let finish = engine::simulate(&horses, &cmd.config)?;
    let result = engine::resolve(&cmd.bets, finish.as_slice(), &odds, horses.len())?;

    Ok(RaceReport {
        odds: OddsTableDto::from(&odds),
        horses,
        result,
    })
}
