use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::domain::odds::{OddsTable, PairKey, TripleKey};
use crate::engine::monte_carlo::EstimateProgress;

/// Сообщение о прогрессе: `{ "completedTrials": n, "totalTrials": t }`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMessage {
    pub completed_trials: u64,
    pub total_trials: u64,
}

impl From<EstimateProgress> for ProgressMessage {
    fn from(p: EstimateProgress) -> Self {
        Self {
            completed_trials: p.completed_trials,
            total_trials: p.total_trials,
        }
    }
}

/// Таблица коэффициентов в «проводном» виде.
///
/// `win` / `place` – параллельные массивы (индекс = позиция лошади),
/// `quinella` / `trifecta` – списки пар `("a-b", odds)` / `("a-b-c", odds)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OddsTableDto {
    pub win: Vec<f64>,
    pub place: Vec<f64>,
    pub quinella: Vec<(String, f64)>,
    pub trifecta: Vec<(String, f64)>,
}

impl From<&OddsTable> for OddsTableDto {
    fn from(table: &OddsTable) -> Self {
        Self {
            win: table.win().to_vec(),
            place: table.place().to_vec(),
            quinella: table
                .quinella()
                .iter()
                .map(|(k, &v)| (k.to_string(), v))
                .collect(),
            trifecta: table
                .trifecta()
                .iter()
                .map(|(k, &v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl TryFrom<OddsTableDto> for OddsTable {
    type Error = ApiError;

    fn try_from(dto: OddsTableDto) -> Result<Self, Self::Error> {
        let quinella = dto
            .quinella
            .into_iter()
            .map(|(k, v)| Ok((k.parse::<PairKey>().map_err(|e| ApiError::BadRequest(e.to_string()))?, v)))
            .collect::<Result<BTreeMap<_, _>, ApiError>>()?;
        let trifecta = dto
            .trifecta
            .into_iter()
            .map(|(k, v)| Ok((k.parse::<TripleKey>().map_err(|e| ApiError::BadRequest(e.to_string()))?, v)))
            .collect::<Result<BTreeMap<_, _>, ApiError>>()?;

        Ok(OddsTable::new(dto.win, dto.place, quinella, trifecta))
    }
}

/// Сообщения фонового прогона для хоста.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    Progress(ProgressMessage),
    Complete(OddsTableDto),
}
