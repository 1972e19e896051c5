//! Фоновый прогон Монте-Карло: поток + канал событий.
//!
//! Хост получает `EstimateEvent::Progress` после каждой пачки и
//! `EstimateEvent::Finished` в конце. Если получатель бросил канал,
//! поток останавливается после текущей пачки.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::engine::monte_carlo::{Estimate, EstimateEvent, EstimateRun};

/// Ручка фонового прогона.
pub struct EstimationHandle {
    events: Receiver<EstimateEvent>,
    join: JoinHandle<()>,
}

impl EstimationHandle {
    /// Канал событий (для `recv`, `try_recv`, `iter`).
    pub fn events(&self) -> &Receiver<EstimateEvent> {
        &self.events
    }

    /// Дождаться итоговой оценки, вызывая `on_progress` на каждую пачку.
    /// `None`, если поток завершился без итога (например, упал).
    pub fn wait(self, mut on_progress: impl FnMut(crate::engine::EstimateProgress)) -> Option<Estimate> {
        let mut result = None;
        for event in self.events.iter() {
            match event {
                EstimateEvent::Progress(p) => on_progress(p),
                EstimateEvent::Finished(estimate) => {
                    result = Some(estimate);
                    break;
                }
            }
        }
        if self.join.join().is_err() {
            log::warn!("estimation worker panicked");
        }
        result
    }
}

/// Увести прогон в отдельный поток.
pub fn spawn_estimation(run: EstimateRun) -> EstimationHandle {
    let (tx, rx) = mpsc::channel();

    let join = thread::spawn(move || {
        for event in run {
            if tx.send(event).is_err() {
                log::debug!("estimation receiver dropped, stopping worker");
                break;
            }
        }
    });

    EstimationHandle { events: rx, join }
}
