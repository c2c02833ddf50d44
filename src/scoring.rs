use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::ProgressStore;
use crate::error::StoreResult;
use crate::models::{Completion, Progress, ProgressDelta};
use crate::session::Session;

/// Points for any qualifying game completion except timed arithmetic.
pub const GAME_POINTS: i64 = 10;
/// Points for a tutor reply to a learner's own question.
pub const QUESTION_POINTS: i64 = 2;
/// Points for reading one of the canned subject answers.
pub const FAQ_POINTS: i64 = 1;

// One try plus one retry per store step.
const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Recorded(Progress),
    Skipped,
    /// Persistence gave up. The notice is shown to the learner without
    /// interrupting play.
    Failed { notice: String },
}

impl RecordOutcome {
    pub fn notice(&self) -> Option<&str> {
        match self {
            RecordOutcome::Failed { notice } => Some(notice),
            _ => None,
        }
    }
}

/// The single write path from a finished game or question to the store.
pub struct ScoringPolicy<'a, S: ProgressStore> {
    store: &'a S,
}

impl<'a, S: ProgressStore> ScoringPolicy<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn record_completion(&self, session: &Session, completion: &Completion) -> RecordOutcome {
        if completion.points <= 0 {
            debug!(label = %completion.label, "completion earned no points, not recorded");
            return RecordOutcome::Skipped;
        }

        let key = session.key();

        if let Err(e) = with_retry("append activity", || {
            self.store.append_activity(key, completion)
        }) {
            warn!(learner = %key, label = %completion.label, error = %e, "activity not recorded");
            return RecordOutcome::Failed {
                notice: "No pudimos guardar tus puntos esta vez.".to_string(),
            };
        }

        let delta = ProgressDelta::for_completion(completion);
        match with_retry("update progress", || {
            self.store.apply_progress_delta(key, delta)
        }) {
            Ok(progress) => {
                info!(
                    learner = %key,
                    label = %completion.label,
                    points = completion.points,
                    total = progress.total_score,
                    level = progress.level,
                    "completion recorded"
                );
                RecordOutcome::Recorded(progress)
            }
            Err(e) => {
                warn!(learner = %key, label = %completion.label, error = %e, "progress not updated");
                RecordOutcome::Failed {
                    notice: "Guardamos la actividad, pero tu puntaje no se actualizó.".to_string(),
                }
            }
        }
    }
}

fn with_retry<T, F>(step: &str, mut op: F) -> StoreResult<T>
where
    F: FnMut() -> StoreResult<T>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_ATTEMPTS => {
                debug!(step, attempt, error = %e, "store step failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
