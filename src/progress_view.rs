use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

use crate::achievements::{achievement_states, evaluate, AchievementState};
use crate::db::{ProgressStore, RECENT_ACTIVITY_LIMIT};
use crate::models::{ActivityRecord, Progress};
use crate::session::Session;

/// Everything the progress page shows, derived on demand.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub display_name: String,
    pub progress: Progress,
    pub recent_activity: Vec<ActivityRecord>,
    pub unlocked: BTreeSet<&'static str>,
    pub achievements: Vec<AchievementState>,
    pub points_to_next_level: i64,
}

impl ProgressReport {
    /// Read-only. Store failures degrade to an empty report.
    pub fn load<S: ProgressStore>(store: &S, session: &Session) -> Self {
        let key = session.key();

        let progress = match store.get_progress(key) {
            Ok(Some(p)) => p,
            Ok(None) => Progress::empty(key),
            Err(e) => {
                warn!(learner = %key, error = %e, "could not load progress");
                Progress::empty(key)
            }
        };

        let recent_activity = store
            .recent_activity(key, RECENT_ACTIVITY_LIMIT)
            .unwrap_or_else(|e| {
                warn!(learner = %key, error = %e, "could not load recent activity");
                Vec::new()
            });

        Self::from_parts(session, progress, recent_activity)
    }

    pub fn from_parts(
        session: &Session,
        progress: Progress,
        recent_activity: Vec<ActivityRecord>,
    ) -> Self {
        Self {
            display_name: session.display_name().to_string(),
            unlocked: evaluate(&progress),
            achievements: achievement_states(&progress),
            points_to_next_level: progress.points_to_next_level(),
            progress,
            recent_activity,
        }
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Share of the current level already earned, 0..=100.
    pub fn level_percent(&self) -> u16 {
        (self.progress.total_score.max(0) % crate::models::POINTS_PER_LEVEL) as u16
    }
}
