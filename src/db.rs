use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    timestamp_now, ActivityKind, ActivityRecord, ChatMessage, Completion, Conversation,
    LearnerKey, Progress, ProgressDelta,
};

/// Number of ledger entries shown on the progress page.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// The narrow surface the scoring policy and the progress view need.
pub trait ProgressStore {
    fn append_activity(&self, key: &LearnerKey, completion: &Completion) -> StoreResult<i64>;

    fn get_progress(&self, key: &LearnerKey) -> StoreResult<Option<Progress>>;

    /// Adds `delta` to the learner's aggregate, creating the row if absent,
    /// and returns the row as stored afterwards.
    fn apply_progress_delta(
        &self,
        key: &LearnerKey,
        delta: ProgressDelta,
    ) -> StoreResult<Progress>;

    fn recent_activity(&self, key: &LearnerKey, limit: usize) -> StoreResult<Vec<ActivityRecord>>;
}

type ActivityRow = (i64, String, String, String, i64, String, String);

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS activity_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                child_name TEXT NOT NULL,
                activity_type TEXT NOT NULL CHECK(activity_type IN ('game', 'chat', 'question')),
                activity_name TEXT NOT NULL,
                points_earned INTEGER NOT NULL DEFAULT 0 CHECK(points_earned >= 0),
                details TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS user_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                child_name TEXT NOT NULL UNIQUE,
                total_score INTEGER NOT NULL DEFAULT 0 CHECK(total_score >= 0),
                level INTEGER NOT NULL DEFAULT 1,
                games_completed INTEGER NOT NULL DEFAULT 0,
                questions_answered INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            -- Tutor conversations, replayed to the completion service as history
            CREATE TABLE IF NOT EXISTS chat_conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                child_name TEXT NOT NULL,
                subject TEXT NOT NULL,
                messages TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_activity_child_created ON activity_log(child_name, created_at);
            CREATE INDEX IF NOT EXISTS idx_conversations_child ON chat_conversations(child_name);
            "#,
        )?;
        Ok(())
    }

    // Conversation operations
    pub fn create_conversation(
        &self,
        key: &LearnerKey,
        subject: &str,
        messages: &[ChatMessage],
    ) -> StoreResult<i64> {
        let payload = serde_json::to_string(messages)?;
        self.conn.execute(
            "INSERT INTO chat_conversations (child_name, subject, messages) VALUES (?1, ?2, ?3)",
            params![key.as_str(), subject, payload],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_conversation(&self, id: i64, messages: &[ChatMessage]) -> StoreResult<()> {
        let payload = serde_json::to_string(messages)?;
        self.conn.execute(
            "UPDATE chat_conversations SET messages = ?1, updated_at = ?2 WHERE id = ?3",
            params![payload, timestamp_now(), id],
        )?;
        Ok(())
    }

    pub fn get_conversation(&self, id: i64) -> StoreResult<Option<Conversation>> {
        let row = self.conn.query_row(
            r#"
            SELECT id, child_name, subject, messages, created_at, updated_at
            FROM chat_conversations
            WHERE id = ?1
            "#,
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        );

        match row {
            Ok((id, child_name, subject, messages, created_at, updated_at)) => {
                Ok(Some(Conversation {
                    id,
                    child_name,
                    subject,
                    messages: serde_json::from_str(&messages)?,
                    created_at,
                    updated_at,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }
}

impl ProgressStore for Database {
    fn append_activity(&self, key: &LearnerKey, completion: &Completion) -> StoreResult<i64> {
        let details = serde_json::to_string(&completion.detail)?;
        self.conn.execute(
            r#"
            INSERT INTO activity_log (child_name, activity_type, activity_name, points_earned, details, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                key.as_str(),
                completion.kind.as_str(),
                completion.label,
                completion.points,
                details,
                timestamp_now()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_progress(&self, key: &LearnerKey) -> StoreResult<Option<Progress>> {
        let progress = self.conn.query_row(
            r#"
            SELECT child_name, total_score, level, games_completed, questions_answered, updated_at
            FROM user_progress
            WHERE child_name = ?1
            "#,
            params![key.as_str()],
            |row| {
                Ok(Progress {
                    child_name: row.get(0)?,
                    total_score: row.get(1)?,
                    level: row.get(2)?,
                    games_completed: row.get(3)?,
                    questions_answered: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            },
        );

        match progress {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Single statement upsert: the increment happens inside SQLite, so two
    // completions racing on one learner cannot overwrite each other.
    fn apply_progress_delta(
        &self,
        key: &LearnerKey,
        delta: ProgressDelta,
    ) -> StoreResult<Progress> {
        self.conn.execute(
            r#"
            INSERT INTO user_progress (child_name, total_score, level, games_completed, questions_answered, updated_at)
            VALUES (?1, ?2, ?2 / 100 + 1, ?3, ?4, ?5)
            ON CONFLICT(child_name) DO UPDATE SET
                total_score = total_score + excluded.total_score,
                level = (total_score + excluded.total_score) / 100 + 1,
                games_completed = games_completed + excluded.games_completed,
                questions_answered = questions_answered + excluded.questions_answered,
                updated_at = excluded.updated_at
            "#,
            params![
                key.as_str(),
                delta.points.max(0),
                delta.games,
                delta.questions,
                timestamp_now()
            ],
        )?;

        self.get_progress(key)?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    fn recent_activity(&self, key: &LearnerKey, limit: usize) -> StoreResult<Vec<ActivityRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, child_name, activity_type, activity_name, points_earned, details, created_at
            FROM activity_log
            WHERE child_name = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![key.as_str(), limit as i64], Self::read_activity)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, child_name, kind, activity_name, points_earned, details, created_at) = row?;
            let activity_type =
                ActivityKind::from_str(&kind).ok_or(StoreError::UnknownActivityType(kind))?;
            records.push(ActivityRecord {
                id,
                child_name,
                activity_type,
                activity_name,
                points_earned,
                details: serde_json::from_str(&details)?,
                created_at,
            });
        }

        Ok(records)
    }
}
