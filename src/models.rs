use serde::{Deserialize, Serialize};

/// Points needed to climb one level.
pub const POINTS_PER_LEVEL: i64 = 100;

pub fn level_for_score(total_score: i64) -> i64 {
    total_score.max(0) / POINTS_PER_LEVEL + 1
}

pub fn points_to_next_level(total_score: i64) -> i64 {
    POINTS_PER_LEVEL - total_score.max(0) % POINTS_PER_LEVEL
}

// Fixed-width UTC timestamps so stored values sort lexicographically.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Canonical lookup key for a learner. Reads and writes both go through
/// `LearnerKey::new`, so "Ana", " ana " and "ANA" share one aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LearnerKey(String);

impl LearnerKey {
    pub const FALLBACK: &'static str = "estudiante";

    pub fn new(display_name: &str) -> Self {
        let key = display_name.trim().to_lowercase();
        if key.is_empty() {
            LearnerKey(Self::FALLBACK.to_string())
        } else {
            LearnerKey(key)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LearnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Game,
    Chat,
    Question,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Game => "game",
            ActivityKind::Chat => "chat",
            ActivityKind::Question => "question",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "game" => Some(ActivityKind::Game),
            "chat" => Some(ActivityKind::Chat),
            "question" => Some(ActivityKind::Question),
            _ => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityKind::Game => "🎮",
            ActivityKind::Chat => "💬",
            ActivityKind::Question => "❓",
        }
    }
}

/// A scoring event produced by a game engine or the tutor, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub kind: ActivityKind,
    pub label: String,
    pub points: i64,
    pub detail: serde_json::Value,
}

impl Completion {
    pub fn game(label: &str, points: i64, detail: serde_json::Value) -> Self {
        Self {
            kind: ActivityKind::Game,
            label: label.to_string(),
            points,
            detail,
        }
    }

    pub fn question(label: &str, points: i64, detail: serde_json::Value) -> Self {
        Self {
            kind: ActivityKind::Question,
            label: label.to_string(),
            points,
            detail,
        }
    }
}

// Append-only ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub child_name: String,
    pub activity_type: ActivityKind,
    pub activity_name: String,
    pub points_earned: i64,
    pub details: serde_json::Value,
    pub created_at: String,
}

/// One mutable summary row per learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub child_name: String,
    pub total_score: i64,
    pub level: i64,
    pub games_completed: i64,
    pub questions_answered: i64,
    pub updated_at: Option<String>,
}

impl Progress {
    /// The aggregate a learner has before their first scoring event.
    pub fn empty(key: &LearnerKey) -> Self {
        Self {
            child_name: key.as_str().to_string(),
            total_score: 0,
            level: level_for_score(0),
            games_completed: 0,
            questions_answered: 0,
            updated_at: None,
        }
    }

    pub fn points_to_next_level(&self) -> i64 {
        points_to_next_level(self.total_score)
    }

    pub fn level_label(&self) -> &'static str {
        match self.level {
            1 => "Explorador",
            2 => "Aprendiz",
            3 => "Estudiante",
            4 => "Experto",
            5..=9 => "Maestro",
            n if n >= 10 => "Leyenda",
            _ => "Desconocido",
        }
    }
}

/// Counter and score increments applied to an aggregate in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressDelta {
    pub points: i64,
    pub games: i64,
    pub questions: i64,
}

impl ProgressDelta {
    pub fn for_completion(completion: &Completion) -> Self {
        let points = completion.points.max(0);
        match completion.kind {
            ActivityKind::Game => Self {
                points,
                games: 1,
                questions: 0,
            },
            ActivityKind::Question => Self {
                points,
                games: 0,
                questions: 1,
            },
            ActivityKind::Chat => Self {
                points,
                games: 0,
                questions: 0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: timestamp_now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub child_name: String,
    pub subject: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: String,
    pub updated_at: String,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod level_tests {
        use super::*;

        #[test]
        fn level_starts_at_one() {
            assert_eq!(level_for_score(0), 1);
            assert_eq!(level_for_score(99), 1);
        }

        #[test]
        fn level_steps_every_hundred() {
            assert_eq!(level_for_score(100), 2);
            assert_eq!(level_for_score(105), 2);
            assert_eq!(level_for_score(250), 3);
        }

        #[test]
        fn points_to_next_level_is_never_zero() {
            assert_eq!(points_to_next_level(0), 100);
            assert_eq!(points_to_next_level(95), 5);
            assert_eq!(points_to_next_level(100), 100);
        }
    }

    mod learner_key_tests {
        use super::*;

        #[test]
        fn folds_case_and_whitespace() {
            assert_eq!(LearnerKey::new("  Ana "), LearnerKey::new("ana"));
            assert_eq!(LearnerKey::new("ANA").as_str(), "ana");
        }

        #[test]
        fn blank_name_uses_fallback() {
            assert_eq!(LearnerKey::new("   ").as_str(), LearnerKey::FALLBACK);
        }
    }

    mod activity_kind_tests {
        use super::*;

        #[test]
        fn as_str_round_trips_through_from_str() {
            for kind in [ActivityKind::Game, ActivityKind::Chat, ActivityKind::Question] {
                assert_eq!(ActivityKind::from_str(kind.as_str()), Some(kind));
            }
        }

        #[test]
        fn from_str_invalid() {
            assert!(ActivityKind::from_str("quiz").is_none());
            assert!(ActivityKind::from_str("").is_none());
        }
    }

    mod delta_tests {
        use super::*;

        #[test]
        fn game_completion_counts_a_game() {
            let c = Completion::game("Juego de Memoria", 10, serde_json::json!({}));
            let d = ProgressDelta::for_completion(&c);
            assert_eq!(
                d,
                ProgressDelta {
                    points: 10,
                    games: 1,
                    questions: 0
                }
            );
        }

        #[test]
        fn question_completion_counts_a_question() {
            let c = Completion::question("Matemática", 2, serde_json::json!({}));
            let d = ProgressDelta::for_completion(&c);
            assert_eq!(d.questions, 1);
            assert_eq!(d.games, 0);
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn ok_with_string() {
            let output = JsonOutput::ok("test data");
            assert!(output.success);
            assert_eq!(output.data, Some("test data"));
            assert!(output.error.is_none());
        }

        #[test]
        fn err_with_string() {
            let output = JsonOutput::<()>::err("something went wrong");
            assert!(!output.success);
            assert!(output.data.is_none());
            assert_eq!(output.error, Some("something went wrong".to_string()));
        }

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok("test");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
            assert!(json.contains("\"error\":null"));
        }
    }
}
