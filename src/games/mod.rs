//! Self-contained play loops. Engines never touch the store: on a qualifying
//! terminal state they hand back a `Completion` for the scoring policy.

pub mod math_speed;
pub mod memory;
pub mod pattern;
pub mod sequence;
pub mod word_search;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Idle,
    Playing,
    Won,
    Lost,
    TimedOut,
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost | GamePhase::TimedOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Memory,
    Sequence,
    WordSearch,
    Pattern,
    MathSpeed,
}

impl GameKind {
    pub const ALL: [GameKind; 5] = [
        GameKind::Memory,
        GameKind::Sequence,
        GameKind::WordSearch,
        GameKind::Pattern,
        GameKind::MathSpeed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Memory => "memory",
            GameKind::Sequence => "sequence",
            GameKind::WordSearch => "wordsearch",
            GameKind::Pattern => "pattern",
            GameKind::MathSpeed => "math",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "memoria" => Some(GameKind::Memory),
            "sequence" | "secuencia" => Some(GameKind::Sequence),
            "wordsearch" | "word-search" | "sopa" => Some(GameKind::WordSearch),
            "pattern" | "patrones" => Some(GameKind::Pattern),
            "math" | "math-speed" | "matematica" => Some(GameKind::MathSpeed),
            _ => None,
        }
    }

    /// Label written to the activity log.
    pub fn activity_label(&self) -> &'static str {
        match self {
            GameKind::Memory => memory::LABEL,
            GameKind::Sequence => sequence::LABEL,
            GameKind::WordSearch => word_search::LABEL,
            GameKind::Pattern => pattern::LABEL,
            GameKind::MathSpeed => math_speed::LABEL,
        }
    }

    /// Ids accepted by `play`, for error messages.
    pub fn known_names() -> String {
        Self::ALL
            .iter()
            .map(GameKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
