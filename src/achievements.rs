//! Achievement unlocks are always recomputed from the progress aggregate;
//! nothing here is stored.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    TotalScore,
    GamesCompleted,
    QuestionsAnswered,
}

impl Dimension {
    pub fn value(&self, progress: &Progress) -> i64 {
        match self {
            Dimension::TotalScore => progress.total_score,
            Dimension::GamesCompleted => progress.games_completed,
            Dimension::QuestionsAnswered => progress.questions_answered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub threshold: i64,
    pub dimension: Dimension,
}

impl Achievement {
    pub fn is_unlocked(&self, progress: &Progress) -> bool {
        self.dimension.value(progress) >= self.threshold
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first-game",
        name: "Primer Juego",
        description: "Completa tu primer juego",
        icon: "🎮",
        threshold: 1,
        dimension: Dimension::GamesCompleted,
    },
    Achievement {
        id: "explorer",
        name: "Explorador",
        description: "Gana 50 puntos",
        icon: "🔍",
        threshold: 50,
        dimension: Dimension::TotalScore,
    },
    Achievement {
        id: "curious",
        name: "Curioso",
        description: "Responde 10 preguntas",
        icon: "❓",
        threshold: 10,
        dimension: Dimension::QuestionsAnswered,
    },
    Achievement {
        id: "student",
        name: "Estudiante Dedicado",
        description: "Gana 100 puntos",
        icon: "📚",
        threshold: 100,
        dimension: Dimension::TotalScore,
    },
    Achievement {
        id: "gamer",
        name: "Jugador Experto",
        description: "Completa 20 juegos",
        icon: "🎯",
        threshold: 20,
        dimension: Dimension::GamesCompleted,
    },
    Achievement {
        id: "champion",
        name: "Campeón",
        description: "Gana 200 puntos",
        icon: "🏆",
        threshold: 200,
        dimension: Dimension::TotalScore,
    },
    Achievement {
        id: "genius",
        name: "Genio",
        description: "Gana 500 puntos",
        icon: "🧠",
        threshold: 500,
        dimension: Dimension::TotalScore,
    },
    Achievement {
        id: "master",
        name: "Maestro",
        description: "Gana 1000 puntos",
        icon: "⭐",
        threshold: 1000,
        dimension: Dimension::TotalScore,
    },
];

/// Identifiers of every achievement the aggregate has reached.
pub fn evaluate(progress: &Progress) -> BTreeSet<&'static str> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| a.is_unlocked(progress))
        .map(|a| a.id)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementState {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}

/// Every definition paired with its unlock flag, in display order.
pub fn achievement_states(progress: &Progress) -> Vec<AchievementState> {
    ACHIEVEMENTS
        .iter()
        .map(|a| AchievementState {
            achievement: *a,
            unlocked: a.is_unlocked(progress),
        })
        .collect()
}
