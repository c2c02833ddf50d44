use super::GamePhase;
use crate::models::Completion;
use crate::scoring::GAME_POINTS;

pub const LABEL: &str = "Juego de Patrones";

pub const BLANK: &str = "?";

/// Symbols offered as candidates for the blank slot.
pub const SHAPES: [&str; 6] = ["🔴", "🔵", "🟢", "🟡", "🟣", "🟠"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub sequence: &'static [&'static str],
    pub answer: &'static str,
}

pub const BANK: [Pattern; 8] = [
    Pattern {
        sequence: &["🔴", "🔵", "🔴", "🔵", BLANK],
        answer: "🔴",
    },
    Pattern {
        sequence: &["🟢", "🟢", "🔵", "🟢", "🟢", "🔵", BLANK],
        answer: "🟢",
    },
    Pattern {
        sequence: &["🔴", "🔵", "🟢", "🔴", "🔵", "🟢", BLANK],
        answer: "🔴",
    },
    Pattern {
        sequence: &["🟡", "🟣", "🟡", "🟣", BLANK],
        answer: "🟡",
    },
    Pattern {
        sequence: &["🔴", "🔴", "🔵", "🔴", "🔴", "🔵", BLANK],
        answer: "🔴",
    },
    Pattern {
        sequence: &["🟢", "🟡", "🟠", "🟢", "🟡", "🟠", BLANK],
        answer: "🟢",
    },
    Pattern {
        sequence: &["🔵", "🔵", "🔵", "🟢", "🔵", "🔵", "🔵", "🟢", BLANK],
        answer: "🔵",
    },
    Pattern {
        sequence: &["🟣", "🟡", "🟣", "🟣", "🟡", "🟣", "🟣", "🟡", BLANK],
        answer: "🟣",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    Ignored,
    /// Advanced to the next pattern.
    Correct,
    /// Same pattern again; the learner may retry.
    Incorrect,
    Finished(Completion),
}

#[derive(Debug, Clone)]
pub struct PatternGame {
    index: usize,
    first_try: u32,
    missed_current: bool,
    phase: GamePhase,
}

impl PatternGame {
    pub fn new() -> Self {
        Self {
            index: 0,
            first_try: 0,
            missed_current: false,
            phase: GamePhase::Idle,
        }
    }

    pub fn start(&mut self) {
        self.index = 0;
        self.first_try = 0;
        self.missed_current = false;
        self.phase = GamePhase::Playing;
    }

    pub fn current(&self) -> Option<&'static Pattern> {
        match self.phase {
            GamePhase::Playing => BANK.get(self.index),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Patterns solved without a wrong guess.
    pub fn score(&self) -> u32 {
        self.first_try
    }

    pub fn submit(&mut self, symbol: &str) -> SubmitResult {
        let pattern = match self.current() {
            Some(p) => p,
            None => return SubmitResult::Ignored,
        };

        if symbol != pattern.answer {
            self.missed_current = true;
            return SubmitResult::Incorrect;
        }

        if !self.missed_current {
            self.first_try += 1;
        }
        self.missed_current = false;
        self.index += 1;

        if self.index < BANK.len() {
            return SubmitResult::Correct;
        }

        self.phase = GamePhase::Won;
        SubmitResult::Finished(Completion::game(
            LABEL,
            GAME_POINTS,
            serde_json::json!({ "score": self.first_try }),
        ))
    }
}

impl Default for PatternGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> PatternGame {
        let mut game = PatternGame::new();
        game.start();
        game
    }

    #[test]
    fn every_pattern_has_one_blank_at_the_end() {
        for pattern in BANK {
            assert_eq!(pattern.sequence.iter().filter(|&&s| s == BLANK).count(), 1);
            assert_eq!(pattern.sequence.last(), Some(&BLANK));
            assert!(SHAPES.contains(&pattern.answer));
        }
    }

    #[test]
    fn alternating_pair_only_accepts_red() {
        let game = started();
        let first = game.current().unwrap();
        assert_eq!(first.sequence, &["🔴", "🔵", "🔴", "🔵", "?"]);

        for shape in SHAPES.iter().filter(|&&s| s != "🔴") {
            let mut g = started();
            assert_eq!(g.submit(shape), SubmitResult::Incorrect);
            assert_eq!(g.index(), 0);
            assert_eq!(g.phase(), GamePhase::Playing);
        }

        let mut g = started();
        assert_eq!(g.submit("🔴"), SubmitResult::Correct);
        assert_eq!(g.index(), 1);
    }

    #[test]
    fn incorrect_is_retryable() {
        let mut game = started();
        assert_eq!(game.submit("🟢"), SubmitResult::Incorrect);
        assert_eq!(game.submit("🟢"), SubmitResult::Incorrect);
        assert_eq!(game.submit("🔴"), SubmitResult::Correct);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn bank_exhaustion_finishes_once() {
        let mut game = started();
        let mut finished = Vec::new();
        for pattern in BANK {
            if let SubmitResult::Finished(c) = game.submit(pattern.answer) {
                finished.push(c);
            }
        }

        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].label, "Juego de Patrones");
        assert_eq!(finished[0].points, 10);
        assert_eq!(finished[0].detail["score"], 8);
        assert_eq!(game.phase(), GamePhase::Won);
        assert!(game.current().is_none());
        assert_eq!(game.submit("🔴"), SubmitResult::Ignored);
    }

    #[test]
    fn submit_before_start_is_ignored() {
        let mut game = PatternGame::new();
        assert_eq!(game.submit("🔴"), SubmitResult::Ignored);
    }
}
