use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use super::GamePhase;
use crate::models::Completion;

pub const LABEL: &str = "Matemáticas Rápidas";

pub const ROUND_DURATION: Duration = Duration::from_secs(60);

/// Correct answers needed before a round is worth recording.
pub const MATH_SPEED_MIN_CORRECT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '×',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub left: u32,
    pub right: u32,
    pub operator: Operator,
}

impl Problem {
    // Operand ranges keep every answer non-negative.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3) {
            0 => Problem {
                left: rng.gen_range(1..=50),
                right: rng.gen_range(1..=50),
                operator: Operator::Add,
            },
            1 => {
                let left = rng.gen_range(20..70);
                Problem {
                    left,
                    right: rng.gen_range(1..left),
                    operator: Operator::Subtract,
                }
            }
            _ => Problem {
                left: rng.gen_range(1..=12),
                right: rng.gen_range(1..=12),
                operator: Operator::Multiply,
            },
        }
    }

    pub fn answer(&self) -> u32 {
        match self.operator {
            Operator::Add => self.left + self.right,
            Operator::Subtract => self.left - self.right,
            Operator::Multiply => self.left * self.right,
        }
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.symbol(), self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerResult {
    Ignored,
    Correct,
    Incorrect,
}

/// The countdown is driven by `advance`, so the caller owns the clock.
#[derive(Debug, Clone)]
pub struct MathSpeedGame {
    remaining: Duration,
    problem: Option<Problem>,
    correct: u32,
    phase: GamePhase,
}

impl MathSpeedGame {
    pub fn new() -> Self {
        Self {
            remaining: ROUND_DURATION,
            problem: None,
            correct: 0,
            phase: GamePhase::Idle,
        }
    }

    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.remaining = ROUND_DURATION;
        self.correct = 0;
        self.problem = Some(Problem::generate(rng));
        self.phase = GamePhase::Playing;
    }

    pub fn problem(&self) -> Option<Problem> {
        self.problem
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn submit<R: Rng + ?Sized>(&mut self, answer: u32, rng: &mut R) -> AnswerResult {
        let problem = match (self.phase, self.problem) {
            (GamePhase::Playing, Some(p)) => p,
            _ => return AnswerResult::Ignored,
        };

        if answer != problem.answer() {
            return AnswerResult::Incorrect;
        }

        self.correct += 1;
        self.problem = Some(Problem::generate(rng));
        AnswerResult::Correct
    }

    /// Moves the countdown forward. On expiry the round ends and, if enough
    /// answers were correct, the completion is returned (once).
    pub fn advance(&mut self, elapsed: Duration) -> Option<Completion> {
        if self.phase != GamePhase::Playing {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(elapsed);
        if !self.remaining.is_zero() {
            return None;
        }

        self.phase = GamePhase::TimedOut;
        self.problem = None;
        if self.correct < MATH_SPEED_MIN_CORRECT {
            return None;
        }
        Some(Completion::game(
            LABEL,
            i64::from(self.correct),
            serde_json::json!({ "score": self.correct }),
        ))
    }
}

impl Default for MathSpeedGame {
    fn default() -> Self {
        Self::new()
    }
}
