use rand::Rng;
use serde::Serialize;

use super::GamePhase;
use crate::models::Completion;
use crate::scoring::GAME_POINTS;

pub const LABEL: &str = "Juego de Secuencias";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "Rojo",
            Color::Blue => "Azul",
            Color::Green => "Verde",
            Color::Yellow => "Amarillo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" | "rojo" | "r" => Some(Color::Red),
            "blue" | "azul" | "a" | "b" => Some(Color::Blue),
            "green" | "verde" | "v" | "g" => Some(Color::Green),
            "yellow" | "amarillo" | "y" => Some(Color::Yellow),
            _ => None,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PressResult {
    Ignored,
    Correct,
    /// The whole sequence was reproduced; it has already grown by one cue.
    RoundComplete(Completion),
    Mismatch,
}

#[derive(Debug, Clone)]
pub struct SequenceGame {
    sequence: Vec<Color>,
    position: usize,
    level: u32,
    phase: GamePhase,
}

impl SequenceGame {
    pub fn new() -> Self {
        Self {
            sequence: Vec::new(),
            position: 0,
            level: 0,
            phase: GamePhase::Idle,
        }
    }

    /// Starts (or restarts) with a single random cue.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.sequence = vec![Color::random(rng)];
        self.position = 0;
        self.level = 1;
        self.phase = GamePhase::Playing;
    }

    /// The cues to play back before the learner's turn.
    pub fn sequence(&self) -> &[Color] {
        &self.sequence
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn press<R: Rng + ?Sized>(&mut self, color: Color, rng: &mut R) -> PressResult {
        if self.phase != GamePhase::Playing {
            return PressResult::Ignored;
        }

        if self.sequence[self.position] != color {
            self.phase = GamePhase::Lost;
            return PressResult::Mismatch;
        }

        self.position += 1;
        if self.position < self.sequence.len() {
            return PressResult::Correct;
        }

        let completion = Completion::game(
            LABEL,
            GAME_POINTS,
            serde_json::json!({ "level": self.level }),
        );
        self.sequence.push(Color::random(rng));
        self.position = 0;
        self.level += 1;
        PressResult::RoundComplete(completion)
    }
}

impl Default for SequenceGame {
    fn default() -> Self {
        Self::new()
    }
}
