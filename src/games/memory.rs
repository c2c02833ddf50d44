use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::GamePhase;
use crate::models::Completion;
use crate::scoring::GAME_POINTS;

pub const LABEL: &str = "Juego de Memoria";

pub const SYMBOLS: [&str; 8] = ["🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub symbol: &'static str,
    pub face_up: bool,
    pub matched: bool,
}

impl Card {
    pub fn is_visible(&self) -> bool {
        self.face_up || self.matched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipResult {
    Ignored,
    FirstOfPair,
    /// Two cards are face up; call `resolve_pending` after the reveal delay.
    PairPending { matched: bool },
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    cards: Vec<Card>,
    pending: Vec<usize>,
    moves: u32,
    phase: GamePhase,
}

impl MemoryGame {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            pending: Vec::new(),
            moves: 0,
            phase: GamePhase::Idle,
        }
    }

    /// Deals a fresh shuffled deck. Also used for replay.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut symbols: Vec<&'static str> = SYMBOLS.iter().chain(SYMBOLS.iter()).copied().collect();
        symbols.shuffle(rng);
        self.cards = symbols
            .into_iter()
            .map(|symbol| Card {
                symbol,
                face_up: false,
                matched: false,
            })
            .collect();
        self.pending.clear();
        self.moves = 0;
        self.phase = GamePhase::Playing;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.matched).count() / 2
    }

    pub fn flip(&mut self, index: usize) -> FlipResult {
        if self.phase != GamePhase::Playing || self.pending.len() == 2 {
            return FlipResult::Ignored;
        }
        match self.cards.get(index) {
            Some(card) if !card.is_visible() => {}
            _ => return FlipResult::Ignored,
        }

        self.cards[index].face_up = true;
        self.pending.push(index);

        if self.pending.len() < 2 {
            return FlipResult::FirstOfPair;
        }

        self.moves += 1;
        let (a, b) = (self.pending[0], self.pending[1]);
        FlipResult::PairPending {
            matched: self.cards[a].symbol == self.cards[b].symbol,
        }
    }

    /// Settles a face-up pair: a match stays revealed, a mismatch is hidden
    /// again. Returns the completion when the last pair is matched.
    pub fn resolve_pending(&mut self) -> Option<Completion> {
        if self.pending.len() != 2 {
            return None;
        }
        let (a, b) = (self.pending[0], self.pending[1]);
        self.pending.clear();

        if self.cards[a].symbol == self.cards[b].symbol {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
        } else {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
        }

        if self.cards.iter().all(|c| c.matched) {
            self.phase = GamePhase::Won;
            return Some(Completion::game(
                LABEL,
                GAME_POINTS,
                serde_json::json!({ "moves": self.moves }),
            ));
        }
        None
    }
}

impl Default for MemoryGame {
    fn default() -> Self {
        Self::new()
    }
}
