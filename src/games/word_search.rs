use std::collections::BTreeSet;

use super::GamePhase;
use crate::models::Completion;
use crate::scoring::GAME_POINTS;

pub const LABEL: &str = "Sopa de Letras";

pub const WORDS: [&str; 6] = ["GATO", "PERRO", "CASA", "SOL", "LUNA", "MAR"];

pub const GRID: [[char; 8]; 6] = [
    ['G', 'A', 'T', 'O', 'X', 'M', 'A', 'R'],
    ['P', 'X', 'C', 'X', 'L', 'X', 'X', 'X'],
    ['E', 'X', 'A', 'X', 'U', 'X', 'S', 'X'],
    ['R', 'X', 'S', 'X', 'N', 'X', 'O', 'X'],
    ['R', 'X', 'A', 'X', 'A', 'X', 'L', 'X'],
    ['O', 'X', 'X', 'X', 'X', 'X', 'X', 'X'],
];

// Left-to-right and top-to-bottom.
const DIRECTIONS: [(usize, usize); 2] = [(0, 1), (1, 0)];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToggleResult {
    pub newly_found: Vec<&'static str>,
    pub completion: Option<Completion>,
}

#[derive(Debug, Clone)]
pub struct WordSearchGame {
    selected: BTreeSet<(usize, usize)>,
    found: BTreeSet<&'static str>,
    phase: GamePhase,
}

impl WordSearchGame {
    pub fn new() -> Self {
        Self {
            selected: BTreeSet::new(),
            found: BTreeSet::new(),
            phase: GamePhase::Idle,
        }
    }

    pub fn start(&mut self) {
        self.selected.clear();
        self.found.clear();
        self.phase = GamePhase::Playing;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.selected.contains(&(row, col))
    }

    pub fn found(&self) -> &BTreeSet<&'static str> {
        &self.found
    }

    pub fn toggle(&mut self, row: usize, col: usize) -> ToggleResult {
        if self.phase != GamePhase::Playing || row >= GRID.len() || col >= GRID[0].len() {
            return ToggleResult::default();
        }

        if !self.selected.remove(&(row, col)) {
            self.selected.insert((row, col));
        }

        let mut result = ToggleResult::default();
        for word in WORDS {
            if !self.found.contains(word) && self.is_word_selected(word) {
                self.found.insert(word);
                result.newly_found.push(word);
            }
        }

        if self.found.len() == WORDS.len() {
            self.phase = GamePhase::Won;
            result.completion = Some(Completion::game(
                LABEL,
                GAME_POINTS,
                serde_json::json!({ "words": WORDS.len() }),
            ));
        }
        result
    }

    fn is_word_selected(&self, word: &str) -> bool {
        (0..GRID.len()).any(|row| {
            (0..GRID[0].len()).any(|col| {
                DIRECTIONS
                    .iter()
                    .any(|&dir| self.word_at(word, (row, col), dir))
            })
        })
    }

    fn word_at(&self, word: &str, start: (usize, usize), dir: (usize, usize)) -> bool {
        word.chars().enumerate().all(|(i, letter)| {
            let row = start.0 + i * dir.0;
            let col = start.1 + i * dir.1;
            row < GRID.len()
                && col < GRID[0].len()
                && GRID[row][col] == letter
                && self.selected.contains(&(row, col))
        })
    }
}

impl Default for WordSearchGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> WordSearchGame {
        let mut game = WordSearchGame::new();
        game.start();
        game
    }

    fn select_all(game: &mut WordSearchGame, cells: &[(usize, usize)]) -> Vec<ToggleResult> {
        cells.iter().map(|&(r, c)| game.toggle(r, c)).collect()
    }

    #[test]
    fn gato_on_row_zero_is_found_alone() {
        let mut game = started();
        let results = select_all(&mut game, &[(0, 0), (0, 1), (0, 2), (0, 3)]);

        assert_eq!(results[3].newly_found, vec!["GATO"]);
        assert_eq!(game.found().iter().copied().collect::<Vec<_>>(), vec!["GATO"]);
        assert!(results.iter().all(|r| r.completion.is_none()));
    }

    #[test]
    fn partial_selection_finds_nothing() {
        let mut game = started();
        let results = select_all(&mut game, &[(0, 0), (0, 1), (0, 2)]);
        assert!(results.iter().all(|r| r.newly_found.is_empty()));
        assert!(game.found().is_empty());
    }

    #[test]
    fn vertical_words_are_found() {
        let mut game = started();
        select_all(&mut game, &[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]);
        assert!(game.found().contains("PERRO"));
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut game = started();
        game.toggle(0, 5);
        assert!(game.is_selected(0, 5));
        game.toggle(0, 5);
        assert!(!game.is_selected(0, 5));
    }

    #[test]
    fn found_word_stays_found_after_deselect() {
        let mut game = started();
        select_all(&mut game, &[(0, 5), (0, 6), (0, 7)]);
        assert!(game.found().contains("MAR"));
        game.toggle(0, 7);
        assert!(game.found().contains("MAR"));
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut game = started();
        let result = game.toggle(6, 0);
        assert_eq!(result, ToggleResult::default());
        assert!(!game.is_selected(6, 0));
    }

    #[test]
    fn finding_every_word_wins_once() {
        let mut game = started();
        let cells = [
            // GATO, MAR
            (0, 0), (0, 1), (0, 2), (0, 3), (0, 5), (0, 6), (0, 7),
            // PERRO
            (1, 0), (2, 0), (3, 0), (4, 0), (5, 0),
            // CASA
            (1, 2), (2, 2), (3, 2), (4, 2),
            // LUNA
            (1, 4), (2, 4), (3, 4), (4, 4),
            // SOL
            (2, 6), (3, 6), (4, 6),
        ];
        let results = select_all(&mut game, &cells);
        assert_eq!(
            results.last(),
            Some(&ToggleResult {
                newly_found: vec!["SOL"],
                completion: Some(Completion::game(LABEL, GAME_POINTS, serde_json::json!({ "words": 6 }))),
            })
        );

        let completions: Vec<_> = results.iter().filter_map(|r| r.completion.clone()).collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].label, "Sopa de Letras");
        assert_eq!(completions[0].detail["words"], 6);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(game.toggle(0, 4), ToggleResult::default());
    }
}
