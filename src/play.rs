//! Line-based play loops for the `play` subcommand. Each loop drives one
//! engine from text input and hands every completion to the scoring policy.

use rand::Rng;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::db::ProgressStore;
use crate::games::math_speed::{AnswerResult, MathSpeedGame, MATH_SPEED_MIN_CORRECT};
use crate::games::memory::{FlipResult, MemoryGame};
use crate::games::pattern::{PatternGame, SubmitResult, BANK, SHAPES};
use crate::games::sequence::{Color, PressResult, SequenceGame};
use crate::games::word_search::{WordSearchGame, GRID};
use crate::games::{GameKind, GamePhase};
use crate::models::Completion;
use crate::scoring::{RecordOutcome, ScoringPolicy};
use crate::session::Session;

const QUIT_WORDS: [&str; 3] = ["salir", "q", "quit"];

/// One read from the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Closed,
    TimedOut,
}

pub trait LineSource {
    /// Blocks when `wait` is `None`.
    fn next_line(&mut self, wait: Option<Duration>) -> io::Result<Input>;
}

/// Reads straight from a `BufRead` and never times out.
pub struct Blocking<R>(pub R);

impl<R: BufRead> LineSource for Blocking<R> {
    fn next_line(&mut self, _wait: Option<Duration>) -> io::Result<Input> {
        let mut line = String::new();
        if self.0.read_line(&mut line)? == 0 {
            return Ok(Input::Closed);
        }
        Ok(Input::Line(line))
    }
}

/// Reads on its own thread so a deadline can cut the wait short.
pub struct Background {
    lines: Receiver<io::Result<String>>,
}

impl Background {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in reader.lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }
}

impl LineSource for Background {
    fn next_line(&mut self, wait: Option<Duration>) -> io::Result<Input> {
        let received = match wait {
            Some(wait) => match self.lines.recv_timeout(wait) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => return Ok(Input::TimedOut),
                Err(RecvTimeoutError::Disconnected) => return Ok(Input::Closed),
            },
            None => match self.lines.recv() {
                Ok(line) => line,
                Err(_) => return Ok(Input::Closed),
            },
        };
        received.map(Input::Line)
    }
}

pub struct Player<'a, L, W, S: ProgressStore> {
    input: L,
    output: W,
    scoring: ScoringPolicy<'a, S>,
    session: &'a Session,
    recorded: Vec<RecordOutcome>,
}

impl<'a, L: LineSource, W: Write, S: ProgressStore> Player<'a, L, W, S> {
    pub fn new(input: L, output: W, store: &'a S, session: &'a Session) -> Self {
        Self {
            input,
            output,
            scoring: ScoringPolicy::new(store),
            session,
            recorded: Vec::new(),
        }
    }

    /// Every outcome recorded during this run, in order.
    pub fn recorded(&self) -> &[RecordOutcome] {
        &self.recorded
    }

    pub fn play<G: Rng + ?Sized>(&mut self, kind: GameKind, rng: &mut G) -> io::Result<()> {
        match kind {
            GameKind::Memory => self.play_memory(rng),
            GameKind::Sequence => self.play_sequence(rng),
            GameKind::WordSearch => self.play_word_search(),
            GameKind::Pattern => self.play_pattern(),
            GameKind::MathSpeed => {
                let mut last = Instant::now();
                let mut clock = move || {
                    let now = Instant::now();
                    let elapsed = now - last;
                    last = now;
                    elapsed
                };
                self.play_math_speed(rng, &mut clock)
            }
        }
    }

    /// Reads one trimmed line. `None` on end of input or a quit word.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        match self.ask(text, None)? {
            Input::Line(line) => Ok(Some(line)),
            Input::Closed | Input::TimedOut => Ok(None),
        }
    }

    /// Like `prompt`, but gives up after `wait`. Quit words read as `Closed`.
    fn ask(&mut self, text: &str, wait: Option<Duration>) -> io::Result<Input> {
        write!(self.output, "{} ", text)?;
        self.output.flush()?;

        match self.input.next_line(wait)? {
            Input::Line(line) => {
                let line = line.trim().to_string();
                if QUIT_WORDS.contains(&line.to_lowercase().as_str()) {
                    return Ok(Input::Closed);
                }
                Ok(Input::Line(line))
            }
            other => {
                writeln!(self.output)?;
                Ok(other)
            }
        }
    }

    fn record(&mut self, completion: &Completion) -> io::Result<()> {
        let outcome = self.scoring.record_completion(self.session, completion);
        match &outcome {
            RecordOutcome::Recorded(progress) => writeln!(
                self.output,
                "⭐ +{} puntos. Total: {} (nivel {})",
                completion.points, progress.total_score, progress.level
            )?,
            RecordOutcome::Skipped => {}
            RecordOutcome::Failed { notice } => writeln!(self.output, "⚠️  {}", notice)?,
        }
        self.recorded.push(outcome);
        Ok(())
    }

    fn play_memory<G: Rng + ?Sized>(&mut self, rng: &mut G) -> io::Result<()> {
        let mut game = MemoryGame::new();
        game.start(rng);
        writeln!(self.output, "🃏 Encuentra las parejas. Escribe el número de una carta.")?;

        while !game.phase().is_over() {
            self.draw_memory(&game)?;
            let Some(line) = self.prompt("Carta:")? else {
                return Ok(());
            };
            let index = match line.parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => {
                    writeln!(self.output, "Escribe un número del 1 al {}.", game.cards().len())?;
                    continue;
                }
            };

            match game.flip(index) {
                FlipResult::Ignored => writeln!(self.output, "Esa carta no se puede voltear.")?,
                FlipResult::FirstOfPair => {}
                FlipResult::PairPending { matched } => {
                    self.draw_memory(&game)?;
                    if matched {
                        writeln!(
                            self.output,
                            "¡Pareja encontrada! ({}/{})",
                            game.matched_pairs(),
                            game.cards().len() / 2
                        )?;
                    } else {
                        writeln!(self.output, "No son iguales.")?;
                    }
                    if let Some(completion) = game.resolve_pending() {
                        writeln!(self.output, "🎉 ¡Ganaste en {} movimientos!", game.moves())?;
                        self.record(&completion)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_memory(&mut self, game: &MemoryGame) -> io::Result<()> {
        for (row, cards) in game.cards().chunks(4).enumerate() {
            let cells: Vec<String> = cards
                .iter()
                .enumerate()
                .map(|(col, card)| {
                    if card.is_visible() {
                        format!("{:>3}", card.symbol)
                    } else {
                        format!("{:>3}", row * 4 + col + 1)
                    }
                })
                .collect();
            writeln!(self.output, "{}", cells.join(" "))?;
        }
        Ok(())
    }

    fn play_sequence<G: Rng + ?Sized>(&mut self, rng: &mut G) -> io::Result<()> {
        let mut game = SequenceGame::new();
        game.start(rng);
        writeln!(self.output, "🎨 Repite la secuencia (rojo, azul, verde, amarillo).")?;

        'rounds: while !game.phase().is_over() {
            let shown: Vec<&str> = game.sequence().iter().map(Color::name).collect();
            writeln!(self.output, "Nivel {}: {}", game.level(), shown.join(" "))?;

            let Some(line) = self.prompt("Tu turno:")? else {
                return Ok(());
            };
            for word in line.split_whitespace() {
                let Some(color) = Color::from_str(word) else {
                    writeln!(self.output, "No conozco el color '{}'.", word)?;
                    continue 'rounds;
                };
                match game.press(color, rng) {
                    PressResult::Correct | PressResult::Ignored => {}
                    PressResult::RoundComplete(completion) => {
                        writeln!(self.output, "✅ ¡Muy bien!")?;
                        self.record(&completion)?;
                        continue 'rounds;
                    }
                    PressResult::Mismatch => {
                        writeln!(self.output, "❌ ¡Ups! Llegaste al nivel {}.", game.level())?;
                        break 'rounds;
                    }
                }
            }
        }
        Ok(())
    }

    fn play_word_search(&mut self) -> io::Result<()> {
        let mut game = WordSearchGame::new();
        game.start();
        writeln!(
            self.output,
            "🔤 Marca letras con 'fila columna' (por ejemplo: 1 3) hasta formar cada palabra."
        )?;

        while !game.phase().is_over() {
            self.draw_grid(&game)?;
            let Some(line) = self.prompt("Letra:")? else {
                return Ok(());
            };
            let coords: Vec<usize> = line
                .split_whitespace()
                .filter_map(|p| p.parse::<usize>().ok())
                .collect();
            let (row, col) = match coords.as_slice() {
                [r, c] if *r >= 1 && *c >= 1 => (r - 1, c - 1),
                _ => {
                    writeln!(self.output, "Escribe la fila y la columna.")?;
                    continue;
                }
            };

            let result = game.toggle(row, col);
            for word in &result.newly_found {
                writeln!(self.output, "¡Encontraste {}!", word)?;
            }
            if let Some(completion) = result.completion {
                writeln!(self.output, "🎉 ¡Encontraste todas las palabras!")?;
                self.record(&completion)?;
            }
        }
        Ok(())
    }

    fn draw_grid(&mut self, game: &WordSearchGame) -> io::Result<()> {
        for (r, row) in GRID.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, letter)| {
                    if game.is_selected(r, c) {
                        format!("[{}]", letter)
                    } else {
                        format!(" {} ", letter)
                    }
                })
                .collect();
            writeln!(self.output, "{}", cells.concat())?;
        }
        let found: Vec<&str> = game.found().iter().copied().collect();
        writeln!(self.output, "Encontradas: {}", found.join(", "))
    }

    fn play_pattern(&mut self) -> io::Result<()> {
        let mut game = PatternGame::new();
        game.start();
        let options: Vec<String> = SHAPES
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}={}", i + 1, s))
            .collect();
        writeln!(self.output, "🧩 ¿Qué figura sigue? Opciones: {}", options.join(" "))?;

        while !game.phase().is_over() {
            let Some(pattern) = game.current() else {
                break;
            };
            writeln!(
                self.output,
                "Patrón {}/{}: {}",
                game.index() + 1,
                BANK.len(),
                pattern.sequence.join(" ")
            )?;
            let Some(line) = self.prompt("Respuesta:")? else {
                return Ok(());
            };
            let symbol = match line.parse::<usize>() {
                Ok(n) if (1..=SHAPES.len()).contains(&n) => SHAPES[n - 1],
                _ => line.as_str(),
            };

            match game.submit(symbol) {
                SubmitResult::Correct => writeln!(self.output, "✅ ¡Correcto!")?,
                SubmitResult::Incorrect => writeln!(self.output, "Intenta otra vez.")?,
                SubmitResult::Finished(completion) => {
                    writeln!(
                        self.output,
                        "🎉 ¡Completaste todos los patrones! A la primera: {}/{}",
                        game.score(),
                        BANK.len()
                    )?;
                    self.record(&completion)?;
                }
                SubmitResult::Ignored => {}
            }
        }
        Ok(())
    }

    /// `clock` returns the time elapsed since its previous call.
    fn play_math_speed<G, C>(&mut self, rng: &mut G, clock: &mut C) -> io::Result<()>
    where
        G: Rng + ?Sized,
        C: FnMut() -> Duration,
    {
        let mut game = MathSpeedGame::new();
        game.start(rng);
        clock();
        writeln!(self.output, "⚡ Resuelve todas las que puedas en 60 segundos.")?;

        while let Some(problem) = game.problem() {
            let text = format!("[{}s] {} =", game.remaining().as_secs(), problem);
            let input = self.ask(&text, Some(game.remaining()))?;

            if let Some(completion) = game.advance(clock()) {
                writeln!(self.output, "⏰ ¡Tiempo! Respuestas correctas: {}", game.correct())?;
                self.record(&completion)?;
                break;
            }
            if game.phase() == GamePhase::TimedOut {
                writeln!(
                    self.output,
                    "⏰ ¡Tiempo! Respuestas correctas: {}. Necesitas {} para sumar puntos.",
                    game.correct(),
                    MATH_SPEED_MIN_CORRECT
                )?;
                break;
            }

            let line = match input {
                Input::Line(line) => line,
                Input::TimedOut => continue,
                Input::Closed => return Ok(()),
            };
            match line.parse::<u32>() {
                Ok(answer) => match game.submit(answer, rng) {
                    AnswerResult::Correct => writeln!(self.output, "✅")?,
                    AnswerResult::Incorrect => writeln!(self.output, "❌")?,
                    AnswerResult::Ignored => {}
                },
                Err(_) => writeln!(self.output, "Escribe un número.")?,
            }
        }
        Ok(())
    }
}
