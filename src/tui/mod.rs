mod ui;
mod widgets;

use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;

use crate::content::{self, GameInfo, GuideCategory, Subject};
use crate::db::Database;
use crate::progress_view::ProgressReport;
use crate::scoring::QUESTION_POINTS;
use crate::session::Session;
use crate::tutor::{ChatSession, CompletionClient, PendingQuestion, SendOutcome, TutorError};

/// The five routes of the app, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Games,
    Chat,
    Progress,
    Guide,
}

impl View {
    pub const ALL: [View; 5] = [View::Home, View::Games, View::Chat, View::Progress, View::Guide];

    /// Unknown paths land on Home.
    pub fn from_path(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "/juegos" => View::Games,
            "/chat-educativo" => View::Chat,
            "/progreso" => View::Progress,
            "/guia-padres" => View::Guide,
            _ => View::Home,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            View::Home => "/",
            View::Games => "/juegos",
            View::Chat => "/chat-educativo",
            View::Progress => "/progreso",
            View::Guide => "/guia-padres",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Inicio",
            View::Games => "Juegos",
            View::Chat => "Chat",
            View::Progress => "Progreso",
            View::Guide => "Guía para Padres",
        }
    }

    /// The tutor's one-line tip for this page.
    pub fn hint(&self) -> &'static str {
        match self {
            View::Home => "¿Qué te gustaría hacer hoy? Puedo ayudarte a elegir 😊",
            View::Games => "¡Los juegos de memoria son geniales para empezar! 🧠",
            View::Chat => "Recuerda: ¡No hay prisa! Tómate tu tiempo para pensar 🤔",
            View::Progress => "¡Cada punto cuenta! Sigue así y llegarás muy lejos ⭐",
            View::Guide => "Aquí encontrarás recursos útiles para el aprendizaje 📖",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

type Reply = Result<String, TutorError>;

pub struct App {
    db: Database,
    client: Arc<dyn CompletionClient>,
    pending: Option<(PendingQuestion, Receiver<Reply>)>,
    pub session: Session,
    pub view: View,
    pub report: ProgressReport,
    pub games: StatefulList<&'static GameInfo>,
    pub game_open: bool,
    pub subjects: StatefulList<&'static Subject>,
    pub chat: ChatSession,
    pub chat_input: String,
    pub input_mode: bool,
    pub guides: StatefulList<&'static GuideCategory>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database, session: Session, client: Box<dyn CompletionClient>) -> Self {
        let report = ProgressReport::load(&db, &session);
        Self {
            db,
            client: Arc::from(client),
            pending: None,
            session,
            view: View::Home,
            report,
            games: StatefulList::with_items(content::GAMES.iter().collect()),
            game_open: false,
            subjects: StatefulList::with_items(content::SUBJECTS.iter().collect()),
            chat: ChatSession::new(content::DEFAULT_SUBJECT),
            chat_input: String::new(),
            input_mode: false,
            guides: StatefulList::with_items(content::PARENT_GUIDES.iter().collect()),
            status: None,
            should_quit: false,
        }
    }

    pub fn navigate(&mut self, path: &str) {
        self.set_view(View::from_path(path));
    }

    fn set_view(&mut self, view: View) {
        debug!(route = view.path(), "navigate");
        self.view = view;
        self.game_open = false;
        if matches!(view, View::Home | View::Progress) {
            self.refresh_report();
        }
    }

    pub fn refresh_report(&mut self) {
        self.report = ProgressReport::load(&self.db, &self.session);
    }

    fn open_subject(&mut self) {
        if self.is_thinking() {
            self.status = Some("Espera la respuesta del tutor".to_string());
            return;
        }
        if let Some(subject) = self.subjects.selected_item() {
            if subject.id != self.chat.subject() || !self.chat.messages().is_empty() {
                self.chat = ChatSession::new(subject.id);
            }
            self.input_mode = true;
            self.status = Some(format!("{} {}", subject.icon, subject.name));
        }
    }

    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands the question to a worker thread; `poll_tutor` collects the reply.
    fn send_chat(&mut self) {
        if self.is_thinking() {
            self.status = Some("Espera la respuesta del tutor".to_string());
            return;
        }
        let text = std::mem::take(&mut self.chat_input);
        let Some(question) = self.chat.ask(&text, &self.session) else {
            return;
        };

        let (tx, rx) = mpsc::channel();
        let client = Arc::clone(&self.client);
        let asked = question.clone();
        thread::spawn(move || {
            // The app may have quit; nobody is left to tell.
            let _ = tx.send(asked.answer(client.as_ref()));
        });

        debug!(subject = self.chat.subject(), "tutor request sent");
        self.pending = Some((question, rx));
        self.status = Some("🤔 El tutor está pensando...".to_string());
    }

    /// Applies the tutor's reply once it has arrived. Never blocks.
    pub fn poll_tutor(&mut self) {
        let reply = match &self.pending {
            Some((_, rx)) => match rx.try_recv() {
                Ok(reply) => reply,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => Err(TutorError::Interrupted),
            },
            None => return,
        };
        let Some((question, _)) = self.pending.take() else {
            return;
        };

        let outcome = self.chat.receive(&question, reply, &self.db, &self.session);
        self.status = match &outcome {
            SendOutcome::Ignored => None,
            SendOutcome::Failed(e) => Some(format!("El tutor no respondió: {}", e)),
            SendOutcome::Answered { .. } => outcome
                .notice()
                .map(str::to_string)
                .or_else(|| Some(format!("+{} puntos por tu pregunta", QUESTION_POINTS))),
        };
    }

    fn handle_input_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.input_mode = false,
            KeyCode::Enter => self.send_chat(),
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Char(c) => self.chat_input.push(c),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if self.input_mode {
            self.handle_input_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_report();
            }

            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.set_view(self.view.prev()),
            KeyCode::Char('l') | KeyCode::Right => self.set_view(self.view.next()),
            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.set_view(self.view.prev());
                } else {
                    self.set_view(self.view.next());
                }
            }

            // Home shortcuts mirror the landing page links.
            KeyCode::Char(c @ '1'..='5') if self.view == View::Home => {
                let index = c as usize - '1' as usize;
                self.set_view(View::ALL[index]);
            }

            KeyCode::Char('j') | KeyCode::Down => match self.view {
                View::Games => {
                    self.games.next();
                    self.game_open = false;
                }
                View::Chat => self.subjects.next(),
                View::Guide => self.guides.next(),
                _ => {}
            },
            KeyCode::Char('k') | KeyCode::Up => match self.view {
                View::Games => {
                    self.games.previous();
                    self.game_open = false;
                }
                View::Chat => self.subjects.previous(),
                View::Guide => self.guides.previous(),
                _ => {}
            },

            KeyCode::Char('i') if self.view == View::Chat => self.input_mode = true,

            KeyCode::Enter => match self.view {
                View::Games => self.game_open = !self.game_open,
                View::Chat => self.open_subject(),
                _ => {}
            },

            KeyCode::Esc => {
                self.game_open = false;
                self.status = None;
            }

            _ => {}
        }
    }
}

pub fn run(
    db: Database,
    session: Session,
    client: Box<dyn CompletionClient>,
    route: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db, session, client);
    app.navigate(route);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.poll_tutor();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutor::FakeClient;
    use std::time::Instant;

    fn app_with(client: FakeClient) -> App {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        App::new(db, Session::new("Ana"), Box::new(client))
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for &key in keys {
            app.handle_key(key, KeyModifiers::NONE);
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, &[KeyCode::Char(c)]);
        }
    }

    fn wait_for_reply(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_thinking() && Instant::now() < deadline {
            app.poll_tutor();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!app.is_thinking(), "tutor reply never arrived");
    }

    /// Answers after a delay, like a slow network.
    struct SlowClient(Duration);

    impl CompletionClient for SlowClient {
        fn complete(&self, _request: &crate::tutor::ChatRequest<'_>) -> Result<String, TutorError> {
            thread::sleep(self.0);
            Ok("Ya está 🐢".to_string())
        }
    }

    mod routes {
        use super::*;

        #[test]
        fn paths_resolve_to_views() {
            assert_eq!(View::from_path("/"), View::Home);
            assert_eq!(View::from_path("/juegos"), View::Games);
            assert_eq!(View::from_path("/chat-educativo"), View::Chat);
            assert_eq!(View::from_path("/progreso"), View::Progress);
            assert_eq!(View::from_path("/guia-padres/"), View::Guide);
        }

        #[test]
        fn unknown_path_is_home() {
            assert_eq!(View::from_path("/nada"), View::Home);
            assert_eq!(View::from_path(""), View::Home);
        }

        #[test]
        fn every_view_round_trips_through_its_path() {
            for view in View::ALL {
                assert_eq!(View::from_path(view.path()), view);
            }
        }

        #[test]
        fn every_view_has_its_own_hint() {
            let hints: std::collections::HashSet<&str> = View::ALL.iter().map(View::hint).collect();
            assert_eq!(hints.len(), View::ALL.len());
            assert!(hints.iter().all(|h| !h.is_empty()));
        }

        #[test]
        fn tab_order_wraps() {
            assert_eq!(View::Guide.next(), View::Home);
            assert_eq!(View::Home.prev(), View::Guide);
        }
    }

    mod keys {
        use super::*;

        #[test]
        fn h_and_l_switch_tabs() {
            let mut app = app_with(FakeClient::replying("ok"));
            press(&mut app, &[KeyCode::Char('l'), KeyCode::Char('l')]);
            assert_eq!(app.view, View::Chat);
            press(&mut app, &[KeyCode::Char('h')]);
            assert_eq!(app.view, View::Games);
        }

        #[test]
        fn number_keys_jump_from_home() {
            let mut app = app_with(FakeClient::replying("ok"));
            press(&mut app, &[KeyCode::Char('4')]);
            assert_eq!(app.view, View::Progress);
        }

        #[test]
        fn navigate_by_path() {
            let mut app = app_with(FakeClient::replying("ok"));
            app.navigate("/guia-padres");
            assert_eq!(app.view, View::Guide);
            app.navigate("/desconocido");
            assert_eq!(app.view, View::Home);
        }

        #[test]
        fn q_quits_outside_input_mode() {
            let mut app = app_with(FakeClient::replying("ok"));
            press(&mut app, &[KeyCode::Char('q')]);
            assert!(app.should_quit);
        }

        #[test]
        fn game_list_wraps_and_opens() {
            let mut app = app_with(FakeClient::replying("ok"));
            app.navigate("/juegos");
            press(&mut app, &[KeyCode::Char('k')]);
            assert_eq!(app.games.selected, Some(content::GAMES.len() - 1));
            press(&mut app, &[KeyCode::Enter]);
            assert!(app.game_open);
        }
    }

    mod chat {
        use super::*;

        #[test]
        fn typing_q_in_input_mode_does_not_quit() {
            let mut app = app_with(FakeClient::replying("ok"));
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('i'), KeyCode::Char('q')]);
            assert!(!app.should_quit);
            assert_eq!(app.chat_input, "q");
        }

        #[test]
        fn enter_sends_and_scores() {
            let mut app = app_with(FakeClient::replying("¡Claro!"));
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('i')]);
            type_text(&mut app, "hola");
            press(&mut app, &[KeyCode::Enter]);

            assert!(app.chat_input.is_empty());
            wait_for_reply(&mut app);
            assert_eq!(app.chat.messages().len(), 2);
            assert_eq!(
                app.status.as_deref(),
                Some(format!("+{} puntos por tu pregunta", QUESTION_POINTS).as_str())
            );

            press(&mut app, &[KeyCode::Esc]);
            app.navigate("/progreso");
            assert_eq!(app.report.progress.total_score, 2);
            assert_eq!(app.report.progress.questions_answered, 1);
        }

        #[test]
        fn slow_tutor_does_not_freeze_the_keys() {
            let db = Database::open(":memory:").expect("Failed to create in-memory database");
            db.init().expect("Failed to initialize database");
            let mut app = App::new(
                db,
                Session::new("Ana"),
                Box::new(SlowClient(Duration::from_millis(400))),
            );
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('i')]);
            type_text(&mut app, "¿Cuánto es 3 x 4?");

            let started = Instant::now();
            press(&mut app, &[KeyCode::Enter]);
            assert!(started.elapsed() < Duration::from_millis(200));
            assert!(app.is_thinking());
            assert_eq!(app.chat.messages().len(), 1);

            // Still navigable while the reply is on its way.
            press(&mut app, &[KeyCode::Esc, KeyCode::Char('l')]);
            assert_eq!(app.view, View::Progress);
            app.poll_tutor();
            assert!(app.is_thinking());

            wait_for_reply(&mut app);
            assert_eq!(app.chat.messages()[1].content, "Ya está 🐢");
            app.refresh_report();
            assert_eq!(app.report.progress.questions_answered, 1);
        }

        #[test]
        fn second_enter_waits_for_the_first_reply() {
            let db = Database::open(":memory:").expect("Failed to create in-memory database");
            db.init().expect("Failed to initialize database");
            let mut app = App::new(
                db,
                Session::new("Ana"),
                Box::new(SlowClient(Duration::from_millis(200))),
            );
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('i')]);
            type_text(&mut app, "uno");
            press(&mut app, &[KeyCode::Enter]);
            type_text(&mut app, "dos");
            press(&mut app, &[KeyCode::Enter]);

            assert_eq!(app.chat_input, "dos");
            assert_eq!(app.status.as_deref(), Some("Espera la respuesta del tutor"));
            wait_for_reply(&mut app);
            assert_eq!(app.chat.messages().len(), 2);
        }

        #[test]
        fn failed_reply_shows_in_status() {
            let mut app = app_with(FakeClient::failing(TutorError::MissingApiKey("GROQ_API_KEY")));
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('i')]);
            type_text(&mut app, "hola");
            press(&mut app, &[KeyCode::Enter]);
            wait_for_reply(&mut app);

            assert_eq!(
                app.status.as_deref(),
                Some("El tutor no respondió: falta la clave GROQ_API_KEY")
            );
            assert!(app.chat.messages()[1].content.starts_with("No pude responder ahora."));
        }

        #[test]
        fn blank_enter_sends_nothing() {
            let mut app = app_with(FakeClient::replying("¡Claro!"));
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('i'), KeyCode::Enter]);
            assert!(app.chat.messages().is_empty());
            assert!(!app.is_thinking());
        }

        #[test]
        fn choosing_a_subject_starts_a_new_conversation() {
            let mut app = app_with(FakeClient::replying("ok"));
            app.navigate("/chat-educativo");
            press(&mut app, &[KeyCode::Char('j'), KeyCode::Enter]);
            assert_eq!(app.chat.subject(), "lenguaje");
            assert!(app.input_mode);
        }
    }
}
