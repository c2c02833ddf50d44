//! Subject tutor: a completion backend behind `CompletionClient`, and the
//! chat session that records answered questions and saves the conversation.

pub mod groq;
pub mod openai;

use tracing::{debug, warn};

use crate::config::{TutorBackend, TutorConfig};
use crate::content;
use crate::db::Database;
use crate::models::{ChatMessage, ChatRole, Completion, Conversation};
use crate::scoring::{RecordOutcome, ScoringPolicy, QUESTION_POINTS};
use crate::session::Session;

pub use groq::GroqClient;
pub use openai::OpenAiClient;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TutorError {
    #[error("falta la clave {0}")]
    MissingApiKey(&'static str),

    #[error("la cuenta del tutor no tiene créditos")]
    QuotaExceeded,

    #[error("la clave del tutor es inválida")]
    InvalidApiKey,

    #[error("error HTTP: {0}")]
    Http(String),

    #[error("el tutor tardó más de {0} segundos")]
    Timeout(u64),

    #[error("respuesta inválida: {0}")]
    InvalidResponse(String),

    #[error("el tutor no devolvió texto")]
    EmptyResponse,

    #[error("la consulta al tutor se interrumpió")]
    Interrupted,
}

/// Everything a backend may use to answer one learner message.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub subject: &'a str,
    pub child_name: &'a str,
    /// Earlier turns, oldest first, not including `message`.
    pub history: &'a [ChatMessage],
}

pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<String, TutorError>;
}

pub fn client_from_config(config: &TutorConfig) -> Result<Box<dyn CompletionClient>, TutorError> {
    match config.backend {
        TutorBackend::Groq => Ok(Box::new(GroqClient::new(config)?)),
        TutorBackend::OpenAi => Ok(Box::new(OpenAiClient::new(config)?)),
    }
}

pub fn subject_prompt(subject: &str) -> &'static str {
    match content::subject_or_default(subject).id {
        "lenguaje" => "Eres un tutor de lenguaje y lectura amigable para niños de 6-12 años. Ayudas con gramática, ortografía, comprensión lectora, vocabulario y escritura creativa. Usas ejemplos divertidos y emojis para hacer el aprendizaje más entretenido.",
        "ciencias" => "Eres un tutor de ciencias naturales entusiasta para niños de 6-12 años. Explicas conceptos de biología, física, química y ciencias de la tierra de forma simple y fascinante. Usas ejemplos del mundo real y emojis para hacer la ciencia divertida.",
        "sociales" => "Eres un tutor de ciencias sociales amigable para niños de 6-12 años. Ayudas a entender historia, geografía, cultura y sociedad de forma interesante. Usas historias, ejemplos y emojis para hacer el aprendizaje más atractivo.",
        _ => "Eres un tutor de matemáticas amigable y paciente para niños de 6-12 años. Explicas conceptos matemáticos de forma simple, usando ejemplos cotidianos y emojis. Ayudas con sumas, restas, multiplicaciones, divisiones, fracciones, geometría básica y problemas matemáticos.",
    }
}

/// A learner message waiting for its reply. Owns its context so it can be
/// answered on another thread.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    message: String,
    subject: &'static str,
    child_name: String,
    history: Vec<ChatMessage>,
}

impl PendingQuestion {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn request(&self) -> ChatRequest<'_> {
        ChatRequest {
            message: &self.message,
            subject: self.subject,
            child_name: &self.child_name,
            history: &self.history,
        }
    }

    pub fn answer<C: CompletionClient + ?Sized>(&self, client: &C) -> Result<String, TutorError> {
        client.complete(&self.request())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Answered { record: RecordOutcome },
    /// The reply was replaced by an inline apology. History is kept.
    Failed(TutorError),
}

impl SendOutcome {
    pub fn notice(&self) -> Option<&str> {
        match self {
            SendOutcome::Answered { record } => record.notice(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    subject: &'static str,
    messages: Vec<ChatMessage>,
    conversation_id: Option<i64>,
}

impl ChatSession {
    pub fn new(subject: &str) -> Self {
        Self {
            subject: content::subject_or_default(subject).id,
            messages: Vec::new(),
            conversation_id: None,
        }
    }

    /// Continues a saved conversation; its history is replayed on the next send.
    pub fn resume(conversation: Conversation) -> Self {
        Self {
            subject: content::subject_or_default(&conversation.subject).id,
            messages: conversation.messages,
            conversation_id: Some(conversation.id),
        }
    }

    pub fn subject(&self) -> &'static str {
        self.subject
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    /// Asks and waits for the reply on the calling thread.
    pub fn send<C: CompletionClient + ?Sized>(
        &mut self,
        text: &str,
        client: &C,
        db: &Database,
        session: &Session,
    ) -> SendOutcome {
        match self.ask(text, session) {
            Some(question) => {
                let reply = question.answer(client);
                self.receive(&question, reply, db, session)
            }
            None => SendOutcome::Ignored,
        }
    }

    /// Appends the learner's message. `None` for blank text, which is never sent.
    pub fn ask(&mut self, text: &str, session: &Session) -> Option<PendingQuestion> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let question = PendingQuestion {
            message: text.to_string(),
            subject: self.subject,
            child_name: session.display_name().to_string(),
            history: self.messages.clone(),
        };
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        Some(question)
    }

    /// Appends the reply (or an inline apology), scores an answered question
    /// and saves the conversation.
    pub fn receive(
        &mut self,
        question: &PendingQuestion,
        reply: Result<String, TutorError>,
        db: &Database,
        session: &Session,
    ) -> SendOutcome {
        let outcome = match reply {
            Ok(reply) => {
                self.messages.push(ChatMessage::new(ChatRole::Assistant, reply));
                let completion = Completion::question(
                    &question_label(self.subject),
                    QUESTION_POINTS,
                    serde_json::json!({ "subject": self.subject, "question": question.message() }),
                );
                let record = ScoringPolicy::new(db).record_completion(session, &completion);
                SendOutcome::Answered { record }
            }
            Err(e) => {
                warn!(subject = self.subject, error = %e, "tutor request failed");
                self.messages.push(ChatMessage::new(
                    ChatRole::Assistant,
                    format!("No pude responder ahora. ({})", e),
                ));
                SendOutcome::Failed(e)
            }
        };

        self.save(db, session);
        outcome
    }

    // A failed save only loses history, never points.
    fn save(&mut self, db: &Database, session: &Session) {
        let result = match self.conversation_id {
            Some(id) => db.update_conversation(id, &self.messages),
            None => db
                .create_conversation(session.key(), self.subject, &self.messages)
                .map(|id| {
                    self.conversation_id = Some(id);
                }),
        };
        match result {
            Ok(()) => debug!(conversation = ?self.conversation_id, "conversation saved"),
            Err(e) => warn!(error = %e, "conversation not saved"),
        }
    }
}

pub fn question_label(subject: &str) -> String {
    format!("Pregunta de {}", content::subject_or_default(subject).name)
}

/// Records a canned answer the learner opened from a subject's FAQ list.
pub fn record_faq_read(
    db: &Database,
    session: &Session,
    subject: &content::Subject,
    faq: &content::Faq,
) -> RecordOutcome {
    let completion = Completion::question(
        &question_label(subject.id),
        crate::scoring::FAQ_POINTS,
        serde_json::json!({ "subject": subject.id, "question": faq.question, "faq": true }),
    );
    ScoringPolicy::new(db).record_completion(session, &completion)
}

/// Scripted client for tests: replays responses in order, then repeats the
/// last one.
#[cfg(test)]
pub struct FakeClient {
    responses: std::sync::Mutex<Vec<Result<String, TutorError>>>,
    requests: std::sync::Mutex<Vec<(String, usize)>>,
}

#[cfg(test)]
impl FakeClient {
    pub fn new(responses: Vec<Result<String, TutorError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(error: TutorError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// (message, history length) of every call so far.
    pub fn requests(&self) -> Vec<(String, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl CompletionClient for FakeClient {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<String, TutorError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.message.to_string(), request.history.len()));

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(TutorError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressStore;
    use crate::models::ActivityKind;

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    mod prompts {
        use super::*;

        #[test]
        fn known_subjects_have_their_own_prompt() {
            assert!(subject_prompt("ciencias").contains("ciencias naturales"));
            assert!(subject_prompt("lenguaje").contains("lenguaje"));
            assert!(subject_prompt("sociales").contains("ciencias sociales"));
        }

        #[test]
        fn unknown_subject_uses_maths_prompt() {
            assert_eq!(subject_prompt("musica"), subject_prompt("matematica"));
        }

        #[test]
        fn question_label_uses_subject_name() {
            assert_eq!(question_label("ciencias"), "Pregunta de Ciencias");
        }
    }

    mod send {
        use super::*;

        #[test]
        fn blank_input_is_a_no_op() {
            let db = setup_db();
            let client = FakeClient::replying("hola");
            let mut chat = ChatSession::new("matematica");

            let outcome = chat.send("   ", &client, &db, &Session::new("Ana"));

            assert_eq!(outcome, SendOutcome::Ignored);
            assert!(client.requests().is_empty());
            assert!(chat.messages().is_empty());
            assert!(chat.conversation_id().is_none());
        }

        #[test]
        fn reply_records_a_question_event() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::replying("2 + 2 = 4 🎉");
            let mut chat = ChatSession::new("matematica");

            let outcome = chat.send("¿Cuánto es 2 + 2?", &client, &db, &session);

            match outcome {
                SendOutcome::Answered {
                    record: RecordOutcome::Recorded(progress),
                } => {
                    assert_eq!(progress.total_score, QUESTION_POINTS);
                    assert_eq!(progress.questions_answered, 1);
                    assert_eq!(progress.games_completed, 0);
                }
                other => panic!("Expected a recorded answer, got {:?}", other),
            }

            assert_eq!(chat.messages().len(), 2);
            assert_eq!(chat.messages()[1].role, ChatRole::Assistant);
            assert_eq!(chat.messages()[1].content, "2 + 2 = 4 🎉");

            let activity = db.recent_activity(session.key(), 10).unwrap();
            assert_eq!(activity.len(), 1);
            assert_eq!(activity[0].activity_type, ActivityKind::Question);
            assert_eq!(activity[0].activity_name, "Pregunta de Matemática");
        }

        #[test]
        fn history_grows_with_each_turn() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::new(vec![Ok("uno".into()), Ok("dos".into())]);
            let mut chat = ChatSession::new("ciencias");

            chat.send("primera", &client, &db, &session);
            chat.send("segunda", &client, &db, &session);

            assert_eq!(
                client.requests(),
                vec![("primera".to_string(), 0), ("segunda".to_string(), 2)]
            );
            assert_eq!(chat.messages().len(), 4);
        }

        #[test]
        fn failure_appends_inline_message_and_records_nothing() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::failing(TutorError::QuotaExceeded);
            let mut chat = ChatSession::new("matematica");

            let outcome = chat.send("hola", &client, &db, &session);

            assert_eq!(outcome, SendOutcome::Failed(TutorError::QuotaExceeded));
            assert_eq!(chat.messages().len(), 2);
            assert_eq!(
                chat.messages()[1].content,
                "No pude responder ahora. (la cuenta del tutor no tiene créditos)"
            );
            assert!(db.get_progress(session.key()).unwrap().is_none());
        }

        #[test]
        fn retry_after_failure_keeps_history() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::new(vec![
                Err(TutorError::Timeout(30)),
                Ok("ahora sí".into()),
            ]);
            let mut chat = ChatSession::new("lenguaje");

            chat.send("hola", &client, &db, &session);
            let outcome = chat.send("hola otra vez", &client, &db, &session);

            assert!(matches!(outcome, SendOutcome::Answered { .. }));
            assert_eq!(chat.messages().len(), 4);
            assert_eq!(client.requests()[1].1, 2);
        }
    }

    mod ask_and_receive {
        use super::*;

        #[test]
        fn question_carries_history_before_the_new_message() {
            let session = Session::new("Ana");
            let mut chat = ChatSession::new("lenguaje");
            assert!(chat.ask("  ", &session).is_none());

            let question = chat.ask(" ¿Qué es un verbo? ", &session).unwrap();
            let request = question.request();
            assert_eq!(request.message, "¿Qué es un verbo?");
            assert_eq!(request.subject, "lenguaje");
            assert_eq!(request.child_name, "Ana");
            assert!(request.history.is_empty());
            assert_eq!(chat.messages().len(), 1);
        }

        #[test]
        fn reply_answered_elsewhere_is_scored_on_receive() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::replying("Una acción 🏃");
            let mut chat = ChatSession::new("lenguaje");

            let question = chat.ask("¿Qué es un verbo?", &session).unwrap();
            let reply = std::thread::scope(|s| s.spawn(|| question.answer(&client)).join().unwrap());
            let outcome = chat.receive(&question, reply, &db, &session);

            assert!(matches!(
                outcome,
                SendOutcome::Answered { record: RecordOutcome::Recorded(ref p) } if p.questions_answered == 1
            ));
            assert_eq!(chat.messages()[1].content, "Una acción 🏃");
            let activity = db.recent_activity(session.key(), 10).unwrap();
            assert_eq!(activity[0].details["question"], "¿Qué es un verbo?");
        }

        #[test]
        fn interrupted_reply_keeps_history_for_a_retry() {
            let db = setup_db();
            let session = Session::new("Ana");
            let mut chat = ChatSession::new("ciencias");

            let question = chat.ask("¿Por qué llueve?", &session).unwrap();
            let outcome = chat.receive(&question, Err(TutorError::Interrupted), &db, &session);

            assert_eq!(outcome, SendOutcome::Failed(TutorError::Interrupted));
            assert_eq!(chat.messages().len(), 2);
            assert!(chat.messages()[1].content.starts_with("No pude responder ahora."));
        }
    }

    mod persistence {
        use super::*;

        #[test]
        fn conversation_is_created_then_updated() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::replying("ok");
            let mut chat = ChatSession::new("sociales");

            chat.send("uno", &client, &db, &session);
            let id = chat.conversation_id().unwrap();
            chat.send("dos", &client, &db, &session);
            assert_eq!(chat.conversation_id(), Some(id));

            let saved = db.get_conversation(id).unwrap().unwrap();
            assert_eq!(saved.subject, "sociales");
            assert_eq!(saved.child_name, "ana");
            assert_eq!(saved.messages.len(), 4);
        }

        #[test]
        fn resumed_conversation_replays_history() {
            let db = setup_db();
            let session = Session::new("Ana");
            let client = FakeClient::replying("ok");
            let mut chat = ChatSession::new("ciencias");
            chat.send("uno", &client, &db, &session);
            let id = chat.conversation_id().unwrap();

            let saved = db.get_conversation(id).unwrap().unwrap();
            let mut resumed = ChatSession::resume(saved);
            assert_eq!(resumed.subject(), "ciencias");
            assert_eq!(resumed.messages().len(), 2);

            resumed.send("dos", &client, &db, &session);
            assert_eq!(resumed.conversation_id(), Some(id));
            assert_eq!(client.requests().last(), Some(&("dos".to_string(), 2)));
            assert_eq!(db.get_conversation(id).unwrap().unwrap().messages.len(), 4);
        }

        #[test]
        fn unknown_subject_is_saved_as_maths() {
            let chat = ChatSession::new("musica");
            assert_eq!(chat.subject(), "matematica");
        }
    }

    mod faq {
        use super::*;

        #[test]
        fn reading_a_faq_is_worth_one_point() {
            let db = setup_db();
            let session = Session::new("Ana");
            let subject = content::subject("ciencias").unwrap();

            let outcome = record_faq_read(&db, &session, subject, &subject.faq[0]);

            match outcome {
                RecordOutcome::Recorded(p) => {
                    assert_eq!(p.total_score, 1);
                    assert_eq!(p.questions_answered, 1);
                }
                other => panic!("Expected Recorded, got {:?}", other),
            }
        }
    }
}
