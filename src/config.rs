use std::path::PathBuf;

const DEFAULT_DB_NAME: &str = "aprende.db";
const DEFAULT_SESSION_NAME: &str = "session.json";
const DEFAULT_LOG_NAME: &str = "aprende.log";
const DEFAULT_TUTOR_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorBackend {
    Groq,
    OpenAi,
}

impl TutorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TutorBackend::Groq => "groq",
            TutorBackend::OpenAi => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" | "llama" => Some(TutorBackend::Groq),
            "openai" | "gpt" => Some(TutorBackend::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TutorConfig {
    pub backend: TutorBackend,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub groq_endpoint: String,
    pub openai_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            backend: TutorBackend::Groq,
            groq_api_key: None,
            openai_api_key: None,
            groq_endpoint: "https://api.groq.com/openai".to_string(),
            openai_endpoint: "https://api.openai.com".to_string(),
            timeout_secs: DEFAULT_TUTOR_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub session_path: PathBuf,
    pub tutor: TutorConfig,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let db_path = non_empty("APRENDE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join(DEFAULT_DB_NAME));
        let session_path = non_empty("APRENDE_SESSION")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join(DEFAULT_SESSION_NAME));

        let mut tutor = TutorConfig::default();
        if let Some(backend) = non_empty("APRENDE_TUTOR") {
            match TutorBackend::from_str(&backend) {
                Some(b) => tutor.backend = b,
                None => tracing::warn!("unknown tutor backend '{}', using groq", backend),
            }
        }
        tutor.groq_api_key = non_empty("GROQ_API_KEY");
        tutor.openai_api_key = non_empty("OPENAI_API_KEY");
        if let Some(secs) = non_empty("APRENDE_TUTOR_TIMEOUT").and_then(|v| v.parse().ok()) {
            tutor.timeout_secs = secs;
        }

        Self {
            db_path,
            session_path,
            tutor,
        }
    }
}

/// Where logs go while the TUI owns the terminal. Read before the rest of the
/// configuration so config warnings land in it too.
pub fn log_path() -> PathBuf {
    log_path_from(|name| std::env::var(name).ok())
}

fn log_path_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("APRENDE_LOG_FILE")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join(DEFAULT_LOG_NAME))
}

fn data_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aprende");

    std::fs::create_dir_all(&dir).ok();
    dir
}
