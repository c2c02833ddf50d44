mod achievements;
mod config;
mod content;
mod db;
mod error;
mod games;
mod models;
mod play;
mod progress_view;
mod scoring;
mod session;
mod tui;
mod tutor;

use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use config::Config;
use db::{Database, ProgressStore};
use games::GameKind;
use models::JsonOutput;
use progress_view::ProgressReport;
use session::{Session, SessionCache};
use tutor::{ChatSession, SendOutcome};

#[derive(Parser)]
#[command(name = "aprende")]
#[command(about = "Juegos, tutor y progreso para aprender jugando")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Save the learner's name for this device
    Onboard {
        /// Name shown in greetings; also the progress key
        name: String,
    },

    /// Show who is playing
    Whoami,

    /// List the games
    Games,

    /// Play a game in the terminal
    Play {
        /// memory, sequence, wordsearch, pattern or math
        game: String,
    },

    /// Show score, level, achievements and recent activity
    Progress,

    /// Show recent activity
    Activity {
        /// Number of records to show
        #[arg(long, short, default_value_t = db::RECENT_ACTIVITY_LIMIT)]
        limit: usize,
    },

    /// List achievements and which are unlocked
    Achievements,

    /// List tutor subjects
    Subjects,

    /// Read a subject's frequent questions
    Ask {
        /// Subject id (matematica, lenguaje, ciencias, sociales)
        subject: String,

        /// Question number to read
        index: Option<usize>,
    },

    /// Chat with the tutor about a subject
    Chat {
        /// Subject id (matematica, lenguaje, ciencias, sociales)
        #[arg(default_value = content::DEFAULT_SUBJECT)]
        subject: String,
        /// Continue a saved conversation by id
        #[arg(long)]
        resume: Option<i64>,
    },

    /// Tips for parents
    Guide {
        /// Category id (salud, hogar, escuela)
        category: Option<String>,
    },

    /// Launch interactive terminal UI
    Tui {
        /// Route to open first (/, /juegos, /chat-educativo, /progreso, /guia-padres)
        #[arg(long, default_value = "/")]
        route: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Commands::Tui { .. }));
    let json = cli.json;

    if let Err(e) = run(cli) {
        if let (true, Ok(out)) = (json, serde_json::to_string(&JsonOutput::<()>::err(e.to_string()))) {
            println!("{}", out);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_logging(tui: bool) {
    let filter = EnvFilter::try_from_env("APRENDE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!tui)
        .with_writer(log_writer(tui, &config::log_path()))
        .init();
}

/// Stderr, except under the TUI: it owns the terminal, so logs go to a file.
fn log_writer(tui: bool, path: &Path) -> BoxMakeWriter {
    if !tui {
        return BoxMakeWriter::new(io::stderr);
    }
    let file = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(path));
    match file {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(io::sink),
    }
}

fn open_db(config: &Config) -> Result<Database, Box<dyn std::error::Error>> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&config.db_path)?;
    db.init()?;
    Ok(db)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let db = open_db(&config)?;
    let mut cache = SessionCache::load(&config.session_path)?;
    let session = Session::from_cache(&cache);
    debug!(learner = %session.key(), db = %config.db_path.display(), "session resolved");

    match cli.command {
        Commands::Init => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", config.db_path.display());
            }
        }

        Commands::Onboard { name } => {
            if name.trim().is_empty() {
                return Err("el nombre no puede estar vacío".into());
            }
            cache.onboard(&name);
            cache.save(&config.session_path)?;
            let session = Session::from_cache(&cache);
            info!(learner = %session.key(), "onboarded");

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "display_name": session.display_name(),
                        "key": session.key().as_str(),
                    })))?
                );
            } else {
                println!("¡Bienvenido, {}! 🎉", session.display_name());
            }
        }

        Commands::Whoami => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "display_name": session.display_name(),
                        "key": session.key().as_str(),
                        "has_onboarded": cache.has_onboarded,
                    })))?
                );
            } else {
                println!("Nombre: {}", session.display_name());
                println!("Clave: {}", session.key());
                if !cache.has_onboarded {
                    println!("Todavía no hay nombre guardado. Usa: aprende onboard <nombre>");
                }
            }
        }

        Commands::Games => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(content::GAMES))?);
            } else {
                println!("{:<12} {:<22} HABILIDADES", "ID", "JUEGO");
                println!("{}", "-".repeat(60));
                for game in content::GAMES {
                    println!(
                        "{:<12} {} {:<20} {}",
                        game.kind.as_str(),
                        game.icon,
                        game.name,
                        game.skills.join(", ")
                    );
                }
            }
        }

        Commands::Play { game } => {
            let kind = GameKind::from_str(&game)
                .ok_or_else(|| {
                    format!("juego desconocido: '{}' (opciones: {})", game, GameKind::known_names())
                })?;
            info!(game = kind.as_str(), label = kind.activity_label(), learner = %session.key(), "play");
            if let Some(info) = content::game(kind) {
                println!("{} {} · {}", info.icon, info.name, info.duration);
            }

            let input = play::Background::spawn(io::BufReader::new(io::stdin()));
            let mut player = play::Player::new(input, io::stdout(), &db, &session);
            player.play(kind, &mut rand::thread_rng())?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(player.recorded()))?);
            }
        }

        Commands::Progress => {
            let report = ProgressReport::load(&db, &session);
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&report))?);
            } else {
                print_report(&report);
            }
        }

        Commands::Activity { limit } => {
            let records = db.recent_activity(session.key(), limit)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&records))?);
            } else if records.is_empty() {
                println!("No activity yet.");
            } else {
                for r in records {
                    println!(
                        "{:<20} {} {:<30} +{}",
                        truncate(&r.created_at, 19),
                        r.activity_type.icon(),
                        truncate(&r.activity_name, 28),
                        r.points_earned
                    );
                }
            }
        }

        Commands::Achievements => {
            let progress = db
                .get_progress(session.key())?
                .unwrap_or_else(|| models::Progress::empty(session.key()));
            let states = achievements::achievement_states(&progress);
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&states))?);
            } else {
                for state in states {
                    let a = state.achievement;
                    let mark = if state.unlocked { a.icon } else { "🔒" };
                    println!("{} {:<12} {}", mark, a.name, a.description);
                }
            }
        }

        Commands::Subjects => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(content::SUBJECTS))?);
            } else {
                for s in content::SUBJECTS {
                    println!("{:<12} {} {:<18} {}", s.id, s.icon, s.name, s.description);
                }
            }
        }

        Commands::Ask { subject, index } => {
            let subject = content::subject(&subject)
                .ok_or_else(|| format!("materia desconocida: '{}'", subject))?;

            match index {
                None => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(subject.faq))?);
                    } else {
                        println!("{} {}", subject.icon, subject.name);
                        for (i, faq) in subject.faq.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, faq.question);
                        }
                    }
                }
                Some(n) => {
                    let faq = n
                        .checked_sub(1)
                        .and_then(|i| subject.faq.get(i))
                        .ok_or_else(|| format!("pregunta {} no existe", n))?;
                    let outcome = tutor::record_faq_read(&db, &session, subject, faq);

                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "faq": faq,
                                "outcome": outcome,
                            })))?
                        );
                    } else {
                        println!("{}", faq.question);
                        println!();
                        println!("{}", faq.answer);
                        if let Some(notice) = outcome.notice() {
                            println!("⚠️  {}", notice);
                        }
                    }
                }
            }
        }

        Commands::Chat { subject, resume } => {
            let client = tutor::client_from_config(&config.tutor)?;
            let mut chat = match resume {
                Some(id) => {
                    let conversation = db
                        .get_conversation(id)?
                        .filter(|c| c.child_name == session.key().as_str())
                        .ok_or_else(|| format!("conversación no encontrada: {}", id))?;
                    ChatSession::resume(conversation)
                }
                None => ChatSession::new(&subject),
            };
            let info = content::subject_or_default(chat.subject());
            println!(
                "{} Tutor de {} ({}). Escribe tu pregunta; 'salir' para terminar.",
                info.icon,
                info.name,
                config.tutor.backend.as_str()
            );

            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            loop {
                print!("{}> ", session.display_name());
                io::stdout().flush()?;
                let Some(line) = lines.next().transpose()? else {
                    break;
                };
                if matches!(line.trim(), "salir" | "q" | "quit") {
                    break;
                }

                let outcome = chat.send(&line, client.as_ref(), &db, &session);
                if let SendOutcome::Ignored = outcome {
                    continue;
                }
                if let Some(reply) = chat.messages().last() {
                    println!("Tutor: {}", reply.content);
                }
                if let Some(notice) = outcome.notice() {
                    println!("⚠️  {}", notice);
                }
            }

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "conversation_id": chat.conversation_id(),
                        "messages": chat.messages(),
                    })))?
                );
            }
        }

        Commands::Guide { category } => match category {
            None => {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(content::PARENT_GUIDES))?);
                } else {
                    for g in content::PARENT_GUIDES {
                        println!("{:<10} {} {:<10} {}", g.id, g.icon, g.name, g.description);
                    }
                }
            }
            Some(id) => {
                let guide =
                    content::guide(&id).ok_or_else(|| format!("categoría desconocida: '{}'", id))?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(guide))?);
                } else {
                    println!("{} {}: {}", guide.icon, guide.name, guide.description);
                    for tip in guide.tips {
                        println!();
                        println!("{}", tip.title);
                        println!("  {}", tip.content);
                        for example in tip.examples {
                            println!("  • {}", example);
                        }
                    }
                }
            }
        },

        Commands::Tui { route } => {
            let client = tutor::client_from_config(&config.tutor)?;
            tui::run(db, session, client, &route)?;
        }
    }

    Ok(())
}

fn print_report(report: &ProgressReport) {
    let p = &report.progress;
    println!("Progreso de {}", report.display_name);
    println!(
        "Puntos: {}  Nivel: {} ({})  Faltan {} para el siguiente",
        p.total_score,
        p.level,
        p.level_label(),
        report.points_to_next_level
    );
    println!(
        "Juegos: {}  Preguntas: {}  Logros: {}/{}",
        p.games_completed,
        p.questions_answered,
        report.unlocked_count(),
        report.achievements.len()
    );

    if !report.recent_activity.is_empty() {
        println!();
        println!("--- Actividad reciente ---");
        for r in &report.recent_activity {
            println!(
                "{} {:<30} +{}",
                r.activity_type.icon(),
                truncate(&r.activity_name, 28),
                r.points_earned
            );
        }
    }
}

/// Truncates by chars, not bytes. Shared with the TUI widgets.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hola", 10), "hola");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hola", 4), "hola");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("Sopa de Letras", 8), "Sopa ...");
        }

        #[test]
        fn truncate_multibyte() {
            assert_eq!(truncate("Matemáticas", 6), "Mat...");
            assert_eq!(truncate("Matemáticas Rápidas", 10), "Matemát...");
        }

        #[test]
        fn truncate_counts_chars_not_bytes() {
            assert_eq!(truncate("ñandú", 5), "ñandú");
        }
    }

    mod logging_tests {
        use super::*;
        use tracing_subscriber::fmt::MakeWriter;

        #[test]
        fn tui_logs_go_to_the_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("logs").join("aprende.log");

            let writer = log_writer(true, &path);
            writer.make_writer().write_all(b"tutor request failed\n").unwrap();
            writer.make_writer().write_all(b"otra vez\n").unwrap();

            let logged = std::fs::read_to_string(&path).unwrap();
            assert_eq!(logged, "tutor request failed\notra vez\n");
        }

        #[test]
        fn unwritable_log_file_is_silenced() {
            let dir = tempfile::tempdir().unwrap();
            // A directory cannot be opened for appending.
            let writer = log_writer(true, dir.path());
            writer.make_writer().write_all(b"nada").unwrap();
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["aprende", "init"]).unwrap();
            assert!(!cli.json);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_init_with_json() {
            let cli = Cli::try_parse_from(["aprende", "--json", "init"]).unwrap();
            assert!(cli.json);
        }

        #[test]
        fn parse_json_after_subcommand() {
            let cli = Cli::try_parse_from(["aprende", "progress", "--json"]).unwrap();
            assert!(cli.json);
            assert!(matches!(cli.command, Commands::Progress));
        }

        #[test]
        fn parse_onboard() {
            let cli = Cli::try_parse_from(["aprende", "onboard", "Ana María"]).unwrap();
            match cli.command {
                Commands::Onboard { name } => assert_eq!(name, "Ana María"),
                _ => panic!("Expected Onboard command"),
            }
        }

        #[test]
        fn onboard_requires_name() {
            assert!(Cli::try_parse_from(["aprende", "onboard"]).is_err());
        }

        #[test]
        fn parse_play() {
            let cli = Cli::try_parse_from(["aprende", "play", "memory"]).unwrap();
            match cli.command {
                Commands::Play { game } => {
                    assert_eq!(GameKind::from_str(&game), Some(GameKind::Memory));
                }
                _ => panic!("Expected Play command"),
            }
        }

        #[test]
        fn parse_activity_default_limit() {
            let cli = Cli::try_parse_from(["aprende", "activity"]).unwrap();
            match cli.command {
                Commands::Activity { limit } => assert_eq!(limit, 10),
                _ => panic!("Expected Activity command"),
            }
        }

        #[test]
        fn parse_activity_with_limit_short() {
            let cli = Cli::try_parse_from(["aprende", "activity", "-l", "3"]).unwrap();
            match cli.command {
                Commands::Activity { limit } => assert_eq!(limit, 3),
                _ => panic!("Expected Activity command"),
            }
        }

        #[test]
        fn parse_ask_with_index() {
            let cli = Cli::try_parse_from(["aprende", "ask", "ciencias", "2"]).unwrap();
            match cli.command {
                Commands::Ask { subject, index } => {
                    assert_eq!(subject, "ciencias");
                    assert_eq!(index, Some(2));
                }
                _ => panic!("Expected Ask command"),
            }
        }

        #[test]
        fn parse_ask_rejects_non_numeric_index() {
            assert!(Cli::try_parse_from(["aprende", "ask", "ciencias", "dos"]).is_err());
        }

        #[test]
        fn parse_chat_defaults_to_maths() {
            let cli = Cli::try_parse_from(["aprende", "chat"]).unwrap();
            match cli.command {
                Commands::Chat { subject, resume } => {
                    assert_eq!(subject, "matematica");
                    assert!(resume.is_none());
                }
                _ => panic!("Expected Chat command"),
            }
        }

        #[test]
        fn parse_guide_with_category() {
            let cli = Cli::try_parse_from(["aprende", "guide", "hogar"]).unwrap();
            match cli.command {
                Commands::Guide { category } => assert_eq!(category.as_deref(), Some("hogar")),
                _ => panic!("Expected Guide command"),
            }
        }

        #[test]
        fn parse_tui() {
            let cli = Cli::try_parse_from(["aprende", "tui"]).unwrap();
            match cli.command {
                Commands::Tui { route } => assert_eq!(route, "/"),
                _ => panic!("expected tui"),
            }

            let cli = Cli::try_parse_from(["aprende", "tui", "--route", "/juegos"]).unwrap();
            match cli.command {
                Commands::Tui { route } => assert_eq!(route, "/juegos"),
                _ => panic!("expected tui"),
            }
        }

        #[test]
        fn missing_subcommand_is_an_error() {
            assert!(Cli::try_parse_from(["aprende"]).is_err());
        }
    }
}
