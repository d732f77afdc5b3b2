//! Terminal front end for the tutor.
//!
//! Diagnostics go to stderr; the conversation goes to stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tutor::store::achievements::{achievement_progress, completion_percent};
use tutor::store::progress::dashboard;
use tutor::store::{SettingsPatch, StatsPatch};
use tutor::{
    Action, Emotion, ImageAttachment, LearningLevel, ReplySource, TutorConfig, TutorSession,
};

/// Adaptive AI tutor.
#[derive(Parser)]
#[command(name = "tutor", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting learning level (beginner, intermediate, advanced, expert).
    #[arg(short, long)]
    level: Option<LearningLevel>,

    /// Read every reply aloud.
    #[arg(long)]
    speak: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session (default).
    Chat,

    /// Ask a single question and exit.
    Ask {
        question: String,

        /// Image to attach.
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tutor=info")),
        )
        .init();

    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(TutorConfig::default_config_path);

    if let Some(Command::InitConfig { force }) = cli.command {
        return init_config(&path, force);
    }

    let config = TutorConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    if config.gemini.api_key.is_empty() {
        info!(
            "no API key in {} or {}; answering locally",
            path.display(),
            tutor::config::API_KEY_ENV
        );
    }

    let session = TutorSession::from_config(&config);
    if let Some(level) = cli.level {
        session.dispatch(Action::SetLearningLevel(level));
    }

    match cli.command {
        Some(Command::Ask { question, image }) => {
            let image = image
                .as_deref()
                .map(ImageAttachment::from_path)
                .transpose()?;
            ask(&session, &question, image, cli.speak).await
        }
        _ => run_chat(&session, cli.speak).await,
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    TutorConfig::default().save_to_file(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn ask(
    session: &TutorSession,
    question: &str,
    image: Option<ImageAttachment>,
    speak: bool,
) -> anyhow::Result<()> {
    let reply = interruptible(session, session.send_message(question, image)).await?;
    println!("{}", reply.text);
    if speak {
        session.speak_last_reply().await?;
    }
    Ok(())
}

const HELP: &str = "\
Commands:
  /level <beginner|intermediate|advanced|expert>
  /emotion <curious|confused|frustrated|excited|neutral|engaged|bored>
  /image <path> [question]   ask about an image
  /voice                     ask by speaking
  /speak                     read the last reply aloud
  /clear                     clear the conversation
  /reset                     retry the remote tutor after fallback
  /progress                  show progress
  /achievements              show achievements
  /settings [json]           show or update settings, e.g. {\"fontSize\": 18}
  /stats [json]              show or update stats, e.g. {\"totalPoints\": 120}
  /tab <learn|progress|achievements|settings>
  /quit";

async fn run_chat(session: &TutorSession, speak: bool) -> anyhow::Result<()> {
    println!("Tutor v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Level: {}. Type a question, or /help for commands.\n",
        session.learning_level().display_name()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match line.strip_prefix('/') {
            Some(command) => match run_command(session, command).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => Ok(()),
                Err(e) => Err(e),
            },
            None => turn(session, line, None, speak).await,
        };
        if let Err(e) = outcome {
            eprintln!("error: {e:#}");
        }
    }
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

async fn run_command(session: &TutorSession, command: &str) -> anyhow::Result<Flow> {
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((command, ""));

    match name {
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => println!("{HELP}"),
        "level" => {
            let level: LearningLevel = arg.parse().map_err(anyhow::Error::msg)?;
            session.dispatch(Action::SetLearningLevel(level));
            println!("Level: {} ({})", level.display_name(), level.description());
        }
        "emotion" => {
            let emotion: Emotion = arg.parse().map_err(anyhow::Error::msg)?;
            session.set_emotion(emotion);
            println!("Emotion hint: {emotion:?}");
        }
        "image" => {
            let (path, question) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
            if path.is_empty() {
                anyhow::bail!("usage: /image <path> [question]");
            }
            let image = ImageAttachment::from_path(Path::new(path))?;
            turn(session, question.trim(), Some(image), false).await?;
        }
        "voice" if !session.voice().supports_recognition() => {
            println!("(speech recognition is not available on this platform)");
        }
        "voice" => match interruptible(session, session.voice_turn()).await? {
            Some(reply) => print_reply(&reply.text, &reply.source),
            None => println!("(nothing heard)"),
        },
        "speak" => {
            if !session.speak_last_reply().await? {
                println!("(no reply yet)");
            }
        }
        "clear" => {
            session.dispatch(Action::ClearChatHistory);
            println!("Conversation cleared.");
        }
        "reset" => {
            if session.reset_to_remote() {
                println!("Remote tutor re-enabled.");
            } else {
                println!("Remote tutor already active.");
            }
        }
        "progress" => {
            for metric in dashboard(&session.snapshot()) {
                println!(
                    "{} {:<18} {:>12}  {:>5.1}%",
                    metric.icon, metric.label, metric.value, metric.percent
                );
            }
        }
        "achievements" => {
            let state = session.snapshot();
            for a in &state.achievements {
                let mark = if a.unlocked { "✔" } else { " " };
                println!(
                    "[{mark}] {} {}: {} ({:.0}%)",
                    a.icon,
                    a.title,
                    a.description,
                    achievement_progress(&a.id, &state.user_stats)
                );
            }
            println!("{:.0}% complete", completion_percent(&state.achievements));
        }
        "settings" => {
            if !arg.is_empty() {
                let patch: SettingsPatch = serde_json::from_str(arg)?;
                session.dispatch(Action::UpdateSettings(patch));
            }
            println!("{}", serde_json::to_string_pretty(&session.snapshot().settings)?);
        }
        "stats" => {
            if !arg.is_empty() {
                let patch: StatsPatch = serde_json::from_str(arg)?;
                session.dispatch(Action::UpdateUserStats(patch));
            }
            println!("{}", serde_json::to_string_pretty(&session.snapshot().user_stats)?);
        }
        "tab" => {
            let tab = arg.parse().map_err(anyhow::Error::msg)?;
            session.dispatch(Action::SetActiveTab(tab));
        }
        other => anyhow::bail!("unknown command /{other} (try /help)"),
    }
    Ok(Flow::Continue)
}

async fn turn(
    session: &TutorSession,
    text: &str,
    image: Option<ImageAttachment>,
    speak: bool,
) -> anyhow::Result<()> {
    let reply = interruptible(session, session.send_message(text, image)).await?;
    print_reply(&reply.text, &reply.source);
    if speak {
        session.speak_last_reply().await?;
    }
    Ok(())
}

/// Drive a turn to completion; Ctrl-C abandons the remote attempt so the
/// turn is answered locally.
async fn interruptible<T>(
    session: &TutorSession,
    turn: impl Future<Output = tutor::Result<T>>,
) -> tutor::Result<T> {
    tokio::pin!(turn);
    loop {
        tokio::select! {
            result = &mut turn => return result,
            Ok(()) = tokio::signal::ctrl_c() => {
                if session.cancel_turn() {
                    eprintln!("(cancelled; answering locally)");
                } else if session.voice().stop_listening() {
                    eprintln!("(stopped listening)");
                }
            }
        }
    }
}

fn print_reply(text: &str, source: &ReplySource) {
    match source {
        ReplySource::Remote { model } => println!("\n[{model}]\n{text}\n"),
        ReplySource::Fallback => println!("\n[local]\n{text}\n"),
    }
}
