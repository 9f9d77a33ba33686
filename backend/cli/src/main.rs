mod backend;
mod chat_cmd;
mod config_cmd;
mod doctor_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use vani_config::{apply_all_defaults, config_dir, config_file_path, load_and_prepare, load_config};
use vani_core::Language;
use vani_logging::{init_logger, LoggerGuard};
use vani_tutor::classify;

use chat_cmd::ChatArgs;

#[derive(Parser)]
#[command(name = "vani")]
#[command(about = "Vani: an offline Socratic tutor that asks instead of answering")]
#[command(version)]
struct Cli {
    /// Config directory (default: $VANI_CONFIG_DIR or ~/.vani)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tutoring session
    Chat {
        /// Problem text (otherwise read from --file or asked for)
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,
        /// File holding the extracted problem text
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Reply language: en, hi, kn, ta, te
        #[arg(short, long)]
        language: Option<Language>,
        /// Backend: ollama, demo or auto
        #[arg(short, long)]
        backend: Option<String>,
        /// Export the transcript on exit (.json or .html)
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// Print the detected subject of a problem
    Classify {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Check config, backend and translator health
    Doctor,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config
    Show,
    /// Write a config file with every default filled in
    Init {
        #[arg(long)]
        force: bool,
    },
}

/// Logging settings come from the raw file so that load-time warnings are
/// already captured by the subscriber.
async fn start_logging(dir: &std::path::Path) -> Result<LoggerGuard> {
    let raw = load_config(&config_file_path(dir)).await.unwrap_or_default();
    let config = apply_all_defaults(raw);
    let level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.clone())
        .unwrap_or_else(|| vani_config::defaults::DEFAULT_LOG_LEVEL.to_string());
    let log_dir = vani_config::log_dir(&config, dir);
    init_logger(log_dir.as_deref(), &level, terminal_output::supports_color())
        .or_else(|_| init_logger(None, vani_config::defaults::DEFAULT_LOG_LEVEL, false))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.config_dir.clone().unwrap_or_else(config_dir);
    let path = config_file_path(&dir);
    let guard = start_logging(&dir).await?;

    match cli.command {
        Commands::Config {
            action: ConfigAction::Init { force },
        } => config_cmd::init(&path, force).await?,
        Commands::Classify { text, json } => {
            let subject = classify(&text);
            if json {
                println!("{}", serde_json::json!({ "subject": subject, "name": subject.display_name() }));
            } else {
                println!("{}", subject.display_name());
            }
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => config_cmd::show(&load_and_prepare(&path).await?, &path)?,
        Commands::Doctor => {
            let config = apply_all_defaults(load_config(&path).await?);
            if !doctor_cmd::run(&config, &path).await? {
                drop(guard);
                std::process::exit(1);
            }
        }
        Commands::Chat {
            text,
            file,
            language,
            backend,
            transcript,
        } => {
            let config = load_and_prepare(&path).await?;
            let args = ChatArgs {
                text,
                file,
                language,
                backend,
                transcript,
            };
            chat_cmd::run(&config, args).await?
        }
    }

    drop(guard);
    Ok(())
}
