//! `vani chat`: interactive tutoring session on stdin/stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use vani_config::VaniConfig;
use vani_core::{phrase, Language, Phrase, TutorError};
use vani_tutor::{export_transcript, Session, TurnOutcome, TutorController};

use crate::backend::build_controller;
use crate::terminal_output as out;

pub struct ChatArgs {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub language: Option<Language>,
    pub backend: Option<String>,
    pub transcript: Option<PathBuf>,
}

/// A line typed at the answer prompt.
#[derive(Debug, PartialEq)]
enum Input {
    Answer(String),
    Lang(Option<Language>),
    New,
    Save(Option<PathBuf>),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Answer(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Input::Quit,
        "lang" | "language" => Input::Lang(arg.parse().ok()),
        "new" => Input::New,
        "save" => Input::Save((!arg.is_empty()).then(|| PathBuf::from(arg))),
        "help" | "?" => Input::Help,
        _ => Input::Answer(line.to_string()),
    }
}

const HELP: &str = "/lang <en|hi|kn|ta|te>  switch reply language\n\
                    /new                    start over with a new problem\n\
                    /save <file.json|html>  export the transcript\n\
                    /quit                   end the session";

pub async fn run(config: &VaniConfig, args: ChatArgs) -> Result<()> {
    let mut language = match args.language {
        Some(lang) => lang,
        None => vani_config::default_language(config)?,
    };
    let controller = build_controller(config, args.backend.as_deref()).await?;
    if controller.backend_name() == "demo" {
        out::note_warn("Demo mode: Ollama is not in use, replies are canned examples.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let problem = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => read_problem_file(&path).await?,
        (None, None) => match read_problem(&mut lines, language).await? {
            Some(text) => text,
            None => return Ok(()),
        },
    };

    let mut session = match open_session(&controller, &problem, language).await? {
        Some(session) => session,
        None => return Ok(()),
    };
    out::print_dim(HELP);

    let mut announced_complete = false;
    loop {
        out::prompt_answer(language)?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => out::print_dim(HELP),
            Input::Lang(None) => out::note_error("Unknown language. Use en, hi, kn, ta or te."),
            Input::Lang(Some(lang)) => {
                language = lang;
                session.set_language(lang);
                out::note_info(&format!("{} → {}", lang.english_name(), lang.display_name()));
            }
            Input::Save(path) => {
                let path = path.or_else(|| args.transcript.clone());
                match path {
                    Some(path) => save(&session, &path).await,
                    None => out::note_error("Usage: /save <file.json|file.html>"),
                }
            }
            Input::New => {
                finish(&session, args.transcript.as_deref()).await;
                println!("\n{}", phrase(Phrase::NewSession, language));
                let Some(text) = read_problem(&mut lines, language).await? else {
                    return Ok(());
                };
                match open_session(&controller, &text, language).await? {
                    Some(next) => session = next,
                    None => return Ok(()),
                }
                announced_complete = false;
            }
            Input::Answer(text) => match controller.submit_turn(&mut session, &text).await {
                Ok(outcome) => {
                    show(&outcome, language);
                    if outcome.mastered {
                        out::note_success("Mastered! You worked it out yourself.");
                    }
                    if outcome.dialogue_complete && !announced_complete {
                        announced_complete = true;
                        out::note_info("Turn limit reached. Keep going, or /new for another problem.");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "turn failed");
                    out::note_error(&e.to_string());
                }
            },
        }
    }

    finish(&session, args.transcript.as_deref()).await;
    Ok(())
}

/// Reads non-empty problem text; `None` at end of input.
async fn read_problem(lines: &mut Lines<BufReader<Stdin>>, language: Language) -> Result<Option<String>> {
    loop {
        out::stream_write(
            &mut std::io::stdout(),
            &format!("{} › ", phrase(Phrase::ExtractedQuestion, language)),
        )?;
        match lines.next_line().await? {
            None => return Ok(None),
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => return Ok(Some(line)),
        }
    }
}

async fn open_session(
    controller: &TutorController,
    problem: &str,
    language: Language,
) -> Result<Option<Session>> {
    match controller.start_session(problem, language).await {
        Ok((session, outcome)) => {
            out::print_problem(
                session.problem_text(),
                session.subject().display_name(),
                language,
            );
            show(&outcome, language);
            Ok(Some(session))
        }
        Err(TutorError::NoProblemDetected) => {
            out::note_error("No problem text detected. Paste or type the question.");
            Ok(None)
        }
        Err(e) => bail!(e),
    }
}

fn show(outcome: &TurnOutcome, language: Language) {
    out::print_reply(&outcome.reply, outcome.mode, language);
    out::print_meter(outcome.comprehension_score, outcome.badge, language);
    if !outcome.repairs.is_empty() {
        let labels: Vec<&str> = outcome.repairs.iter().map(|r| r.label()).collect();
        info!(repairs = ?labels, "reply repaired");
    }
}

async fn save(session: &Session, path: &Path) {
    match export_transcript(session, path).await {
        Ok(written) => out::note_success(&format!("Transcript saved to {}", written.display())),
        Err(e) => out::note_error(&format!("{e:#}")),
    }
}

async fn finish(session: &Session, transcript: Option<&Path>) {
    if let Some(path) = transcript {
        save(session, path).await;
    }
    out::print_meter(session.comprehension_score(), session.badge(), session.language());
}

/// Reads already extracted problem text. Documents that still need text
/// extraction are refused with a pointer to what to do instead.
async fn read_problem_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read problem file {}", path.display()))?;
    let kind = if bytes.starts_with(b"%PDF") {
        Some("a PDF")
    } else if bytes.starts_with(b"PK\x03\x04") {
        Some("an Office document")
    } else {
        None
    };
    if let Some(kind) = kind {
        bail!(
            "{} is {kind}; extract its text first and pass it with --text or as a .txt file",
            path.display()
        );
    }
    String::from_utf8(bytes)
        .with_context(|| format!("problem file {} is not UTF-8 text", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_answers() {
        assert_eq!(parse_input("force is 10 N"), Input::Answer("force is 10 N".into()));
        assert_eq!(parse_input(""), Input::Answer(String::new()));
        assert_eq!(parse_input("/unknown thing"), Input::Answer("/unknown thing".into()));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input(" /EXIT "), Input::Quit);
        assert_eq!(parse_input("/lang hi"), Input::Lang(Some(Language::Hi)));
        assert_eq!(parse_input("/lang Tamil"), Input::Lang(Some(Language::Ta)));
        assert_eq!(parse_input("/lang xx"), Input::Lang(None));
        assert_eq!(parse_input("/new"), Input::New);
        assert_eq!(parse_input("/save out/t.html"), Input::Save(Some(PathBuf::from("out/t.html"))));
        assert_eq!(parse_input("/save"), Input::Save(None));
    }

    #[tokio::test]
    async fn problem_file_must_be_plain_text() {
        let dir = std::env::temp_dir().join(format!("vani-problem-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let txt = dir.join("q.txt");
        tokio::fs::write(&txt, "F = ?, m = 5 kg, a = 2 m/s²\n").await.unwrap();
        assert!(read_problem_file(&txt).await.unwrap().contains("m = 5 kg"));

        let pdf = dir.join("q.pdf");
        tokio::fs::write(&pdf, b"%PDF-1.7\n...").await.unwrap();
        let err = read_problem_file(&pdf).await.unwrap_err().to_string();
        assert!(err.contains("a PDF"), "{err}");

        let docx = dir.join("q.docx");
        tokio::fs::write(&docx, b"PK\x03\x04rest").await.unwrap();
        let err = read_problem_file(&docx).await.unwrap_err().to_string();
        assert!(err.contains("Office document"), "{err}");

        let bin = dir.join("q.bin");
        tokio::fs::write(&bin, [0xffu8, 0xfe, 0x00]).await.unwrap();
        assert!(read_problem_file(&bin).await.is_err());

        assert!(read_problem_file(&dir.join("missing.txt")).await.is_err());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
