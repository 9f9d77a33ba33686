//! Transcript export.
//!
//! Writes a finished (or ongoing) session to disk on request, as JSON or as
//! a standalone HTML page. Nothing is ever read back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use vani_core::{Badge, Language, Mode, Speaker, Subject};

use crate::session_state::{Session, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Json,
    Html,
}

impl TranscriptFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
            Some("json") => Ok(Self::Json),
            Some("html") | Some("htm") => Ok(Self::Html),
            _ => bail!(
                "cannot infer transcript format from {} (use .json or .html)",
                path.display()
            ),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptDocument<'a> {
    id: Uuid,
    created_at: DateTime<Utc>,
    problem_text: &'a str,
    subject: Subject,
    language: Language,
    comprehension_score: u8,
    badge: Badge,
    mode: Mode,
    attempts: u32,
    turns: &'a [Turn],
}

impl<'a> From<&'a Session> for TranscriptDocument<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            id: session.id(),
            created_at: session.created_at(),
            problem_text: session.problem_text(),
            subject: session.subject(),
            language: session.language(),
            comprehension_score: session.comprehension_score(),
            badge: session.badge(),
            mode: session.mode(),
            attempts: session.attempts(),
            turns: session.turns(),
        }
    }
}

pub fn render_json(session: &Session) -> Result<String> {
    serde_json::to_string_pretty(&TranscriptDocument::from(session))
        .context("failed to serialize transcript")
}

pub fn render_html(session: &Session) -> String {
    let turns_html = session
        .turns()
        .iter()
        .map(|turn| {
            let (class, who) = match turn.speaker() {
                Speaker::Tutor => ("msg-tutor", "Vani"),
                Speaker::Student => ("msg-student", "Student"),
            };
            let verdict = turn
                .judgement()
                .map(|j| {
                    let mark = if j.correct { "on track" } else { "not yet" };
                    format!(" · {mark} · {}%", j.score)
                })
                .unwrap_or_default();
            format!(
                r#"<div class="message {class}"><span class="role">{who} · {at}{verdict}</span><div class="content">{content}</div></div>"#,
                at = turn.at().format("%H:%M:%S"),
                content = html_escape(turn.text()),
            )
        })
        .collect::<String>();

    let title = format!("{} session {}", session.subject(), short_id(session.id()));
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; background: #0f172a; color: #e2e8f0; }}
.summary {{ color: #94a3b8; margin-bottom: 1.5rem; }}
.message {{ margin-bottom: 1rem; border-radius: 8px; padding: 0.75rem 1rem; }}
.msg-student {{ background: #1e293b; }}
.msg-tutor {{ background: #111827; border-left: 3px solid #a855f7; }}
.role {{ font-weight: 700; font-size: 0.75rem; text-transform: uppercase; color: #94a3b8; display: block; margin-bottom: 0.25rem; }}
.content {{ white-space: pre-wrap; line-height: 1.6; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="summary">Comprehension {score}% ({badge}) · mode {mode} · {attempts} judged turns</p>
{turns}
</body>
</html>"#,
        lang = session.language().code(),
        title = html_escape(&title),
        score = session.comprehension_score(),
        badge = session.badge().label(),
        mode = session.mode(),
        attempts = session.attempts(),
        turns = turns_html,
    )
}

/// Writes the transcript, creating parent directories as needed.
pub async fn export_transcript(session: &Session, path: &Path) -> Result<PathBuf> {
    let format = TranscriptFormat::from_path(path)?;
    let body = match format {
        TranscriptFormat::Json => render_json(session)?,
        TranscriptFormat::Html => render_html(session),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("cannot write transcript to {}", path.display()))?;
    info!(session_id = %session.id(), path = %path.display(), "transcript exported");
    Ok(path.to_path_buf())
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vani_core::ModePolicy;

    use crate::comprehension::Judgement;

    fn session() -> Session {
        let mut s = Session::new("Is 3 < 5? Find x", Language::En, 50, ModePolicy::default()).unwrap();
        s.append(Speaker::Student, "help with <b>this</b>");
        s.append(Speaker::Tutor, "What do we know?");
        s
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TranscriptFormat::from_path(Path::new("a/b.JSON")).unwrap(), TranscriptFormat::Json);
        assert_eq!(TranscriptFormat::from_path(Path::new("t.html")).unwrap(), TranscriptFormat::Html);
        assert!(TranscriptFormat::from_path(Path::new("t.txt")).is_err());
        assert!(TranscriptFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn json_lists_turns_in_order() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&session()).unwrap()).unwrap();
        assert_eq!(json["subject"], "unknown");
        assert_eq!(json["comprehensionScore"], 50);
        assert_eq!(json["turns"][0]["speaker"], "student");
        assert_eq!(json["turns"][1]["text"], "What do we know?");
    }

    #[test]
    fn html_escapes_turn_text() {
        let html = render_html(&session());
        assert!(html.contains("help with &lt;b&gt;this&lt;/b&gt;"));
        assert!(!html.contains("<b>this</b>"));
        assert!(html.contains("msg-tutor"));
    }

    #[test]
    fn judged_turns_keep_the_score_trajectory() {
        let mut s = session();
        s.append_judged(
            "x is 4",
            Judgement { correct: true, heuristic_score: 65, backend_score: Some(80), score: 70 },
        );
        let json: serde_json::Value = serde_json::from_str(&render_json(&s).unwrap()).unwrap();
        assert!(json["turns"][0].get("judgement").is_none());
        assert_eq!(json["turns"][2]["judgement"]["score"], 70);
        assert_eq!(json["turns"][2]["judgement"]["backend_score"], 80);

        let html = render_html(&s);
        assert!(html.contains("on track · 70%"));
    }

    #[tokio::test]
    async fn writes_file() {
        let dir = std::env::temp_dir().join(format!("vani-export-{}", Uuid::new_v4().simple()));
        let path = dir.join("nested").join("t.json");
        let written = export_transcript(&session(), &path).await.unwrap();
        let body = tokio::fs::read_to_string(&written).await.unwrap();
        assert!(body.contains("What do we know?"));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
