//! Reply validation.
//!
//! Nothing the backend produces reaches the student without passing through
//! here. Rules run in order:
//!
//! 1. one question per reply (leading statements plus the first question
//!    that has words in it; a reply with none left gets the canned question),
//! 2. answer-leak guard (heuristic, see [`states_final_value`]),
//! 3. language script check with translation,
//! 4. canned fallback for empty output or backend failure.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use vani_core::{Language, Mode, Script, Translator, TutorError};

use crate::session_state::Session;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

static FINAL_VALUE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\banswer\s*(?:is|:|=)\s*(?:about\s+|approximately\s+)?(-?\d+(?:\.\d+)?)",
        r"(?i)\bresult\s+(?:is|=)\s*(-?\d+(?:\.\d+)?)",
        r"=\s*(-?\d+(?:\.\d+)?)\s*[\p{L}/²³^]*\s*$",
        r"(?i)\btherefore\b.*?(-?\d+(?:\.\d+)?)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const UNKNOWN_MARKERS: &[&str] = &["?", "find", "calculate", "what is", "solve", "how much", "how many"];

/// A deterministic change made to a backend reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repair {
    /// Extra questions were cut or `??` runs collapsed; `dropped` sentences removed.
    TrimmedQuestions { dropped: usize },
    /// The reply stated the final value and was replaced.
    AnswerLeak,
    /// Question marks but no worded question; replaced by the canned one.
    NoQuestionLeft,
    /// The reply was in the wrong script and was translated.
    Translated,
    /// The backend returned no words at all.
    EmptyGeneration,
    /// The backend call failed or timed out.
    BackendFailure,
}

impl Repair {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TrimmedQuestions { .. } => "trimmed_questions",
            Self::AnswerLeak => "answer_leak",
            Self::NoQuestionLeft => "no_question_left",
            Self::Translated => "translated",
            Self::EmptyGeneration => "empty_generation",
            Self::BackendFailure => "backend_failure",
        }
    }
}

/// Text that is safe to show, plus what was done to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedReply {
    pub text: String,
    pub repairs: Vec<Repair>,
}

/// Canned probing question for a mode, in English.
pub fn canned_reply(mode: Mode) -> &'static str {
    match mode {
        Mode::Scaffolded => {
            "Let's think about this step by step. What do we already know from the problem?"
        }
        Mode::Socratic => {
            "Let's pause here. Which quantity in the problem do you think matters most, and why?"
        }
        Mode::DeepProbe => {
            "Good progress so far. How would this idea apply if one of the given values changed?"
        }
        Mode::Hint => {
            "Here is a small hint: start by writing down the formula that links the quantities \
             you were given. Which formula could that be?"
        }
    }
}

pub struct ResponseValidator {
    translator: Arc<dyn Translator>,
}

impl ResponseValidator {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// `raw` is `Err` when the backend failed, `Ok` with whatever text it
    /// produced otherwise. Always returns a non-empty reply.
    pub async fn validate(&self, raw: Result<String, TutorError>, session: &Session) -> ValidatedReply {
        let mode = session.mode();
        let language = session.language();

        let text = match raw {
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, mode = %mode, "backend failed, using canned reply");
                return self.fallback(mode, language, Repair::BackendFailure).await;
            }
            Ok(text) if !text.chars().any(char::is_alphanumeric) => {
                warn!(session_id = %session.id(), mode = %mode, "backend returned nothing, using canned reply");
                return self.fallback(mode, language, Repair::EmptyGeneration).await;
            }
            Ok(text) => text,
        };

        let mut repairs = Vec::new();

        let original = text.trim();
        let mut text = match single_question(original) {
            Some((trimmed, _)) if trimmed == original => trimmed,
            Some((trimmed, dropped)) => {
                repairs.push(Repair::TrimmedQuestions { dropped });
                trimmed
            }
            None => {
                repairs.push(Repair::NoQuestionLeft);
                canned_reply(mode).to_string()
            }
        };

        if asks_for_unknown(session.problem_text()) && states_final_value(&text, session.problem_text()) {
            text = canned_reply(mode).to_string();
            repairs.push(Repair::AnswerLeak);
        }

        if wrong_script(&text, language) {
            if let Some(translated) = self.translate(&text, language).await {
                text = translated;
                repairs.push(Repair::Translated);
            }
        }

        for repair in &repairs {
            warn!(session_id = %session.id(), repair = repair.label(), "reply repaired");
        }
        ValidatedReply { text, repairs }
    }

    async fn fallback(&self, mode: Mode, language: Language, cause: Repair) -> ValidatedReply {
        let canned = canned_reply(mode);
        let mut repairs = vec![cause];
        let text = if language == Language::En {
            canned.to_string()
        } else if let Some(translated) = self.translate(canned, language).await {
            repairs.push(Repair::Translated);
            translated
        } else {
            canned.to_string()
        };
        ValidatedReply { text, repairs }
    }

    /// `None` keeps the original text.
    async fn translate(&self, text: &str, language: Language) -> Option<String> {
        match self.translator.translate(text, language).await {
            Ok(t) if t.trim().is_empty() => {
                warn!(translator = self.translator.name(), "empty translation, keeping original");
                None
            }
            Ok(t) if t.trim() == text.trim() => {
                debug!(translator = self.translator.name(), "translator returned the text unchanged");
                None
            }
            Ok(t) => Some(t.trim().to_string()),
            Err(e) => {
                warn!(translator = self.translator.name(), error = %e, "translation failed, keeping original");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '।' | '？' | '！' | '。')
}

fn is_question_mark(c: char) -> bool {
    matches!(c, '?' | '？')
}

/// A terminator at byte `i` of `text`, except the point inside a decimal
/// such as `2.5`.
fn ends_sentence(text: &str, i: usize, c: char) -> bool {
    if !is_terminator(c) {
        return false;
    }
    if c != '.' {
        return true;
    }
    let before = text[..i].chars().next_back();
    let after = text[i + c.len_utf8()..].chars().next();
    !(before.is_some_and(|b| b.is_ascii_digit()) && after.is_some_and(|a| a.is_ascii_digit()))
}

/// A sentence body and the run of terminators that closed it (may be empty).
struct Sentence<'a> {
    body: &'a str,
    terminators: &'a str,
}

impl Sentence<'_> {
    fn is_question(&self) -> bool {
        self.terminators.chars().any(is_question_mark)
    }

    fn has_words(&self) -> bool {
        self.body.chars().any(char::is_alphanumeric)
    }
}

fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let body_end = rest
            .char_indices()
            .find(|&(i, c)| ends_sentence(rest, i, c))
            .map_or(rest.len(), |(i, _)| i);
        let term_end = rest[body_end..]
            .char_indices()
            .find(|&(i, c)| !ends_sentence(rest, body_end + i, c))
            .map_or(rest.len(), |(i, _)| body_end + i);
        let body = &rest[..body_end];
        let terminators = &rest[body_end..term_end];
        if !body.trim().is_empty() || !terminators.is_empty() {
            sentences.push(Sentence { body, terminators });
        }
        rest = &rest[term_end..];
    }
    sentences
}

/// Keeps leading statements plus the first worded question, returning the
/// text and how many sentences were dropped. Bare terminator runs such as a
/// leading `??` are dropped. Replies with fewer than two question marks come
/// back unchanged; `None` means there were several question marks but no
/// worded question to keep.
fn single_question(text: &str) -> Option<(String, usize)> {
    let question_marks = text.chars().filter(|c| is_question_mark(*c)).count();
    let sentences = split_sentences(text);
    let questions = sentences.iter().filter(|s| s.is_question()).count();
    if question_marks < 2 && questions < 2 {
        return Some((text.to_string(), 0));
    }

    let mut out = String::new();
    let mut kept = 0;
    for sentence in sentences.iter().filter(|s| s.has_words()) {
        kept += 1;
        if sentence.is_question() {
            let mark = if sentence.terminators.contains('?') { '?' } else { '？' };
            out.push_str(sentence.body);
            out.push(mark);
            return Some((out.trim().to_string(), sentences.len() - kept));
        }
        out.push_str(sentence.body);
        out.push_str(sentence.terminators);
    }
    None
}

// ---------------------------------------------------------------------------
// Leak guard
// ---------------------------------------------------------------------------

/// Whether the problem asks for something to be found.
fn asks_for_unknown(problem: &str) -> bool {
    let lower = problem.to_lowercase();
    UNKNOWN_MARKERS.iter().any(|m| lower.contains(m))
}

fn numbers_in(text: &str) -> HashSet<String> {
    NUMBER_RE
        .find_iter(text)
        .map(|m| canonical_number(m.as_str()))
        .collect()
}

fn canonical_number(n: &str) -> String {
    let n = n.trim_start_matches('-');
    match n.parse::<f64>() {
        Ok(v) => v.to_string(),
        Err(_) => n.to_string(),
    }
}

/// Best-effort: a statement (not a question) that announces a final value
/// which is not one of the numbers given in the problem. Paraphrased answers
/// and values written in words slip through.
pub fn states_final_value(reply: &str, problem: &str) -> bool {
    let given = numbers_in(problem);
    split_sentences(reply)
        .iter()
        .filter(|s| !s.is_question())
        .any(|s| {
            let body = s.body.trim();
            FINAL_VALUE_RES.iter().any(|re| {
                re.captures_iter(body).any(|caps| {
                    caps.get(1)
                        .is_some_and(|n| !given.contains(&canonical_number(n.as_str())))
                })
            })
        })
}

// ---------------------------------------------------------------------------
// Script check
// ---------------------------------------------------------------------------

/// True when some other script has more letters than the language's own.
fn wrong_script(text: &str, language: Language) -> bool {
    let expected = language.script();
    let mut own = 0usize;
    let mut others: [usize; 5] = [0; 5];
    for script in text.chars().filter_map(Script::of) {
        if script == expected {
            own += 1;
        } else {
            others[script as usize] += 1;
        }
    }
    others.iter().any(|&n| n > own)
}
